//! Drop-accounting tests for the AA-tree.
//!
//! Every key and value handed to the tree must be dropped exactly once:
//! when it is replaced, when it is removed (unless it is returned to the
//! caller), when the tree is cleared, or when the tree itself is dropped.
//! Removal moves entries between arena slots, so these tests track each
//! instance individually.
//!
//! For additional leak detection, run under LeakSanitizer:
//!
//! ```bash
//! RUSTFLAGS="-Zsanitizer=leak" cargo +nightly test --test memory_tests --target x86_64-unknown-linux-gnu
//! ```

use aatree::Tree;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

// ===========================================================================
// Helper Types
// ===========================================================================

/// Counts live instances; ordered by `id` only.
struct Tracked {
	id: u32,
	live: Arc<AtomicUsize>,
}

impl Tracked {
	fn new(id: u32, live: &Arc<AtomicUsize>) -> Self {
		live.fetch_add(1, AtomicOrdering::SeqCst);
		Tracked {
			id,
			live: Arc::clone(live),
		}
	}
}

impl Drop for Tracked {
	fn drop(&mut self) {
		let before = self.live.fetch_sub(1, AtomicOrdering::SeqCst);
		assert!(before > 0, "instance {} dropped twice", self.id);
	}
}

impl Clone for Tracked {
	fn clone(&self) -> Self {
		Tracked::new(self.id, &self.live)
	}
}

impl PartialEq for Tracked {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for Tracked {}

impl PartialOrd for Tracked {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Tracked {
	fn cmp(&self, other: &Self) -> Ordering {
		self.id.cmp(&other.id)
	}
}

fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
	(Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
}

fn live(counter: &Arc<AtomicUsize>) -> usize {
	counter.load(AtomicOrdering::SeqCst)
}

fn filled(n: u32, keys: &Arc<AtomicUsize>, values: &Arc<AtomicUsize>) -> Tree<Tracked, Tracked> {
	let tree = Tree::new();
	for i in 0..n {
		tree.insert(Tracked::new(i, keys), Tracked::new(i, values));
	}
	tree
}

// ===========================================================================
// Drop Accounting Tests
// ===========================================================================

#[test]
fn dropping_tree_drops_every_entry() {
	let (keys, values) = counters();
	let tree = filled(500, &keys, &values);
	assert_eq!(live(&keys), 500);
	assert_eq!(live(&values), 500);

	drop(tree);
	assert_eq!(live(&keys), 0);
	assert_eq!(live(&values), 0);
}

#[test]
fn clear_drops_every_entry() {
	let (keys, values) = counters();
	let tree = filled(500, &keys, &values);

	tree.clear();
	assert_eq!(live(&keys), 0);
	assert_eq!(live(&values), 0);
	assert!(tree.is_empty());
}

#[test]
fn replace_drops_new_key_and_returns_old_value() {
	let (keys, values) = counters();
	let tree = filled(10, &keys, &values);

	let old = tree.insert(Tracked::new(3, &keys), Tracked::new(300, &values)).unwrap();
	assert_eq!(old.id, 3);
	// The duplicate key is discarded; the stored key is kept.
	assert_eq!(live(&keys), 10);
	assert_eq!(live(&values), 11);
	drop(old);
	assert_eq!(live(&values), 10);
	assert_eq!(tree.lookup(&Tracked::new(3, &keys), |v| v.id), Some(300));
}

#[test]
fn remove_drops_only_the_removed_entry() {
	let (keys, values) = counters();
	let tree = filled(200, &keys, &values);

	// Removing in root-first order always takes the predecessor swap path.
	for n in 0..100 {
		let root = tree.read().root().map(|node| node.key().id).unwrap();
		let probe = Tracked::new(root, &keys);
		let removed = tree.remove(&probe).unwrap();
		drop(probe);
		assert_eq!(removed.id, root);
		drop(removed);
		assert_eq!(live(&keys), 200 - n - 1);
		assert_eq!(live(&values), 200 - n - 1);
	}
	tree.assert_invariants();
}

#[test]
fn remove_entry_hands_back_both_halves() {
	let (keys, values) = counters();
	let tree = filled(50, &keys, &values);

	let probe = Tracked::new(25, &keys);
	let (key, value) = tree.remove_entry(&probe).unwrap();
	drop(probe);
	assert_eq!((key.id, value.id), (25, 25));
	assert_eq!(live(&keys), 50);
	assert_eq!(live(&values), 50);

	drop((key, value));
	assert_eq!(live(&keys), 49);
	assert_eq!(live(&values), 49);
}

#[test]
fn clone_doubles_then_releases() {
	let (keys, values) = counters();
	let tree = filled(100, &keys, &values);
	let copy = tree.clone();
	assert_eq!(live(&keys), 200);
	assert_eq!(live(&values), 200);

	drop(tree);
	assert_eq!(live(&keys), 100);
	copy.assert_invariants();
	drop(copy);
	assert_eq!(live(&keys), 0);
	assert_eq!(live(&values), 0);
}

#[test]
fn slots_are_reused_after_removal() {
	let (keys, values) = counters();
	let tree = filled(1000, &keys, &values);
	for round in 0..10 {
		for i in 0..1000 {
			let probe = Tracked::new(i, &keys);
			tree.remove(&probe);
		}
		assert_eq!(live(&keys), 0, "round {round}");
		for i in 0..1000 {
			tree.insert(Tracked::new(i, &keys), Tracked::new(i, &values));
		}
	}
	tree.assert_invariants();
	assert_eq!(tree.len(), 1000);
}
