//! # aatree: A Concurrent In-Memory AA-Tree
//!
//! This crate provides an ordered key-value map backed by an AA-tree, a
//! self-balancing binary search tree that tracks one integer *level* per node
//! instead of a red/black colour. Insertion, removal and lookup are
//! O(log n); iteration walks the keys in ascending order.
//!
//! ## Design Overview
//!
//! **Levels**: leaves sit at level 1. A left child is always one level below
//! its parent; a right child may share its parent's level (a *horizontal
//! link*) but two horizontal links may never follow each other. Two local
//! rotations, *skew* and *split*, restore these rules after every change.
//!
//! **Arena nodes**: nodes live in a slab owned by the tree and link to each
//! other through [`NodeId`]s. Each node also records its parent, which lets
//! iteration step to the in-order successor or predecessor without a stack,
//! and lets insertion and removal rebalance bottom-up without recursion.
//!
//! **One reader-writer lock**: [`Tree`] wraps a [`RawTree`] in a single
//! `parking_lot::RwLock`. Any number of readers proceed in parallel; an
//! insertion, removal or clear waits for exclusive access.
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │ Tree                 │
//!                 │  RwLock<RawTree>     │  <- one lock for the whole tree
//!                 └──────────┬───────────┘
//!                            │
//!                            ▼
//!                 ┌──────────────────────┐
//!                 │ RawTree              │
//!                 │  root, len, cmp      │
//!                 │  Slab<Node>          │  <- nodes addressed by NodeId
//!                 └──────────┬───────────┘
//!                            │
//!              ┌─────────────┴─────────────┐
//!              ▼                           ▼
//!        ┌──────────┐                ┌──────────┐
//!        │  Node    │ ◄── parent ──  │  Node    │
//!        │ level 2  │  ── right ──►  │ level 2  │  <- horizontal link
//!        └──────────┘                └──────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use aatree::Tree;
//!
//! let tree = Tree::new();
//!
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     tree.insert(key, key * 10);
//! }
//!
//! assert_eq!(tree.get(&4), Some(40));
//! assert_eq!(tree.get_closest_not_exceeding(&6), Some(50));
//! assert_eq!(tree.keys().collect::<Vec<_>>(), vec![1, 3, 4, 5, 7, 8, 9]);
//!
//! // Node-level access happens under an explicit read guard.
//! let guard = tree.read();
//! let four = guard.node_by_key(&4).unwrap();
//! assert_eq!(four.next().map(|n| *n.key()), Some(5));
//! assert_eq!(four.prev().map(|n| *n.key()), Some(3));
//! ```
//!
//! ## Thread Safety
//!
//! The tree can be shared across threads via `Arc<Tree<K, V>>`. Node handles
//! ([`NodeRef`]) and cursors ([`KeyCursor`], [`ValueCursor`]) keep the read
//! lock for as long as they live, so the structure cannot change while they
//! are in use.
//!
//! Read access never waits behind a queued writer: a thread holding a cursor
//! may call [`Tree::get`] or open further cursors while another thread is
//! blocked in [`Tree::insert`]. The flip side is that a steady stream of
//! readers can delay a writer indefinitely. Calling a mutating method while
//! the same thread still holds a handle or cursor deadlocks.

mod balance;
mod comparator;
pub mod error;
mod guard;
pub mod iter;
mod node;
mod raw;
mod sync;
mod tracing_helpers;

pub use comparator::{Comparator, NaturalOrder};
pub use error::{Error, Result};
pub use guard::{ReadGuard, WriteGuard};
pub use iter::{Cursor, Iter, KeyCursor, Keys, ValueCursor, Values};
pub use node::{NodeId, NodeRef};
pub use raw::RawTree;

use std::cmp::Ordering;
use std::fmt;

use sync::RwLock;
use tracing_helpers::debug_log;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// A thread-safe ordered map backed by an AA-tree.
///
/// # Type Parameters
///
/// - `K`: The key type.
/// - `V`: The value type.
/// - `C`: The key order, [`NaturalOrder`] (the key's [`Ord`]) by default, or
///   any `Fn(&K, &K) -> Ordering` closure.
///
/// Methods that hand out data return owned copies so that no reference
/// outlives the internal lock. For borrowed, node-level access take a
/// [`ReadGuard`] with [`Tree::read`].
pub struct Tree<K, V, C = NaturalOrder> {
	inner: RwLock<RawTree<K, V, C>>,
}

impl<K: Ord, V> Default for Tree<K, V> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K: Ord, V> Tree<K, V> {
	/// Creates an empty tree ordered by `K`'s [`Ord`] implementation.
	///
	/// # Example
	///
	/// ```
	/// use aatree::Tree;
	///
	/// let tree: Tree<String, i32> = Tree::new();
	/// assert!(tree.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::from_raw(RawTree::new())
	}

	/// Creates an empty tree whose arena can hold `capacity` nodes before it
	/// reallocates.
	pub fn with_capacity(capacity: usize) -> Self {
		Self::from_raw(RawTree::with_capacity(capacity))
	}
}

impl<K, V, C> Tree<K, V, C> {
	/// Wraps an existing [`RawTree`].
	pub fn from_raw(raw: RawTree<K, V, C>) -> Self {
		Tree {
			inner: RwLock::new(raw),
		}
	}

	// -----------------------------------------------------------------------
	// Locking
	// -----------------------------------------------------------------------

	/// Acquires shared access, blocking while a writer holds the tree.
	///
	/// Shared access is granted even when a writer is already queued, so a
	/// thread that holds a cursor can keep reading without waiting on it.
	pub fn read(&self) -> ReadGuard<'_, K, V, C> {
		ReadGuard::new(self.inner.read_recursive())
	}

	/// Acquires exclusive access, blocking while any other guard is alive.
	///
	/// # Example
	///
	/// ```
	/// use aatree::Tree;
	///
	/// let tree: Tree<i32, i32> = Tree::new();
	/// {
	///     let mut guard = tree.write();
	///     for i in 0..10 {
	///         guard.insert(i, i);
	///     }
	///     *guard.get_mut(&3).unwrap() = 300;
	/// }
	/// assert_eq!(tree.get(&3), Some(300));
	/// ```
	pub fn write(&self) -> WriteGuard<'_, K, V, C> {
		WriteGuard::new(self.inner.write())
	}

	/// Acquires shared access if no writer holds the tree.
	pub fn try_read(&self) -> Option<ReadGuard<'_, K, V, C>> {
		self.inner.try_read_recursive().map(ReadGuard::new)
	}

	/// Acquires exclusive access if no other guard is alive.
	pub fn try_write(&self) -> Option<WriteGuard<'_, K, V, C>> {
		self.inner.try_write().map(WriteGuard::new)
	}
}

impl<K, V, C: Comparator<K>> Tree<K, V, C> {
	/// Creates an empty tree ordered by `comparator`.
	///
	/// # Example
	///
	/// ```
	/// use aatree::Tree;
	///
	/// let tree = Tree::with_comparator(|a: &String, b: &String| {
	///     a.to_lowercase().cmp(&b.to_lowercase())
	/// });
	/// tree.insert("Beta".to_string(), 2);
	/// tree.insert("alpha".to_string(), 1);
	/// tree.insert("BETA".to_string(), 3);
	///
	/// assert_eq!(tree.len(), 2);
	/// assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["alpha", "Beta"]);
	/// assert_eq!(tree.get(&"beta".to_string()), Some(3));
	/// ```
	pub fn with_comparator(comparator: C) -> Self {
		Self::from_raw(RawTree::with_comparator(comparator))
	}

	pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
		Self::from_raw(RawTree::with_capacity_and_comparator(capacity, comparator))
	}

	// -----------------------------------------------------------------------
	// Public API: Read Operations
	// -----------------------------------------------------------------------

	/// Looks up a key and passes its value to a closure.
	///
	/// The closure runs while the read lock is held, which makes this the way
	/// to inspect values that are expensive (or impossible) to clone.
	///
	/// # Example
	///
	/// ```
	/// use aatree::Tree;
	///
	/// let tree: Tree<String, Vec<i32>> = Tree::new();
	/// tree.insert("key".to_string(), vec![1, 2, 3]);
	///
	/// let len = tree.lookup(&"key".to_string(), |v| v.len());
	/// assert_eq!(len, Some(3));
	/// ```
	pub fn lookup<R, F>(&self, key: &K, f: F) -> Option<R>
	where
		F: FnOnce(&V) -> R,
	{
		self.read().get(key).map(f)
	}

	/// Returns a clone of the value stored under `key`.
	pub fn get(&self, key: &K) -> Option<V>
	where
		V: Clone,
	{
		self.lookup(key, V::clone)
	}

	/// Returns `true` if the tree holds `key`.
	pub fn contains_key(&self, key: &K) -> bool {
		self.read().contains_key(key)
	}

	/// Returns a clone of the value stored under the greatest key that does
	/// not exceed `key`, or `None` if every key is greater.
	///
	/// # Example
	///
	/// ```
	/// use aatree::Tree;
	///
	/// let tree = Tree::new();
	/// tree.insert(10, "ten");
	/// tree.insert(20, "twenty");
	///
	/// assert_eq!(tree.get_closest_not_exceeding(&15), Some("ten"));
	/// assert_eq!(tree.get_closest_not_exceeding(&20), Some("twenty"));
	/// assert_eq!(tree.get_closest_not_exceeding(&5), None);
	/// ```
	pub fn get_closest_not_exceeding(&self, key: &K) -> Option<V>
	where
		V: Clone,
	{
		self.read().get_closest_not_exceeding(key).cloned()
	}

	/// Applies `f` to the smallest entry.
	pub fn first_key_value<R, F>(&self, f: F) -> Option<R>
	where
		F: FnOnce(&K, &V) -> R,
	{
		self.read().first().map(|node| f(node.key(), node.value()))
	}

	/// Applies `f` to the greatest entry.
	pub fn last_key_value<R, F>(&self, f: F) -> Option<R>
	where
		F: FnOnce(&K, &V) -> R,
	{
		self.read().last().map(|node| f(node.key(), node.value()))
	}

	/// Applies `f` to the entry found with a partial-key comparator.
	///
	/// See [`RawTree::node_by_key_with`] for the contract `cmp` must honour.
	pub fn lookup_with<Q, R, G, F>(&self, key: &Q, cmp: G, f: F) -> Option<R>
	where
		Q: ?Sized,
		G: Fn(&Q, &K) -> Ordering,
		F: FnOnce(&K, &V) -> R,
	{
		self.read().node_by_key_with(key, cmp).map(|node| f(node.key(), node.value()))
	}

	/// Applies `f` to the leftmost entry matching a partial-key comparator.
	///
	/// See [`RawTree::first_node_by_key_with`].
	pub fn lookup_first_with<Q, R, G, F>(&self, key: &Q, cmp: G, f: F) -> Option<R>
	where
		Q: ?Sized,
		G: Fn(&Q, &K) -> Ordering,
		F: FnOnce(&K, &V) -> R,
	{
		self.read().first_node_by_key_with(key, cmp).map(|node| f(node.key(), node.value()))
	}

	/// Returns a cursor over copies of the keys in ascending order.
	///
	/// The cursor holds the read lock until it is dropped.
	pub fn keys(&self) -> KeyCursor<'_, K, V, C>
	where
		K: Clone,
	{
		Cursor::new(self.read(), |key, _| key.clone())
	}

	/// Returns a cursor over copies of the values in ascending key order.
	///
	/// The cursor holds the read lock until it is dropped.
	pub fn values(&self) -> ValueCursor<'_, K, V, C>
	where
		V: Clone,
	{
		Cursor::new(self.read(), |_, value| value.clone())
	}

	/// Number of entries, O(1).
	pub fn len(&self) -> usize {
		self.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read().is_empty()
	}

	/// AA level of the root, 0 when empty.
	pub fn root_level(&self) -> u32 {
		self.read().root_level()
	}

	// -----------------------------------------------------------------------
	// Public API: Write Operations
	// -----------------------------------------------------------------------

	/// Inserts a key-value pair.
	///
	/// If the key already exists, its value is replaced and the old value is
	/// returned; the stored key is kept. If the key is new, `None` is returned.
	///
	/// # Example
	///
	/// ```
	/// use aatree::Tree;
	///
	/// let tree: Tree<i32, &str> = Tree::new();
	///
	/// assert_eq!(tree.insert(1, "one"), None);
	/// assert_eq!(tree.insert(1, "uno"), Some("one"));
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn insert(&self, key: K, value: V) -> Option<V> {
		self.write().insert(key, value)
	}

	/// Removes a key, returning its value if it was present.
	///
	/// Removing an absent key leaves the tree untouched.
	pub fn remove(&self, key: &K) -> Option<V> {
		self.write().remove(key)
	}

	/// Removes a key, returning the stored key and value.
	pub fn remove_entry(&self, key: &K) -> Option<(K, V)> {
		self.write().remove_entry(key)
	}

	/// Removes all entries.
	pub fn clear(&self) {
		self.write().clear();
	}

	// -----------------------------------------------------------------------
	// Validation
	// -----------------------------------------------------------------------

	/// Verifies the tree's structural invariants. See [`RawTree::validate`].
	pub fn validate(&self) -> Result<()> {
		self.read().validate()
	}

	/// Checks a partial-key comparator against the tree's order. See
	/// [`RawTree::check_comparator`].
	pub fn check_comparator<Q, F>(&self, key: &Q, cmp: F) -> Result<()>
	where
		Q: ?Sized,
		F: Fn(&Q, &K) -> Ordering,
	{
		self.read().check_comparator(key, cmp)
	}

	/// Validates all tree invariants, panicking with the violation if any.
	#[cfg(any(test, feature = "test-utils"))]
	pub fn assert_invariants(&self) {
		self.read().assert_invariants();
	}
}

impl<K: Clone, V: Clone, C: Clone> Clone for Tree<K, V, C> {
	/// Copies the tree under the read lock.
	///
	/// The copy owns its own arena: later changes to either tree are not
	/// visible in the other.
	fn clone(&self) -> Self {
		let guard = self.read();
		debug_log!(len = guard.len(), "clone");
		let raw: RawTree<K, V, C> = (*guard).clone();
		Tree::from_raw(raw)
	}
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Tree<K, V, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.read(), f)
	}
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for Tree<K, V, C> {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Tree::from_raw(iter.into_iter().collect())
	}
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for Tree<K, V, C> {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		self.write().extend(iter);
	}
}
