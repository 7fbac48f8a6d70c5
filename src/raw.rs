//! The unsynchronised AA-tree.
//!
//! [`RawTree`] owns the node arena, the root link, the entry count and the
//! key comparator. All structural work happens here; [`Tree`](crate::Tree)
//! only adds the reader-writer lock around it.
//!
//! Insertion and removal are iterative: the descent records nothing but the
//! last visited node, and the bottom-up rebalancing pass climbs back to the
//! root through the parent links.

use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;

use crate::comparator::{Comparator, NaturalOrder, Position};
use crate::error::{Error, Result};
use crate::iter::{Iter, Keys, Values};
use crate::node::{Arena, Node, NodeId, NodeRef};
use crate::tracing_helpers::{debug_log, trace_log, warn_log};

/// An ordered map backed by an AA-tree, without any synchronisation.
///
/// Mutation requires `&mut self`. Wrap it in a [`Tree`](crate::Tree) to share
/// it between threads.
///
/// # Example
///
/// ```
/// use aatree::RawTree;
///
/// let mut tree = RawTree::new();
/// for key in [5, 3, 8, 1, 4, 7, 9] {
///     tree.insert(key, key * 10);
/// }
///
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5, 7, 8, 9]);
/// assert_eq!(tree.get_closest_not_exceeding(&6), Some(&50));
/// assert_eq!(tree.get_closest_not_exceeding(&0), None);
/// ```
#[derive(Clone)]
pub struct RawTree<K, V, C = NaturalOrder> {
	pub(crate) arena: Arena<K, V>,
	pub(crate) root: Option<NodeId>,
	pub(crate) len: usize,
	pub(crate) comparator: C,
}

impl<K: Ord, V> RawTree<K, V> {
	/// Creates an empty tree ordered by `K`'s [`Ord`] implementation.
	pub fn new() -> Self {
		Self::with_comparator(NaturalOrder)
	}

	/// Creates an empty tree with room for `capacity` nodes before the arena
	/// reallocates.
	pub fn with_capacity(capacity: usize) -> Self {
		Self::with_capacity_and_comparator(capacity, NaturalOrder)
	}
}

impl<K, V, C: Comparator<K> + Default> Default for RawTree<K, V, C> {
	fn default() -> Self {
		Self::with_comparator(C::default())
	}
}

impl<K, V, C: Comparator<K>> RawTree<K, V, C> {
	/// Creates an empty tree ordered by `comparator`.
	///
	/// ```
	/// use aatree::RawTree;
	///
	/// let mut tree = RawTree::with_comparator(|a: &i32, b: &i32| b.cmp(a));
	/// tree.insert(1, "one");
	/// tree.insert(2, "two");
	/// assert_eq!(tree.first().map(|n| *n.key()), Some(2));
	/// ```
	pub fn with_comparator(comparator: C) -> Self {
		Self::with_capacity_and_comparator(0, comparator)
	}

	pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
		RawTree {
			arena: Arena::with_capacity(capacity),
			root: None,
			len: 0,
			comparator,
		}
	}

	/// Returns the comparator ordering this tree.
	pub fn comparator(&self) -> &C {
		&self.comparator
	}

	/// Number of entries, O(1).
	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// AA level of the root node, 0 for an empty tree.
	///
	/// The height of an AA-tree is at most twice its root level.
	pub fn root_level(&self) -> u32 {
		self.arena.level_of(self.root)
	}

	// -----------------------------------------------------------------------
	// Search
	// -----------------------------------------------------------------------

	fn find(&self, key: &K) -> Option<NodeId> {
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.arena[id];
			current = match self.comparator.compare(key, &node.key) {
				Ordering::Equal => return Some(id),
				Ordering::Less => node.left,
				Ordering::Greater => node.right,
			};
		}
		None
	}

	/// Greatest key not exceeding `key`.
	///
	/// Every node passed on the way down whose key is below the query becomes
	/// the candidate, since anything better must lie in its right subtree.
	fn find_not_exceeding(&self, key: &K) -> Option<NodeId> {
		let mut best = None;
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.arena[id];
			current = match self.comparator.compare(key, &node.key) {
				Ordering::Equal => return Some(id),
				Ordering::Less => node.left,
				Ordering::Greater => {
					best = Some(id);
					node.right
				}
			};
		}
		best
	}

	fn find_with<Q, F>(&self, key: &Q, cmp: &F) -> Option<NodeId>
	where
		Q: ?Sized,
		F: Fn(&Q, &K) -> Ordering,
	{
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.arena[id];
			current = match cmp(key, &node.key) {
				Ordering::Equal => return Some(id),
				Ordering::Less => node.left,
				Ordering::Greater => node.right,
			};
		}
		None
	}

	fn find_first_with<Q, F>(&self, key: &Q, cmp: &F) -> Option<NodeId>
	where
		Q: ?Sized,
		F: Fn(&Q, &K) -> Ordering,
	{
		let mut best = self.find_with(key, cmp)?;
		let mut current = self.arena[best].left;
		while let Some(id) = current {
			let node = &self.arena[id];
			current = match cmp(key, &node.key) {
				Ordering::Equal => {
					best = id;
					node.left
				}
				Ordering::Greater => node.right,
				Ordering::Less => node.left,
			};
		}
		Some(best)
	}

	/// Returns the node holding `key`.
	pub fn node_by_key(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
		self.find(key).map(|id| NodeRef::new(&self.arena, id))
	}

	/// Returns the node holding the greatest key that does not exceed `key`.
	pub fn nearest_not_exceeding(&self, key: &K) -> Option<NodeRef<'_, K, V>> {
		self.find_not_exceeding(key).map(|id| NodeRef::new(&self.arena, id))
	}

	/// Looks a node up with a caller-supplied comparator.
	///
	/// `cmp(key, stored)` may treat several stored keys as equal to `key`
	/// (for example a prefix match), but it must never contradict the tree's
	/// own order. When several nodes match, the one closest to the root is
	/// returned. Results are unspecified for a comparator that disagrees with
	/// the tree's order; see [`RawTree::check_comparator`].
	///
	/// ```
	/// use aatree::RawTree;
	/// use std::cmp::Ordering;
	///
	/// let mut tree = RawTree::new();
	/// for word in ["car", "cart", "carton", "dog"] {
	///     tree.insert(word.to_string(), ());
	/// }
	///
	/// let prefix = |q: &str, k: &String| {
	///     if k.starts_with(q) { Ordering::Equal } else { q.cmp(k.as_str()) }
	/// };
	/// assert!(tree.node_by_key_with("car", prefix).is_some());
	/// assert_eq!(tree.first_node_by_key_with("car", prefix).map(|n| n.key().as_str()), Some("car"));
	/// assert!(tree.node_by_key_with("cat", prefix).is_none());
	/// ```
	pub fn node_by_key_with<Q, F>(&self, key: &Q, cmp: F) -> Option<NodeRef<'_, K, V>>
	where
		Q: ?Sized,
		F: Fn(&Q, &K) -> Ordering,
	{
		self.find_with(key, &cmp).map(|id| NodeRef::new(&self.arena, id))
	}

	/// Like [`RawTree::node_by_key_with`], but returns the leftmost node of
	/// the run of keys comparing equal under `cmp`.
	pub fn first_node_by_key_with<Q, F>(&self, key: &Q, cmp: F) -> Option<NodeRef<'_, K, V>>
	where
		Q: ?Sized,
		F: Fn(&Q, &K) -> Ordering,
	{
		self.find_first_with(key, &cmp).map(|id| NodeRef::new(&self.arena, id))
	}

	/// The node holding the smallest key.
	pub fn first(&self) -> Option<NodeRef<'_, K, V>> {
		self.root.map(|root| NodeRef::new(&self.arena, self.arena.leftmost(root)))
	}

	/// The node holding the greatest key.
	pub fn last(&self) -> Option<NodeRef<'_, K, V>> {
		self.root.map(|root| NodeRef::new(&self.arena, self.arena.rightmost(root)))
	}

	/// The root node, if any.
	pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
		self.root.map(|root| NodeRef::new(&self.arena, root))
	}

	pub fn get(&self, key: &K) -> Option<&V> {
		self.find(key).map(|id| &self.arena[id].value)
	}

	pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
		self.find(key).map(|id| {
			let node = &self.arena[id];
			(&node.key, &node.value)
		})
	}

	pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
		let id = self.find(key)?;
		Some(&mut self.arena[id].value)
	}

	pub fn contains_key(&self, key: &K) -> bool {
		self.find(key).is_some()
	}

	/// Value of the greatest key that does not exceed `key`.
	pub fn get_closest_not_exceeding(&self, key: &K) -> Option<&V> {
		self.find_not_exceeding(key).map(|id| &self.arena[id].value)
	}

	// -----------------------------------------------------------------------
	// Iteration
	// -----------------------------------------------------------------------

	/// Iterates over the entries in ascending key order.
	pub fn iter(&self) -> Iter<'_, K, V> {
		Iter::new(&self.arena, self.root.map(|root| self.arena.leftmost(root)), self.len)
	}

	pub fn keys(&self) -> Keys<'_, K, V> {
		Keys::new(self.iter())
	}

	pub fn values(&self) -> Values<'_, K, V> {
		Values::new(self.iter())
	}

	// -----------------------------------------------------------------------
	// Mutation
	// -----------------------------------------------------------------------

	/// Inserts `value` under `key`.
	///
	/// If the key is already present its value is replaced in place and the
	/// previous value returned; the stored key and the tree's shape are left
	/// untouched. Otherwise a level 1 node is attached below the last node
	/// visited and every node on the way back to the root is skewed and split.
	pub fn insert(&mut self, key: K, value: V) -> Option<V> {
		let mut parent = None;
		let mut go_left = false;
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.arena[id];
			match self.comparator.compare(&key, &node.key) {
				Ordering::Equal => {
					trace_log!(node = id.0, "insert: replace value");
					return Some(std::mem::replace(&mut self.arena[id].value, value));
				}
				Ordering::Less => {
					go_left = true;
					current = node.left;
				}
				Ordering::Greater => {
					go_left = false;
					current = node.right;
				}
			}
			parent = Some(id);
		}

		let id = self.arena.alloc(Node::leaf(key, value, parent));
		match parent {
			None => self.root = Some(id),
			Some(parent) if go_left => self.arena[parent].left = Some(id),
			Some(parent) => self.arena[parent].right = Some(id),
		}
		self.len += 1;
		trace_log!(node = id.0, len = self.len, "insert: new key");

		let mut current = Some(id);
		while let Some(id) = current {
			let up = self.arena[id].parent;
			let top = self.skew(id);
			self.split(top);
			current = up;
		}
		None
	}

	/// Removes `key`, returning its value if it was present.
	pub fn remove(&mut self, key: &K) -> Option<V> {
		self.remove_entry(key).map(|(_, value)| value)
	}

	/// Removes `key`, returning the stored key and value if it was present.
	///
	/// A node with two children trades its entry with its in-order
	/// predecessor (the rightmost node of its left subtree), which has at most
	/// one child and is unlinked in its place. The parent chain of the
	/// unlinked node is then rebalanced up to the root.
	pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
		let target = self.find(key)?;
		let node = &self.arena[target];
		let victim = match (node.left, node.right) {
			(Some(left), Some(_)) => {
				let predecessor = self.arena.rightmost(left);
				self.swap_entries(target, predecessor);
				predecessor
			}
			_ => target,
		};

		let node = &self.arena[victim];
		let child = node.left.or(node.right);
		let parent = node.parent;
		self.replace_child(parent, victim, child);
		let Node {
			key,
			value,
			..
		} = self.arena.free(victim);
		self.len -= 1;
		trace_log!(node = victim.0, len = self.len, "remove");

		let mut current = parent;
		while let Some(id) = current {
			let up = self.arena[id].parent;
			self.rebalance_after_remove(id);
			current = up;
		}
		Some((key, value))
	}

	/// Removes every entry.
	pub fn clear(&mut self) {
		debug_log!(len = self.len, "clear");
		self.arena.clear();
		self.root = None;
		self.len = 0;
	}

	fn swap_entries(&mut self, a: NodeId, b: NodeId) {
		match self.arena.get2_mut(a, b) {
			Some((a, b)) => {
				std::mem::swap(&mut a.key, &mut b.key);
				std::mem::swap(&mut a.value, &mut b.value);
			}
			None => unreachable!("entry swap between {} and {} needs two live nodes", a.0, b.0),
		}
	}

	// -----------------------------------------------------------------------
	// Validation
	// -----------------------------------------------------------------------

	/// Checks that `cmp` is consistent with the tree's order for `key`.
	///
	/// Walking the keys in ascending order, `cmp(key, stored)` must move from
	/// `Greater` through `Equal` to `Less` and never back. This is the
	/// validating counterpart to [`RawTree::node_by_key_with`] and
	/// [`RawTree::first_node_by_key_with`], and costs O(n).
	pub fn check_comparator<Q, F>(&self, key: &Q, cmp: F) -> Result<()>
	where
		Q: ?Sized,
		F: Fn(&Q, &K) -> Ordering,
	{
		let mut phase = Ordering::Greater;
		for (position, stored) in self.keys().enumerate() {
			let ord = cmp(key, stored);
			if ord > phase {
				warn_log!(position, "comparator disagrees with tree order");
				return Err(Error::InconsistentComparator {
					position,
				});
			}
			phase = ord;
		}
		Ok(())
	}

	/// Verifies every structural invariant of the tree.
	///
	/// - keys strictly increase in order under the tree's comparator
	/// - leaves are at level 1, left children sit one level below their
	///   parent, right children at most at their parent's level, right-right
	///   grandchildren strictly below their grandparent, and every node above
	///   level 1 has two children
	/// - the root has no parent and every other node's parent link names the
	///   node holding it
	/// - the entry count matches both the reachable nodes and the arena
	pub fn validate(&self) -> Result<()> {
		let result = self.validate_structure().and_then(|()| self.validate_order());
		if let Err(ref _err) = result {
			debug_log!(error = %_err, "validation failed");
		}
		result
	}

	fn validate_structure(&self) -> Result<()> {
		if self.arena.len() != self.len {
			return Err(Error::invariant(
				"count",
				format!("{} entries recorded, {} nodes allocated", self.len, self.arena.len()),
			));
		}
		let Some(root) = self.root else {
			return if self.len == 0 {
				Ok(())
			} else {
				Err(Error::invariant("count", format!("empty root with {} entries", self.len)))
			};
		};
		if !self.arena.contains(root) {
			return Err(Error::invariant("dangling link", format!("root names vacant slot {}", root.0)));
		}
		if self.arena[root].parent.is_some() {
			return Err(Error::invariant("root parent", "root has a parent link"));
		}

		let mut visited = 0usize;
		let mut stack: SmallVec<[NodeId; 64]> = SmallVec::new();
		stack.push(root);
		while let Some(id) = stack.pop() {
			visited += 1;
			if visited > self.len {
				return Err(Error::invariant("count", "more reachable nodes than entries"));
			}
			let node = &self.arena[id];
			for child in [node.left, node.right].into_iter().flatten() {
				if !self.arena.contains(child) {
					return Err(Error::invariant(
						"dangling link",
						format!("node {} links vacant slot {}", id.0, child.0),
					));
				}
				if self.arena[child].parent != Some(id) {
					return Err(Error::invariant(
						"parent link",
						format!("node {} does not point back to parent {}", child.0, id.0),
					));
				}
				stack.push(child);
			}
			self.validate_levels(id)?;
		}
		if visited != self.len {
			return Err(Error::invariant(
				"count",
				format!("{} entries recorded, {visited} reachable", self.len),
			));
		}
		Ok(())
	}

	fn validate_levels(&self, id: NodeId) -> Result<()> {
		let node = &self.arena[id];
		let level = node.level;
		let left = self.arena.level_of(node.left);
		let right = self.arena.level_of(node.right);
		let right_right = node.right.map_or(0, |right| self.arena.level_of(self.arena[right].right));

		if node.left.is_none() && node.right.is_none() && level != 1 {
			return Err(Error::invariant("leaf level", format!("leaf {} at level {level}", id.0)));
		}
		if left >= level {
			return Err(Error::invariant(
				"left level",
				format!("node {} at level {level} has left child at level {left}", id.0),
			));
		}
		if right > level {
			return Err(Error::invariant(
				"right level",
				format!("node {} at level {level} has right child at level {right}", id.0),
			));
		}
		if right_right >= level {
			return Err(Error::invariant(
				"right-right level",
				format!("node {} at level {level} has right-right grandchild at level {right_right}", id.0),
			));
		}
		if level > 1 && (node.left.is_none() || node.right.is_none()) {
			return Err(Error::invariant(
				"internal children",
				format!("node {} at level {level} is missing a child", id.0),
			));
		}
		Ok(())
	}

	fn validate_order(&self) -> Result<()> {
		let mut previous: Option<&K> = None;
		let mut seen = 0usize;
		for (position, key) in self.keys().enumerate() {
			if let Some(previous) = previous {
				if self.comparator.compare(previous, key) != Ordering::Less {
					return Err(Error::invariant(
						"bst order",
						format!("{} does not follow its predecessor", Position(position)),
					));
				}
			}
			previous = Some(key);
			seen = position + 1;
		}
		if seen != self.len {
			return Err(Error::invariant(
				"count",
				format!("in-order walk visited {seen} of {} entries", self.len),
			));
		}
		Ok(())
	}

	/// Validates all tree invariants, panicking with the violation if any.
	#[cfg(any(test, feature = "test-utils"))]
	pub fn assert_invariants(&self) {
		if let Err(err) = self.validate() {
			panic!("{err}");
		}
	}
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for RawTree<K, V, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let first = self.root.map(|root| self.arena.leftmost(root));
		f.debug_map().entries(Iter::new(&self.arena, first, self.len)).finish()
	}
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for RawTree<K, V, C> {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut tree = Self::default();
		tree.extend(iter);
		tree
	}
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for RawTree<K, V, C> {
	fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
		for (key, value) in iter {
			self.insert(key, value);
		}
	}
}

impl<'a, K, V, C: Comparator<K>> IntoIterator for &'a RawTree<K, V, C> {
	type Item = (&'a K, &'a V);
	type IntoIter = Iter<'a, K, V>;

	fn into_iter(self) -> Iter<'a, K, V> {
		self.iter()
	}
}
