//! Tree nodes, their arena and in-order traversal.
//!
//! Every node lives in a slot of a [`slab::Slab`] owned by the tree and is
//! addressed by a [`NodeId`]. Child links and the parent back-link are plain
//! ids, so the parent/child cycle carries no ownership: the arena owns every
//! node and the links are only ever used for navigation.
//!
//! ```text
//!                 ┌──────────────┐
//!                 │ id 0  key 5  │  parent: None
//!                 │ level 2      │
//!                 └──┬────────┬──┘
//!          left: 1   │        │  right: 2
//!        ┌───────────▼─┐   ┌──▼──────────┐
//!        │ id 1  key 3 │   │ id 2  key 8 │  parent: 0
//!        │ level 1     │   │ level 1     │
//!        └─────────────┘   └─────────────┘
//! ```

use slab::Slab;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Stable handle of a node inside its tree's arena.
///
/// Ids are reused after the node they named is removed, so an id is only
/// meaningful while the node is known to be alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
	/// Returns the raw arena slot index.
	pub fn index(self) -> usize {
		self.0
	}
}

/// A single AA-tree node.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
	pub(crate) key: K,
	pub(crate) value: V,
	/// 1 for leaves; 0 is reserved for empty subtrees.
	pub(crate) level: u32,
	pub(crate) left: Option<NodeId>,
	pub(crate) right: Option<NodeId>,
	pub(crate) parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
	pub(crate) fn leaf(key: K, value: V, parent: Option<NodeId>) -> Self {
		Node {
			key,
			value,
			level: 1,
			left: None,
			right: None,
			parent,
		}
	}
}

/// Slot storage for the nodes of one tree.
#[derive(Clone)]
pub(crate) struct Arena<K, V> {
	slots: Slab<Node<K, V>>,
}

impl<K, V> Arena<K, V> {
	pub(crate) fn with_capacity(capacity: usize) -> Self {
		Arena {
			slots: Slab::with_capacity(capacity),
		}
	}

	pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
		NodeId(self.slots.insert(node))
	}

	pub(crate) fn free(&mut self, id: NodeId) -> Node<K, V> {
		self.slots.remove(id.0)
	}

	pub(crate) fn len(&self) -> usize {
		self.slots.len()
	}

	pub(crate) fn clear(&mut self) {
		self.slots.clear();
	}

	pub(crate) fn get2_mut(&mut self, a: NodeId, b: NodeId) -> Option<(&mut Node<K, V>, &mut Node<K, V>)> {
		self.slots.get2_mut(a.0, b.0)
	}

	pub(crate) fn contains(&self, id: NodeId) -> bool {
		self.slots.contains(id.0)
	}

	/// Level of a possibly empty subtree.
	#[inline]
	pub(crate) fn level_of(&self, id: Option<NodeId>) -> u32 {
		id.map_or(0, |id| self[id].level)
	}

	pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
		while let Some(left) = self[id].left {
			id = left;
		}
		id
	}

	pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
		while let Some(right) = self[id].right {
			id = right;
		}
		id
	}

	/// In-order successor of `id`.
	///
	/// Descends to the leftmost node of the right subtree when there is one,
	/// otherwise climbs while the current node is a right child and returns
	/// the first ancestor reached from its left side.
	pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
		if let Some(right) = self[id].right {
			return Some(self.leftmost(right));
		}
		let mut current = id;
		while let Some(parent) = self[current].parent {
			if self[parent].right == Some(current) {
				current = parent;
			} else {
				return Some(parent);
			}
		}
		None
	}

	/// In-order predecessor of `id`; mirror image of [`Arena::successor`].
	pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
		if let Some(left) = self[id].left {
			return Some(self.rightmost(left));
		}
		let mut current = id;
		while let Some(parent) = self[current].parent {
			if self[parent].left == Some(current) {
				current = parent;
			} else {
				return Some(parent);
			}
		}
		None
	}
}

impl<K, V> Index<NodeId> for Arena<K, V> {
	type Output = Node<K, V>;

	#[inline]
	fn index(&self, id: NodeId) -> &Node<K, V> {
		match self.slots.get(id.0) {
			Some(node) => node,
			None => unreachable!("link to vacant arena slot {}", id.0),
		}
	}
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
	#[inline]
	fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
		match self.slots.get_mut(id.0) {
			Some(node) => node,
			None => unreachable!("link to vacant arena slot {}", id.0),
		}
	}
}

/// A borrowed handle to a node of a tree.
///
/// Handles are obtained from a [`RawTree`](crate::RawTree) (directly, or
/// through a [`ReadGuard`](crate::ReadGuard)) and cannot outlive the borrow
/// they came from, so the tree cannot change underneath them.
pub struct NodeRef<'a, K, V> {
	arena: &'a Arena<K, V>,
	id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
	pub(crate) fn new(arena: &'a Arena<K, V>, id: NodeId) -> Self {
		NodeRef {
			arena,
			id,
		}
	}

	#[inline]
	fn node(&self) -> &'a Node<K, V> {
		&self.arena[self.id]
	}

	#[inline]
	fn relative(&self, id: Option<NodeId>) -> Option<NodeRef<'a, K, V>> {
		id.map(|id| NodeRef::new(self.arena, id))
	}

	/// Arena id of this node.
	pub fn id(&self) -> NodeId {
		self.id
	}

	pub fn key(&self) -> &'a K {
		&self.node().key
	}

	pub fn value(&self) -> &'a V {
		&self.node().value
	}

	/// Returns the key and value together.
	pub fn key_value(&self) -> (&'a K, &'a V) {
		let node = self.node();
		(&node.key, &node.value)
	}

	/// AA level of this node; leaves are at level 1.
	pub fn level(&self) -> u32 {
		self.node().level
	}

	pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
		self.relative(self.node().parent)
	}

	pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
		self.relative(self.node().left)
	}

	pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
		self.relative(self.node().right)
	}

	/// The node holding the next greater key, if any.
	pub fn next(&self) -> Option<NodeRef<'a, K, V>> {
		self.relative(self.arena.successor(self.id))
	}

	/// The node holding the next smaller key, if any.
	pub fn prev(&self) -> Option<NodeRef<'a, K, V>> {
		self.relative(self.arena.predecessor(self.id))
	}
}

impl<K, V> Clone for NodeRef<'_, K, V> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K, V> PartialEq for NodeRef<'_, K, V> {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self.arena, other.arena) && self.id == other.id
	}
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for NodeRef<'_, K, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let node = self.node();
		f.debug_struct("NodeRef")
			.field("id", &self.id.0)
			.field("key", &node.key)
			.field("value", &node.value)
			.field("level", &node.level)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Builds the fixed shape
	///
	/// ```text
	///        4
	///      /   \
	///     2     6
	///    / \   / \
	///   1   3 5   7
	/// ```
	fn fixture() -> (Arena<i32, ()>, NodeId) {
		let mut arena = Arena::with_capacity(7);
		let root = arena.alloc(Node::leaf(4, (), None));
		let attach = |arena: &mut Arena<i32, ()>, parent: NodeId, key: i32, left: bool| {
			let id = arena.alloc(Node::leaf(key, (), Some(parent)));
			if left {
				arena[parent].left = Some(id);
			} else {
				arena[parent].right = Some(id);
			}
			id
		};
		let two = attach(&mut arena, root, 2, true);
		let six = attach(&mut arena, root, 6, false);
		attach(&mut arena, two, 1, true);
		attach(&mut arena, two, 3, false);
		attach(&mut arena, six, 5, true);
		attach(&mut arena, six, 7, false);
		(arena, root)
	}

	#[test]
	fn successor_walks_in_order() {
		let (arena, root) = fixture();
		let mut id = Some(arena.leftmost(root));
		let mut keys = Vec::new();
		while let Some(current) = id {
			keys.push(arena[current].key);
			id = arena.successor(current);
		}
		assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 7]);
	}

	#[test]
	fn predecessor_walks_in_reverse() {
		let (arena, root) = fixture();
		let mut id = Some(arena.rightmost(root));
		let mut keys = Vec::new();
		while let Some(current) = id {
			keys.push(arena[current].key);
			id = arena.predecessor(current);
		}
		assert_eq!(keys, vec![7, 6, 5, 4, 3, 2, 1]);
	}

	#[test]
	fn node_ref_navigation() {
		let (arena, root) = fixture();
		let root = NodeRef::new(&arena, root);
		assert!(root.parent().is_none());
		let three = root.left().and_then(|n| n.right()).unwrap();
		assert_eq!(*three.key(), 3);
		assert_eq!(three.next().map(|n| *n.key()), Some(4));
		assert_eq!(three.prev().map(|n| *n.key()), Some(2));
		assert_eq!(three.parent().unwrap().parent(), Some(root));
	}

	#[test]
	fn freed_slots_are_reused() {
		let mut arena: Arena<i32, ()> = Arena::with_capacity(2);
		let a = arena.alloc(Node::leaf(1, (), None));
		let _b = arena.alloc(Node::leaf(2, (), None));
		let node = arena.free(a);
		assert_eq!(node.key, 1);
		assert!(!arena.contains(a));
		let c = arena.alloc(Node::leaf(3, (), None));
		assert_eq!(c, a);
		assert_eq!(arena.len(), 2);
	}
}
