//! AA rebalancing primitives.
//!
//! The AA-tree keeps one integer *level* per node instead of a colour. Two
//! local rotations restore the level rules after a structural change:
//!
//! ```text
//! skew: remove a left horizontal link (right rotation)
//!
//!        │                      │
//!   L ◄──T          ──►         L──► T
//!  / \    \                    /    / \
//! A   B    R                  A    B   R
//!
//! split: remove two consecutive right horizontal links
//!        (left rotation, the new subtree root moves up one level)
//!
//!   │                             │
//!   T──► R──► X       ──►         R
//!  /    /                        / \
//! A    B                        T   X
//!                              / \
//!                             A   B
//! ```
//!
//! Every rotation rewires the parent links of the moved nodes and the
//! grandparent's child link (or the tree root) immediately, so the tree is
//! fully linked between any two primitive calls.

use crate::node::NodeId;
use crate::tracing_helpers::trace_log;
use crate::RawTree;

impl<K, V, C> RawTree<K, V, C> {
	/// Points `parent`'s link to `old` (or the root, when `parent` is `None`)
	/// at `new`, and sets `new`'s parent link accordingly.
	pub(crate) fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
		match parent {
			None => self.root = new,
			Some(parent) => {
				let node = &mut self.arena[parent];
				if node.left == Some(old) {
					node.left = new;
				} else {
					debug_assert_eq!(node.right, Some(old), "parent does not hold the replaced child");
					node.right = new;
				}
			}
		}
		if let Some(new) = new {
			self.arena[new].parent = parent;
		}
	}

	/// Removes a left horizontal link at `id` by rotating right.
	///
	/// Returns the root of the subtree that now occupies `id`'s position.
	pub(crate) fn skew(&mut self, id: NodeId) -> NodeId {
		let Some(left) = self.arena[id].left else {
			return id;
		};
		if self.arena[left].level != self.arena[id].level {
			return id;
		}
		trace_log!(node = id.0, left = left.0, "skew");

		let parent = self.arena[id].parent;
		let moved = self.arena[left].right;

		self.arena[id].left = moved;
		if let Some(moved) = moved {
			self.arena[moved].parent = Some(id);
		}
		self.arena[left].right = Some(id);
		self.arena[id].parent = Some(left);
		self.replace_child(parent, id, Some(left));

		// The adopted subtree may sit at the old root's level.
		self.skew(id);
		left
	}

	/// Removes two consecutive right horizontal links at `id` by rotating
	/// left and promoting the middle node one level.
	///
	/// Returns the root of the subtree that now occupies `id`'s position.
	pub(crate) fn split(&mut self, id: NodeId) -> NodeId {
		let Some(right) = self.arena[id].right else {
			return id;
		};
		let Some(right_right) = self.arena[right].right else {
			return id;
		};
		if self.arena[right_right].level != self.arena[id].level {
			return id;
		}
		trace_log!(node = id.0, right = right.0, "split");

		let parent = self.arena[id].parent;
		let moved = self.arena[right].left;

		self.arena[id].right = moved;
		if let Some(moved) = moved {
			self.arena[moved].parent = Some(id);
		}
		self.arena[right].left = Some(id);
		self.arena[id].parent = Some(right);
		self.arena[right].level += 1;
		self.replace_child(parent, id, Some(right));

		self.split(right_right);
		right
	}

	/// Restores the level rules at `id` after a node was removed below it.
	///
	/// A removal can lower a child's level by one. When either child ends up
	/// more than one level below `id`, `id` drops a level (and so does a right
	/// child that would now be above it). The horizontal links this creates
	/// are cleared by skewing `id` and its right child, then splitting `id`,
	/// its right child and its right-right child.
	pub(crate) fn rebalance_after_remove(&mut self, id: NodeId) -> NodeId {
		let node = &self.arena[id];
		let level = node.level;
		let right = node.right;
		if self.arena.level_of(node.left) + 1 < level || self.arena.level_of(right) + 1 < level {
			let level = level - 1;
			self.arena[id].level = level;
			if let Some(right) = right {
				if self.arena[right].level > level {
					self.arena[right].level = level;
				}
			}
		}

		// `skew` follows every rotation down the right child it pushed aside,
		// so two calls cover the right spine.
		let top = self.skew(id);
		if let Some(right) = self.arena[top].right {
			self.skew(right);
		}

		let top = self.split(top);
		if let Some(right) = self.arena[top].right {
			let right = self.split(right);
			if let Some(right_right) = self.arena[right].right {
				self.split(right_right);
			}
		}
		top
	}
}

#[cfg(test)]
mod tests {
	use crate::node::{Node, NodeId};
	use crate::RawTree;

	/// Hand-links a chain of nodes without balancing, returning their ids in
	/// the order given.
	fn link(tree: &mut RawTree<i32, ()>, shape: &[(i32, u32, Option<usize>, bool)]) -> Vec<NodeId> {
		let mut ids: Vec<NodeId> = Vec::new();
		for &(key, level, parent, left) in shape {
			let parent = parent.map(|p| ids[p]);
			let id = tree.arena.alloc(Node::leaf(key, (), parent));
			tree.arena[id].level = level;
			match parent {
				None => tree.root = Some(id),
				Some(parent) if left => tree.arena[parent].left = Some(id),
				Some(parent) => tree.arena[parent].right = Some(id),
			}
			ids.push(id);
		}
		tree.len = ids.len();
		ids
	}

	#[test]
	fn skew_rotates_left_horizontal_link() {
		let mut tree = RawTree::new();
		// 2 (level 1) holds 1 (level 1) on its left: illegal.
		let ids = link(&mut tree, &[(2, 1, None, false), (1, 1, Some(0), true)]);
		let top = tree.skew(ids[0]);
		assert_eq!(top, ids[1]);
		assert_eq!(tree.root, Some(ids[1]));
		assert_eq!(tree.arena[ids[1]].right, Some(ids[0]));
		assert_eq!(tree.arena[ids[0]].parent, Some(ids[1]));
		assert_eq!(tree.arena[ids[1]].parent, None);
		tree.assert_invariants();
	}

	#[test]
	fn skew_is_noop_on_valid_node() {
		let mut tree = RawTree::new();
		let ids = link(&mut tree, &[(2, 2, None, false), (1, 1, Some(0), true), (3, 1, Some(0), false)]);
		assert_eq!(tree.skew(ids[0]), ids[0]);
		assert_eq!(tree.root, Some(ids[0]));
		tree.assert_invariants();
	}

	#[test]
	fn split_promotes_middle_node() {
		let mut tree = RawTree::new();
		// 1 ─► 2 ─► 3, all level 1.
		let ids = link(&mut tree, &[(1, 1, None, false), (2, 1, Some(0), false), (3, 1, Some(1), false)]);
		let top = tree.split(ids[0]);
		assert_eq!(top, ids[1]);
		assert_eq!(tree.root, Some(ids[1]));
		assert_eq!(tree.arena[ids[1]].level, 2);
		assert_eq!(tree.arena[ids[1]].left, Some(ids[0]));
		assert_eq!(tree.arena[ids[1]].right, Some(ids[2]));
		assert_eq!(tree.arena[ids[0]].parent, Some(ids[1]));
		assert_eq!(tree.arena[ids[2]].parent, Some(ids[1]));
		tree.assert_invariants();
	}

	#[test]
	fn split_reattaches_middle_left_subtree() {
		let mut tree = RawTree::new();
		// 2 ─► 4 ─► 6 at level 2, with 4 holding 3 on its left.
		let ids = link(
			&mut tree,
			&[
				(2, 2, None, false),
				(1, 1, Some(0), true),
				(4, 2, Some(0), false),
				(3, 1, Some(2), true),
				(6, 2, Some(2), false),
				(5, 1, Some(4), true),
				(7, 1, Some(4), false),
			],
		);
		let top = tree.split(ids[0]);
		assert_eq!(top, ids[2]);
		assert_eq!(tree.arena[ids[0]].right, Some(ids[3]));
		assert_eq!(tree.arena[ids[3]].parent, Some(ids[0]));
		assert_eq!(tree.arena[ids[2]].level, 3);
		tree.assert_invariants();
	}

	#[test]
	fn rotation_below_root_relinks_grandparent() {
		let mut tree = RawTree::new();
		// 5 (level 2) ─► right child 8 (level 1) holding 7 (level 1) on its left.
		let ids = link(
			&mut tree,
			&[(5, 2, None, false), (3, 1, Some(0), true), (8, 1, Some(0), false), (7, 1, Some(2), true)],
		);
		let top = tree.skew(ids[2]);
		assert_eq!(top, ids[3]);
		assert_eq!(tree.arena[ids[0]].right, Some(ids[3]));
		assert_eq!(tree.arena[ids[3]].parent, Some(ids[0]));
		assert_eq!(tree.arena[ids[3]].right, Some(ids[2]));
		tree.assert_invariants();
	}

	#[test]
	fn remove_skews_capped_right_child() {
		let mut tree = RawTree::new();
		// 2 ─► 4 at level 2, 4 holding 3 on its left and 5 on its right.
		let ids = link(
			&mut tree,
			&[
				(2, 2, None, false),
				(1, 1, Some(0), true),
				(4, 2, Some(0), false),
				(3, 1, Some(2), true),
				(5, 1, Some(2), false),
			],
		);
		tree.assert_invariants();

		// Losing 1 drops 2 and 4 to level 1, leaving 3 as a left horizontal
		// link under 4 and then a run 2 ─► 3 ─► 4 ─► 5 to split.
		assert_eq!(tree.remove(&1), Some(()));
		tree.assert_invariants();
		assert_eq!(tree.root, Some(ids[3]));
		assert_eq!(tree.arena[ids[3]].level, 2);
		assert_eq!(tree.arena[ids[3]].left, Some(ids[0]));
		assert_eq!(tree.arena[ids[3]].right, Some(ids[2]));
		assert_eq!(tree.arena[ids[2]].right, Some(ids[4]));
		assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
	}
}
