//! Iterators over the entries of a tree.
//!
//! All iterators walk the in-order sequence by following successor links,
//! starting from the leftmost node. They are forward-only and single pass;
//! build a new one to iterate again.
//!
//! - [`Iter`], [`Keys`] and [`Values`] borrow a [`RawTree`](crate::RawTree)
//!   (or a guard dereferencing to one) and yield references.
//! - [`Cursor`] owns a [`ReadGuard`] and yields owned copies. It is what
//!   [`Tree::keys`](crate::Tree::keys) and [`Tree::values`](crate::Tree::values)
//!   return. Because the guard lives inside the cursor, writers are held off
//!   until the cursor is dropped.

use std::iter::FusedIterator;

use crate::guard::ReadGuard;
use crate::node::{Arena, NodeId};

/// Borrowing in-order iterator over `(&K, &V)` pairs.
pub struct Iter<'a, K, V> {
	arena: &'a Arena<K, V>,
	next: Option<NodeId>,
	remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
	pub(crate) fn new(arena: &'a Arena<K, V>, first: Option<NodeId>, len: usize) -> Self {
		Iter {
			arena,
			next: first,
			remaining: len,
		}
	}
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
	type Item = (&'a K, &'a V);

	fn next(&mut self) -> Option<Self::Item> {
		let id = self.next?;
		let node = &self.arena[id];
		self.next = self.arena.successor(id);
		self.remaining = self.remaining.saturating_sub(1);
		Some((&node.key, &node.value))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
	fn clone(&self) -> Self {
		Iter {
			arena: self.arena,
			next: self.next,
			remaining: self.remaining,
		}
	}
}

/// Borrowing in-order iterator over keys.
pub struct Keys<'a, K, V> {
	inner: Iter<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
	pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
		Keys {
			inner,
		}
	}
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
	type Item = &'a K;

	fn next(&mut self) -> Option<&'a K> {
		self.inner.next().map(|(key, _)| key)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// Borrowing in-order iterator over values.
pub struct Values<'a, K, V> {
	inner: Iter<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
	pub(crate) fn new(inner: Iter<'a, K, V>) -> Self {
		Values {
			inner,
		}
	}
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
	type Item = &'a V;

	fn next(&mut self) -> Option<&'a V> {
		self.inner.next().map(|(_, value)| value)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		self.inner.size_hint()
	}
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// Forward-only cursor that owns a read lock on its tree.
///
/// Each step hands out `project(key, value)` for the current node and moves
/// to its in-order successor. What is projected (key, value, or anything
/// derived from them) is fixed when the cursor is built.
///
/// # Example
///
/// ```
/// use aatree::Tree;
///
/// let tree: Tree<i32, &str> = Tree::new();
/// tree.insert(2, "two");
/// tree.insert(1, "one");
///
/// let keys: Vec<i32> = tree.keys().collect();
/// assert_eq!(keys, vec![1, 2]);
///
/// let values: Vec<&str> = tree.values().collect();
/// assert_eq!(values, vec!["one", "two"]);
/// ```
pub struct Cursor<'t, K, V, C, T> {
	guard: ReadGuard<'t, K, V, C>,
	next: Option<NodeId>,
	remaining: usize,
	project: fn(&K, &V) -> T,
}

/// Cursor yielding copies of the keys.
pub type KeyCursor<'t, K, V, C> = Cursor<'t, K, V, C, K>;

/// Cursor yielding copies of the values.
pub type ValueCursor<'t, K, V, C> = Cursor<'t, K, V, C, V>;

impl<'t, K, V, C, T> Cursor<'t, K, V, C, T> {
	/// Positions a new cursor on the first node of the guarded tree.
	pub fn new(guard: ReadGuard<'t, K, V, C>, project: fn(&K, &V) -> T) -> Self {
		let next = guard.root.map(|root| guard.arena.leftmost(root));
		let remaining = guard.len;
		Cursor {
			guard,
			next,
			remaining,
			project,
		}
	}

	/// Stops the traversal and hands back the read guard it was holding.
	pub fn into_guard(self) -> ReadGuard<'t, K, V, C> {
		self.guard
	}
}

impl<K, V, C, T> Iterator for Cursor<'_, K, V, C, T> {
	type Item = T;

	fn next(&mut self) -> Option<T> {
		let id = self.next?;
		let arena = &self.guard.arena;
		let node = &arena[id];
		let item = (self.project)(&node.key, &node.value);
		self.next = arena.successor(id);
		self.remaining = self.remaining.saturating_sub(1);
		Some(item)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<K, V, C, T> ExactSizeIterator for Cursor<'_, K, V, C, T> {}

impl<K, V, C, T> FusedIterator for Cursor<'_, K, V, C, T> {}

#[cfg(test)]
mod tests {
	use crate::{RawTree, Tree};

	#[test]
	fn iter_is_exact_size() {
		let tree: RawTree<i32, i32> = (0..10).map(|i| (i, i * i)).collect();
		let mut iter = tree.iter();
		assert_eq!(iter.len(), 10);
		iter.next();
		assert_eq!(iter.len(), 9);
		assert_eq!(iter.map(|(_, v)| *v).sum::<i32>(), (1..10).map(|i| i * i).sum::<i32>());
	}

	#[test]
	fn iterators_are_single_pass() {
		let tree: RawTree<i32, ()> = (0..3).map(|i| (i, ())).collect();
		let mut keys = tree.keys();
		assert_eq!(keys.by_ref().count(), 3);
		assert_eq!(keys.next(), None);
		assert_eq!(tree.keys().count(), 3);
	}

	#[test]
	fn cursor_projects_custom_items() {
		let tree: Tree<i32, i32> = Tree::new();
		for i in 0..5 {
			tree.insert(i, i * 10);
		}
		let sums: Vec<i32> = crate::Cursor::new(tree.read(), |k, v| k + v).collect();
		assert_eq!(sums, vec![0, 11, 22, 33, 44]);
	}

	#[test]
	fn cursor_holds_read_lock() {
		let tree: Tree<i32, i32> = Tree::new();
		tree.insert(1, 1);
		let cursor = tree.keys();
		assert!(tree.try_write().is_none());
		assert!(tree.try_read().is_some());
		drop(cursor);
		assert!(tree.try_write().is_some());
	}

	#[test]
	fn cursor_on_empty_tree() {
		let tree: Tree<i32, i32> = Tree::new();
		assert_eq!(tree.values().next(), None);
	}
}
