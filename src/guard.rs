//! RAII access guards for a [`Tree`](crate::Tree).
//!
//! A [`ReadGuard`] holds the tree's lock in shared mode and dereferences to
//! the underlying [`RawTree`], which gives access to the node-level API
//! ([`RawTree::node_by_key`], [`RawTree::first`], [`NodeRef::next`], ...).
//! Every [`NodeRef`] borrows the guard it came from, so handles can never be
//! used after the lock is released.
//!
//! A [`WriteGuard`] holds the lock exclusively and dereferences mutably, which
//! allows batching several mutations under a single lock acquisition.
//!
//! [`NodeRef`]: crate::NodeRef
//! [`NodeRef::next`]: crate::NodeRef::next

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::sync::{RwLockReadGuard, RwLockWriteGuard};
use crate::RawTree;

/// Shared access to a tree. Other readers may hold guards at the same time;
/// writers wait until every `ReadGuard` is dropped.
pub struct ReadGuard<'t, K, V, C> {
	guard: RwLockReadGuard<'t, RawTree<K, V, C>>,
}

impl<'t, K, V, C> ReadGuard<'t, K, V, C> {
	pub(crate) fn new(guard: RwLockReadGuard<'t, RawTree<K, V, C>>) -> Self {
		ReadGuard {
			guard,
		}
	}
}

impl<K, V, C> Deref for ReadGuard<'_, K, V, C> {
	type Target = RawTree<K, V, C>;

	#[inline]
	fn deref(&self) -> &RawTree<K, V, C> {
		&self.guard
	}
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for ReadGuard<'_, K, V, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}

/// Exclusive access to a tree. No other guard of any kind exists while a
/// `WriteGuard` is alive.
pub struct WriteGuard<'t, K, V, C> {
	guard: RwLockWriteGuard<'t, RawTree<K, V, C>>,
}

impl<'t, K, V, C> WriteGuard<'t, K, V, C> {
	pub(crate) fn new(guard: RwLockWriteGuard<'t, RawTree<K, V, C>>) -> Self {
		WriteGuard {
			guard,
		}
	}
}

impl<K, V, C> Deref for WriteGuard<'_, K, V, C> {
	type Target = RawTree<K, V, C>;

	#[inline]
	fn deref(&self) -> &RawTree<K, V, C> {
		&self.guard
	}
}

impl<K, V, C> DerefMut for WriteGuard<'_, K, V, C> {
	#[inline]
	fn deref_mut(&mut self) -> &mut RawTree<K, V, C> {
		&mut self.guard
	}
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for WriteGuard<'_, K, V, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&**self, f)
	}
}
