//! Key ordering used by the tree.
//!
//! A tree is built around a single total order over its keys. The default is
//! the key's own [`Ord`] implementation; any `Fn(&K, &K) -> Ordering` closure
//! can be supplied instead at construction.

use std::cmp::Ordering;
use std::fmt;

/// A total order over keys of type `K`.
///
/// Implementations must be consistent for the lifetime of the tree: if the
/// relative order of two stored keys changes, lookups return unspecified
/// results and [`RawTree::validate`](crate::RawTree::validate) reports the
/// broken ordering.
pub trait Comparator<K: ?Sized> {
	/// Compares two keys.
	fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		a.cmp(b)
	}
}

impl<K: ?Sized, F> Comparator<K> for F
where
	F: Fn(&K, &K) -> Ordering,
{
	#[inline]
	fn compare(&self, a: &K, b: &K) -> Ordering {
		self(a, b)
	}
}

/// Names a key by its in-order position in the ordering-violation messages
/// produced by `validate`, which places no `Debug` bound on keys.
pub(crate) struct Position(pub usize);

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "in-order #{}", self.0)
	}
}
