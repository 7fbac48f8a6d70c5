//! # Error Types for the AA-Tree
//!
//! Lookups and removals never fail: an absent key is reported as `None`.
//! Errors are reserved for the two situations the tree can *detect* but not
//! repair on its own:
//!
//! - A structural invariant no longer holds ([`Error::Invariant`]). This is only
//!   ever reported by [`RawTree::validate`](crate::RawTree::validate) and means a
//!   bug in the balancing code or a key whose ordering changed while stored.
//! - A caller-supplied partial-key comparator disagrees with the tree's order
//!   ([`Error::InconsistentComparator`]), reported by the opt-in validating
//!   mode [`RawTree::check_comparator`](crate::RawTree::check_comparator).
//!
//! ## Common Patterns
//!
//! ```
//! use aatree::{Error, Tree};
//!
//! let tree: Tree<String, u32> = Tree::new();
//! tree.insert("apple".to_string(), 1);
//! tree.insert("apricot".to_string(), 2);
//!
//! // Prefix comparator: consistent with the natural string order.
//! let prefix = |q: &str, k: &String| {
//!     if k.starts_with(q) { std::cmp::Ordering::Equal } else { q.cmp(k.as_str()) }
//! };
//! assert!(tree.check_comparator("ap", prefix).is_ok());
//!
//! // Reversed comparator: the tree refuses to vouch for it.
//! let reversed = |q: &str, k: &String| k.as_str().cmp(q);
//! assert!(matches!(
//!     tree.check_comparator("apple", reversed),
//!     Err(Error::InconsistentComparator { .. })
//! ));
//! ```

use thiserror::Error;

/// Errors reported by the validating operations of the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// A structural invariant of the AA-tree does not hold.
	///
	/// `reason` names the invariant (ordering, level, parent link, count) and
	/// `detail` describes where it was found to be broken.
	#[error("tree invariant violated ({reason}): {detail}")]
	Invariant {
		/// Short name of the broken invariant.
		reason: &'static str,
		/// Human readable location of the violation.
		detail: String,
	},

	/// A partial-key comparator is not monotone over the tree's key order.
	///
	/// Walking the keys in ascending order, a consistent comparator yields
	/// `Greater`, then `Equal`, then `Less` results, never going back. The
	/// `position` is the in-order index of the first key that broke this.
	#[error("comparator disagrees with tree order at in-order position {position}")]
	InconsistentComparator {
		/// Zero-based in-order index of the offending key.
		position: usize,
	},
}

impl Error {
	pub(crate) fn invariant(reason: &'static str, detail: impl Into<String>) -> Self {
		Error::Invariant {
			reason,
			detail: detail.into(),
		}
	}
}

/// A Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invariant_display_names_reason() {
		let err = Error::invariant("bst order", "key 3 follows key 4");
		assert_eq!(err.to_string(), "tree invariant violated (bst order): key 3 follows key 4");
	}

	#[test]
	fn comparator_display_names_position() {
		let err = Error::InconsistentComparator {
			position: 7,
		};
		assert!(err.to_string().contains("position 7"));
	}
}
