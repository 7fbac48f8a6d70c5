//! The tree's lock, swappable for a model-checked one.
//!
//! Normal builds use `parking_lot`'s reader-writer lock directly. Under
//! `cfg(loom)` the same names resolve to a thin shim over loom's lock, so
//! `tests/loom_tests.rs` can explore every interleaving of tree operations.
//!
//! The tree takes shared access with `read_recursive`, which never queues
//! behind a waiting writer. Loom's lock has no writer queue to speak of, so
//! the shim maps both flavours onto a plain `read`.

#[cfg(not(loom))]
pub use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(loom)]
pub use self::model::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[cfg(loom)]
mod model {
	use std::ops::{Deref, DerefMut};
	use std::sync::PoisonError;

	/// Loom's lock, exposing only the calls the tree makes.
	pub struct RwLock<T> {
		lock: loom::sync::RwLock<T>,
	}

	/// Shared access to the locked value.
	pub struct RwLockReadGuard<'a, T> {
		guard: loom::sync::RwLockReadGuard<'a, T>,
	}

	/// Exclusive access to the locked value.
	pub struct RwLockWriteGuard<'a, T> {
		guard: loom::sync::RwLockWriteGuard<'a, T>,
	}

	impl<T> RwLock<T> {
		pub fn new(value: T) -> Self {
			RwLock {
				lock: loom::sync::RwLock::new(value),
			}
		}

		// A panicking test thread poisons the lock; the model run is already
		// failing at that point, so the guard is recovered as is.
		pub fn read_recursive(&self) -> RwLockReadGuard<'_, T> {
			let guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
			RwLockReadGuard {
				guard,
			}
		}

		pub fn try_read_recursive(&self) -> Option<RwLockReadGuard<'_, T>> {
			let guard = self.lock.try_read().ok()?;
			Some(RwLockReadGuard {
				guard,
			})
		}

		pub fn write(&self) -> RwLockWriteGuard<'_, T> {
			let guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
			RwLockWriteGuard {
				guard,
			}
		}

		pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, T>> {
			let guard = self.lock.try_write().ok()?;
			Some(RwLockWriteGuard {
				guard,
			})
		}
	}

	impl<T> Deref for RwLockReadGuard<'_, T> {
		type Target = T;

		fn deref(&self) -> &T {
			&self.guard
		}
	}

	impl<T> Deref for RwLockWriteGuard<'_, T> {
		type Target = T;

		fn deref(&self) -> &T {
			&self.guard
		}
	}

	impl<T> DerefMut for RwLockWriteGuard<'_, T> {
		fn deref_mut(&mut self) -> &mut T {
			&mut self.guard
		}
	}
}
