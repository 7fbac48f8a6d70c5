//! Zero-cost tracing helpers.
//!
//! With the `tracing` feature enabled these macros forward to the `tracing`
//! crate. Without it they expand to nothing, so the balancing hot paths carry
//! no logging cost in normal builds.
//!
//! ```bash
//! RUST_LOG=aatree=trace cargo test --features tracing
//! ```

#![allow(unused_macros, unused_imports)]

/// Trace-level logging (rotations, per-key events).
#[cfg(feature = "tracing")]
macro_rules! trace_log {
	($($arg:tt)*) => {
		tracing::trace!($($arg)*)
	};
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
	($($arg:tt)*) => {};
}

/// Debug-level logging.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
	($($arg:tt)*) => {
		tracing::debug!($($arg)*)
	};
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
	($($arg:tt)*) => {};
}

/// Warn-level logging.
#[cfg(feature = "tracing")]
macro_rules! warn_log {
	($($arg:tt)*) => {
		tracing::warn!($($arg)*)
	};
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_log {
	($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
pub(crate) use warn_log;
