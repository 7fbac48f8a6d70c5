//! Shared helpers for the integration test binaries.
//!
//! Call [`init_tracing`] at the top of a test to see the tree's rotation and
//! removal events (requires `--features tracing`):
//!
//! ```bash
//! RUST_LOG=aatree=trace cargo test --features tracing -- --nocapture
//! ```

#![allow(dead_code)]

use std::sync::Once;

use aatree::Tree;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a console subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
		let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
	});
}

/// The seven-key tree most tests start from: 1, 3, 4, 5, 7, 8, 9 mapped to
/// ten times themselves.
pub fn sample_tree() -> Tree<i32, i32> {
	let tree = Tree::new();
	for key in [5, 3, 8, 1, 4, 7, 9] {
		tree.insert(key, key * 10);
	}
	tree
}

/// Collects the keys of `tree` in iteration order.
pub fn keys<V, C>(tree: &Tree<i32, V, C>) -> Vec<i32>
where
	C: aatree::Comparator<i32>,
{
	tree.read().keys().copied().collect()
}
