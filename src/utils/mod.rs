//! Utility functions and helpers
//!
//! Atomic file replacement used by log compaction, and collection helpers.

pub mod atomic;
pub mod collections;

pub use atomic::{remove_stale_temp, replace_with, temp_path_for};
pub use collections::mutual_containment;
