//! Log Store Module
//!
//! Persistence for every aggregate in the trainer:
//! - `codec`: JSON + base64 record encoding
//! - `frame`: u32 little-endian length-prefixed frames
//! - `LogStore`: append-only log with an in-memory index, replay and compaction
//! - `LogStoreStats`: size and compaction counters
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//! ┌─────────┐    ┌────────────┐    ┌──────────────┐    ┌──────────────────┐
//! │ save(v) │───►│ encode +   │───►│ update index │───►│ compact() every  │
//! │         │    │ append     │    │ (same lock)  │    │ N writes (rayon) │
//! └─────────┘    └────────────┘    └──────────────┘    └──────────────────┘
//!
//! Read Path (Startup):
//! ┌──────────────┐    ┌──────────────────┐
//! │ Replay seeds │───►│ Replay primary   │───► Ready!
//! │ (read-only)  │    │ (latest wins)    │
//! └──────────────┘    └──────────────────┘
//! ```

pub mod codec;
pub mod frame;
mod stats;
mod store;

pub use codec::CodecError;
pub use frame::FrameError;
pub use stats::{CompactionReport, LogStoreStats};
pub use store::{LogStore, LogStoreConfig, LogStoreError, LogStoreResult, Record};
