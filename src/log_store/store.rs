//! Log Store - append-only record log with an in-memory index
//!
//! The log file is the source of truth. The index is a derived cache that
//! holds the latest version of every record and is rebuilt from the file
//! (and any seed files) on open.

use std::collections::HashMap;
use std::fmt::Debug;
use std::fs::{self, File, OpenOptions};
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::codec::{self, CodecError};
use super::frame::{self, FrameError};
use super::stats::{CompactionReport, LogStoreStats};
use crate::utils::atomic;

/// A value that can be kept in a [`LogStore`].
///
/// Every version of a record carries the same id; the newest version
/// written wins.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Debug + Send + Sync + 'static;

    fn record_id(&self) -> Self::Id;
}

/// Configuration for a LogStore
#[derive(Debug, Clone)]
pub struct LogStoreConfig {
    /// Writes after which a background compaction is scheduled (0 disables)
    pub compaction_threshold: usize,
    /// Whether to fsync the data after every append
    pub sync_writes: bool,
}

impl Default for LogStoreConfig {
    fn default() -> Self {
        Self {
            compaction_threshold: 1000,
            sync_writes: true,
        }
    }
}

impl LogStoreConfig {
    /// Config that never compacts on its own
    pub fn without_compaction() -> Self {
        Self {
            compaction_threshold: 0,
            ..Default::default()
        }
    }

    pub fn with_compaction_threshold(mut self, threshold: usize) -> Self {
        self.compaction_threshold = threshold;
        self
    }

    pub fn with_sync_writes(mut self, sync_writes: bool) -> Self {
        self.sync_writes = sync_writes;
        self
    }
}

/// Result type for LogStore operations
pub type LogStoreResult<T> = Result<T, LogStoreError>;

/// Errors that can occur in LogStore operations
#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("cannot open log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt log {path} at byte {offset}: {reason}")]
    Corrupt {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("record of {0} bytes exceeds the frame size limit")]
    FrameTooLarge(usize),
}

impl LogStoreError {
    fn corrupt_frame(path: &Path, err: FrameError) -> Self {
        LogStoreError::Corrupt {
            path: path.to_path_buf(),
            offset: err.offset(),
            reason: err.to_string(),
        }
    }

    /// True for errors that mean the file content itself is bad
    pub fn is_corruption(&self) -> bool {
        matches!(self, LogStoreError::Corrupt { .. })
    }
}

/// Write side of the store. Holding this lock is required to touch the
/// file or to mutate the index.
struct LogWriter {
    file: File,
    /// File length after the last successful append
    len: u64,
    writes_since_compaction: usize,
    compactions: u64,
}

struct Shared<T: Record> {
    path: PathBuf,
    config: LogStoreConfig,
    writer: Mutex<LogWriter>,
    index: RwLock<HashMap<T::Id, T>>,
    compacting: AtomicBool,
}

/// Append-only log of records with an in-memory index of current values.
///
/// Cloning a `LogStore` yields another handle on the same file and index.
pub struct LogStore<T: Record> {
    shared: Arc<Shared<T>>,
}

impl<T: Record> Clone for LogStore<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Record> std::fmt::Debug for LogStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogStore")
            .field("path", &self.shared.path)
            .field("records", &self.count_all())
            .finish()
    }
}

impl<T: Record> LogStore<T> {
    /// Open (or create) a store at `path` with default config
    pub fn open<P: AsRef<Path>>(path: P) -> LogStoreResult<Self> {
        Self::open_with(path, &[] as &[PathBuf], LogStoreConfig::default())
    }

    /// Open (or create) a store at `path`.
    ///
    /// Startup path:
    /// 1. Create the primary file if it is missing
    /// 2. Replay every seed file, oldest first (read-only, never written)
    /// 3. Replay the primary file; later versions overwrite earlier ones
    /// 4. Open the primary file for appending
    ///
    /// Replay is all-or-nothing: one bad frame in any file fails the open.
    pub fn open_with<P, S>(path: P, seeds: &[S], config: LogStoreConfig) -> LogStoreResult<Self>
    where
        P: AsRef<Path>,
        S: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let started = Instant::now();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LogStoreError::Open {
                path: path.clone(),
                source,
            })?;
        }

        // A leftover temp file means a compaction died before its rename,
        // so the primary file is still the complete log.
        if atomic::remove_stale_temp(&path)? {
            warn!(path = %path.display(), "discarded unfinished compaction output");
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogStoreError::Open {
                path: path.clone(),
                source,
            })?;
        let len = file.metadata()?.len();

        let mut index = HashMap::new();
        for seed in seeds {
            let count = replay_file(seed.as_ref(), &mut index)?;
            debug!(path = %seed.as_ref().display(), records = count, "replayed seed file");
        }
        let count = replay_file(&path, &mut index)?;

        info!(
            path = %path.display(),
            frames = count,
            records = index.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "log store opened"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                path,
                config,
                writer: Mutex::new(LogWriter {
                    file,
                    len,
                    writes_since_compaction: 0,
                    compactions: 0,
                }),
                index: RwLock::new(index),
                compacting: AtomicBool::new(false),
            }),
        })
    }

    /// Path of the primary log file
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// Get the configuration
    pub fn config(&self) -> &LogStoreConfig {
        &self.shared.config
    }

    /// Append a new version of `value` and make it the current one.
    ///
    /// The frame is on disk before the index changes; if the write fails
    /// the index is left as it was.
    pub fn save(&self, value: T) -> LogStoreResult<T> {
        let encoded = codec::encode(&value)?;
        let frame =
            frame::encode_frame(&encoded).ok_or(LogStoreError::FrameTooLarge(encoded.len()))?;

        let compaction_due = {
            let mut writer = self.shared.writer.lock();
            self.shared.append(&mut writer, &frame)?;

            self.shared
                .index
                .write()
                .insert(value.record_id(), value.clone());

            writer.writes_since_compaction += 1;
            let threshold = self.shared.config.compaction_threshold;
            threshold > 0 && writer.writes_since_compaction >= threshold
        };

        if compaction_due {
            self.schedule_compaction();
        }

        Ok(value)
    }

    /// Current version of the record with `id`
    pub fn get(&self, id: &T::Id) -> Option<T> {
        self.shared.index.read().get(id).cloned()
    }

    /// Some record matching `predicate`, if any
    pub fn find_first<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.shared
            .index
            .read()
            .values()
            .find(|value| predicate(value))
            .cloned()
    }

    /// All records matching `predicate`, in no particular order
    pub fn find_all<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.shared
            .index
            .read()
            .values()
            .filter(|value| predicate(value))
            .cloned()
            .collect()
    }

    /// Whether any record matches `predicate`
    pub fn contains<F>(&self, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.shared.index.read().values().any(|value| predicate(value))
    }

    /// A uniformly chosen record matching `predicate`, or `None`
    pub fn find_random<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let index = self.shared.index.read();
        let candidates: Vec<&T> = index.values().filter(|value| predicate(value)).collect();
        candidates.choose(&mut rand::thread_rng()).map(|value| (*value).clone())
    }

    /// Number of distinct records (not frames in the file)
    pub fn count_all(&self) -> usize {
        self.shared.index.read().len()
    }

    /// Rewrite the log so it holds only current values.
    ///
    /// Blocks writers for the whole swap. Logical content is unchanged.
    pub fn compact(&self) -> LogStoreResult<CompactionReport> {
        self.shared.compact()
    }

    /// Snapshot of store statistics
    pub fn stats(&self) -> LogStoreStats {
        let writer = self.shared.writer.lock();
        LogStoreStats {
            path: self.shared.path.clone(),
            record_count: self.shared.index.read().len(),
            file_size: writer.len,
            writes_since_compaction: writer.writes_since_compaction,
            compactions: writer.compactions,
        }
    }

    fn schedule_compaction(&self) {
        if self.shared.compacting.swap(true, Ordering::AcqRel) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        rayon::spawn(move || {
            if let Err(e) = shared.compact() {
                warn!(path = %shared.path.display(), error = %e, "background compaction failed");
            }
            shared.compacting.store(false, Ordering::Release);
        });
    }
}

impl<T: Record> Shared<T> {
    fn append(&self, writer: &mut LogWriter, frame: &[u8]) -> LogStoreResult<()> {
        use std::io::Write;

        let result = writer.file.write_all(frame).and_then(|_| {
            if self.config.sync_writes {
                writer.file.sync_data()
            } else {
                Ok(())
            }
        });

        if let Err(e) = result {
            // Drop any partial frame so the next replay does not see it.
            if let Err(truncate_err) = writer.file.set_len(writer.len) {
                warn!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "could not roll back partial append"
                );
            }
            return Err(e.into());
        }

        writer.len += frame.len() as u64;
        Ok(())
    }

    fn compact(&self) -> LogStoreResult<CompactionReport> {
        let started = Instant::now();
        let mut writer = self.writer.lock();
        let size_before = writer.len;

        // The index only changes under the writer lock, so this copy is
        // exactly what the file must contain after the swap.
        let records: Vec<T> = self.index.read().values().cloned().collect();
        let frames = records
            .par_iter()
            .map(|record| {
                let encoded = codec::encode(record)?;
                frame::encode_frame(&encoded).ok_or(LogStoreError::FrameTooLarge(encoded.len()))
            })
            .collect::<LogStoreResult<Vec<Vec<u8>>>>()?;

        let size_after: u64 = frames.iter().map(|f| f.len() as u64).sum();
        let file = atomic::replace_with(&self.path, |file| {
            use std::io::Write;
            for frame in &frames {
                file.write_all(frame)?;
            }
            Ok(())
        })?;

        writer.file = file;
        writer.len = size_after;
        writer.writes_since_compaction = 0;
        writer.compactions += 1;

        let report = CompactionReport {
            records: frames.len(),
            size_before,
            size_after,
        };

        info!(
            path = %self.path.display(),
            records = report.records,
            size = %LogStoreStats::format_size(report.size_after),
            reclaimed = %LogStoreStats::format_size(report.reclaimed()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "log compacted"
        );

        Ok(report)
    }
}

/// Replay one log file into `index`. Returns the number of frames read.
fn replay_file<T: Record>(path: &Path, index: &mut HashMap<T::Id, T>) -> LogStoreResult<usize> {
    let data = fs::read(path).map_err(|source| LogStoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let frames = frame::split_frames(&data).map_err(|e| LogStoreError::corrupt_frame(path, e))?;

    let values = frames
        .par_iter()
        .map(|(offset, payload)| {
            codec::decode::<T>(payload).map_err(|e| LogStoreError::Corrupt {
                path: path.to_path_buf(),
                offset: *offset,
                reason: e.to_string(),
            })
        })
        .collect::<LogStoreResult<Vec<T>>>()?;

    let count = values.len();
    for value in values {
        index.insert(value.record_id(), value);
    }
    Ok(count)
}
