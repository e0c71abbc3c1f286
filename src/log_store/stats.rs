//! Log Store statistics

use std::path::PathBuf;

use serde::Serialize;

/// Point-in-time statistics of one LogStore
#[derive(Debug, Clone, Serialize)]
pub struct LogStoreStats {
    /// Primary log file
    pub path: PathBuf,
    /// Distinct records in the index
    pub record_count: usize,
    /// Size of the primary log file in bytes
    pub file_size: u64,
    /// Appends since the last compaction (or since open)
    pub writes_since_compaction: usize,
    /// Compactions completed since open
    pub compactions: u64,
}

impl LogStoreStats {
    /// Byte count with a binary unit, for log lines
    pub fn format_size(bytes: u64) -> String {
        const UNITS: [&str; 3] = ["KB", "MB", "GB"];

        if bytes < 1024 {
            return format!("{bytes} B");
        }
        let mut size = bytes as f64 / 1024.0;
        let mut unit = 0;
        while size >= 1024.0 && unit + 1 < UNITS.len() {
            size /= 1024.0;
            unit += 1;
        }
        format!("{size:.2} {}", UNITS[unit])
    }
}

/// Outcome of a single compaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompactionReport {
    /// Records written to the compacted file
    pub records: usize,
    /// File size before compaction in bytes
    pub size_before: u64,
    /// File size after compaction in bytes
    pub size_after: u64,
}

impl CompactionReport {
    /// Bytes reclaimed by the compaction
    pub fn reclaimed(&self) -> u64 {
        self.size_before.saturating_sub(self.size_after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(LogStoreStats::format_size(512), "512 B");
        assert_eq!(LogStoreStats::format_size(2048), "2.00 KB");
        assert_eq!(LogStoreStats::format_size(3 * 1024 * 1024), "3.00 MB");
        assert_eq!(LogStoreStats::format_size(5 << 40), "5120.00 GB");
    }

    #[test]
    fn test_reclaimed() {
        let report = CompactionReport {
            records: 3,
            size_before: 1000,
            size_after: 400,
        };
        assert_eq!(report.reclaimed(), 600);
    }
}
