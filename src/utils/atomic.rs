//! Atomic file replacement
//!
//! Used by log compaction to swap a rewritten log in for the live one
//! without ever leaving the primary path missing or half written.
//!
//! # Pattern
//!
//! 1. Write to a sibling temporary file (`<name>.tmp`)
//! 2. Call sync_all() to flush it to disk
//! 3. Rename it over the final path (atomic on POSIX filesystems)
//! 4. Sync the parent directory so the rename itself is durable
//!
//! The final path therefore always holds either the old version (crash
//! before rename) or the complete new version, never a partial file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Path of the temporary sibling used while replacing `path`
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Atomically replace `path` with content produced by `write_fn`.
///
/// The temporary file is opened in append mode and returned after the
/// rename, so the caller can keep appending to the new file without
/// reopening it. On any failure the temporary file is removed and the
/// original file is left untouched.
///
/// # Example
///
/// ```ignore
/// let file = replace_with(&log_path, |file| {
///     file.write_all(&frame)?;
///     Ok(())
/// })?;
/// ```
pub fn replace_with<F>(path: &Path, write_fn: F) -> io::Result<File>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let temp_path = temp_path_for(path);
    remove_stale_temp(path)?;

    let result = (|| {
        let mut file = OpenOptions::new()
            .append(true)
            .create_new(true)
            .open(&temp_path)?;
        write_fn(&mut file)?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;
        sync_parent_dir(path)?;
        Ok(file)
    })();

    if result.is_err() && temp_path.exists() {
        if let Err(e) = fs::remove_file(&temp_path) {
            warn!(path = %temp_path.display(), error = %e, "failed to remove temp file");
        }
    }

    result
}

/// Remove a temp file left behind by an interrupted replacement.
///
/// Returns `true` if a stale file was found and deleted.
pub fn remove_stale_temp(path: &Path) -> io::Result<bool> {
    let temp_path = temp_path_for(path);
    if !temp_path.exists() {
        return Ok(false);
    }
    fs::remove_file(&temp_path)?;
    debug!(path = %temp_path.display(), "removed stale temp file");
    Ok(true)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => File::open(parent)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> io::Result<()> {
    Ok(())
}
