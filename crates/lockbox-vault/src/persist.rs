// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crash-safe replacement of the vault file.
//!
//! Bytes are written to a temporary file in the target's directory, flushed
//! to stable storage and renamed over the target. A reader sees either the old
//! file or the new one, never a mix.

use std::io::Write;
use std::path::Path;

use lockbox_core::LockboxError;
use tempfile::NamedTempFile;
use tracing::debug;

const TEMP_PREFIX: &str = ".lockbox-";

/// Atomically replace `path` with `bytes`.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LockboxError> {
    let staged = stage(path, bytes)?;
    commit(staged, path)
}

/// Write `bytes` to a synced temporary file next to `path`.
///
/// Dropping the returned handle deletes the temporary file and leaves `path`
/// untouched.
pub(crate) fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile, LockboxError> {
    let dir = parent_dir(path);
    let mut staged = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".tmp")
        .tempfile_in(dir)?;

    // tempfile creates the file 0600 on Unix.
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}

/// Rename a staged file over `path`.
pub(crate) fn commit(staged: NamedTempFile, path: &Path) -> Result<(), LockboxError> {
    staged.persist(path).map_err(|e| LockboxError::Io(e.error))?;
    sync_dir_best_effort(parent_dir(path));
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_dir_best_effort(dir: &Path) {
    if let Err(e) = std::fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!(dir = %dir.display(), error = %e, "directory sync failed");
    }
}

#[cfg(not(unix))]
fn sync_dir_best_effort(_dir: &Path) {}
