// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory cross-process lock on a vault path.
//!
//! The lock is a sibling file `<absolute path>.lck` created exclusively. Its
//! presence means another session holds the vault. Acquisition never waits.
//! A lock file left behind by a crashed process must be removed by hand.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use lockbox_core::LockboxError;
use tracing::{debug, warn};

const LOCK_SUFFIX: &str = ".lck";

/// Exclusive hold on one vault path, released on [`FileLock::release`] or drop.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    released: bool,
}

impl FileLock {
    /// Take the lock for `target`, failing with [`LockboxError::Locked`] if
    /// it is already held.
    pub fn acquire(target: impl AsRef<Path>) -> Result<Self, LockboxError> {
        let target = std::path::absolute(target.as_ref())?;
        let mut lock_path = OsString::from(target.as_os_str());
        lock_path.push(LOCK_SUFFIX);
        let lock_path = PathBuf::from(lock_path);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(LockboxError::Locked(target));
            }
            Err(e) => return Err(e.into()),
        };

        // Owner pid, for whoever has to clear a stale lock.
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            debug!(error = %e, "could not record pid in lock file");
        }

        debug!(lock = %lock_path.display(), "vault lock acquired");
        Ok(Self {
            path: lock_path,
            released: false,
        })
    }

    /// Path of the lock file itself.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock, reporting a failure to remove the lock file.
    pub fn release(mut self) -> Result<(), LockboxError> {
        self.released = true;
        std::fs::remove_file(&self.path)?;
        debug!(lock = %self.path.display(), "vault lock released");
        Ok(())
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = std::fs::remove_file(&self.path)
        {
            warn!(lock = %self.path.display(), error = %e, "failed to remove lock file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_locked_until_release() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("vault.json");

        let lock = FileLock::acquire(&vault).unwrap();
        assert!(lock.path().ends_with("vault.json.lck"));
        assert!(lock.path().exists());

        match FileLock::acquire(&vault) {
            Err(LockboxError::Locked(path)) => assert_eq!(path, vault),
            other => panic!("expected Locked, got {other:?}"),
        }

        lock.release().unwrap();
        assert!(!dir.path().join("vault.json.lck").exists());
        FileLock::acquire(&vault).unwrap().release().unwrap();
    }

    #[test]
    fn drop_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("vault.json");
        {
            let _lock = FileLock::acquire(&vault).unwrap();
        }
        FileLock::acquire(&vault).unwrap().release().unwrap();
    }

    #[test]
    fn stale_lock_file_blocks_acquisition() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("vault.json");
        std::fs::write(dir.path().join("vault.json.lck"), "12345\n").unwrap();

        assert!(matches!(
            FileLock::acquire(&vault),
            Err(LockboxError::Locked(_))
        ));
    }

    #[test]
    fn release_after_external_removal_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let lock = FileLock::acquire(dir.path().join("vault.json")).unwrap();
        std::fs::remove_file(lock.path()).unwrap();
        assert!(matches!(lock.release(), Err(LockboxError::Io(_))));
    }
}
