// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lockbox credential vault.

use std::path::PathBuf;

use thiserror::Error;

/// The error type returned by every vault operation.
#[derive(Debug, Error)]
pub enum LockboxError {
    /// The referenced location does not exist in the vault.
    #[error("credential at `{0}` does not exist in vault")]
    NotFound(String),

    /// A credential already exists at the location.
    #[error("credential at `{0}` already exists")]
    AlreadyExists(String),

    /// The credential has no metadata entry under the key.
    #[error("meta tag `{key}` does not exist on `{location}`")]
    MetaNotFound { location: String, key: String },

    /// The credential already has a metadata entry under the key.
    #[error("meta tag `{key}` already exists on `{location}`")]
    MetaAlreadyExists { location: String, key: String },

    /// Wrong passphrase or tampered ciphertext. The two cases are never
    /// distinguished.
    #[error("incorrect passphrase or corrupt vault -- decryption failed")]
    AuthenticationFailure,

    /// Another handle holds the advisory lock for this vault.
    #[error("vault is locked by another session: {}", .0.display())]
    Locked(PathBuf),

    /// Filesystem errors (read, write, sync, rename).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file matches none of the known vault layouts.
    #[error("malformed vault file: {0}")]
    MalformedFile(String),

    /// A merge hit a location already present in the destination vault.
    #[error("merge conflict: `{0}` already exists in vault")]
    MergeConflict(String),

    /// Random number generation or key derivation failures.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// CSV import failures (unreadable rows, missing columns).
    #[error("import error: {0}")]
    Import(String),

    /// Invalid passphrase generator arguments.
    #[error("generator error: {0}")]
    Generator(String),

    /// Configuration problems surfaced at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
