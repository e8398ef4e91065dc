// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypted single-file credential vault.
//!
//! The vault file holds one XChaCha20-Poly1305 sealed blob of every
//! credential, keyed by Argon2id from the user's passphrase. Saves are atomic,
//! concurrent sessions are excluded by a lock file, and files written by older
//! scrypt + secretbox layouts are read and upgraded transparently.

pub mod crypto;
pub mod filelock;
pub mod format;
pub mod import;
pub mod kdf;
pub mod persist;
pub mod prompt;
pub mod pwgen;
pub mod store;
pub mod vault;

pub use filelock::FileLock;
pub use format::Layout;
pub use kdf::KdfParams;
pub use prompt::{get_passphrase, get_passphrase_with_confirm, get_vault_passphrase};
pub use store::CredentialSet;
pub use vault::Vault;
