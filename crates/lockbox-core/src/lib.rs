// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Lockbox credential vault.
//!
//! Holds the error type returned by every vault operation and the
//! [`Credential`] record stored inside a vault.

pub mod error;
pub mod types;

pub use error::LockboxError;
pub use types::Credential;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, LockboxError>;
