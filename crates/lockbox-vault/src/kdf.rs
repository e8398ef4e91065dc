// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Passphrase key derivation.
//!
//! Argon2id (v0x13) derives every key the vault writes. scrypt with the fixed
//! parameters N=2^14, r=8, p=1 is only used to read legacy layouts.

use lockbox_config::VaultConfig;
use lockbox_core::LockboxError;
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Length of every derived key.
pub const KEY_LEN: usize = 32;

/// Length of salts generated for new seals.
pub const SALT_LEN: usize = 16;

/// Upper bound on memory cost in KiB, for both sealing and reading.
pub const MAX_MEMORY_COST: u32 = lockbox_config::validation::MAX_KDF_MEMORY_COST;

/// Upper bound on time cost, for both sealing and reading.
pub const MAX_TIME_COST: u32 = lockbox_config::validation::MAX_KDF_ITERATIONS;

const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Argon2id cost parameters, stored alongside every vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Iterations.
    pub time_cost: u32,
    /// Memory in KiB.
    pub memory_cost: u32,
    /// Lanes.
    pub parallelism: u8,
}

impl KdfParams {
    /// Reject parameters read from disk that would make derivation
    /// unreasonably expensive.
    ///
    /// A corrupted header must not trigger a multi-terabyte allocation.
    pub fn check_bounds(&self) -> Result<(), LockboxError> {
        match self.out_of_bounds() {
            Some(reason) => Err(LockboxError::MalformedFile(reason)),
            None => Ok(()),
        }
    }

    /// Reject parameters a vault could be sealed with but never reopened.
    ///
    /// Every seal goes through this, so a file is only ever written with
    /// parameters [`KdfParams::check_bounds`] accepts on read.
    pub fn check_sealable(&self) -> Result<(), LockboxError> {
        match self.out_of_bounds() {
            Some(reason) => Err(LockboxError::Config(format!(
                "Argon2id parameters out of range: {reason}"
            ))),
            None => Ok(()),
        }
    }

    fn out_of_bounds(&self) -> Option<String> {
        if self.memory_cost > MAX_MEMORY_COST {
            return Some(format!(
                "memory cost {} KiB exceeds {MAX_MEMORY_COST} KiB",
                self.memory_cost
            ));
        }
        if self.time_cost == 0 || self.time_cost > MAX_TIME_COST {
            return Some(format!(
                "time cost {} outside 1..={MAX_TIME_COST}",
                self.time_cost
            ));
        }
        if self.parallelism == 0 {
            return Some("parallelism is zero".to_string());
        }
        None
    }
}

impl From<&VaultConfig> for KdfParams {
    fn from(config: &VaultConfig) -> Self {
        Self {
            time_cost: config.kdf_iterations,
            memory_cost: config.kdf_memory_cost,
            parallelism: u8::try_from(config.kdf_parallelism).unwrap_or(u8::MAX),
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::from(&VaultConfig::default())
    }
}

/// Derive a 32-byte key from a passphrase using Argon2id.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, LockboxError> {
    if salt.is_empty() {
        return Err(LockboxError::Crypto("empty salt".to_string()));
    }

    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.time_cost,
        u32::from(params.parallelism),
        Some(KEY_LEN),
    )
    .map_err(|e| LockboxError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 =
        argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, argon_params);

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| LockboxError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Derive a key the way legacy layouts did: scrypt with fixed parameters.
pub fn derive_legacy_key(
    passphrase: &[u8],
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>, LockboxError> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| LockboxError::Crypto(format!("invalid scrypt parameters: {e}")))?;

    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    scrypt::scrypt(passphrase, salt, &params, output.as_mut())
        .map_err(|e| LockboxError::Crypto(format!("scrypt key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt for Argon2id.
pub fn generate_salt() -> Result<[u8; SALT_LEN], LockboxError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| LockboxError::Crypto("failed to generate random salt".to_string()))?;
    Ok(salt)
}
