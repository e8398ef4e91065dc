// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so that a misspelled key is
//! reported instead of silently ignored.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level Lockbox configuration. Every section is optional.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockboxConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Vault file and key derivation settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Password generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// CSV import column mapping.
    #[serde(default)]
    pub import: ImportConfig,
}

impl Default for LockboxConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            vault: VaultConfig::default(),
            generator: GeneratorConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Vault file location and Argon2id parameters used for new seals.
///
/// Existing vaults keep the parameters recorded in their file; these values
/// apply to newly created vaults, passphrase changes and legacy migrations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Path of the vault file.
    #[serde(default = "default_vault_path")]
    pub path: String,

    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes (default: 4, at most 255).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_vault_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("lockbox/vault.json"))
        .unwrap_or_else(|| "vault.json".into())
        .display()
        .to_string()
}

fn default_kdf_memory_cost() -> u32 {
    65536
}

fn default_kdf_iterations() -> u32 {
    3
}

fn default_kdf_parallelism() -> u32 {
    4
}

/// Character set used by the password generator.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CharsetKind {
    /// Lowercase letters only.
    Alpha,
    /// Lowercase letters and digits.
    #[default]
    Alphanumeric,
    /// Lowercase letters, digits and punctuation.
    Special,
}

/// Password generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of characters in generated passwords.
    #[serde(default = "default_generator_length")]
    pub length: usize,

    /// Character set for generated passwords.
    #[serde(default)]
    pub charset: CharsetKind,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_generator_length(),
            charset: CharsetKind::default(),
        }
    }
}

fn default_generator_length() -> usize {
    32
}

/// Header names used to pick fields out of an imported CSV file.
///
/// Every other column is stored as a metadata tag named after its header.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    #[serde(default = "default_location_column")]
    pub location_column: String,

    #[serde(default = "default_username_column")]
    pub username_column: String,

    #[serde(default = "default_password_column")]
    pub password_column: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            location_column: default_location_column(),
            username_column: default_username_column(),
            password_column: default_password_column(),
        }
    }
}

fn default_location_column() -> String {
    "location".to_string()
}

fn default_username_column() -> String {
    "username".to_string()
}

fn default_password_column() -> String {
    "password".to_string()
}
