// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of configuration values.

use crate::diagnostic::ConfigError;
use crate::model::LockboxConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Minimum accepted Argon2id memory cost (32 MiB).
pub const MIN_KDF_MEMORY_COST: u32 = 32768;

/// Maximum Argon2id memory cost a vault may be sealed with or read from (4 GiB).
pub const MAX_KDF_MEMORY_COST: u32 = 4 * 1024 * 1024;

/// Maximum Argon2id iteration count a vault may be sealed with or read from.
pub const MAX_KDF_ITERATIONS: u32 = 64;

/// Shortest password the generator may be configured to produce.
pub const MIN_GENERATOR_LENGTH: usize = 8;

/// Validate semantic constraints serde cannot express.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &LockboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log_level `{}` must be one of {}",
                config.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.vault.path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "vault.path must not be empty".to_string(),
        });
    }

    if !(MIN_KDF_MEMORY_COST..=MAX_KDF_MEMORY_COST).contains(&config.vault.kdf_memory_cost) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_memory_cost must be between {MIN_KDF_MEMORY_COST} (32 MiB) and {MAX_KDF_MEMORY_COST} (4 GiB), got {}",
                config.vault.kdf_memory_cost
            ),
        });
    }

    if !(2..=MAX_KDF_ITERATIONS).contains(&config.vault.kdf_iterations) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be between 2 and {MAX_KDF_ITERATIONS}, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    // The file format stores parallelism in a single byte.
    if !(1..=255).contains(&config.vault.kdf_parallelism) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_parallelism must be between 1 and 255, got {}",
                config.vault.kdf_parallelism
            ),
        });
    }

    if config.generator.length < MIN_GENERATOR_LENGTH {
        errors.push(ConfigError::Validation {
            message: format!(
                "generator.length must be at least {MIN_GENERATOR_LENGTH}, got {}",
                config.generator.length
            ),
        });
    }

    let columns = [
        ("import.location_column", &config.import.location_column),
        ("import.username_column", &config.import.username_column),
        ("import.password_column", &config.import.password_column),
    ];
    for (name, value) in columns {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{name} must not be empty"),
            });
        }
    }
    let distinct: std::collections::HashSet<&String> = columns.iter().map(|(_, v)| *v).collect();
    if distinct.len() != columns.len() {
        errors.push(ConfigError::Validation {
            message: "import column names must be distinct".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
