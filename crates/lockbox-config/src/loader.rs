// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Lookup order: `./lockbox.toml` > `~/.config/lockbox/lockbox.toml` >
//! `/etc/lockbox/lockbox.toml`, with `LOCKBOX_*` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LockboxConfig;

const SYSTEM_CONFIG: &str = "/etc/lockbox/lockbox.toml";
const LOCAL_CONFIG: &str = "lockbox.toml";

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("lockbox/lockbox.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lockbox/lockbox.toml`
/// 3. `~/.config/lockbox/lockbox.toml`
/// 4. `./lockbox.toml`
/// 5. `LOCKBOX_*` environment variables
pub fn load_config() -> Result<LockboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The Figment used by [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    config_search_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(LockboxConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `LOCKBOX_VAULT_KDF_MEMORY_COST` into
/// `vault.kdf.memory.cost`; only the first underscore after a known section
/// name is a separator.
fn env_provider() -> Env {
    Env::prefixed("LOCKBOX_")
        // Passphrase variables are read by the prompt module, not the config.
        .ignore(&["passphrase", "new_passphrase", "other_passphrase"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("vault_", "vault.", 1)
                .replacen("generator_", "generator.", 1)
                .replacen("import_", "import.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_paths_end_with_local_file() {
        let paths = config_search_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG)));
        assert_eq!(paths.last(), Some(&PathBuf::from(LOCAL_CONFIG)));
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOCKBOX_VAULT_KDF_ITERATIONS", "7");
            jail.set_env("LOCKBOX_GENERATOR_LENGTH", "48");
            jail.set_env("LOCKBOX_LOG_LEVEL", "debug");

            let config = load_config()?;
            assert_eq!(config.vault.kdf_iterations, 7);
            assert_eq!(config.generator.length, 48);
            assert_eq!(config.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn passphrase_env_var_is_not_a_config_key() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOCKBOX_PASSPHRASE", "secret");
            let config = load_config()?;
            assert_eq!(config.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "lockbox.toml",
                r#"
                [vault]
                path = "/tmp/from-local.json"
                "#,
            )?;
            let config = load_config()?;
            assert_eq!(config.vault.path, "/tmp/from-local.json");
            Ok(())
        });
    }
}
