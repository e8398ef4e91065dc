// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret acquisition via environment variables or an interactive TTY prompt.

use std::io::{BufRead, IsTerminal};

use lockbox_core::LockboxError;
use secrecy::SecretString;

/// Passphrase of the vault being opened or created.
pub const VAULT_KEY_ENV_VAR: &str = "LOCKBOX_PASSPHRASE";

/// Replacement passphrase for `passwd`.
pub const NEW_KEY_ENV_VAR: &str = "LOCKBOX_NEW_PASSPHRASE";

/// Passphrase of the second vault in `merge`.
pub const OTHER_KEY_ENV_VAR: &str = "LOCKBOX_OTHER_PASSPHRASE";

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn read_hidden(label: &str) -> Result<String, LockboxError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map_err(|e| LockboxError::Internal(format!("failed to read {}: {e}", label.to_lowercase())))
}

fn no_source(var: &str) -> LockboxError {
    LockboxError::Config(format!(
        "no passphrase provided; set {var} or run interactively"
    ))
}

/// Get a passphrase from `var` or, on a terminal, a hidden prompt.
pub fn get_passphrase(var: &str, label: &str) -> Result<SecretString, LockboxError> {
    if let Some(passphrase) = from_env(var) {
        return Ok(passphrase);
    }

    if std::io::stdin().is_terminal() {
        let passphrase = read_hidden(label)?;
        if passphrase.is_empty() {
            return Err(LockboxError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(passphrase));
    }

    Err(no_source(var))
}

/// Get the vault passphrase for opening an existing vault.
pub fn get_vault_passphrase() -> Result<SecretString, LockboxError> {
    get_passphrase(VAULT_KEY_ENV_VAR, "Vault passphrase")
}

/// Get a new passphrase, prompting twice on a terminal.
///
/// Environment values are taken as-is without confirmation.
pub fn get_passphrase_with_confirm(var: &str, label: &str) -> Result<SecretString, LockboxError> {
    if let Some(passphrase) = from_env(var) {
        return Ok(passphrase);
    }

    if std::io::stdin().is_terminal() {
        let first = read_hidden(label)?;
        let second = read_hidden(&format!("Confirm {}", label.to_lowercase()))?;
        if first != second {
            return Err(LockboxError::Config("passphrases do not match".to_string()));
        }
        if first.is_empty() {
            return Err(LockboxError::Config("empty passphrase not allowed".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(no_source(var))
}

/// Read a credential password: hidden prompt on a terminal, otherwise one
/// line from stdin.
pub fn read_credential_password() -> Result<SecretString, LockboxError> {
    let stdin = std::io::stdin();
    let password = if stdin.is_terminal() {
        read_hidden("Password")?
    } else {
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_string()
    };

    if password.is_empty() {
        return Err(LockboxError::Config("empty password not allowed".to_string()));
    }
    Ok(SecretString::from(password))
}
