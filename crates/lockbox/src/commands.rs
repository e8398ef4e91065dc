// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Every command that needs the vault opens it, does its work, saves if the
//! vault changed and closes it. A failing command writes nothing to disk.

use std::io::Write;
use std::path::Path;

use lockbox_config::{ImportConfig, LockboxConfig};
use lockbox_core::{Credential, LockboxError};
use lockbox_vault::{FileLock, Vault, prompt};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::{Commands, MetaCommands};

const MASK: &str = "********";

/// What a command needs from its surroundings.
pub(crate) struct Context<'a, W: Write> {
    pub config: &'a LockboxConfig,
    pub out: W,
    /// Source of credential passwords for `add` and `edit`.
    pub read_password: &'a dyn Fn() -> Result<SecretString, LockboxError>,
}

pub(crate) fn run<W: Write>(command: Commands, ctx: &mut Context<'_, W>) -> Result<(), LockboxError> {
    let path = Path::new(&ctx.config.vault.path).to_path_buf();

    match command {
        Commands::Init { force } => init(&path, force, ctx),
        Commands::List => {
            let locations = with_vault(&path, ctx.config, |vault| vault.locations())?;
            for location in locations {
                writeln!(ctx.out, "{location}")?;
            }
            Ok(())
        }
        Commands::Get { location, show } => {
            let (location, credential) = with_vault(&path, ctx.config, |vault| vault.find(&location))?;
            print_credential(&mut ctx.out, &location, &credential, show)
        }
        Commands::Add { location, username } => {
            let password = (ctx.read_password)()?;
            with_vault(&path, ctx.config, |vault| {
                vault.add(&location, Credential::new(username, password.expose_secret()))
            })?;
            writeln!(ctx.out, "Added {location}")?;
            Ok(())
        }
        Commands::Edit { location, username } => {
            let password = (ctx.read_password)()?;
            with_vault(&path, ctx.config, |vault| {
                vault.edit(&location, Credential::new(username, password.expose_secret()))
            })?;
            writeln!(ctx.out, "Updated {location}")?;
            Ok(())
        }
        Commands::Generate {
            location,
            username,
            length,
            charset,
        } => {
            let mut generator = ctx.config.generator.clone();
            if let Some(length) = length {
                generator.length = length;
            }
            if let Some(charset) = charset {
                generator.charset = charset;
            }
            let password = with_vault(&path, ctx.config, |vault| {
                vault.generate(&location, &username, &generator)
            })?;
            writeln!(ctx.out, "{}", password.expose_secret())?;
            Ok(())
        }
        Commands::Delete { location } => {
            with_vault(&path, ctx.config, |vault| vault.delete(&location))?;
            writeln!(ctx.out, "Deleted {location}")?;
            Ok(())
        }
        Commands::Find { search } => {
            let (location, credential) = with_vault(&path, ctx.config, |vault| vault.find(&search))?;
            writeln!(ctx.out, "{location}\t{}", credential.username)?;
            Ok(())
        }
        Commands::Meta { action } => meta(&path, action, ctx),
        Commands::Passwd => {
            let new_passphrase =
                prompt::get_passphrase_with_confirm(prompt::NEW_KEY_ENV_VAR, "New vault passphrase")?;
            with_vault(&path, ctx.config, |vault| vault.change_passphrase(&new_passphrase))?;
            writeln!(ctx.out, "Passphrase changed")?;
            Ok(())
        }
        Commands::Merge { other } => {
            let other_passphrase = prompt::get_passphrase(
                prompt::OTHER_KEY_ENV_VAR,
                &format!("Passphrase for {}", other.display()),
            )?;
            let merged = with_vault(&path, ctx.config, |vault| {
                let source = Vault::open(&other, &other_passphrase, &ctx.config.vault)?;
                let merged = vault.merge(&source);
                source.close()?;
                merged
            })?;
            writeln!(ctx.out, "Merged {merged} credentials from {}", other.display())?;
            Ok(())
        }
        Commands::Import {
            file,
            location_column,
            username_column,
            password_column,
        } => {
            let columns = ImportConfig {
                location_column: location_column.unwrap_or_else(|| ctx.config.import.location_column.clone()),
                username_column: username_column.unwrap_or_else(|| ctx.config.import.username_column.clone()),
                password_column: password_column.unwrap_or_else(|| ctx.config.import.password_column.clone()),
            };
            let reader = std::fs::File::open(&file)?;
            let imported = with_vault(&path, ctx.config, |vault| vault.import_csv(reader, &columns))?;
            writeln!(ctx.out, "Imported {imported} credentials from {}", file.display())?;
            Ok(())
        }
    }
}

/// Write a new empty vault to `path`.
///
/// Holds the vault lock while checking for and replacing an existing file, so
/// `--force` never clobbers a vault another session has open.
fn init<W: Write>(path: &Path, force: bool, ctx: &mut Context<'_, W>) -> Result<(), LockboxError> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        std::fs::create_dir_all(dir)?;
    }
    let lock = FileLock::acquire(path)?;

    if path.exists() && !force {
        return Err(LockboxError::Config(format!(
            "vault already exists at {} (use --force to replace it)",
            path.display()
        )));
    }

    let passphrase = prompt::get_passphrase_with_confirm(prompt::VAULT_KEY_ENV_VAR, "New vault passphrase")?;
    let vault = Vault::create(&passphrase, &ctx.config.vault)?;
    vault.save(path)?;
    vault.close()?;
    lock.release()?;

    info!(path = %path.display(), "vault initialized");
    writeln!(ctx.out, "Created vault at {}", path.display())?;
    Ok(())
}

fn meta<W: Write>(path: &Path, action: MetaCommands, ctx: &mut Context<'_, W>) -> Result<(), LockboxError> {
    match action {
        MetaCommands::Add { location, key, value } => {
            with_vault(path, ctx.config, |vault| vault.add_meta(&location, &key, &value))?;
            writeln!(ctx.out, "Added {key} to {location}")?;
        }
        MetaCommands::Edit { location, key, value } => {
            with_vault(path, ctx.config, |vault| vault.edit_meta(&location, &key, &value))?;
            writeln!(ctx.out, "Updated {key} on {location}")?;
        }
        MetaCommands::Delete { location, key } => {
            with_vault(path, ctx.config, |vault| vault.delete_meta(&location, &key))?;
            writeln!(ctx.out, "Deleted {key} from {location}")?;
        }
        MetaCommands::Find { location, search } => {
            let (key, value) = with_vault(path, ctx.config, |vault| vault.find_meta(&location, &search))?;
            writeln!(ctx.out, "{key}: {value}")?;
        }
    }
    Ok(())
}

/// Open the vault, run `f`, save on success if anything changed, close.
fn with_vault<T>(
    path: &Path,
    config: &LockboxConfig,
    f: impl FnOnce(&Vault) -> Result<T, LockboxError>,
) -> Result<T, LockboxError> {
    let passphrase = prompt::get_vault_passphrase()?;
    let vault = Vault::open(path, &passphrase, &config.vault)?;

    let outcome = f(&vault).and_then(|value| {
        if vault.is_dirty()? {
            vault.save(path)?;
        }
        Ok(value)
    });
    let closed = vault.close();

    let value = outcome?;
    closed?;
    Ok(value)
}

fn print_credential<W: Write>(
    out: &mut W,
    location: &str,
    credential: &Credential,
    show: bool,
) -> Result<(), LockboxError> {
    let password = if show { credential.password.as_str() } else { MASK };
    writeln!(out, "location: {location}")?;
    writeln!(out, "username: {}", credential.username)?;
    writeln!(out, "password: {password}")?;
    for (key, value) in &credential.meta {
        writeln!(out, "{key}: {value}")?;
    }
    Ok(())
}
