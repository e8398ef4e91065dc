// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lockbox - an encrypted credential vault for the command line.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lockbox_config::CharsetKind;
use tracing::debug;

/// Lockbox - an encrypted credential vault.
#[derive(Parser, Debug)]
#[command(name = "lockbox", version, about, long_about = None)]
struct Cli {
    /// Configuration file to use instead of the standard search paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Vault file, overriding `vault.path` from the configuration.
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new empty vault.
    Init {
        /// Replace an existing vault file.
        #[arg(long)]
        force: bool,
    },
    /// List every stored location.
    List,
    /// Show the credential stored at (or best matching) a location.
    Get {
        location: String,
        /// Print the password instead of masking it.
        #[arg(long)]
        show: bool,
    },
    /// Store a new credential; the password is read from the terminal or stdin.
    Add {
        location: String,
        #[arg(long)]
        username: String,
    },
    /// Replace the username and password of a credential, keeping its meta tags.
    Edit {
        location: String,
        #[arg(long)]
        username: String,
    },
    /// Store a credential with a freshly generated password.
    Generate {
        location: String,
        #[arg(long)]
        username: String,
        /// Password length, overriding `generator.length`.
        #[arg(long)]
        length: Option<usize>,
        /// alpha, alphanumeric or special, overriding `generator.charset`.
        #[arg(long)]
        charset: Option<CharsetKind>,
    },
    /// Remove a credential.
    Delete { location: String },
    /// Find the location matching a search string.
    Find { search: String },
    /// Manage meta tags on a credential.
    Meta {
        #[command(subcommand)]
        action: MetaCommands,
    },
    /// Change the vault passphrase.
    Passwd,
    /// Copy every credential from another vault into this one.
    Merge { other: PathBuf },
    /// Import credentials from a CSV export.
    Import {
        file: PathBuf,
        #[arg(long)]
        location_column: Option<String>,
        #[arg(long)]
        username_column: Option<String>,
        #[arg(long)]
        password_column: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum MetaCommands {
    /// Add a meta tag.
    Add {
        location: String,
        key: String,
        value: String,
    },
    /// Change the value of an existing meta tag.
    Edit {
        location: String,
        key: String,
        value: String,
    },
    /// Remove a meta tag.
    Delete { location: String, key: String },
    /// Find the meta tag matching a search string.
    Find { location: String, search: String },
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => lockbox_config::load_and_validate_path(path),
        None => lockbox_config::load_and_validate(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            lockbox_config::render_errors(&errors);
            std::process::exit(2);
        }
    };
    if let Some(vault) = &cli.vault {
        config.vault.path = vault.display().to_string();
    }

    init_tracing(&config.log_level);
    debug!(vault = %config.vault.path, "configuration loaded");

    let mut ctx = commands::Context {
        config: &config,
        out: std::io::stdout().lock(),
        read_password: &lockbox_vault::prompt::read_credential_password,
    };
    if let Err(e) = commands::run(cli.command, &mut ctx) {
        eprintln!("lockbox: {e}");
        std::process::exit(1);
    }
}

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lockbox={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}
