// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Coffer - an envelope-encrypted local credential vault.
//!
//! This is the binary entry point.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use coffer_config::CofferConfig;

/// Coffer - an envelope-encrypted local credential vault.
#[derive(Parser, Debug)]
#[command(name = "coffer", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault protected by a master password.
    Setup,
    /// Check that the master password unlocks the vault.
    Unlock,
    /// Move a legacy Fernet vault to the hybrid key hierarchy.
    Migrate,
    /// Show whether a vault exists and how many credentials it holds.
    Status,
    /// Store a credential. Secret attributes are read without echo.
    Put {
        /// Credential id.
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Prompt for a password.
        #[arg(long)]
        password: bool,
        /// Prompt for a PIN.
        #[arg(long)]
        pin: bool,
        /// Prompt for an extra secret (2FA seed, API key).
        #[arg(long)]
        extra: bool,
    },
    /// Print a credential. Password, PIN and extra are masked unless --reveal.
    Show {
        /// Credential id.
        id: String,
        #[arg(long)]
        reveal: bool,
    },
    /// Print the vault's RSA public key.
    PublicKey,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => coffer_config::load_and_validate_path(path),
        None => coffer_config::load_and_validate(),
    };
    let config: CofferConfig = match loaded {
        Ok(config) => config,
        Err(errors) => {
            coffer_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log.level);

    if let Err(e) = dispatch(cli.command, &config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands, config: &CofferConfig) -> Result<(), coffer_core::CofferError> {
    match command {
        Commands::Setup => {
            commands::run_setup(config).await?;
            println!("Vault created at {}", config.storage.database_path);
        }
        Commands::Unlock => {
            commands::run_unlock(config).await?;
            println!("Master password OK");
        }
        Commands::Migrate => {
            let report = commands::run_migrate(config).await?;
            println!(
                "Migrated {} credentials ({} fields)",
                report.migrated_credentials, report.migrated_fields
            );
        }
        Commands::Status => {
            let status = commands::run_status(config).await?;
            print!("{status}");
        }
        Commands::Put {
            id,
            username,
            notes,
            password,
            pin,
            extra,
        } => {
            let input = commands::read_credential_input(id, username, notes, password, pin, extra)?;
            commands::run_put(config, input).await?;
            println!("Stored");
        }
        Commands::Show { id, reveal } => {
            let view = commands::run_show(config, &id, reveal).await?;
            print!("{}", commands::render_view(&view));
        }
        Commands::PublicKey => {
            print!("{}", commands::run_public_key(config).await?);
        }
    }
    Ok(())
}

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("coffer={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
