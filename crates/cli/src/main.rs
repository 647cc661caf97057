//! Suds CLI - Database migrations and catalog management.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront and session-store migrations
//! suds-cli migrate
//!
//! # Validate a catalog file without touching the database
//! suds-cli seed catalog catalog.yaml --check
//!
//! # Upsert products from a catalog file
//! suds-cli seed catalog catalog.yaml
//! ```
//!
//! Both commands read `STOREFRONT_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "suds-cli")]
#[command(author, version, about = "Suds storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Upsert catalog products from a YAML file
    Catalog {
        /// Path to the catalog YAML file
        file: PathBuf,

        /// Validate the file only
        #[arg(long)]
        check: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { target } => match target {
            SeedTarget::Catalog { file, check } => {
                commands::seed::catalog(&file, check).await?;
            }
        },
    }
    Ok(())
}
