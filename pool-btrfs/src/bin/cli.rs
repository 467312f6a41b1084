// SPDX-License-Identifier: GPL-3.0-only

//! CLI wrapper around the pool-btrfs backend for manual pool operations

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pool_btrfs::{BackendConfig, BtrfsBackend, PoolBackend, Volume};

/// Manage BTRFS backed storage pools
#[derive(Parser)]
#[command(name = "pool-btrfs-cli")]
#[command(about = "CLI tool for BTRFS storage pools", long_about = None)]
struct Cli {
    /// Configuration file with pool definitions
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// btrfs binary to use instead of the configured one
    #[arg(long, global = true)]
    btrfs: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the pool root is accessible
    Check {
        /// Configured pool name or absolute pool root
        pool: String,
    },
    /// Rescan the pool and print it as JSON
    Refresh {
        /// Configured pool name or absolute pool root
        pool: String,
    },
    /// Create a subvolume, or a snapshot of another volume
    Create {
        /// Configured pool name or absolute pool root
        pool: String,
        /// Name of the volume relative to the pool root
        name: String,
        /// Volume to snapshot instead of creating an empty subvolume
        #[arg(long)]
        backing: Option<String>,
    },
    /// Delete a volume
    Delete {
        /// Configured pool name or absolute pool root
        pool: String,
        /// Name of the volume relative to the pool root
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => BackendConfig::load(path)?,
        None => BackendConfig::default(),
    };
    if let Some(binary) = cli.btrfs {
        config.btrfs_binary = binary;
    }

    // Initialize tracing to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    match cli.command {
        Commands::Check { pool } => {
            let pool = config.resolve_pool(&pool)?;
            let active = BtrfsBackend::new().check_pool(&pool);
            println!("{{\"active\": {}}}", active);
        }
        Commands::Refresh { pool } => {
            let backend = BtrfsBackend::from_config(&config)?;
            let mut pool = config.resolve_pool(&pool)?;
            backend
                .refresh_pool(&mut pool)
                .with_context(|| format!("refreshing pool {}", pool.root()))?;

            let json = serde_json::to_string(&pool)?;
            println!("{}", json);
        }
        Commands::Create {
            pool,
            name,
            backing,
        } => {
            let backend = BtrfsBackend::from_config(&config)?;
            let pool = config.resolve_pool(&pool)?;

            let mut volume = Volume::named(name);
            if let Some(backing) = backing {
                volume = volume.with_backing_store(backing);
            }

            backend.create_vol(&pool, &mut volume)?;
            backend.build_vol(&pool, &volume)?;

            let json = serde_json::to_string(&volume)?;
            println!("{}", json);
        }
        Commands::Delete { pool, name } => {
            let backend = BtrfsBackend::from_config(&config)?;
            let pool = config.resolve_pool(&pool)?;
            backend.delete_vol(&pool, &Volume::named(name))?;
            println!("{{\"success\": true}}");
        }
    }

    Ok(())
}
