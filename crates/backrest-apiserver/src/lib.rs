//! pgo-backrest API server
//!
//! Accepts backup, restore and show requests over HTTP (or as one-shot CLI
//! commands) and turns them into `Pgtask` descriptors for the task executor.
//!
//! # Endpoints
//!
//! - `POST /backrestbackup` - Issue backup tasks for named or selected clusters
//! - `GET /backrest/{name}?selector=` - Report `pgbackrest info` per cluster
//! - `POST /restore` - Issue a restore task into a new volume
//! - `GET /healthz` - Health check

#![deny(missing_docs)]

pub mod commands;
pub mod error;
pub mod handlers;
pub mod server;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};

use backrest_common::telemetry::LogFormat;

/// pgo-backrest - pgbackrest task issuance for Postgres clusters
#[derive(Parser, Debug)]
#[command(name = "pgo-backrest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Issue backup tasks
    Backup(commands::backup::BackupArgs),
    /// Issue a restore task
    Restore(commands::restore::RestoreArgs),
    /// Show pgbackrest info for clusters
    Show(commands::show::ShowArgs),
    /// Print the Pgcluster and Pgtask CRDs as YAML
    Crd,
}

impl Cli {
    /// Log format suited to the command: JSON for the server, text otherwise
    pub fn log_format(&self) -> LogFormat {
        match self.command {
            Commands::Serve(_) => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => commands::serve::run(args).await,
            Commands::Backup(args) => commands::backup::run(args).await,
            Commands::Restore(args) => commands::restore::run(args).await,
            Commands::Show(args) => commands::show::run(args).await,
            Commands::Crd => commands::crd::run(),
        }
    }
}
