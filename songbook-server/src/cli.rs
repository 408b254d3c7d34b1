//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigResult, SongbookConfig};

/// Songbook - a song catalog REST service
#[derive(Parser, Debug)]
#[command(name = "songbook")]
#[command(version)]
#[command(about = "Songbook - a song catalog REST service", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply migrations and serve the HTTP API
    Serve(ServeArgs),

    /// Apply pending schema migrations and exit
    Migrate(MigrateArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to the configuration file (defaults to ./songbook.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Database URL, overriding the file and DB_URL
    #[arg(long)]
    pub database_url: Option<String>,
}

impl CommonArgs {
    /// Load configuration and apply these flags on top.
    pub fn load_config(&self) -> ConfigResult<SongbookConfig> {
        let mut config = SongbookConfig::load(self.config.as_deref())?;
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Arguments for the `serve` command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Shared options
    #[command(flatten)]
    pub common: CommonArgs,

    /// Port to listen on, overriding the file and SERV_PORT
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `migrate` command
#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    /// Shared options
    #[command(flatten)]
    pub common: CommonArgs,
}
