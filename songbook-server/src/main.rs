//! Songbook - song catalog REST service.

use clap::Parser;
use tracing::error;

use songbook_query::logging;
use songbook_query::{QueryError, QueryResult};
use songbook_server::cli::{Cli, Command};
use songbook_server::server;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e.display_full(), "songbook failed");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> QueryResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let mut config = args.common.load_config().map_err(config_error)?;
            if let Some(port) = args.port {
                config.server.port = port;
            }
            logging::init_with(&config.logging.level, &config.logging.format);
            server::serve(config).await
        }
        Command::Migrate(args) => {
            let config = args.common.load_config().map_err(config_error)?;
            logging::init_with(&config.logging.level, &config.logging.format);
            let pool = server::connect(&config).await?;
            let report = server::run_migrations(&pool).await?;
            println!(
                "{} applied, {} already up to date",
                report.applied.len(),
                report.skipped.len()
            );
            Ok(())
        }
    }
}

fn config_error(e: songbook_server::config::ConfigError) -> QueryError {
    QueryError::configuration(e.to_string()).with_source(e)
}
