mod api;
mod config;
mod db;
mod maintenance;
mod models;
mod service;

use clap::{Parser, Subcommand};
use config::AppConfig;
use std::path::Path;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "incident-desk")]
#[command(about = "Incident reporting API and maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Print the tables and incidents stored in the database file
    Inspect,
    /// Delete every incident and reset the id sequence
    Purge,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    let existed = Path::new(&config.db_path).exists();
    db::ensure_parent_dir(&config.db_path)?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
    info!("Opened database {}", config.db_path);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting incident API...");
            api::serve(&config, pool).await?;
        }
        Command::Inspect => {
            let mut conn = pool.acquire().await?;
            maintenance::run_inspect(&mut conn, &config.db_path, existed).await?;
        }
        Command::Purge => {
            let mut conn = pool.acquire().await?;
            maintenance::run_purge(&mut conn).await?;
        }
    }

    Ok(())
}
