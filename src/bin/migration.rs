use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use warehouse_api::{config, migrator};

/// Applies or rolls back the warehouse database schema.
#[derive(Parser, Debug)]
#[command(name = "migration", version, about)]
struct Cli {
    /// Database URL; falls back to the configured `database_url`
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply all pending migrations (default)
    Up,
    /// Roll back every applied migration
    Down,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_tracing("info", false);

    let database_url = match cli.database_url {
        Some(url) => url,
        None => config::load_config()?.database_url,
    };

    match cli.command.unwrap_or(Command::Up) {
        Command::Up => migrator::run_migration(&database_url).await?,
        Command::Down => migrator::rollback_migrations(&database_url).await?,
    }

    info!("Migration command finished");
    Ok(())
}
