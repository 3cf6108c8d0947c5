mod pipeline;
mod revenue;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::pipeline::PipelineCommands;
use crate::revenue::RevenueCommands;

#[derive(Debug, Parser)]
#[command(name = "agencydb-cli")]
#[command(about = "Agency CRM operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Proposal pipeline operations
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Revenue ledger reconciliation
    Revenue {
        #[command(subcommand)]
        command: RevenueCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("agencydb-cli: pass --help to list commands");
        return Ok(());
    };

    let config = agencydb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool = agencydb_db::connect_pool_from_config(&config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            agencydb_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = agencydb_db::run_migrations(&pool).await?;
            println!("migrations applied: {applied}");
        }
        Commands::Pipeline { command } => {
            let store = agencydb_db::PgStore::new(pool);
            pipeline::run(&store, command).await?;
        }
        Commands::Revenue { command } => {
            let store = agencydb_db::PgStore::new(pool);
            revenue::run(&store, command).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
