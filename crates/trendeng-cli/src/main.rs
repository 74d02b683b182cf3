mod db;
mod pipeline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trendeng_core::Region;

use crate::db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "trendeng-cli")]
#[command(about = "Trend engine command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Collect trends for a region, then enrich them with products
    Collect {
        /// Region to collect for (BR, US or EU)
        #[arg(long, default_value = "BR")]
        region: Region,
    },
    /// Sync the tracked search-query catalog for a region
    Sync {
        /// Region to sync (BR, US or EU)
        #[arg(long, default_value = "BR")]
        region: Region,
    },
    /// Re-run product enrichment for one trend
    Enrich {
        /// Trend id to enrich
        #[arg(long)]
        trend_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("trendeng-cli: no command given; see --help");
        return Ok(());
    };

    let config = trendeng_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendeng_db::PoolConfig::from_app_config(&config);
    let pool = trendeng_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_db_ping(&pool).await,
            DbCommands::Migrate => db::run_db_migrate(&pool).await,
            DbCommands::Seed => db::run_db_seed(&pool, &config).await,
        },
        Commands::Collect { region } => pipeline::run_collect(pool, &config, region).await,
        Commands::Sync { region } => pipeline::run_sync(pool, &config, region).await,
        Commands::Enrich { trend_id } => pipeline::run_enrich(pool, &config, trend_id).await,
    }
}
