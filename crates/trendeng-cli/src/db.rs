//! `db` subcommands: connectivity check, migrations and seeding.

use clap::Subcommand;
use sqlx::PgPool;
use trendeng_core::AppConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Seed the category tree and tracked search queries from the pipeline file
    Seed,
}

pub(crate) async fn run_db_ping(pool: &PgPool) -> anyhow::Result<()> {
    trendeng_db::health_check(pool).await?;
    println!("database: ok");
    Ok(())
}

pub(crate) async fn run_db_migrate(pool: &PgPool) -> anyhow::Result<()> {
    let applied = trendeng_db::run_migrations(pool).await?;
    tracing::info!(applied, "migrations complete");
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Upserts categories and registers search queries from the pipeline file.
///
/// Migrations are applied first so a fresh database can be seeded in one step.
///
/// # Errors
///
/// Returns an error if the pipeline file is invalid or any write fails.
pub(crate) async fn run_db_seed(pool: &PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let pipeline = trendeng_core::load_pipeline_config(&config.pipeline_path)?;
    trendeng_db::run_migrations(pool).await?;

    let categories = trendeng_db::seed_categories(pool, &pipeline.categories).await?;
    let queries = trendeng_db::seed_search_queries(pool, &pipeline.search_queries).await?;

    tracing::info!(
        categories,
        queries,
        path = %config.pipeline_path.display(),
        "seed complete"
    );
    println!("seeded {categories} categor(ies) and {queries} search quer(ies)");
    Ok(())
}
