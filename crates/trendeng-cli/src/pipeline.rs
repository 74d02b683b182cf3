//! Pipeline commands. Each starts an in-process worker pool, runs the
//! top-level job, then drains the tasks it fanned out before exiting.

use sqlx::PgPool;
use trendeng_core::{AppConfig, Region};
use trendeng_pipeline::{jobs, EnrichOutcome, PipelineRuntime, TriggerSource};

fn start_runtime(pool: PgPool, config: &AppConfig) -> anyhow::Result<PipelineRuntime> {
    let pipeline = trendeng_core::load_pipeline_config(&config.pipeline_path)?;
    Ok(PipelineRuntime::start(config, &pipeline, pool, TriggerSource::Cli)?)
}

/// Collects and processes trends for `region`, then waits for every
/// enrichment task the run dispatched.
pub(crate) async fn run_collect(
    pool: PgPool,
    config: &AppConfig,
    region: Region,
) -> anyhow::Result<()> {
    let runtime = start_runtime(pool, config)?;
    let handler = &runtime.handler;

    let summary = jobs::collect_and_process(
        &handler.aggregator,
        &handler.processor,
        handler.ledger(),
        region,
        TriggerSource::Cli,
    )
    .await;
    tracing::info!(%region, pending = runtime.queue.pending(), "waiting for enrichment tasks");
    runtime.shutdown().await;

    println!(
        "{region}: {} new, {} existing, {} skipped, {} failed; {} enrichment task(s) run",
        summary.created, summary.existing, summary.skipped, summary.failed, summary.dispatched
    );
    Ok(())
}

/// Syncs the tracked search queries for `region`, then waits for every
/// product-detail task the sync dispatched.
pub(crate) async fn run_sync(
    pool: PgPool,
    config: &AppConfig,
    region: Region,
) -> anyhow::Result<()> {
    let runtime = start_runtime(pool, config)?;
    let handler = &runtime.handler;

    let result = jobs::catalog_sync(
        &handler.catalog_sync,
        handler.ledger(),
        region,
        TriggerSource::Cli,
    )
    .await;
    runtime.shutdown().await;

    let summary = result?;
    println!(
        "{region}: {}/{} quer(ies) returned items, {} filter(s), {} detail task(s) run",
        summary.queries_synced, summary.queries, summary.filters, summary.dispatched
    );
    Ok(())
}

/// Runs product enrichment for one trend in the foreground.
pub(crate) async fn run_enrich(
    pool: PgPool,
    config: &AppConfig,
    trend_id: i64,
) -> anyhow::Result<()> {
    let runtime = start_runtime(pool, config)?;
    let result = runtime.handler.enricher.enrich_by_id(trend_id).await;
    runtime.shutdown().await;

    match result? {
        EnrichOutcome::TrendNotFound => anyhow::bail!("trend {trend_id} not found"),
        EnrichOutcome::UnsupportedRegion => {
            println!("trend {trend_id}: region not supported by the shopping provider");
        }
        EnrichOutcome::NoResults => println!("trend {trend_id}: no shopping results"),
        EnrichOutcome::Enriched {
            inserted,
            skipped,
            total_products,
        } => println!(
            "trend {trend_id}: {inserted} product(s) linked, {skipped} skipped, {total_products} total"
        ),
    }
    Ok(())
}
