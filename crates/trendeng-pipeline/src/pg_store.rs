//! Postgres-backed [`CatalogStore`] and [`RunLedger`].

use async_trait::async_trait;
use sqlx::PgPool;
use trendeng_core::{CatalogProductRecord, NewTrend, NewTrendProduct, Region};
use trendeng_db::{SearchQueryRow, TrendRow};

use crate::store::{RunType, TriggerSource};
use crate::{CatalogStore, PipelineError, RunLedger, TrackedQuery, Trend};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<TrendRow> for Trend {
    fn from(row: TrendRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            region: row.region,
            category: row.category,
            source: row.source,
            score: row.score,
        }
    }
}

fn tracked_query(row: SearchQueryRow) -> Option<TrackedQuery> {
    match row.region.parse::<Region>() {
        Ok(region) => Some(TrackedQuery {
            id: row.id,
            query: row.query,
            category: row.category,
            region,
        }),
        Err(e) => {
            tracing::warn!(search_query_id = row.id, error = %e, "ignoring search query with unknown region");
            None
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn trend_by_id(&self, id: i64) -> Result<Option<Trend>, PipelineError> {
        Ok(trendeng_db::get_trend_by_id(&self.pool, id)
            .await?
            .map(Trend::from))
    }

    async fn trend_by_name_and_region(
        &self,
        name: &str,
        region: &str,
    ) -> Result<Option<Trend>, PipelineError> {
        Ok(
            trendeng_db::get_trend_by_name_and_region(&self.pool, name, region)
                .await?
                .map(Trend::from),
        )
    }

    async fn create_trend(&self, trend: &NewTrend) -> Result<Trend, PipelineError> {
        Ok(trendeng_db::insert_trend(&self.pool, trend).await?.into())
    }

    async fn category_id_by_slug(&self, slug: &str) -> Result<Option<i64>, PipelineError> {
        Ok(trendeng_db::get_category_id_by_slug(&self.pool, slug).await?)
    }

    async fn get_or_create_store(&self, name: &str) -> Result<i64, PipelineError> {
        Ok(trendeng_db::get_or_create_store(&self.pool, name).await?.id)
    }

    async fn get_or_create_brand(&self, name: &str) -> Result<i64, PipelineError> {
        Ok(trendeng_db::get_or_create_brand(&self.pool, name).await?.id)
    }

    async fn create_trend_product(
        &self,
        trend_id: i64,
        category_id: Option<i64>,
        product: &NewTrendProduct,
    ) -> Result<i64, PipelineError> {
        Ok(
            trendeng_db::create_trend_product(&self.pool, trend_id, category_id, product)
                .await?,
        )
    }

    async fn count_trend_products(&self, trend_id: i64) -> Result<i64, PipelineError> {
        Ok(trendeng_db::count_trend_products(&self.pool, trend_id).await?)
    }

    async fn active_search_queries(
        &self,
        region: Region,
    ) -> Result<Vec<TrackedQuery>, PipelineError> {
        let rows = trendeng_db::list_active_search_queries(&self.pool, region).await?;
        Ok(rows.into_iter().filter_map(tracked_query).collect())
    }

    async fn get_or_create_filter(
        &self,
        search_query_id: i64,
        name: &str,
        filter_type: &str,
    ) -> Result<i64, PipelineError> {
        Ok(
            trendeng_db::get_or_create_filter(&self.pool, search_query_id, name, filter_type)
                .await?
                .id,
        )
    }

    async fn upsert_catalog_product(
        &self,
        record: &CatalogProductRecord,
    ) -> Result<i64, PipelineError> {
        Ok(trendeng_db::upsert_catalog_product(&self.pool, record).await?)
    }
}

#[async_trait]
impl RunLedger for PgStore {
    async fn begin_run(
        &self,
        run_type: RunType,
        region: Option<Region>,
        trigger: TriggerSource,
    ) -> Option<i64> {
        let run = match trendeng_db::create_collection_run(
            &self.pool,
            run_type.as_str(),
            region.map(Region::as_str),
            trigger.as_str(),
        )
        .await
        {
            Ok(run) => run,
            Err(e) => {
                tracing::error!(run_type = run_type.as_str(), error = %e, "failed to create collection run");
                return None;
            }
        };

        if let Err(e) = trendeng_db::start_collection_run(&self.pool, run.id).await {
            tracing::error!(run_id = run.id, error = %e, "failed to start collection run");
            return None;
        }
        Some(run.id)
    }

    async fn complete_run(&self, run_id: i64, records_processed: i32) {
        if let Err(e) =
            trendeng_db::complete_collection_run(&self.pool, run_id, records_processed).await
        {
            tracing::error!(run_id, error = %e, "failed to complete collection run");
        }
    }

    async fn fail_run(&self, run_id: i64, message: &str) {
        if let Err(e) = trendeng_db::fail_collection_run(&self.pool, run_id, message).await {
            tracing::error!(run_id, error = %e, "failed to mark collection run failed");
        }
    }
}
