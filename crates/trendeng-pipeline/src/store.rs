//! Persistence seams used by the pipeline.
//!
//! [`CatalogStore`] is everything a work item reads or writes. [`RunLedger`]
//! records collection-run audit rows and never fails the caller.

use async_trait::async_trait;
use trendeng_core::{CatalogProductRecord, NewTrend, NewTrendProduct, Region};

use crate::PipelineError;

/// A persisted trend, as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    pub id: i64,
    pub name: String,
    /// Upper-case region code.
    pub region: String,
    /// Canonical category slug.
    pub category: String,
    pub source: String,
    pub score: i64,
}

/// An active tracked search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedQuery {
    pub id: i64,
    pub query: String,
    pub category: String,
    pub region: Region,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn trend_by_id(&self, id: i64) -> Result<Option<Trend>, PipelineError>;

    /// `region` is compared case-insensitively.
    async fn trend_by_name_and_region(
        &self,
        name: &str,
        region: &str,
    ) -> Result<Option<Trend>, PipelineError>;

    async fn create_trend(&self, trend: &NewTrend) -> Result<Trend, PipelineError>;

    async fn category_id_by_slug(&self, slug: &str) -> Result<Option<i64>, PipelineError>;

    /// Never creates a second row for the same name.
    async fn get_or_create_store(&self, name: &str) -> Result<i64, PipelineError>;

    /// Never creates a second row for the same name.
    async fn get_or_create_brand(&self, name: &str) -> Result<i64, PipelineError>;

    /// Inserts the product and links it to the trend and, when given, the
    /// category. All three writes succeed together or not at all.
    async fn create_trend_product(
        &self,
        trend_id: i64,
        category_id: Option<i64>,
        product: &NewTrendProduct,
    ) -> Result<i64, PipelineError>;

    async fn count_trend_products(&self, trend_id: i64) -> Result<i64, PipelineError>;

    async fn active_search_queries(&self, region: Region)
        -> Result<Vec<TrackedQuery>, PipelineError>;

    async fn get_or_create_filter(
        &self,
        search_query_id: i64,
        name: &str,
        filter_type: &str,
    ) -> Result<i64, PipelineError>;

    /// Insert-or-merge keyed on `external_id`.
    async fn upsert_catalog_product(
        &self,
        record: &CatalogProductRecord,
    ) -> Result<i64, PipelineError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunType {
    Collect,
    Sync,
}

impl RunType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RunType::Collect => "collect",
            RunType::Sync => "sync",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerSource {
    Cli,
    Scheduler,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TriggerSource::Cli => "cli",
            TriggerSource::Scheduler => "scheduler",
        }
    }
}

/// Best-effort audit trail for collect and sync runs.
///
/// Implementations log their own failures; a broken ledger must not stop a
/// run.
#[async_trait]
pub trait RunLedger: Send + Sync {
    /// Creates and starts a run. `None` means nothing was recorded.
    async fn begin_run(
        &self,
        run_type: RunType,
        region: Option<Region>,
        trigger: TriggerSource,
    ) -> Option<i64>;

    async fn complete_run(&self, run_id: i64, records_processed: i32);

    async fn fail_run(&self, run_id: i64, message: &str);
}
