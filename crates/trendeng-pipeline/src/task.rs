//! Work items and the dispatch boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use trendeng_core::Region;
use trendeng_shopping::ShoppingItem;

use crate::PipelineError;

/// A self-contained unit of work. Delivery is at-least-once, so every
/// variant states what happens when it runs twice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum Task {
    /// Collect every source for `region` and process the candidates.
    /// Not idempotent: each run re-dispatches enrichment for every trend seen.
    CollectAndProcess { region: Region },
    /// Attach shopping products to one trend.
    /// Not idempotent: a second run inserts a second set of products.
    EnrichTrend { trend_id: i64 },
    /// Refresh filters for every active search query in `region` and fan out
    /// detail fetches. Filters are deduplicated; fan-out repeats.
    CatalogSync { region: Region },
    /// Resolve one shopping result to a catalog product.
    /// Idempotent: the write is an upsert on the external product id.
    FetchProductDetail {
        item: ShoppingItem,
        search_query_id: i64,
        region: Region,
    },
}

impl Task {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Task::CollectAndProcess { .. } => "collect_and_process",
            Task::EnrichTrend { .. } => "enrich_trend",
            Task::CatalogSync { .. } => "catalog_sync",
            Task::FetchProductDetail { .. } => "fetch_product_detail",
        }
    }

    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        matches!(self, Task::FetchProductDetail { .. })
    }
}

/// Fire-and-forget hand-off. The caller never observes the outcome.
pub trait TaskDispatcher: Send + Sync {
    fn dispatch(&self, task: Task);
}

/// Executes one delivery of a task. `Err` asks for redelivery.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: Task) -> Result<(), PipelineError>;
}
