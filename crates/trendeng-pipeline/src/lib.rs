//! Trend collection, enrichment and catalog sync.
//!
//! Collection runs every configured source through the [`Aggregator`], then
//! the [`TrendProcessor`] persists trends and dispatches one
//! [`Task::EnrichTrend`] per trend. Catalog sync refreshes tracked search
//! queries and dispatches one [`Task::FetchProductDetail`] per result. Both
//! fan-outs go through a [`TaskDispatcher`]; in production that is the
//! in-process [`TaskQueue`].

pub mod aggregator;
pub mod brands;
pub mod catalog_sync;
pub mod detail;
pub mod enricher;
pub mod error;
pub mod handler;
pub mod jobs;
pub mod pg_store;
pub mod processor;
pub mod queue;
pub mod store;
pub mod task;

#[cfg(test)]
mod testing;

pub use aggregator::{Aggregator, SourceBinding};
pub use brands::{BrandResolver, KnownBrandResolver};
pub use catalog_sync::{CatalogSync, SyncSummary};
pub use detail::{build_record, DetailFetcher, DetailOutcome};
pub use enricher::{EnrichOutcome, ProductEnricher};
pub use error::PipelineError;
pub use handler::{PipelineRuntime, PipelineTaskHandler};
pub use pg_store::PgStore;
pub use processor::{ProcessSummary, TrendProcessor};
pub use queue::{QueueSettings, TaskQueue, WorkerPool};
pub use store::{CatalogStore, RunLedger, RunType, TrackedQuery, TriggerSource, Trend};
pub use task::{Task, TaskDispatcher, TaskHandler};
