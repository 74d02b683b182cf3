//! Wires the pipeline components together and executes [`Task`]s.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::task::JoinHandle;
use trendeng_collectors::HttpSettings;
use trendeng_core::{AppConfig, PipelineConfig};
use trendeng_shopping::{HasdataClient, HttpConfig, SerperClient, ShoppingSearch};

use crate::store::TriggerSource;
use crate::{
    jobs, Aggregator, CatalogStore, CatalogSync, DetailFetcher, KnownBrandResolver, PgStore,
    PipelineError, ProductEnricher, QueueSettings, RunLedger, Task, TaskDispatcher, TaskHandler,
    TaskQueue, TrendProcessor,
};

pub struct PipelineTaskHandler {
    pub aggregator: Aggregator,
    pub processor: TrendProcessor,
    pub enricher: ProductEnricher,
    pub catalog_sync: CatalogSync,
    pub detail_fetcher: DetailFetcher,
    ledger: Arc<dyn RunLedger>,
    trigger: TriggerSource,
}

impl PipelineTaskHandler {
    /// Builds every component from configuration.
    ///
    /// Trend enrichment searches through Serper; catalog sync and product
    /// detail go through HasData. Missing API keys are not an error here.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a collector or HTTP client cannot be
    /// constructed.
    pub fn from_config(
        app: &AppConfig,
        pipeline: &PipelineConfig,
        store: Arc<dyn CatalogStore>,
        ledger: Arc<dyn RunLedger>,
        dispatcher: Arc<dyn TaskDispatcher>,
        trigger: TriggerSource,
    ) -> Result<Self, PipelineError> {
        let http = HttpConfig::from_app_config(app);
        let serper = Arc::new(SerperClient::new(
            app.serper_api_key.clone(),
            &http,
            app.shopping_result_limit,
        )?);
        let hasdata = Arc::new(HasdataClient::new(app.hasdata_api_key.clone(), &http)?);
        if !serper.is_configured() {
            tracing::warn!("SERPER_API_KEY is not set; trend enrichment will find no products");
        }
        if !hasdata.is_configured() {
            tracing::warn!("HASDATA_API_KEY is not set; catalog sync will find no products");
        }

        let aggregator = Aggregator::from_config(
            pipeline,
            &HttpSettings {
                timeout_secs: app.http_timeout_secs,
                user_agent: app.http_user_agent.clone(),
            },
        )?;

        Ok(Self {
            aggregator,
            processor: TrendProcessor::new(
                Arc::clone(&store),
                Arc::clone(&dispatcher),
                pipeline.category_map(),
            ),
            enricher: ProductEnricher::new(
                Arc::clone(&store),
                serper,
                Arc::new(KnownBrandResolver::from_config(pipeline)),
            ),
            catalog_sync: CatalogSync::new(Arc::clone(&store), Arc::clone(&hasdata) as Arc<dyn ShoppingSearch>, dispatcher),
            detail_fetcher: DetailFetcher::new(store, hasdata),
            ledger,
            trigger,
        })
    }

    #[must_use]
    pub fn ledger(&self) -> &dyn RunLedger {
        self.ledger.as_ref()
    }
}

#[async_trait]
impl TaskHandler for PipelineTaskHandler {
    async fn handle(&self, task: Task) -> Result<(), PipelineError> {
        match task {
            Task::CollectAndProcess { region } => {
                jobs::collect_and_process(
                    &self.aggregator,
                    &self.processor,
                    self.ledger.as_ref(),
                    region,
                    self.trigger,
                )
                .await;
            }
            Task::EnrichTrend { trend_id } => {
                self.enricher.enrich_by_id(trend_id).await?;
            }
            Task::CatalogSync { region } => {
                jobs::catalog_sync(&self.catalog_sync, self.ledger.as_ref(), region, self.trigger)
                    .await?;
            }
            Task::FetchProductDetail {
                item,
                search_query_id,
                region,
            } => {
                self.detail_fetcher
                    .fetch_and_save(&item, search_query_id, region)
                    .await?;
            }
        }
        Ok(())
    }
}

/// A running worker pool backed by Postgres.
pub struct PipelineRuntime {
    pub handler: Arc<PipelineTaskHandler>,
    pub queue: TaskQueue,
    workers: JoinHandle<()>,
}

impl PipelineRuntime {
    /// Builds the handler over `pool` and starts the workers.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the handler cannot be built.
    pub fn start(
        app: &AppConfig,
        pipeline: &PipelineConfig,
        pool: PgPool,
        trigger: TriggerSource,
    ) -> Result<Self, PipelineError> {
        let (queue, worker_pool) = TaskQueue::new(QueueSettings::from_app_config(app));
        let store = Arc::new(PgStore::new(pool));
        let handler = Arc::new(PipelineTaskHandler::from_config(
            app,
            pipeline,
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            store,
            Arc::new(queue.clone()),
            trigger,
        )?);
        let workers = worker_pool.spawn(Arc::clone(&handler) as Arc<dyn TaskHandler>);
        Ok(Self {
            handler,
            queue,
            workers,
        })
    }

    /// Waits for queued work to drain, then stops the workers.
    pub async fn shutdown(self) {
        self.queue.wait_idle().await;
        self.workers.abort();
    }
}
