//! Refreshes filters for tracked search queries and fans out detail fetches.

use std::sync::Arc;

use trendeng_core::Region;
use trendeng_shopping::ShoppingSearch;

use crate::{CatalogStore, PipelineError, Task, TaskDispatcher};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub queries: usize,
    /// Queries whose search returned at least one item.
    pub queries_synced: usize,
    pub filters: usize,
    pub dispatched: usize,
}

pub struct CatalogSync {
    store: Arc<dyn CatalogStore>,
    search: Arc<dyn ShoppingSearch>,
    dispatcher: Arc<dyn TaskDispatcher>,
}

impl CatalogSync {
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        search: Arc<dyn ShoppingSearch>,
        dispatcher: Arc<dyn TaskDispatcher>,
    ) -> Self {
        Self {
            store,
            search,
            dispatcher,
        }
    }

    /// Searches every active query for `region`, records its filter facets
    /// and dispatches one [`Task::FetchProductDetail`] per result item.
    ///
    /// Detail pages are never fetched here.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if a store operation fails. Search failures
    /// skip the query.
    pub async fn sync(&self, region: Region) -> Result<SyncSummary, PipelineError> {
        let queries = self.store.active_search_queries(region).await?;
        let mut summary = SyncSummary {
            queries: queries.len(),
            ..SyncSummary::default()
        };

        for query in queries {
            let results = match self.search.search(&query.query, region).await {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!(
                        search_query_id = query.id,
                        query = %query.query,
                        error = %e,
                        "catalog search failed; skipping query"
                    );
                    continue;
                }
            };
            if results.is_empty() {
                tracing::info!(search_query_id = query.id, query = %query.query, "no catalog results");
                continue;
            }
            summary.queries_synced += 1;

            for group in &results.filters {
                for option in &group.options {
                    if option.text.trim().is_empty() {
                        continue;
                    }
                    self.store
                        .get_or_create_filter(query.id, &option.text, &group.filter_type)
                        .await?;
                    summary.filters += 1;
                }
            }

            for item in results.items {
                self.dispatcher.dispatch(Task::FetchProductDetail {
                    item,
                    search_query_id: query.id,
                    region,
                });
                summary.dispatched += 1;
            }
        }

        tracing::info!(
            %region,
            queries = summary.queries,
            synced = summary.queries_synced,
            filters = summary.filters,
            dispatched = summary.dispatched,
            "catalog sync finished"
        );
        Ok(summary)
    }
}
