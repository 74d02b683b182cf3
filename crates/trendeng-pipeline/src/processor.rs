//! Persists trend candidates and dispatches enrichment for each of them.

use std::sync::Arc;

use trendeng_core::{CategoryMap, NewTrend, TrendCandidate};

use crate::{CatalogStore, PipelineError, Task, TaskDispatcher};

/// Counts from one [`TrendProcessor::process`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub created: usize,
    pub existing: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Enrichment tasks dispatched; equals `created + existing`.
    pub dispatched: usize,
}

impl ProcessSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.created + self.existing + self.skipped + self.failed
    }
}

enum Processed {
    Created,
    Existing,
    Skipped,
}

pub struct TrendProcessor {
    store: Arc<dyn CatalogStore>,
    dispatcher: Arc<dyn TaskDispatcher>,
    category_map: CategoryMap,
}

impl TrendProcessor {
    #[must_use]
    pub fn new(
        store: Arc<dyn CatalogStore>,
        dispatcher: Arc<dyn TaskDispatcher>,
        category_map: CategoryMap,
    ) -> Self {
        Self {
            store,
            dispatcher,
            category_map,
        }
    }

    /// Creates missing trends and dispatches one [`Task::EnrichTrend`] per
    /// usable candidate, new or already known.
    ///
    /// Each candidate is handled on its own; a skip or a store error is
    /// logged and the batch carries on.
    pub async fn process(&self, candidates: &[TrendCandidate]) -> ProcessSummary {
        let mut summary = ProcessSummary::default();

        for candidate in candidates {
            match self.process_one(candidate).await {
                Ok(Processed::Created) => {
                    summary.created += 1;
                    summary.dispatched += 1;
                }
                Ok(Processed::Existing) => {
                    summary.existing += 1;
                    summary.dispatched += 1;
                }
                Ok(Processed::Skipped) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!(
                        trend = candidate.name.as_deref().unwrap_or_default(),
                        error = %e,
                        "failed to persist trend candidate"
                    );
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            created = summary.created,
            existing = summary.existing,
            skipped = summary.skipped,
            failed = summary.failed,
            "trend processing finished"
        );
        summary
    }

    async fn process_one(&self, candidate: &TrendCandidate) -> Result<Processed, PipelineError> {
        let (Some(name), Some(region), Some(source)) = (
            non_blank(candidate.name.as_deref()),
            non_blank(candidate.region.as_deref()),
            non_blank(candidate.source.as_deref()),
        ) else {
            tracing::warn!(?candidate, "skipping candidate with missing name, region or source");
            return Ok(Processed::Skipped);
        };

        let label = candidate.category.as_deref().unwrap_or_default();
        let Some(slug) = self.category_map.translate(label) else {
            tracing::warn!(
                trend = name,
                category = label,
                map_version = self.category_map.version(),
                "skipping candidate with untranslatable category"
            );
            return Ok(Processed::Skipped);
        };

        let region = region.to_uppercase();
        let existing = self.store.trend_by_name_and_region(name, &region).await?;
        let (trend, outcome) = match existing {
            Some(trend) => (trend, Processed::Existing),
            None => {
                let new = NewTrend {
                    name: name.to_string(),
                    region,
                    category: slug.to_string(),
                    source: source.to_string(),
                    score: candidate.score,
                    description: Some(NewTrend::collected_description(source)),
                    inspiration_images: Vec::new(),
                };
                let trend = self.store.create_trend(&new).await?;
                tracing::debug!(trend_id = trend.id, trend = name, "created trend");
                (trend, Processed::Created)
            }
        };

        // Known trends are re-enriched on every pass.
        self.dispatcher.dispatch(Task::EnrichTrend { trend_id: trend.id });
        Ok(outcome)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "processor_test.rs"]
mod tests;
