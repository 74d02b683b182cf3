//! Top-level runs that record a collection-run audit row around the work.

use trendeng_core::Region;

use crate::store::{RunType, TriggerSource};
use crate::{
    Aggregator, CatalogSync, PipelineError, ProcessSummary, RunLedger, SyncSummary,
    TrendProcessor,
};

fn records(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

/// Collects every source for `region` and processes the candidates.
///
/// `records_processed` on the run row is the number of candidates handled.
pub async fn collect_and_process(
    aggregator: &Aggregator,
    processor: &TrendProcessor,
    ledger: &dyn RunLedger,
    region: Region,
    trigger: TriggerSource,
) -> ProcessSummary {
    let run_id = ledger
        .begin_run(RunType::Collect, Some(region), trigger)
        .await;

    let candidates = aggregator.aggregate(region).await;
    let summary = if candidates.is_empty() {
        tracing::info!(%region, "no trend candidates collected");
        ProcessSummary::default()
    } else {
        processor.process(&candidates).await
    };

    if let Some(run_id) = run_id {
        ledger.complete_run(run_id, records(summary.total())).await;
    }
    summary
}

/// Runs a catalog sync for `region`.
///
/// `records_processed` on the run row is the number of queries synced.
///
/// # Errors
///
/// Returns [`PipelineError`] if the sync fails; the run row is marked failed.
pub async fn catalog_sync(
    sync: &CatalogSync,
    ledger: &dyn RunLedger,
    region: Region,
    trigger: TriggerSource,
) -> Result<SyncSummary, PipelineError> {
    let run_id = ledger.begin_run(RunType::Sync, Some(region), trigger).await;

    match sync.sync(region).await {
        Ok(summary) => {
            if let Some(run_id) = run_id {
                ledger
                    .complete_run(run_id, records(summary.queries_synced))
                    .await;
            }
            Ok(summary)
        }
        Err(e) => {
            if let Some(run_id) = run_id {
                ledger.fail_run(run_id, &e.to_string()).await;
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use trendeng_collectors::RawRecord;
    use trendeng_core::{CategoryMap, CollectorKind, SourceConfig};

    use super::*;
    use crate::aggregator::SourceBinding;
    use crate::testing::{InMemoryStore, RecordingDispatcher, StubCollector, StubSearch};
    use crate::{CatalogStore, TaskDispatcher};

    #[tokio::test]
    async fn collect_run_records_candidate_count() {
        let store = Arc::new(InMemoryStore::default());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let aggregator = Aggregator::new(vec![SourceBinding {
            collector: Arc::new(StubCollector::Records(vec![
                RawRecord::Name("Saia Midi".into()),
                RawRecord::Name("Cropped".into()),
            ])),
            config: SourceConfig {
                kind: CollectorKind::StaticPage,
                source: "Shein".into(),
                category: "ready-to-wear".into(),
                region: Some(Region::Br),
                category_label: None,
                path: None,
                base_url: None,
            },
        }]);
        let processor = TrendProcessor::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::clone(&dispatcher) as Arc<dyn TaskDispatcher>,
            CategoryMap::default(),
        );

        let summary = collect_and_process(
            &aggregator,
            &processor,
            store.as_ref(),
            Region::Br,
            TriggerSource::Cli,
        )
        .await;

        assert_eq!(summary.created, 2);
        let runs = store.state.lock().unwrap().runs.clone();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].1, RunType::Collect);
        assert_eq!(runs[0].2, "succeeded");
        assert_eq!(runs[0].3, Some(2));
    }

    #[tokio::test]
    async fn sync_run_records_synced_queries() {
        let store = Arc::new(InMemoryStore::default());
        store.add_query("bolsa", Region::Us);
        let sync = CatalogSync::new(
            Arc::clone(&store) as Arc<dyn CatalogStore>,
            Arc::new(StubSearch::default()),
            Arc::new(RecordingDispatcher::default()),
        );

        let summary = catalog_sync(&sync, store.as_ref(), Region::Us, TriggerSource::Scheduler)
            .await
            .unwrap();

        assert_eq!(summary.queries, 1);
        let runs = store.state.lock().unwrap().runs.clone();
        assert_eq!(runs[0].1, RunType::Sync);
        assert_eq!(runs[0].2, "succeeded");
        assert_eq!(runs[0].3, Some(0));
    }
}
