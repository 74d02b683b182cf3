use super::*;
use crate::testing::{InMemoryStore, RecordingDispatcher};

fn processor(store: &Arc<InMemoryStore>, dispatcher: &Arc<RecordingDispatcher>) -> TrendProcessor {
    TrendProcessor::new(
        Arc::clone(store) as Arc<dyn CatalogStore>,
        Arc::clone(dispatcher) as Arc<dyn TaskDispatcher>,
        CategoryMap::default(),
    )
}

fn setup() -> (Arc<InMemoryStore>, Arc<RecordingDispatcher>) {
    (
        Arc::new(InMemoryStore::default()),
        Arc::new(RecordingDispatcher::default()),
    )
}

#[tokio::test]
async fn creates_trend_with_translated_category_and_upper_region() {
    let (store, dispatcher) = setup();
    let candidate = TrendCandidate::new("Cargo Pants", "br", "TikTok", "APPAREL_ACCESSORIES", 5);

    let summary = processor(&store, &dispatcher).process(&[candidate]).await;

    assert_eq!(summary.created, 1);
    let trends = store.trends();
    assert_eq!(trends.len(), 1);
    let trend = &trends[0];
    assert_eq!(trend.name, "Cargo Pants");
    assert_eq!(trend.region, "BR");
    assert_eq!(trend.category, "acessorios");
    assert_eq!(trend.score, 5);
    assert_eq!(
        dispatcher.tasks(),
        vec![Task::EnrichTrend { trend_id: trend.id }]
    );
}

#[tokio::test]
async fn unknown_category_is_skipped_and_batch_continues() {
    let (store, dispatcher) = setup();
    let candidates = [
        TrendCandidate::new("Mystery", "BR", "TikTok", "UNKNOWN_LABEL", 1),
        TrendCandidate::new("Blush", "BR", "TikTok", "BEAUTY_PERSONAL_CARE", 0),
    ];

    let summary = processor(&store, &dispatcher).process(&candidates).await;

    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.created, 1);
    let trends = store.trends();
    assert_eq!(trends.len(), 1);
    assert_eq!(trends[0].name, "Blush");
    assert_eq!(trends[0].category, "beleza");
    assert_eq!(dispatcher.tasks().len(), 1);
}

#[tokio::test]
async fn candidates_missing_required_fields_are_skipped() {
    let (store, dispatcher) = setup();
    let complete = TrendCandidate::new("Linho", "BR", "Shein", "ready-to-wear", 0);
    let mut no_name = complete.clone();
    no_name.name = None;
    let mut blank_region = complete.clone();
    blank_region.region = Some("  ".to_string());
    let mut no_source = complete.clone();
    no_source.source = None;
    let mut no_category = complete;
    no_category.category = None;

    let summary = processor(&store, &dispatcher)
        .process(&[no_name, blank_region, no_source, no_category])
        .await;

    assert_eq!(summary.skipped, 4);
    assert_eq!(summary.total(), 4);
    assert!(store.trends().is_empty());
    assert!(dispatcher.tasks().is_empty());
}

#[tokio::test]
async fn existing_trend_is_reused_but_enrichment_is_dispatched_again() {
    let (store, dispatcher) = setup();
    let candidate = TrendCandidate::new("Cargo Pants", "br", "TikTok", "APPAREL_ACCESSORIES", 5);
    let processor = processor(&store, &dispatcher);

    let first = processor.process(std::slice::from_ref(&candidate)).await;
    let second = processor.process(std::slice::from_ref(&candidate)).await;

    assert_eq!(first.created, 1);
    assert_eq!(second.existing, 1);
    assert_eq!(store.trends().len(), 1);

    let id = store.trends()[0].id;
    assert_eq!(
        dispatcher.tasks(),
        vec![
            Task::EnrichTrend { trend_id: id },
            Task::EnrichTrend { trend_id: id }
        ]
    );
}

#[tokio::test]
async fn region_lookup_ignores_case_of_stored_trend() {
    let (store, dispatcher) = setup();
    let legacy = store.add_trend("Tricô", "br", "ready-to-wear");

    let summary = processor(&store, &dispatcher)
        .process(&[TrendCandidate::new("Tricô", "BR", "Shein", "ready-to-wear", 0)])
        .await;

    assert_eq!(summary.existing, 1);
    assert_eq!(dispatcher.tasks(), vec![Task::EnrichTrend { trend_id: legacy.id }]);
}
