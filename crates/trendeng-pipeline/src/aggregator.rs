//! Runs every configured source for a region and flattens the results into
//! [`TrendCandidate`]s.

use std::sync::Arc;

use trendeng_collectors::{build_collector, locator_for, Collector, HttpSettings, RawRecord};
use trendeng_core::{PipelineConfig, Region, SourceConfig, TrendCandidate};

use crate::PipelineError;

/// A collector paired with the source entry it was built from.
pub struct SourceBinding {
    pub collector: Arc<dyn Collector>,
    pub config: SourceConfig,
}

pub struct Aggregator {
    sources: Vec<SourceBinding>,
}

impl Aggregator {
    #[must_use]
    pub fn new(sources: Vec<SourceBinding>) -> Self {
        Self { sources }
    }

    /// Builds one collector per `sources` entry.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Collector`] if any collector cannot be
    /// constructed.
    pub fn from_config(config: &PipelineConfig, http: &HttpSettings) -> Result<Self, PipelineError> {
        let sources = config
            .sources
            .iter()
            .map(|source| {
                Ok(SourceBinding {
                    collector: build_collector(source, http)?,
                    config: source.clone(),
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;
        Ok(Self::new(sources))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Collects candidates for `region`.
    ///
    /// Sources bound to another region are skipped. A failing source is
    /// logged and skipped; it never aborts the batch.
    pub async fn aggregate(&self, region: Region) -> Vec<TrendCandidate> {
        let mut candidates = Vec::new();

        for binding in &self.sources {
            let source = &binding.config;
            let source_region = source.effective_region(region);
            if source_region != region {
                tracing::debug!(
                    source = %source.source,
                    source_region = %source_region,
                    %region,
                    "skipping source bound to another region"
                );
                continue;
            }

            let locator = locator_for(source, region);
            let records = match binding.collector.collect(&locator).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(
                        source = %source.source,
                        collector = binding.collector.name(),
                        %locator,
                        error = %e,
                        "collector failed; continuing with remaining sources"
                    );
                    continue;
                }
            };

            if records.is_empty() {
                tracing::info!(source = %source.source, %locator, "collector returned no data");
                continue;
            }

            tracing::debug!(source = %source.source, records = records.len(), "collected records");
            candidates.extend(
                records
                    .into_iter()
                    .map(|record| to_candidate(record, source_region, source)),
            );
        }

        tracing::info!(%region, candidates = candidates.len(), "aggregation finished");
        candidates
    }
}

fn to_candidate(record: RawRecord, region: Region, source: &SourceConfig) -> TrendCandidate {
    let (name, score) = match record {
        RawRecord::Name(name) => (Some(name), 0),
        RawRecord::Weighted { name, value } => (name, value.unwrap_or(0)),
    };
    TrendCandidate {
        name,
        region: Some(region.as_str().to_uppercase()),
        source: Some(source.source.clone()),
        category: Some(source.category.clone()),
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubCollector;
    use trendeng_core::CollectorKind;

    fn source(kind: CollectorKind, name: &str, category: &str, region: Option<Region>) -> SourceConfig {
        SourceConfig {
            kind,
            source: name.to_string(),
            category: category.to_string(),
            region,
            category_label: Some("APPAREL_ACCESSORIES".to_string()),
            path: None,
            base_url: None,
        }
    }

    fn bind(collector: StubCollector, config: SourceConfig) -> SourceBinding {
        SourceBinding {
            collector: Arc::new(collector),
            config,
        }
    }

    #[tokio::test]
    async fn maps_both_record_shapes() {
        let aggregator = Aggregator::new(vec![
            bind(
                StubCollector::Records(vec![RawRecord::Name("Saia Midi".into())]),
                source(CollectorKind::StaticPage, "Shein", "ready-to-wear", None),
            ),
            bind(
                StubCollector::Records(vec![
                    RawRecord::Weighted {
                        name: Some("calça cargo".into()),
                        value: Some(250),
                    },
                    RawRecord::Weighted {
                        name: Some("mom jeans".into()),
                        value: None,
                    },
                ]),
                source(CollectorKind::SearchTrends, "GoogleTrends", "general", None),
            ),
        ]);

        let candidates = aggregator.aggregate(Region::Eu).await;
        assert_eq!(
            candidates,
            vec![
                TrendCandidate::new("Saia Midi", "EU", "Shein", "ready-to-wear", 0),
                TrendCandidate::new("calça cargo", "EU", "GoogleTrends", "general", 250),
                TrendCandidate::new("mom jeans", "EU", "GoogleTrends", "general", 0),
            ]
        );
    }

    #[tokio::test]
    async fn skips_sources_bound_to_other_regions() {
        let aggregator = Aggregator::new(vec![
            bind(
                StubCollector::Records(vec![RawRecord::Name("Shein BR".into())]),
                source(CollectorKind::StaticPage, "Shein", "ready-to-wear", Some(Region::Br)),
            ),
            // Hashtag sources default to BR.
            bind(
                StubCollector::Records(vec![RawRecord::Name("#y2k".into())]),
                source(CollectorKind::HashtagList, "TikTok", "ready-to-wear", None),
            ),
        ]);

        assert!(aggregator.aggregate(Region::Us).await.is_empty());
        assert_eq!(aggregator.aggregate(Region::Br).await.len(), 2);
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_batch() {
        let aggregator = Aggregator::new(vec![
            bind(
                StubCollector::Failing,
                source(CollectorKind::SearchTrends, "GoogleTrends", "general", None),
            ),
            bind(
                StubCollector::Records(vec![]),
                source(CollectorKind::StaticPage, "Empty", "general", None),
            ),
            bind(
                StubCollector::Records(vec![RawRecord::Name("Tricô".into())]),
                source(CollectorKind::StaticPage, "Shein", "ready-to-wear", None),
            ),
        ]);

        let candidates = aggregator.aggregate(Region::Br).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name.as_deref(), Some("Tricô"));
    }

    #[test]
    fn builds_from_pipeline_file_sources() {
        let dir = tempfile::tempdir().unwrap();
        let mut page = source(CollectorKind::StaticPage, "Shein", "ready-to-wear", None);
        page.path = Some(dir.path().to_path_buf());
        let config = PipelineConfig {
            sources: vec![
                source(CollectorKind::SearchTrends, "GoogleTrends", "general", None),
                page,
            ],
            ..PipelineConfig::default()
        };
        let http = HttpSettings {
            timeout_secs: 5,
            user_agent: "trendeng-test/0.1".to_string(),
        };
        assert_eq!(Aggregator::from_config(&config, &http).unwrap().len(), 2);
    }
}
