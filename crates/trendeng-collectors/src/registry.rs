//! Builds collectors and their locators from the pipeline file's `sources`.

use std::sync::Arc;

use trendeng_core::{CollectorKind, Region, SourceConfig};

use crate::{
    CollectError, Collector, HashtagListCollector, Locator, SearchTrendsCollector,
    StaticPageCollector,
};

/// HTTP settings shared by API-backed collectors.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

/// Instantiates the collector described by `source`.
///
/// # Errors
///
/// Returns [`CollectError::Misconfigured`] when a file-backed source has no
/// `path`, or any error raised while constructing the collector.
pub fn build_collector(
    source: &SourceConfig,
    http: &HttpSettings,
) -> Result<Arc<dyn Collector>, CollectError> {
    let require_path = || {
        source
            .path
            .clone()
            .ok_or_else(|| CollectError::Misconfigured {
                source_label: source.source.clone(),
                reason: format!("{} sources need a path", source.kind),
            })
    };

    let collector: Arc<dyn Collector> = match source.kind {
        CollectorKind::SearchTrends => {
            let mut c = SearchTrendsCollector::new(http.timeout_secs, &http.user_agent)?;
            if let Some(base_url) = &source.base_url {
                c = c.with_base_url(base_url.clone());
            }
            Arc::new(c)
        }
        CollectorKind::StaticPage => Arc::new(StaticPageCollector::new(require_path()?)?),
        CollectorKind::HashtagList => Arc::new(HashtagListCollector::new(require_path()?)),
    };
    Ok(collector)
}

/// The locator `source` is invoked with during a run for `run_region`.
#[must_use]
pub fn locator_for(source: &SourceConfig, run_region: Region) -> Locator {
    match source.kind {
        CollectorKind::SearchTrends | CollectorKind::StaticPage => {
            Locator::Region(source.effective_region(run_region))
        }
        CollectorKind::HashtagList => source
            .category_label
            .clone()
            .map_or(Locator::None, Locator::Category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(kind: CollectorKind) -> SourceConfig {
        SourceConfig {
            kind,
            source: "Test".to_string(),
            category: "general".to_string(),
            region: None,
            category_label: None,
            path: None,
            base_url: None,
        }
    }

    fn http() -> HttpSettings {
        HttpSettings {
            timeout_secs: 5,
            user_agent: "trendeng-test/0.1".to_string(),
        }
    }

    #[test]
    fn builds_each_kind() {
        let c = build_collector(&source(CollectorKind::SearchTrends), &http()).unwrap();
        assert_eq!(c.name(), "search_trends");

        let mut page = source(CollectorKind::StaticPage);
        page.path = Some("./data".into());
        assert_eq!(build_collector(&page, &http()).unwrap().name(), "static_page");

        let mut tags = source(CollectorKind::HashtagList);
        tags.path = Some("./data".into());
        assert_eq!(build_collector(&tags, &http()).unwrap().name(), "hashtag_list");
    }

    #[test]
    fn file_backed_source_without_path_is_misconfigured() {
        let result = build_collector(&source(CollectorKind::HashtagList), &http());
        assert!(matches!(result, Err(CollectError::Misconfigured { .. })));
    }

    #[test]
    fn locators_follow_kind() {
        assert_eq!(
            locator_for(&source(CollectorKind::SearchTrends), Region::Us),
            Locator::Region(Region::Us)
        );

        let mut page = source(CollectorKind::StaticPage);
        page.region = Some(Region::Eu);
        assert_eq!(locator_for(&page, Region::Br), Locator::Region(Region::Eu));

        let mut tags = source(CollectorKind::HashtagList);
        tags.category_label = Some("BEAUTY_PERSONAL_CARE".to_string());
        assert_eq!(
            locator_for(&tags, Region::Br),
            Locator::Category("BEAUTY_PERSONAL_CARE".to_string())
        );
    }
}
