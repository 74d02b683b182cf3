//! Hashtags exported from a social platform's creative center, one text
//! file per category.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{read_lines, CollectError, Collector, Locator, RawRecord};

const SUPPORTED_CATEGORIES: &[&str] = &["APPAREL_ACCESSORIES", "BEAUTY_PERSONAL_CARE"];

/// Reads `<dir>/<category>.txt` (lower-case label) and returns each
/// non-blank trimmed line as a trend name.
pub struct HashtagListCollector {
    dir: PathBuf,
}

impl HashtagListCollector {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Collector for HashtagListCollector {
    fn name(&self) -> &'static str {
        "hashtag_list"
    }

    async fn collect(&self, locator: &Locator) -> Result<Vec<RawRecord>, CollectError> {
        let Locator::Category(label) = locator else {
            return Err(CollectError::UnsupportedLocator {
                collector: self.name(),
                locator: locator.to_string(),
            });
        };

        let label = label.trim().to_uppercase();
        if !SUPPORTED_CATEGORIES.contains(&label.as_str()) {
            tracing::warn!(category = %label, "hashtag category is not supported");
            return Ok(Vec::new());
        }

        let path = self.dir.join(format!("{}.txt", label.to_lowercase()));
        let Some(lines) = read_lines(&path).await? else {
            tracing::warn!(category = %label, path = %path.display(), "hashtag file not found");
            return Ok(Vec::new());
        };

        Ok(lines
            .into_iter()
            .map(|line| RawRecord::Name(line.trim().to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendeng_core::Region;

    #[tokio::test]
    async fn reads_trimmed_lines_for_supported_category() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("beauty_personal_care.txt"),
            "  #glassskin \n\n#cleangirl\n",
        )
        .unwrap();

        let records = HashtagListCollector::new(dir.path())
            .collect(&Locator::Category("beauty_personal_care".to_string()))
            .await
            .unwrap();
        assert_eq!(
            records,
            vec![
                RawRecord::Name("#glassskin".to_string()),
                RawRecord::Name("#cleangirl".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_category_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sports.txt"), "#gym\n").unwrap();
        let records = HashtagListCollector::new(dir.path())
            .collect(&Locator::Category("SPORTS".to_string()))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let records = HashtagListCollector::new(dir.path())
            .collect(&Locator::Category("APPAREL_ACCESSORIES".to_string()))
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn region_locator_is_rejected() {
        let err = HashtagListCollector::new(".")
            .collect(&Locator::Region(Region::Br))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::UnsupportedLocator { .. }));
    }
}
