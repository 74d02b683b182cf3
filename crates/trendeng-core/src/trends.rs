//! Trend candidate and insert types.

use serde::{Deserialize, Serialize};

/// A trend observation as produced by the aggregator, before validation.
///
/// Fields are optional because collectors return loosely-shaped records;
/// the processor decides whether a candidate is usable. `category` holds the
/// source's own vocabulary label, untranslated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendCandidate {
    pub name: Option<String>,
    pub region: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub score: i64,
}

impl TrendCandidate {
    /// Builds a fully-populated candidate.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        region: impl Into<String>,
        source: impl Into<String>,
        category: impl Into<String>,
        score: i64,
    ) -> Self {
        Self {
            name: Some(name.into()),
            region: Some(region.into()),
            source: Some(source.into()),
            category: Some(category.into()),
            score,
        }
    }
}

/// Insert payload for the `trends` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrend {
    pub name: String,
    /// Upper-case region code. Free text is tolerated for legacy rows.
    pub region: String,
    /// Canonical category slug.
    pub category: String,
    pub source: String,
    pub score: i64,
    pub description: Option<String>,
    pub inspiration_images: Vec<String>,
}

impl NewTrend {
    /// Description attached to trends created by the collection pipeline.
    #[must_use]
    pub fn collected_description(source: &str) -> String {
        format!("Trend collected from source: {source}.")
    }
}
