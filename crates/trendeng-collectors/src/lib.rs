//! Trend-signal collectors.
//!
//! Every source implements [`Collector`]: given a [`Locator`] it returns zero
//! or more [`RawRecord`]s, or a [`CollectError`]. Callers isolate failures
//! per collector; nothing here aborts a batch.

pub mod error;
pub mod hashtag_list;
pub mod registry;
pub mod search_trends;
pub mod static_page;

use std::fmt;

use async_trait::async_trait;
use trendeng_core::Region;

pub use error::CollectError;
pub use hashtag_list::HashtagListCollector;
pub use registry::{build_collector, locator_for, HttpSettings};
pub use search_trends::SearchTrendsCollector;
pub use static_page::StaticPageCollector;

/// What a collector is pointed at for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Region(Region),
    Category(String),
    None,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Region(region) => write!(f, "region {region}"),
            Locator::Category(label) => write!(f, "category {label}"),
            Locator::None => write!(f, "no locator"),
        }
    }
}

/// A source-shaped record, before aggregation into a trend candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRecord {
    /// A bare trend name.
    Name(String),
    /// A named observation with a numeric weight; either may be absent.
    Weighted {
        name: Option<String>,
        value: Option<i64>,
    },
}

#[async_trait]
pub trait Collector: Send + Sync {
    /// Short, stable identifier used in logs.
    fn name(&self) -> &'static str;

    /// Produce raw records for `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] when the source cannot be read or the
    /// locator does not apply to this collector.
    async fn collect(&self, locator: &Locator) -> Result<Vec<RawRecord>, CollectError>;
}

/// Reads non-blank lines from `path`, treating a missing file as empty.
pub(crate) async fn read_lines(path: &std::path::Path) -> Result<Option<Vec<String>>, CollectError> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(
            content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_owned)
                .collect(),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CollectError::Io {
            path: path.display().to_string(),
            source: e,
        }),
    }
}
