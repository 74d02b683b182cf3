//! Rising related queries from the Google Trends web API.
//!
//! Two calls per collection: `explore` returns the widget descriptors for a
//! keyword/category/timeframe/geo tuple; the `RELATED_QUERIES` widget's
//! request and token are then replayed against `widgetdata/relatedsearches`.
//! Both bodies start with an anti-XSSI prefix that must be stripped before
//! the JSON can be parsed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{CollectError, Collector, Locator, RawRecord};

pub const DEFAULT_BASE_URL: &str = "https://trends.google.com";

const KEYWORD: &str = "fashion";
/// Google Trends category id for "Beauty & Fitness > Fashion & Style".
const FASHION_CATEGORY: u32 = 14;
const TIMEFRAME: &str = "today 1-m";
const HOST_LANGUAGE: &str = "en-US";
const TZ_OFFSET_MINUTES: &str = "360";
const RELATED_QUERIES_WIDGET: &str = "RELATED_QUERIES";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    #[serde(default)]
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RelatedSearchesResponse {
    default: RankedLists,
}

#[derive(Debug, Deserialize)]
struct RankedLists {
    #[serde(rename = "rankedList", default)]
    ranked_list: Vec<RankedList>,
}

#[derive(Debug, Deserialize)]
struct RankedList {
    #[serde(rename = "rankedKeyword", default)]
    ranked_keyword: Vec<RankedKeyword>,
}

#[derive(Debug, Deserialize)]
struct RankedKeyword {
    query: Option<String>,
    value: Option<i64>,
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

pub struct SearchTrendsCollector {
    client: Client,
    base_url: String,
}

impl SearchTrendsCollector {
    /// # Errors
    ///
    /// Returns [`CollectError::Http`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CollectError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the collector at another host (tests use a mock server).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, CollectError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CollectError::RateLimited {
                host: self.base_url.clone(),
                retry_after_secs,
            });
        }
        if !status.is_success() {
            return Err(CollectError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(strip_xssi_prefix(&body)).map_err(|e| {
            CollectError::Deserialize {
                context: context.to_string(),
                source: e,
            }
        })
    }

    async fn rising_queries(&self, geo: &str) -> Result<Vec<RawRecord>, CollectError> {
        let explore_url = format!("{}/trends/api/explore", self.base_url);
        let explore_req = json!({
            "comparisonItem": [{ "keyword": KEYWORD, "time": TIMEFRAME, "geo": geo }],
            "category": FASHION_CATEGORY,
            "property": "",
        })
        .to_string();

        let explore: ExploreResponse = self
            .get_json(
                &explore_url,
                &[
                    ("hl", HOST_LANGUAGE),
                    ("tz", TZ_OFFSET_MINUTES),
                    ("req", &explore_req),
                ],
                "trends explore",
            )
            .await?;

        let widget = explore
            .widgets
            .into_iter()
            .find(|w| w.id.starts_with(RELATED_QUERIES_WIDGET))
            .ok_or_else(|| CollectError::MissingWidget {
                url: explore_url.clone(),
                widget: RELATED_QUERIES_WIDGET,
            })?;
        let (Some(token), Some(request)) = (widget.token, widget.request) else {
            return Err(CollectError::MissingWidget {
                url: explore_url,
                widget: RELATED_QUERIES_WIDGET,
            });
        };

        let related_url = format!("{}/trends/api/widgetdata/relatedsearches", self.base_url);
        let request = request.to_string();
        let related: RelatedSearchesResponse = self
            .get_json(
                &related_url,
                &[
                    ("hl", HOST_LANGUAGE),
                    ("tz", TZ_OFFSET_MINUTES),
                    ("req", &request),
                    ("token", &token),
                ],
                "trends related searches",
            )
            .await?;

        // rankedList[0] is "top", rankedList[1] is "rising".
        let rising = related
            .default
            .ranked_list
            .into_iter()
            .nth(1)
            .map(|list| list.ranked_keyword)
            .unwrap_or_default();

        Ok(rising
            .into_iter()
            .map(|kw| RawRecord::Weighted {
                name: kw.query,
                value: kw.value,
            })
            .collect())
    }
}

#[async_trait]
impl Collector for SearchTrendsCollector {
    fn name(&self) -> &'static str {
        "search_trends"
    }

    async fn collect(&self, locator: &Locator) -> Result<Vec<RawRecord>, CollectError> {
        let Locator::Region(region) = locator else {
            return Err(CollectError::UnsupportedLocator {
                collector: self.name(),
                locator: locator.to_string(),
            });
        };

        let records = self.rising_queries(region.as_str()).await?;
        if records.is_empty() {
            tracing::info!(%region, "no rising search trends for region");
        }
        Ok(records)
    }
}

/// Drops the `)]}'` guard (and the `,` that follows it on widget responses).
fn strip_xssi_prefix(body: &str) -> &str {
    body.trim_start()
        .trim_start_matches(")]}'")
        .trim_start_matches(',')
        .trim_start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_both_prefix_shapes() {
        assert_eq!(strip_xssi_prefix(")]}'\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_xssi_prefix(")]}',\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_xssi_prefix("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn ranked_keyword_tolerates_missing_fields() {
        let parsed: RankedKeyword = serde_json::from_str(r#"{"formattedValue":"Breakout"}"#).unwrap();
        assert!(parsed.query.is_none());
        assert!(parsed.value.is_none());
    }
}
