use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use trendeng_core::Region;

use crate::retry::retry_with_backoff;
use crate::types::SerperShoppingResponse;
use crate::{
    parse_response, region_params, usable_key, HttpConfig, ShoppingError, ShoppingResults,
    ShoppingSearch,
};

pub const DEFAULT_BASE_URL: &str = "https://google.serper.dev";
const PROVIDER: &str = "serper";

/// Serper Google Shopping client used for trend enrichment.
///
/// Serper returns no facet groups, so `filters` is always empty.
pub struct SerperClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    result_limit: u32,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl SerperClient {
    /// A client without a key is valid; every search then fails with
    /// [`ShoppingError::NotConfigured`] before touching the network.
    ///
    /// # Errors
    ///
    /// Returns [`ShoppingError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: Option<String>,
        http: &HttpConfig,
        result_limit: u32,
    ) -> Result<Self, ShoppingError> {
        Ok(Self {
            client: http.build_client()?,
            api_key: usable_key(api_key),
            base_url: DEFAULT_BASE_URL.to_string(),
            result_limit,
            max_retries: http.max_retries,
            backoff_base_secs: http.backoff_base_secs,
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ShoppingSearch for SerperClient {
    async fn search(&self, query: &str, region: Region) -> Result<ShoppingResults, ShoppingError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ShoppingError::NotConfigured { provider: PROVIDER });
        };

        let params = region_params(region);
        let url = format!("{}/shopping", self.base_url);
        let body = json!({
            "q": query,
            "num": self.result_limit,
            "gl": params.gl,
            "hl": params.hl,
            "google_domain": params.google_domain,
        });

        let parsed: SerperShoppingResponse =
            retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
                let url = url.clone();
                let body = body.clone();
                async move {
                    let response = self
                        .client
                        .post(&url)
                        .header("X-API-KEY", api_key)
                        .json(&body)
                        .send()
                        .await?;
                    parse_response(PROVIDER, response, "serper shopping").await
                }
            })
            .await?;

        tracing::debug!(query, %region, items = parsed.shopping.len(), "serper shopping search");
        Ok(ShoppingResults {
            items: parsed.shopping,
            filters: Vec::new(),
        })
    }
}
