use async_trait::async_trait;
use reqwest::Client;
use trendeng_core::Region;

use crate::retry::retry_with_backoff;
use crate::types::{HasdataImmersiveResponse, HasdataShoppingResponse};
use crate::{
    parse_response, region_params, usable_key, HttpConfig, ProductDetail, ProductResult,
    ShoppingError, ShoppingResults, ShoppingSearch,
};

pub const DEFAULT_BASE_URL: &str = "https://api.hasdata.com";
const PROVIDER: &str = "hasdata";

/// HasData Google Shopping and Immersive Product client used by catalog sync.
pub struct HasdataClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl HasdataClient {
    /// # Errors
    ///
    /// Returns [`ShoppingError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: Option<String>, http: &HttpConfig) -> Result<Self, ShoppingError> {
        Ok(Self {
            client: http.build_client()?,
            api_key: usable_key(api_key),
            base_url: DEFAULT_BASE_URL.to_string(),
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

    fn key(&self) -> Result<&str, ShoppingError> {
        self.api_key
            .as_deref()
            .ok_or(ShoppingError::NotConfigured { provider: PROVIDER })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<T, ShoppingError> {
        let api_key = self.key()?;
        let url = format!("{}{path}", self.base_url);
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header("x-api-key", api_key)
                    .query(query)
                    .send()
                    .await?;
                parse_response(PROVIDER, response, context).await
            }
        })
        .await
    }
}

#[async_trait]
impl ShoppingSearch for HasdataClient {
    async fn search(&self, query: &str, region: Region) -> Result<ShoppingResults, ShoppingError> {
        let params = region_params(region);
        let parsed: HasdataShoppingResponse = self
            .get(
                "/scrape/google/shopping",
                &[
                    ("q", query),
                    ("gl", params.gl),
                    ("hl", params.hl),
                    ("domain", params.google_domain),
                ],
                "hasdata shopping",
            )
            .await?;

        tracing::debug!(
            query,
            %region,
            items = parsed.shopping_results.len(),
            filters = parsed.filters.len(),
            "hasdata shopping search"
        );
        Ok(ShoppingResults {
            items: parsed.shopping_results,
            filters: parsed.filters,
        })
    }
}

#[async_trait]
impl ProductDetail for HasdataClient {
    async fn detail(&self, page_token: &str) -> Result<Option<ProductResult>, ShoppingError> {
        let parsed: HasdataImmersiveResponse = self
            .get(
                "/scrape/google/immersive-product",
                &[("pageToken", page_token)],
                "hasdata immersive product",
            )
            .await?;
        Ok(parsed.product_result)
    }
}
