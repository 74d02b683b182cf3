//! Shopping-search and immersive product-detail clients.
//!
//! Two providers are wrapped: Serper (trend enrichment) and HasData (catalog
//! sync and product detail). Both sit behind the [`ShoppingSearch`] and
//! [`ProductDetail`] traits so pipeline code can be tested without HTTP.

pub mod error;
pub mod hasdata;
pub mod region;
pub(crate) mod retry;
pub mod serper;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use trendeng_core::{AppConfig, Region};

pub use error::ShoppingError;
pub use hasdata::HasdataClient;
pub use region::{region_params, RegionParams};
pub use serper::SerperClient;
pub use types::{FilterGroup, FilterOption, ProductResult, ShoppingItem, ShoppingResults, StoreOffer};

/// Free-text product search scoped to a market.
#[async_trait]
pub trait ShoppingSearch: Send + Sync {
    async fn search(&self, query: &str, region: Region) -> Result<ShoppingResults, ShoppingError>;
}

/// Resolves an immersive product page token to its full product block.
///
/// `Ok(None)` means the provider answered but had no `productResult`.
#[async_trait]
pub trait ProductDetail: Send + Sync {
    async fn detail(&self, page_token: &str) -> Result<Option<ProductResult>, ShoppingError>;
}

/// HTTP settings shared by every provider client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
}

impl HttpConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout_secs: config.http_timeout_secs,
            user_agent: config.http_user_agent.clone(),
            max_retries: config.http_max_retries,
            backoff_base_secs: config.http_retry_backoff_base_secs,
        }
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, ShoppingError> {
        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&self.user_agent)
            .build()?)
    }
}

/// Maps 429 and other non-success statuses to typed errors, then parses the
/// body as `T`.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
    context: &str,
) -> Result<T, ShoppingError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ShoppingError::RateLimited {
            provider,
            retry_after_secs,
        });
    }
    if !status.is_success() {
        return Err(ShoppingError::UnexpectedStatus {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str::<T>(&body).map_err(|e| ShoppingError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// Treats blank keys as absent.
pub(crate) fn usable_key(api_key: Option<String>) -> Option<String> {
    api_key.filter(|k| !k.trim().is_empty())
}
