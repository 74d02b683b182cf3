use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShoppingError {
    #[error("{provider} API key is not configured")]
    NotConfigured { provider: &'static str },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {provider} (retry after {retry_after_secs}s)")]
    RateLimited {
        provider: &'static str,
        retry_after_secs: u64,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}
