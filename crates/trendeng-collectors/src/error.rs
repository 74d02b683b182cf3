use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by {host} (retry after {retry_after_secs}s)")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response from {url} is missing the {widget} widget")]
    MissingWidget { url: String, widget: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{collector} collector cannot be located by {locator}")]
    UnsupportedLocator {
        collector: &'static str,
        locator: String,
    },

    #[error("invalid cleaning pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("source '{source_label}' is misconfigured: {reason}")]
    Misconfigured {
        source_label: String,
        reason: String,
    },
}
