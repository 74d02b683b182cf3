//! Domain types and configuration shared by every trend-engine crate.

pub mod app_config;
pub mod catalog;
pub mod category_map;
pub mod config;
pub mod pipeline_config;
pub mod region;
pub mod trends;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogProductRecord, NewTrendProduct};
pub use category_map::CategoryMap;
pub use config::{load_app_config, load_app_config_from_env};
pub use pipeline_config::{
    load_pipeline_config, CategoryConfig, CollectorKind, PipelineConfig, SearchQueryConfig,
    SourceConfig,
};
pub use region::Region;
pub use trends::{NewTrend, TrendCandidate};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read pipeline file {path}: {source}")]
    PipelineFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline file: {0}")]
    PipelineFileParse(#[from] serde_yaml::Error),

    #[error("pipeline config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported region: {0}")]
    UnsupportedRegion(String),
}
