use std::net::SocketAddr;
use std::path::PathBuf;

use crate::Region;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub pipeline_path: PathBuf,
    pub serper_api_key: Option<String>,
    pub hasdata_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub http_user_agent: String,
    pub http_max_retries: u32,
    pub http_retry_backoff_base_secs: u64,
    pub shopping_result_limit: u32,
    pub workers: usize,
    pub task_max_deliveries: u32,
    pub scheduler_regions: Vec<Region>,
    pub collect_cron: String,
    pub sync_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("pipeline_path", &self.pipeline_path)
            .field("database_url", &"[redacted]")
            .field(
                "serper_api_key",
                &self.serper_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "hasdata_api_key",
                &self.hasdata_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("http_user_agent", &self.http_user_agent)
            .field("http_max_retries", &self.http_max_retries)
            .field(
                "http_retry_backoff_base_secs",
                &self.http_retry_backoff_base_secs,
            )
            .field("shopping_result_limit", &self.shopping_result_limit)
            .field("workers", &self.workers)
            .field("task_max_deliveries", &self.task_max_deliveries)
            .field("scheduler_regions", &self.scheduler_regions)
            .field("collect_cron", &self.collect_cron)
            .field("sync_cron", &self.sync_cron)
            .finish()
    }
}
