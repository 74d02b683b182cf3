use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, Region};

const DEFAULT_USER_AGENT: &str = "trendeng/0.1 (trend-intelligence)";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty credentials are treated the same as unset ones.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("TRENDENG_ENV", "development"))?;
    let bind_addr = parse_addr("TRENDENG_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("TRENDENG_LOG_LEVEL", "info");
    let pipeline_path = PathBuf::from(or_default(
        "TRENDENG_PIPELINE_PATH",
        "./config/pipeline.yaml",
    ));
    let serper_api_key = optional("SERPER_API_KEY");
    let hasdata_api_key = optional("HASDATA_API_KEY");

    let db_max_connections = parse_u32("TRENDENG_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("TRENDENG_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("TRENDENG_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let http_timeout_secs = parse_u64("TRENDENG_HTTP_TIMEOUT_SECS", "30")?;
    let http_user_agent = or_default("TRENDENG_HTTP_USER_AGENT", DEFAULT_USER_AGENT);
    let http_max_retries = parse_u32("TRENDENG_HTTP_MAX_RETRIES", "2")?;
    let http_retry_backoff_base_secs = parse_u64("TRENDENG_HTTP_RETRY_BACKOFF_BASE_SECS", "2")?;
    let shopping_result_limit = parse_u32("TRENDENG_SHOPPING_RESULT_LIMIT", "10")?;

    let workers = parse_usize("TRENDENG_WORKERS", "4")?;
    if workers == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRENDENG_WORKERS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let task_max_deliveries = parse_u32("TRENDENG_TASK_MAX_DELIVERIES", "3")?;
    if task_max_deliveries == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRENDENG_TASK_MAX_DELIVERIES".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let scheduler_regions = parse_regions(&or_default("TRENDENG_SCHEDULER_REGIONS", "BR"))?;
    let collect_cron = or_default("TRENDENG_COLLECT_CRON", "0 0 6 * * *");
    let sync_cron = or_default("TRENDENG_SYNC_CRON", "0 0 7 * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        pipeline_path,
        serper_api_key,
        hasdata_api_key,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        http_timeout_secs,
        http_user_agent,
        http_max_retries,
        http_retry_backoff_base_secs,
        shopping_result_limit,
        workers,
        task_max_deliveries,
        scheduler_regions,
        collect_cron,
        sync_cron,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDENG_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated region list such as `"BR,us"`.
fn parse_regions(raw: &str) -> Result<Vec<Region>, ConfigError> {
    let mut regions = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let region = part
            .parse::<Region>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "TRENDENG_SCHEDULER_REGIONS".to_string(),
                reason: e.to_string(),
            })?;
        if !regions.contains(&region) {
            regions.push(region);
        }
    }
    Ok(regions)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
