mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use trendeng_pipeline::{PipelineRuntime, TaskDispatcher, TriggerSource};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(trendeng_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendeng_db::PoolConfig::from_app_config(&config);
    let pool = trendeng_db::connect_pool(&config.database_url, pool_config).await?;
    trendeng_db::run_migrations(&pool).await?;

    let pipeline = trendeng_core::load_pipeline_config(&config.pipeline_path)?;
    let runtime =
        PipelineRuntime::start(&config, &pipeline, pool.clone(), TriggerSource::Scheduler)?;
    let dispatcher: Arc<dyn TaskDispatcher> = Arc::new(runtime.queue.clone());
    let mut scheduler = scheduler::build_scheduler(dispatcher, Arc::clone(&config)).await?;

    let app = build_app(AppState { pool });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = scheduler.shutdown().await {
        tracing::warn!(error = %e, "scheduler did not shut down cleanly");
    }
    tracing::info!(pending = runtime.queue.pending(), "draining pipeline tasks");
    runtime.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
