//! Background job scheduler.
//!
//! Registers the recurring collect-and-process and catalog-sync jobs. Each
//! job only dispatches tasks; the shared worker pool does the work.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use trendeng_core::{AppConfig, Region};
use trendeng_pipeline::{Task, TaskDispatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScheduledRun {
    Collect,
    Sync,
}

impl ScheduledRun {
    fn task(self, region: Region) -> Task {
        match self {
            ScheduledRun::Collect => Task::CollectAndProcess { region },
            ScheduledRun::Sync => Task::CatalogSync { region },
        }
    }

    fn label(self) -> &'static str {
        match self {
            ScheduledRun::Collect => "collect",
            ScheduledRun::Sync => "sync",
        }
    }
}

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if a cron expression is invalid or the
/// scheduler fails to start.
pub async fn build_scheduler(
    dispatcher: Arc<dyn TaskDispatcher>,
    config: Arc<AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_dispatch_job(
        &scheduler,
        &config.collect_cron,
        ScheduledRun::Collect,
        config.scheduler_regions.clone(),
        Arc::clone(&dispatcher),
    )
    .await?;
    register_dispatch_job(
        &scheduler,
        &config.sync_cron,
        ScheduledRun::Sync,
        config.scheduler_regions.clone(),
        dispatcher,
    )
    .await?;

    scheduler.start().await?;
    tracing::info!(
        collect_cron = %config.collect_cron,
        sync_cron = %config.sync_cron,
        regions = ?config.scheduler_regions,
        "scheduler started"
    );
    Ok(scheduler)
}

async fn register_dispatch_job(
    scheduler: &JobScheduler,
    cron: &str,
    run: ScheduledRun,
    regions: Vec<Region>,
    dispatcher: Arc<dyn TaskDispatcher>,
) -> Result<(), JobSchedulerError> {
    let regions = Arc::new(regions);

    let job = Job::new_async(cron, move |_uuid, _lock| {
        let dispatcher = Arc::clone(&dispatcher);
        let regions = Arc::clone(&regions);

        Box::pin(async move {
            let dispatched = dispatch_for_regions(dispatcher.as_ref(), run, &regions);
            tracing::info!(run = run.label(), dispatched, "scheduler: tasks dispatched");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

fn dispatch_for_regions(
    dispatcher: &dyn TaskDispatcher,
    run: ScheduledRun,
    regions: &[Region],
) -> usize {
    for &region in regions {
        dispatcher.dispatch(run.task(region));
    }
    regions.len()
}
