//! In-process worker pool with at-least-once delivery.
//!
//! [`TaskQueue`] is the dispatch side and is cheap to clone. [`WorkerPool`]
//! owns the receiving end and runs each delivery on its own tokio task,
//! bounded by a semaphore. A delivery that returns `Err` or panics is put
//! back on the queue until `max_deliveries` attempts have been made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::JoinHandle;
use trendeng_core::AppConfig;

use crate::{Task, TaskDispatcher, TaskHandler};

#[derive(Debug, Clone, Copy)]
pub struct QueueSettings {
    pub workers: usize,
    pub max_deliveries: u32,
}

impl QueueSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            workers: config.workers,
            max_deliveries: config.task_max_deliveries,
        }
    }
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            max_deliveries: 3,
        }
    }
}

struct Envelope {
    task: Task,
    delivery: u32,
}

/// Tasks queued or running, including ones awaiting redelivery.
struct Pending {
    count: AtomicUsize,
    idle: Notify,
}

impl Pending {
    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn finish(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

#[derive(Clone)]
pub struct TaskQueue {
    tx: mpsc::UnboundedSender<Envelope>,
    pending: Arc<Pending>,
}

pub struct WorkerPool {
    rx: mpsc::UnboundedReceiver<Envelope>,
    tx: mpsc::UnboundedSender<Envelope>,
    pending: Arc<Pending>,
    settings: QueueSettings,
}

impl TaskQueue {
    /// Creates the queue and its (not yet running) worker pool.
    ///
    /// The pool is started separately so the handler can hold a clone of the
    /// queue for fan-out.
    #[must_use]
    pub fn new(settings: QueueSettings) -> (Self, WorkerPool) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(Pending {
            count: AtomicUsize::new(0),
            idle: Notify::new(),
        });
        let queue = Self {
            tx: tx.clone(),
            pending: Arc::clone(&pending),
        };
        let pool = WorkerPool {
            rx,
            tx,
            pending,
            settings,
        };
        (queue, pool)
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.count.load(Ordering::SeqCst)
    }

    /// Resolves once nothing is queued or running, including tasks that
    /// running tasks dispatched.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.pending.idle.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

impl TaskDispatcher for TaskQueue {
    fn dispatch(&self, task: Task) {
        tracing::debug!(task = task.name(), "dispatching task");
        self.pending.add();
        if let Err(e) = self.tx.send(Envelope { task, delivery: 1 }) {
            tracing::error!(task = e.0.task.name(), "task queue is closed; dropping task");
            self.pending.finish();
        }
    }
}

impl WorkerPool {
    /// Starts consuming the queue on the current tokio runtime.
    pub fn spawn(self, handler: Arc<dyn TaskHandler>) -> JoinHandle<()> {
        tokio::spawn(self.run(handler))
    }

    async fn run(mut self, handler: Arc<dyn TaskHandler>) {
        let semaphore = Arc::new(Semaphore::new(self.settings.workers.max(1)));
        tracing::info!(
            workers = self.settings.workers,
            max_deliveries = self.settings.max_deliveries,
            "worker pool started"
        );

        while let Some(envelope) = self.rx.recv().await {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            let handler = Arc::clone(&handler);
            let tx = self.tx.clone();
            let pending = Arc::clone(&self.pending);
            let max_deliveries = self.settings.max_deliveries;

            tokio::spawn(async move {
                let _permit = permit;
                deliver(handler, envelope, max_deliveries, &tx, &pending).await;
            });
        }
    }
}

async fn deliver(
    handler: Arc<dyn TaskHandler>,
    envelope: Envelope,
    max_deliveries: u32,
    tx: &mpsc::UnboundedSender<Envelope>,
    pending: &Pending,
) {
    let name = envelope.task.name();
    let task = envelope.task.clone();

    // Run on a separate tokio task so a panic is caught by the JoinHandle.
    let outcome = tokio::spawn(async move { handler.handle(task).await }).await;
    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(join_err) if join_err.is_panic() => Some("task panicked".to_string()),
        Err(join_err) => Some(join_err.to_string()),
    };

    let Some(reason) = failure else {
        tracing::debug!(task = name, delivery = envelope.delivery, "task completed");
        pending.finish();
        return;
    };

    if envelope.delivery < max_deliveries {
        tracing::warn!(
            task = name,
            delivery = envelope.delivery,
            max_deliveries,
            error = %reason,
            "task failed; redelivering"
        );
        let retry = Envelope {
            task: envelope.task,
            delivery: envelope.delivery + 1,
        };
        if tx.send(retry).is_err() {
            pending.finish();
        }
    } else {
        tracing::error!(
            task = name,
            delivery = envelope.delivery,
            error = %reason,
            "task failed on final delivery; dropping"
        );
        pending.finish();
    }
}

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;
