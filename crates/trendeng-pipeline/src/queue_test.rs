use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::*;
use crate::PipelineError;

/// Fails or panics on the first `failures` deliveries of trend 1, fans out
/// two enrichments from every collect task, and records everything else.
struct ScriptedHandler {
    queue: TaskQueue,
    failures: u32,
    panic_instead: bool,
    attempts: AtomicU32,
    completed: Mutex<Vec<Task>>,
}

impl ScriptedHandler {
    fn new(queue: TaskQueue, failures: u32, panic_instead: bool) -> Self {
        Self {
            queue,
            failures,
            panic_instead,
            attempts: AtomicU32::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TaskHandler for ScriptedHandler {
    async fn handle(&self, task: Task) -> Result<(), PipelineError> {
        if let Task::CollectAndProcess { .. } = task {
            self.queue.dispatch(Task::EnrichTrend { trend_id: 10 });
            self.queue.dispatch(Task::EnrichTrend { trend_id: 11 });
        }
        if task == (Task::EnrichTrend { trend_id: 1 }) {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
            if attempt < self.failures {
                assert!(!self.panic_instead, "simulated worker crash");
                return Err(PipelineError::Store {
                    operation: "test",
                    message: "transient".to_string(),
                });
            }
        }
        self.completed.lock().unwrap().push(task);
        Ok(())
    }
}

fn start(failures: u32, panic_instead: bool, max_deliveries: u32) -> (TaskQueue, Arc<ScriptedHandler>) {
    let (queue, pool) = TaskQueue::new(QueueSettings {
        workers: 2,
        max_deliveries,
    });
    let handler = Arc::new(ScriptedHandler::new(queue.clone(), failures, panic_instead));
    pool.spawn(Arc::clone(&handler) as Arc<dyn TaskHandler>);
    (queue, handler)
}

async fn wait(queue: &TaskQueue) {
    tokio::time::timeout(Duration::from_secs(5), queue.wait_idle())
        .await
        .expect("queue did not go idle");
}

#[tokio::test]
async fn wait_idle_returns_immediately_when_empty() {
    let (queue, _handler) = start(0, false, 3);
    wait(&queue).await;
    assert_eq!(queue.pending(), 0);
}

#[tokio::test]
async fn wait_idle_covers_fan_out() {
    let (queue, handler) = start(0, false, 3);
    queue.dispatch(Task::CollectAndProcess {
        region: trendeng_core::Region::Br,
    });
    wait(&queue).await;

    let completed = handler.completed.lock().unwrap();
    assert_eq!(completed.len(), 3);
    assert!(completed.contains(&Task::EnrichTrend { trend_id: 10 }));
    assert!(completed.contains(&Task::EnrichTrend { trend_id: 11 }));
}

#[tokio::test]
async fn failed_task_is_redelivered_until_it_succeeds() {
    let (queue, handler) = start(2, false, 3);
    queue.dispatch(Task::EnrichTrend { trend_id: 1 });
    wait(&queue).await;

    assert_eq!(handler.attempts.load(Ordering::SeqCst), 3);
    assert_eq!(handler.completed.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn task_is_dropped_after_max_deliveries() {
    let (queue, handler) = start(5, false, 3);
    queue.dispatch(Task::EnrichTrend { trend_id: 1 });
    wait(&queue).await;

    assert_eq!(handler.attempts.load(Ordering::SeqCst), 3);
    assert!(handler.completed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn panic_counts_as_failed_delivery() {
    let (queue, handler) = start(1, true, 2);
    queue.dispatch(Task::EnrichTrend { trend_id: 1 });
    queue.dispatch(Task::EnrichTrend { trend_id: 2 });
    wait(&queue).await;

    assert_eq!(handler.attempts.load(Ordering::SeqCst), 2);
    let completed = handler.completed.lock().unwrap();
    assert_eq!(completed.len(), 2);
}
