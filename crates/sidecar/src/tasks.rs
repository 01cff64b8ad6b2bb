//! Fixed-interval periodic tasks.

use crate::error::SidecarError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::warn;

/// A task the sidecar runs on a fixed interval.
#[async_trait]
pub trait PeriodicTask: Send + Sync + 'static {
    /// Human-readable task name for logs.
    fn name(&self) -> &str;
    /// Delay before the first cycle.
    fn initial_delay(&self) -> Duration;
    /// Interval between the end of one cycle and the start of the next.
    fn delay(&self) -> Duration;
    /// Run one cycle. A failed cycle is logged and the schedule
    /// continues; it never tears down the runner.
    async fn execute(&self) -> Result<(), SidecarError>;
}

/// Drive `task` on its schedule until the returned handle is aborted.
pub fn spawn(task: Arc<dyn PeriodicTask>) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(task.initial_delay()).await;
        loop {
            if let Err(error) = task.execute().await {
                warn!(task = task.name(), %error, "periodic task cycle failed");
            }
            tokio::time::sleep(task.delay()).await;
        }
    })
}
