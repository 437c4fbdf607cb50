//! Periodic sweep task
//!
//! Background task that runs the [`ChunkSweeper`] at a fixed interval until
//! the cancellation token fires. Deployments that prefer an external cron job
//! can skip this task and call [`ChunkSweeper::sweep`] themselves.
//!
//! # Example
//!
//! ```no_run
//! use resumable_upload::{Config, SweepTask};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() {
//! let config = Config::default();
//! let cancel = CancellationToken::new();
//!
//! let task = SweepTask::from_config(&config, cancel.clone());
//! tokio::spawn(async move {
//!     task.run().await;
//! });
//!
//! // ... later, on shutdown:
//! cancel.cancel();
//! # }
//! ```

use crate::config::Config;
use crate::sweep::ChunkSweeper;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background task that sweeps stale chunk directories on an interval
pub struct SweepTask {
    sweeper: ChunkSweeper,
    interval: Duration,
    cancel: CancellationToken,
}

impl SweepTask {
    /// Creates a sweep task with an explicit sweeper and interval
    pub fn new(sweeper: ChunkSweeper, interval: Duration, cancel: CancellationToken) -> Self {
        Self {
            sweeper,
            interval,
            cancel,
        }
    }

    /// Creates a sweep task covering the configured chunk roots
    pub fn from_config(config: &Config, cancel: CancellationToken) -> Self {
        Self::new(
            ChunkSweeper::from_config(config),
            config.sweep.interval,
            cancel,
        )
    }

    /// Runs the task until the cancellation token fires
    ///
    /// The first sweep happens one interval after start, not immediately, so
    /// a restart loop cannot hammer the filesystem.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "sweep task started");

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = sleep(self.interval) => {
                    let report = self.sweeper.sweep().await;
                    if report.deleted.is_empty() && report.failed.is_empty() {
                        debug!(scanned = report.scanned, "sweep pass found nothing stale");
                    } else {
                        info!(
                            scanned = report.scanned,
                            deleted = report.deleted.len(),
                            failed = report.failed.len(),
                            "sweep pass finished"
                        );
                    }
                }
            }
        }

        info!("sweep task stopped");
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn run_exits_promptly_on_cancellation() {
        let temp = TempDir::new().unwrap();
        let cancel = CancellationToken::new();
        let task = SweepTask::new(
            ChunkSweeper::new(vec![temp.path().to_path_buf()], Duration::from_secs(3600)),
            Duration::from_secs(3600),
            cancel.clone(),
        );

        let handle = tokio::spawn(async move {
            task.run().await;
        });

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;

        assert!(result.is_ok(), "sweep task must exit on cancellation");
    }

    #[tokio::test]
    async fn run_deletes_stale_directories_between_intervals() {
        let temp = TempDir::new().unwrap();
        let stale = temp.path().join("abandoned-upload");
        std_fs::create_dir(&stale).unwrap();

        let cancel = CancellationToken::new();
        let task = SweepTask::new(
            ChunkSweeper::new(vec![temp.path().to_path_buf()], Duration::from_millis(10)),
            Duration::from_millis(50),
            cancel.clone(),
        );
        let handle = tokio::spawn(async move {
            task.run().await;
        });

        // Give the task at least one interval plus the age threshold.
        tokio::time::sleep(Duration::from_millis(300)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("task must stop")
            .unwrap();

        assert!(!stale.exists(), "stale directory removed by a sweep pass");
    }
}
