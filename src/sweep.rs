//! Stale chunk-directory sweeping
//!
//! Abandoned uploads never reach assembly, so their per-identifier chunk
//! directories accumulate under the chunk root(s). The sweeper enumerates
//! the immediate subdirectories of each configured root and deletes those
//! whose last-modified time is older than the age threshold. Roots it cannot
//! enumerate are skipped, and a failed deletion is reported without aborting
//! the rest of the sweep.
//!
//! The sweeper must not race an in-flight assembly for the same identifier;
//! keep `max_age` comfortably above the longest plausible upload pause.

use crate::config::Config;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tokio::fs;

/// Deletes chunk directories older than a threshold
pub struct ChunkSweeper {
    roots: Vec<PathBuf>,
    max_age: Duration,
}

/// Per-sweep accounting
#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    /// Number of chunk directories examined
    pub scanned: usize,
    /// Directories successfully deleted
    pub deleted: Vec<PathBuf>,
    /// Directories that could not be deleted, with the failure reason
    pub failed: Vec<(PathBuf, String)>,
}

impl ChunkSweeper {
    /// Sweep the given chunk roots with the given age threshold
    pub fn new(roots: Vec<PathBuf>, max_age: Duration) -> Self {
        Self { roots, max_age }
    }

    /// Sweep the engine's chunk root plus any configured extra roots
    pub fn from_config(config: &Config) -> Self {
        let mut roots = vec![config.chunk_dir.clone()];
        roots.extend(config.sweep.extra_dirs.iter().cloned());
        Self::new(roots, config.sweep.max_age)
    }

    /// Run one sweep pass
    pub async fn sweep(&self) -> SweepReport {
        let cutoff = SystemTime::now()
            .checked_sub(self.max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let mut report = SweepReport::default();

        for root in &self.roots {
            let mut entries = match fs::read_dir(root).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::debug!(root = %root.display(), error = %e, "skipping unreadable chunk root");
                    continue;
                }
            };

            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                let Ok(meta) = entry.metadata().await else {
                    continue;
                };
                if !meta.is_dir() {
                    continue;
                }
                report.scanned += 1;

                let Ok(modified) = meta.modified() else {
                    continue;
                };
                if modified >= cutoff {
                    continue;
                }

                match fs::remove_dir_all(&path).await {
                    Ok(()) => {
                        tracing::info!(
                            dir = %path.display(),
                            last_modified = %chrono::DateTime::<chrono::Utc>::from(modified),
                            "deleted stale chunk directory"
                        );
                        report.deleted.push(path);
                    }
                    Err(e) => {
                        tracing::warn!(dir = %path.display(), error = %e, "failed to delete chunk directory");
                        report.failed.push((path, e.to_string()));
                    }
                }
            }
        }

        report
    }
}
