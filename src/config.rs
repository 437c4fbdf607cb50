//! Configuration types for resumable-upload

use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// Main configuration for the upload engine and its collaborators
///
/// All directories are explicit — the engine never consults ambient state.
/// The chunk directory is created lazily on the first stored chunk; the
/// upload directory must exist before assembly runs and is deliberately
/// never created by the engine (a missing upload directory is treated as a
/// deployment error, see [`Error::UploadDirMissing`](crate::Error::UploadDirMissing)).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Directory holding per-identifier chunk subdirectories (default: "./chunks")
    #[serde(default = "default_chunk_dir")]
    pub chunk_dir: PathBuf,

    /// Directory receiving assembled files (default: "./uploads")
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Require every chunk number 1..=total_chunks to exist before assembly
    /// (default: true)
    ///
    /// When false, the original resumable.js backend heuristic is used
    /// instead: assembly runs as soon as the summed on-disk chunk sizes
    /// reach the declared total, even if chunk numbers are missing. A gap
    /// then aborts assembly mid-concatenation and the request is answered
    /// as accepted-but-incomplete.
    #[serde(default = "default_true")]
    pub require_all_chunks: bool,

    /// Stale-chunk sweeping
    #[serde(default)]
    pub sweep: SweepConfig,

    /// HTTP surface configuration
    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_dir: default_chunk_dir(),
            upload_dir: default_upload_dir(),
            require_all_chunks: true,
            sweep: SweepConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

/// Stale-chunk sweep configuration
///
/// Abandoned uploads leave per-identifier chunk directories behind; the
/// sweeper deletes those whose last-modified time is older than `max_age`.
/// Disabled by default — enable it when running the bundled
/// [`SweepTask`](crate::SweepTask) rather than an external cron job.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepConfig {
    /// Enable the periodic sweep task (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Additional chunk roots to sweep besides `chunk_dir`
    #[serde(default)]
    pub extra_dirs: Vec<PathBuf>,

    /// Minimum age before a chunk directory is considered stale
    /// (default: 1 hour)
    #[serde(default = "default_max_age", with = "duration_serde")]
    pub max_age: Duration,

    /// How often the sweep task runs (default: 1 hour)
    #[serde(default = "default_sweep_interval", with = "duration_serde")]
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            extra_dirs: vec![],
            max_age: default_max_age(),
            interval: default_sweep_interval(),
        }
    }
}

/// HTTP surface configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8090)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

// Default value functions
fn default_chunk_dir() -> PathBuf {
    PathBuf::from("chunks")
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_true() -> bool {
    true
}

fn default_max_age() -> Duration {
    Duration::from_secs(60 * 60) // 1 hour
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8090))
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
