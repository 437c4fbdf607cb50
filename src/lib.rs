//! # resumable-upload
//!
//! Server-side handling of [resumable.js](http://resumablejs.com/) chunked
//! file uploads: resume probes, chunk storage, and atomic assembly of the
//! final file.
//!
//! ## Design Philosophy
//!
//! resumable-upload is designed to be:
//! - **Filesystem-backed** - No session store; every request reconstructs its
//!   view from the chunk directory, so uploads survive process restarts
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Library-first** - The bundled axum router is optional; the engine can
//!   sit behind any HTTP framework
//! - **Protocol-faithful** - Answers with the status codes resumable.js
//!   expects (200 found / 204 missing on probes, 200 / 415 on uploads)
//!
//! ## Quick Start
//!
//! ```no_run
//! use resumable_upload::{Config, UploadEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         chunk_dir: "data/chunks".into(),
//!         upload_dir: "data/uploads".into(),
//!         ..Default::default()
//!     };
//!
//!     let engine = Arc::new(UploadEngine::new(config));
//!
//!     // Serve the resumable.js endpoints (blocks until shutdown)
//!     resumable_upload::api::start_api_server(engine).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP surface (axum router and handlers)
pub mod api;
/// Configuration types
pub mod config;
/// Chunk session engine
pub mod engine;
/// Error types
pub mod error;
/// resumable.js parameter extraction
pub mod params;
/// Stale chunk-directory sweeping
pub mod sweep;
/// Periodic sweep task
pub mod sweep_task;
/// Core protocol types
pub mod types;
/// Filename helpers
pub mod utils;
/// Chunk validation hook
pub mod validator;

pub use config::{ApiConfig, Config, SweepConfig};
pub use engine::UploadEngine;
pub use error::{Error, Result};
pub use params::UploadParameters;
pub use sweep::{ChunkSweeper, SweepReport};
pub use sweep_task::SweepTask;
pub use types::{ChunkStatus, Mode, UploadOutcome, UploadRequest, UploadedPart};
pub use validator::{AcceptAll, ChunkValidator};
