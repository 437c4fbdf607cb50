//! Chunk session engine
//!
//! Handles the server side of a resumable.js upload: existence probes for
//! already-stored chunks, persistence of incoming chunk parts, the
//! completeness check after every accepted chunk, and assembly of the final
//! file once all chunks are on disk.
//!
//! The engine holds no in-memory session state between calls — every request
//! reconstructs its view from the filesystem via the identifier-derived chunk
//! directory, which makes uploads naturally resumable across process
//! restarts. The completeness-check + assembly + cleanup critical section is
//! serialized per identifier with an in-process async lock; deployments
//! running multiple server processes against the same chunk root need an
//! external lock (e.g. a lock file) on top.

mod assembly;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{ChunkStatus, Mode, UploadOutcome, UploadRequest};
use crate::utils::with_extension_of;
use crate::validator::{AcceptAll, ChunkValidator};
use crate::params::UploadParameters;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// The chunk session engine
///
/// Construct once with a [`Config`] and share behind an [`Arc`]; one call to
/// [`process`](UploadEngine::process) handles one HTTP request.
///
/// Identifiers and filenames are treated as opaque names, with one guard:
/// values containing a `..` segment or forming an absolute path are refused
/// before any path is built, since joining them would resolve outside the
/// configured roots.
pub struct UploadEngine {
    config: Config,
    validator: Arc<dyn ChunkValidator>,
    identifier_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UploadEngine {
    /// Create an engine with the default accept-all validator
    pub fn new(config: Config) -> Self {
        Self::with_validator(config, Arc::new(AcceptAll))
    }

    /// Create an engine with an injected validator
    pub fn with_validator(config: Config, validator: Arc<dyn ChunkValidator>) -> Self {
        Self {
            config,
            validator,
            identifier_locks: Mutex::new(HashMap::new()),
        }
    }

    /// The engine's configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process one request: probe in [`Mode::TestChunk`], store (and possibly
    /// assemble) in [`Mode::UploadChunk`].
    ///
    /// Every protocol outcome is an `Ok` carrying a [`ChunkStatus`]; an `Err`
    /// signals a non-protocol failure ([`Error::UploadDirMissing`] or an I/O
    /// error outside the recoverable assembly path).
    pub async fn process(&self, mode: Mode, request: &UploadRequest) -> Result<UploadOutcome> {
        match mode {
            Mode::TestChunk => Ok(self.probe(request).await),
            Mode::UploadChunk => self.store(request).await,
        }
    }

    /// Does the chunk named by this request already exist on disk?
    ///
    /// No side effects. Returns [`ChunkStatus::Found`] (the client skips the
    /// chunk) or [`ChunkStatus::NotFound`] (the client should upload it).
    pub async fn probe(&self, request: &UploadRequest) -> UploadOutcome {
        if escapes_roots(&request.params) {
            return UploadOutcome::status_only(ChunkStatus::NotFound);
        }

        let path = self.chunk_path(request);
        let exists = fs::try_exists(&path).await.unwrap_or(false);

        tracing::debug!(
            identifier = %request.params.identifier,
            chunk = request.params.chunk_number,
            exists,
            "chunk probe"
        );

        UploadOutcome::status_only(if exists {
            ChunkStatus::Found
        } else {
            ChunkStatus::NotFound
        })
    }

    /// Store the request's uploaded parts, then assemble if the upload is now
    /// complete.
    ///
    /// Parts with a transport error are skipped. A validator rejection
    /// answers the whole request with [`ChunkStatus::Unsupported`] and stops
    /// part processing. Re-uploads of an already-stored chunk number simply
    /// overwrite it (last write wins).
    pub async fn store(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        let params = &request.params;
        if escapes_roots(params) {
            tracing::warn!(
                identifier = %params.identifier,
                filename = %params.filename,
                "rejecting name that would escape the configured roots"
            );
            return Ok(UploadOutcome::status_only(ChunkStatus::Unsupported));
        }

        let chunk_dir = self.chunk_dir(request);
        let chunk_path = self.chunk_path(request);

        for part in &request.parts {
            if let Some(reason) = &part.transport_error {
                tracing::warn!(
                    identifier = %params.identifier,
                    chunk = params.chunk_number,
                    reason = %reason,
                    "skipping part that failed in transit"
                );
                continue;
            }

            if !self.validator.accept(part, params) {
                tracing::info!(
                    identifier = %params.identifier,
                    chunk = params.chunk_number,
                    "validator rejected chunk"
                );
                return Ok(UploadOutcome::status_only(ChunkStatus::Unsupported));
            }

            // Lazy directory creation; a concurrent upload for the same
            // identifier may win the race, which is fine.
            if let Err(e) = fs::create_dir_all(&chunk_dir).await
                && e.kind() != std::io::ErrorKind::AlreadyExists
            {
                return Err(Error::Io(e));
            }

            fs::write(&chunk_path, &part.bytes).await?;

            tracing::debug!(
                identifier = %params.identifier,
                chunk = params.chunk_number,
                bytes = part.bytes.len(),
                "stored chunk"
            );
        }

        self.try_assemble(request).await
    }

    /// Run the completeness check and, if it passes, assembly — as one
    /// critical section per identifier.
    async fn try_assemble(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        let lock = self.identifier_lock(&request.params.identifier).await;
        let outcome = {
            let _guard = lock.lock().await;
            self.assemble_if_complete(request).await
        };
        self.release_identifier_lock(&request.params.identifier, &lock)
            .await;
        outcome
    }

    async fn assemble_if_complete(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        let params = &request.params;
        let basename = self.chunk_basename(request);
        if !assembly::is_complete(&self.config, params, basename).await {
            return Ok(UploadOutcome::status_only(ChunkStatus::Accepted));
        }

        let final_name = self.assembled_filename(request);
        match assembly::assemble(&self.config, params, basename, &final_name).await {
            Ok(path) => Ok(UploadOutcome {
                status: ChunkStatus::Accepted,
                completed: true,
                assembled: Some(path),
            }),
            Err(e @ Error::UploadDirMissing { .. }) => Err(e),
            Err(e) => {
                // Recoverable: chunks stay on disk, completion stays false,
                // and a retried request re-attempts assembly.
                tracing::warn!(
                    identifier = %params.identifier,
                    error = %e,
                    "assembly failed, keeping chunks for retry"
                );
                Ok(UploadOutcome::status_only(ChunkStatus::Accepted))
            }
        }
    }

    /// Per-identifier chunk directory: `<chunk_dir>/<identifier>`
    pub fn chunk_dir(&self, request: &UploadRequest) -> PathBuf {
        self.config.chunk_dir.join(&request.params.identifier)
    }

    /// Deterministic chunk file path:
    /// `<chunk_dir>/<identifier>/<basename>.part<N>`
    pub fn chunk_path(&self, request: &UploadRequest) -> PathBuf {
        self.chunk_dir(request).join(format!(
            "{}.part{}",
            self.chunk_basename(request),
            request.params.chunk_number
        ))
    }

    /// Where the assembled file will land: `<upload_dir>/<final filename>`
    pub fn assembled_path(&self, request: &UploadRequest) -> PathBuf {
        self.config.upload_dir.join(self.assembled_filename(request))
    }

    /// Base name used for chunk files: the caller override when present,
    /// otherwise the client-declared filename.
    fn chunk_basename<'a>(&self, request: &'a UploadRequest) -> &'a str {
        request
            .target_basename
            .as_deref()
            .unwrap_or(&request.params.filename)
    }

    /// Name of the assembled file: the client filename, or the override base
    /// plus the client filename's extension.
    fn assembled_filename(&self, request: &UploadRequest) -> String {
        match &request.target_basename {
            Some(base) => with_extension_of(base, &request.params.filename),
            None => request.params.filename.clone(),
        }
    }

    async fn identifier_lock(&self, identifier: &str) -> Arc<Mutex<()>> {
        let mut locks = self.identifier_locks.lock().await;
        locks
            .entry(identifier.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the map entry once no other request holds a clone, keeping the
    /// lock map bounded by the number of in-flight identifiers rather than
    /// every identifier ever seen.
    async fn release_identifier_lock(&self, identifier: &str, lock: &Arc<Mutex<()>>) {
        let mut locks = self.identifier_locks.lock().await;
        // Two strong counts means only the map and this caller hold the Arc;
        // a waiter would hold a third. Cloning goes through the map mutex, so
        // the count cannot rise while we hold it.
        if Arc::strong_count(lock) == 2 {
            locks.remove(identifier);
        }
    }
}

/// True when a client-supplied identifier or filename could resolve outside
/// the configured roots: an absolute path would replace the root entirely on
/// `join`, and a `..` segment climbs out of it.
fn escapes_roots(params: &UploadParameters) -> bool {
    [params.identifier.as_str(), params.filename.as_str()]
        .into_iter()
        .any(|value| {
            Path::new(value).is_absolute() || value.split(['/', '\\']).any(|seg| seg == "..")
        })
}
