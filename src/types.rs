//! Core protocol types

use crate::params::UploadParameters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Request mode, derived from the HTTP method by the caller
///
/// resumable.js probes with a GET before uploading each chunk, then POSTs
/// the chunk data. The engine never inspects the transport itself; callers
/// map their request method (or equivalent) to a mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Existence probe for a single chunk; no side effects
    TestChunk,
    /// Data-carrying upload of one or more chunk parts
    UploadChunk,
}

/// Terminal status of a processed request
///
/// The protocol answers with a bare status code and nothing else; a probe
/// answer and an accepted-but-incomplete upload are distinguished only by
/// the numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChunkStatus {
    /// Probe: the chunk is already stored (HTTP 200, client skips it)
    Found,
    /// Probe: the chunk is missing (HTTP 204, client uploads it)
    NotFound,
    /// The configured validator rejected a part (HTTP 415)
    Unsupported,
    /// Upload processed — whether or not assembly ran (HTTP 200)
    Accepted,
}

impl ChunkStatus {
    /// The HTTP status code this outcome maps to on the wire
    pub fn http_status(&self) -> u16 {
        match self {
            ChunkStatus::Found => 200,
            ChunkStatus::NotFound => 204,
            ChunkStatus::Unsupported => 415,
            ChunkStatus::Accepted => 200,
        }
    }
}

/// One uploaded file part of a chunk-upload request
///
/// A part that failed in transit carries `transport_error` and is skipped
/// during processing rather than failing the whole request.
#[derive(Clone, Debug)]
pub struct UploadedPart {
    /// Form field name, when the transport provides one
    pub field_name: Option<String>,
    /// Client-declared filename for this part, when provided
    pub file_name: Option<String>,
    /// Raw part bytes
    pub bytes: Vec<u8>,
    /// Transport-level failure reading this part, if any
    pub transport_error: Option<String>,
}

impl UploadedPart {
    /// A well-formed part carrying `bytes`
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            field_name: None,
            file_name: None,
            bytes,
            transport_error: None,
        }
    }

    /// A part that failed in transit and will be skipped
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            field_name: None,
            file_name: None,
            bytes: Vec::new(),
            transport_error: Some(reason.into()),
        }
    }
}

/// Immutable per-request context, built once at request entry
///
/// Replaces the mutable cross-call state of classic resumable.js backends
/// (`setMode`, `setFilename`, ...) with a value threaded explicitly through
/// the engine.
#[derive(Clone, Debug)]
pub struct UploadRequest {
    /// The parameter snapshot extracted from the request
    pub params: UploadParameters,
    /// Uploaded file parts (empty for probes)
    pub parts: Vec<UploadedPart>,
    /// Optional base name overriding the client filename for the assembled
    /// file; the client filename's extension is appended to it
    pub target_basename: Option<String>,
}

impl UploadRequest {
    /// Build a request context from a parameter snapshot with no parts
    pub fn new(params: UploadParameters) -> Self {
        Self {
            params,
            parts: Vec::new(),
            target_basename: None,
        }
    }

    /// Attach uploaded parts
    pub fn with_parts(mut self, parts: Vec<UploadedPart>) -> Self {
        self.parts = parts;
        self
    }

    /// Override the assembled file's base name (extension still comes from
    /// the client-declared filename)
    pub fn with_target_basename(mut self, base: impl Into<String>) -> Self {
        self.target_basename = Some(base.into());
        self
    }
}

/// Result of processing one request
#[derive(Clone, Debug)]
pub struct UploadOutcome {
    /// Terminal protocol status
    pub status: ChunkStatus,
    /// True only when assembly ran to completion during this request
    pub completed: bool,
    /// Location of the assembled file, set together with `completed`
    pub assembled: Option<PathBuf>,
}

impl UploadOutcome {
    pub(crate) fn status_only(status: ChunkStatus) -> Self {
        Self {
            status,
            completed: false,
            assembled: None,
        }
    }
}
