//! Pluggable per-chunk validation
//!
//! Callers inject a [`ChunkValidator`] at engine construction to veto
//! individual uploaded parts (size limits, extension allow-lists, magic-byte
//! sniffing, ...). A rejected part answers the whole request with HTTP 415
//! and stops further part processing. The default implementation accepts
//! everything.

use crate::params::UploadParameters;
use crate::types::UploadedPart;

/// Predicate over an uploaded part and its parameter snapshot
pub trait ChunkValidator: Send + Sync {
    /// Return false to reject the part (and the request) with HTTP 415
    fn accept(&self, part: &UploadedPart, params: &UploadParameters) -> bool;
}

/// Default validator: accepts every part
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl ChunkValidator for AcceptAll {
    fn accept(&self, _part: &UploadedPart, _params: &UploadParameters) -> bool {
        true
    }
}

// Closures double as validators, matching the callable the classic backends
// take.
impl<F> ChunkValidator for F
where
    F: Fn(&UploadedPart, &UploadParameters) -> bool + Send + Sync,
{
    fn accept(&self, part: &UploadedPart, params: &UploadParameters) -> bool {
        self(part, params)
    }
}
