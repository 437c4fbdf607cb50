//! Extraction of the resumable.js protocol parameters
//!
//! The five parameter names are fixed by the client-side protocol and are not
//! renameable without breaking every resumable.js client. Extraction is
//! deliberately permissive: absent or blank fields become zero values and
//! non-numeric input coerces to 0 — malformed values are the engine's problem,
//! never an extraction error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Query/form field carrying the upload identifier
pub const PARAM_IDENTIFIER: &str = "resumableIdentifier";
/// Query/form field carrying the client-declared filename
pub const PARAM_FILENAME: &str = "resumableFilename";
/// Query/form field carrying the 1-based chunk number
pub const PARAM_CHUNK_NUMBER: &str = "resumableChunkNumber";
/// Query/form field carrying the declared total file size in bytes
pub const PARAM_TOTAL_SIZE: &str = "resumableTotalSize";
/// Query/form field carrying the declared chunk count
pub const PARAM_TOTAL_CHUNKS: &str = "resumableTotalChunks";

/// Immutable snapshot of the protocol parameters for one request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadParameters {
    /// Opaque client-generated ID scoping all chunks of one logical upload;
    /// used as the chunk subdirectory name. An empty identifier is accepted
    /// (degenerate: all such sessions share one unnamed directory).
    pub identifier: String,

    /// Client-declared target filename (name only; the client controls the
    /// extension)
    pub filename: String,

    /// 1-based position of this chunk
    pub chunk_number: u32,

    /// Client-declared total byte size of the complete file
    pub total_size: u64,

    /// Client-declared chunk count
    pub total_chunks: u32,
}

impl UploadParameters {
    /// Build a snapshot from any request-parameter lookup capability.
    ///
    /// Pure transformation; the lookup is consulted once per field.
    pub fn from_lookup<'a, F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        Self {
            identifier: trimmed(lookup(PARAM_IDENTIFIER)),
            filename: trimmed(lookup(PARAM_FILENAME)),
            chunk_number: parse_or_zero(lookup(PARAM_CHUNK_NUMBER)),
            total_size: parse_or_zero(lookup(PARAM_TOTAL_SIZE)),
            total_chunks: parse_or_zero(lookup(PARAM_TOTAL_CHUNKS)),
        }
    }

    /// Build a snapshot from a decoded query/form parameter map
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        Self::from_lookup(|name| map.get(name).map(String::as_str))
    }
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

fn parse_or_zero<T>(value: Option<&str>) -> T
where
    T: std::str::FromStr + Default,
{
    value
        .map(str::trim)
        .and_then(|v| v.parse().ok())
        .unwrap_or_default()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn full_parameter_set_extracts_all_fields() {
        let params = UploadParameters::from_map(&map(&[
            (PARAM_IDENTIFIER, "164041-video_mp4"),
            (PARAM_FILENAME, "video.mp4"),
            (PARAM_CHUNK_NUMBER, "3"),
            (PARAM_TOTAL_SIZE, "164041"),
            (PARAM_TOTAL_CHUNKS, "5"),
        ]));

        assert_eq!(params.identifier, "164041-video_mp4");
        assert_eq!(params.filename, "video.mp4");
        assert_eq!(params.chunk_number, 3);
        assert_eq!(params.total_size, 164041);
        assert_eq!(params.total_chunks, 5);
    }

    #[test]
    fn missing_parameters_default_to_zero_values() {
        let params = UploadParameters::from_map(&HashMap::new());

        assert_eq!(params, UploadParameters::default());
        assert_eq!(params.identifier, "");
        assert_eq!(params.chunk_number, 0);
        assert_eq!(params.total_size, 0);
    }

    #[test]
    fn string_fields_are_trimmed() {
        let params = UploadParameters::from_map(&map(&[
            (PARAM_IDENTIFIER, "  abc-123  "),
            (PARAM_FILENAME, " report.pdf\t"),
        ]));

        assert_eq!(params.identifier, "abc-123");
        assert_eq!(params.filename, "report.pdf");
    }

    #[test]
    fn non_numeric_input_coerces_to_zero_without_error() {
        let params = UploadParameters::from_map(&map(&[
            (PARAM_CHUNK_NUMBER, "three"),
            (PARAM_TOTAL_SIZE, "12MB"),
            (PARAM_TOTAL_CHUNKS, "-4"),
        ]));

        assert_eq!(params.chunk_number, 0);
        assert_eq!(params.total_size, 0);
        assert_eq!(params.total_chunks, 0, "negative input coerces to 0 for u32");
    }

    #[test]
    fn numeric_fields_tolerate_surrounding_whitespace() {
        let params = UploadParameters::from_map(&map(&[(PARAM_CHUNK_NUMBER, " 7 ")]));
        assert_eq!(params.chunk_number, 7);
    }
}
