//! OpenAPI documentation for the upload API
//!
//! Uses utoipa for compile-time spec generation; the spec is served at
//! `GET /openapi.json`.

use utoipa::OpenApi;

/// OpenAPI documentation for the resumable upload API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "resumable-upload API",
        version = "0.1.0",
        description = "Server-side endpoints for the resumable.js chunked upload protocol",
        license(name = "MIT OR Apache-2.0")
    ),
    paths(
        crate::api::probe_chunk,
        crate::api::upload_chunk,
        crate::api::health_check,
        crate::api::openapi_spec,
    ),
    components(schemas(
        crate::params::UploadParameters,
        crate::types::Mode,
        crate::types::ChunkStatus,
        crate::config::Config,
        crate::config::SweepConfig,
        crate::config::ApiConfig,
    )),
    tags(
        (name = "upload", description = "Chunk probes and uploads"),
        (name = "system", description = "Health check and OpenAPI spec"),
    )
)]
pub struct ApiDoc;
