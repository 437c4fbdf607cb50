//! HTTP surface for the resumable.js upload protocol
//!
//! Exposes the two endpoints the resumable.js client speaks against, both on
//! the same path:
//!
//! - `GET /upload` - chunk existence probe (200 = skip the chunk, 204 = send it)
//! - `POST /upload` - chunk upload (multipart/form-data)
//!
//! Plus the supporting endpoints:
//!
//! - `GET /health` - health check
//! - `GET /openapi.json` - OpenAPI specification
//!
//! resumable.js sends its parameters in the query string on GET and as
//! multipart form fields on POST; the handlers accept both and let form
//! fields take precedence.

use crate::engine::UploadEngine;
use crate::error::{Error, Result};
use crate::params::UploadParameters;
use crate::types::{Mode, UploadRequest, UploadedPart};
use axum::{
    Json, Router,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod openapi;

pub use openapi::ApiDoc;

/// Shared state for the upload handlers
#[derive(Clone)]
pub struct AppState {
    /// The chunk session engine behind every request
    pub engine: Arc<UploadEngine>,
}

/// Create the API router
///
/// # Routes
///
/// - `GET /upload` - Probe whether a chunk is already stored
/// - `POST /upload` - Store a chunk, assembling the file when complete
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(engine: Arc<UploadEngine>) -> Router {
    let state = AppState { engine };

    Router::new()
        .route("/upload", get(probe_chunk).post(upload_chunk))
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// GET /upload - Chunk existence probe
#[utoipa::path(
    get,
    path = "/upload",
    tag = "upload",
    params(
        ("resumableIdentifier" = String, Query, description = "Upload session identifier"),
        ("resumableFilename" = String, Query, description = "Client-declared filename"),
        ("resumableChunkNumber" = u32, Query, description = "1-based chunk number"),
        ("resumableTotalSize" = u64, Query, description = "Total upload size in bytes"),
        ("resumableTotalChunks" = u32, Query, description = "Total number of chunks")
    ),
    responses(
        (status = 200, description = "Chunk already stored, client skips it"),
        (status = 204, description = "Chunk not stored, client should upload it")
    )
)]
pub async fn probe_chunk(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> StatusCode {
    let params = UploadParameters::from_map(&query);
    let outcome = state
        .engine
        .probe(&UploadRequest::new(params))
        .await;

    status_code(outcome.status.http_status())
}

/// POST /upload - Store a chunk
#[utoipa::path(
    post,
    path = "/upload",
    tag = "upload",
    request_body(content = Vec<u8>, description = "Chunk payload plus resumable.js form fields (multipart/form-data)", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Chunk accepted; body reports whether the upload completed"),
        (status = 415, description = "Chunk rejected by the validator"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn upload_chunk(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> Response {
    let (fields, parts) = split_multipart(multipart).await;

    // Form fields win over the query string, matching what a resumable.js
    // POST actually carries.
    let mut lookup = query;
    lookup.extend(fields);
    let params = UploadParameters::from_map(&lookup);
    let request = UploadRequest::new(params).with_parts(parts);

    match state.engine.process(Mode::UploadChunk, &request).await {
        Ok(outcome) => {
            let status = status_code(outcome.status.http_status());
            let body = json!({
                "completed": outcome.completed,
                "assembled": outcome.assembled,
            });
            (status, Json(body)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "upload request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification")
    )
)]
pub async fn openapi_spec() -> Json<serde_json::Value> {
    Json(serde_json::to_value(ApiDoc::openapi()).unwrap_or_else(|_| json!({})))
}

/// Drain a multipart stream into text form fields and file parts.
///
/// A field carrying a filename becomes an [`UploadedPart`]; any other field
/// is read as UTF-8 text and contributes to parameter extraction. A field
/// whose body cannot be read is recorded as a failed part so the engine can
/// skip it instead of the request aborting mid-stream.
async fn split_multipart(mut multipart: Multipart) -> (HashMap<String, String>, Vec<UploadedPart>) {
    let mut fields = HashMap::new();
    let mut parts = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name {
            Some(file_name) => {
                let part = match field.bytes().await {
                    Ok(bytes) => UploadedPart::new(bytes.to_vec()),
                    Err(e) => UploadedPart::failed(e.to_string()),
                };
                parts.push(UploadedPart {
                    field_name: Some(name),
                    file_name: Some(file_name),
                    ..part
                });
            }
            None => {
                if let Ok(bytes) = field.bytes().await
                    && let Ok(value) = String::from_utf8(bytes.to_vec())
                {
                    fields.insert(name, value);
                }
            }
        }
    }

    (fields, parts)
}

fn status_code(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Start the API server on the configured bind address.
///
/// Binds a TCP listener and serves the router until the server is shut down.
///
/// # Example
///
/// ```no_run
/// use resumable_upload::{Config, UploadEngine};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = Arc::new(UploadEngine::new(Config::default()));
/// resumable_upload::api::start_api_server(engine).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(engine: Arc<UploadEngine>) -> Result<()> {
    let bind_address = engine.config().api.bind_address;
    let app = create_router(engine);

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;
    tracing::info!(address = %bind_address, "upload API listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::ApiServer(e.to_string()))?;

    tracing::info!("upload API stopped");
    Ok(())
}
