//! End-to-end upload flow through the public API
//!
//! Drives a full resumable.js session against the axum router: probe every
//! chunk, upload the missing ones, resume after a simulated interruption,
//! and verify the assembled file.

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use resumable_upload::{Config, UploadEngine};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot()

const BOUNDARY: &str = "----IntegrationTestBoundary";
const IDENTIFIER: &str = "95400-report_pdf";
const FILENAME: &str = "report.pdf";

fn setup() -> (Router, Arc<UploadEngine>, TempDir) {
    let temp = TempDir::new().unwrap();
    let config = Config {
        chunk_dir: temp.path().join("chunks"),
        upload_dir: temp.path().join("uploads"),
        ..Config::default()
    };
    fs::create_dir_all(&config.upload_dir).unwrap();

    let engine = Arc::new(UploadEngine::new(config));
    let app = resumable_upload::api::create_router(engine.clone());
    (app, engine, temp)
}

fn probe(chunk_number: u32, total_size: u64, total_chunks: u32) -> Request<Body> {
    Request::builder()
        .uri(format!(
            "/upload?resumableIdentifier={IDENTIFIER}&resumableFilename={FILENAME}\
             &resumableChunkNumber={chunk_number}&resumableTotalSize={total_size}\
             &resumableTotalChunks={total_chunks}"
        ))
        .body(Body::empty())
        .unwrap()
}

fn upload(chunk_number: u32, total_size: u64, total_chunks: u32, data: &str) -> Request<Body> {
    let fields = [
        ("resumableIdentifier", IDENTIFIER.to_string()),
        ("resumableFilename", FILENAME.to_string()),
        ("resumableChunkNumber", chunk_number.to_string()),
        ("resumableTotalSize", total_size.to_string()),
        ("resumableTotalChunks", total_chunks.to_string()),
    ];

    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"blob\"\r\n\
         Content-Type: application/octet-stream\r\n\
         \r\n\
         {data}\r\n\
         --{BOUNDARY}--\r\n"
    ));

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn interrupted_upload_resumes_and_assembles() {
    let (app, engine, _temp) = setup();
    let chunks = ["chunk-one!", "chunk-two!", "chunk-3!"];
    let total_size: u64 = chunks.iter().map(|c| c.len() as u64).sum();
    let total_chunks = chunks.len() as u32;

    // First session: probes all answer 204, then only chunks 1 and 2 make it.
    for number in 1..=total_chunks {
        let response = app
            .clone()
            .oneshot(probe(number, total_size, total_chunks))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
    for (i, data) in chunks.iter().take(2).enumerate() {
        let response = app
            .clone()
            .oneshot(upload(i as u32 + 1, total_size, total_chunks, data))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Second session: the client re-probes and skips what is already stored.
    for number in [1, 2] {
        let response = app
            .clone()
            .oneshot(probe(number, total_size, total_chunks))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::OK,
            "stored chunk {number} must answer 200 so the client skips it"
        );
    }
    let response = app
        .clone()
        .oneshot(probe(3, total_size, total_chunks))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The last chunk completes the upload.
    let response = app
        .clone()
        .oneshot(upload(3, total_size, total_chunks, chunks[2]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["completed"], true);

    let assembled = engine.config().upload_dir.join(FILENAME);
    assert_eq!(
        fs::read_to_string(&assembled).unwrap(),
        chunks.concat(),
        "assembled file is the chunks concatenated in order"
    );
    assert!(
        !engine.config().chunk_dir.join(IDENTIFIER).exists(),
        "chunk directory is removed after assembly"
    );
}

#[tokio::test]
async fn duplicate_chunk_uploads_do_not_corrupt_the_result() {
    let (app, engine, _temp) = setup();

    // Two chunks of 4 bytes; chunk 1 arrives twice (a retry after a lost
    // response), then chunk 2 completes the upload.
    for request in [
        upload(1, 8, 2, "AAAA"),
        upload(1, 8, 2, "AAAA"),
        upload(2, 8, 2, "BBBB"),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let assembled = engine.config().upload_dir.join(FILENAME);
    assert_eq!(fs::read_to_string(&assembled).unwrap(), "AAAABBBB");
}
