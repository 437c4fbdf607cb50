//! Completeness check and final-file assembly

use crate::config::Config;
use crate::error::{Error, Result};
use crate::params::UploadParameters;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Is the upload for this identifier ready to assemble?
///
/// Sums the on-disk sizes of chunk files 1..=total_chunks (missing chunk
/// numbers contribute 0, never an error) and compares against the declared
/// total size. Under the strict policy (`require_all_chunks`, the default)
/// every chunk number must additionally exist, which closes the gap where a
/// retried oversized chunk pushes the sum past the total while another chunk
/// is still missing.
pub(super) async fn is_complete(
    config: &Config,
    params: &UploadParameters,
    basename: &str,
) -> bool {
    let chunk_dir = config.chunk_dir.join(&params.identifier);
    match fs::metadata(&chunk_dir).await {
        Ok(meta) if meta.is_dir() => {}
        _ => return false,
    }

    let mut stored_bytes: u64 = 0;
    let mut all_present = true;
    for number in 1..=params.total_chunks {
        match fs::metadata(chunk_file(&chunk_dir, basename, number)).await {
            Ok(meta) if meta.is_file() => stored_bytes += meta.len(),
            _ => all_present = false,
        }
    }

    let size_reached = stored_bytes >= params.total_size;
    if config.require_all_chunks {
        all_present && size_reached
    } else {
        size_reached
    }
}

/// Concatenate all chunk files in strict ascending chunk-number order into
/// `<upload_dir>/<final_name>`, then delete the per-identifier chunk
/// directory.
///
/// The upload directory must already exist — its absence is a deployment
/// error ([`Error::UploadDirMissing`]), never a client-retryable one. Any
/// other failure (destination not writable, an expected chunk unreadable)
/// returns the recoverable [`Error::Assembly`] without having deleted
/// anything.
pub(super) async fn assemble(
    config: &Config,
    params: &UploadParameters,
    basename: &str,
    final_name: &str,
) -> Result<PathBuf> {
    let upload_dir_ok = fs::metadata(&config.upload_dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !upload_dir_ok {
        return Err(Error::UploadDirMissing {
            path: config.upload_dir.clone(),
        });
    }

    let chunk_dir = config.chunk_dir.join(&params.identifier);
    let destination = config.upload_dir.join(final_name);

    let mut out = fs::File::create(&destination)
        .await
        .map_err(|e| Error::Assembly {
            path: destination.clone(),
            reason: format!("cannot open destination: {e}"),
        })?;

    for number in 1..=params.total_chunks {
        let path = chunk_file(&chunk_dir, basename, number);
        let mut chunk = fs::File::open(&path).await.map_err(|e| Error::Assembly {
            path: destination.clone(),
            reason: format!("chunk {number} unreadable at {}: {e}", path.display()),
        })?;
        tokio::io::copy(&mut chunk, &mut out)
            .await
            .map_err(|e| Error::Assembly {
                path: destination.clone(),
                reason: format!("write failed on chunk {number}: {e}"),
            })?;
    }

    out.flush().await.map_err(|e| Error::Assembly {
        path: destination.clone(),
        reason: format!("flush failed: {e}"),
    })?;
    drop(out);

    // The assembled file is the durable success signal; a failed chunk-dir
    // removal is worth a warning but not a failed request.
    if let Err(e) = fs::remove_dir_all(&chunk_dir).await {
        tracing::warn!(
            identifier = %params.identifier,
            chunk_dir = %chunk_dir.display(),
            error = %e,
            "failed to remove chunk directory after assembly"
        );
    }

    tracing::info!(
        identifier = %params.identifier,
        destination = %destination.display(),
        chunks = params.total_chunks,
        "assembled upload"
    );

    Ok(destination)
}

fn chunk_file(chunk_dir: &Path, basename: &str, number: u32) -> PathBuf {
    chunk_dir.join(format!("{basename}.part{number}"))
}
