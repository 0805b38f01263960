// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace snapshot/restore/retention, grounded on
//! `original_source/backend/app/services/snapshot_service.py`'s
//! tar+zstd-plus-manifest design. Streams through `async-compression`'s
//! zstd frontend and `tokio-tar` rather than shelling out to `tar`/`zstd`.

use async_compression::tokio::bufread::ZstdDecoder;
use async_compression::tokio::write::ZstdEncoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::{AsyncRead, BufReader};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("workspace not found: {0}")]
    WorkspaceNotFound(PathBuf),
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),
    #[error("integrity check failed: expected {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("manifest is not valid json: {0}")]
    InvalidManifest(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub user_id: String,
    pub snap_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub files_hash: String,
    pub files_size_bytes: u64,
    pub prev_snap_id: Option<String>,
}

fn snapshots_dir(data_path: &Path) -> PathBuf {
    data_path.join("snapshots")
}

fn workspace_dir(data_path: &Path) -> PathBuf {
    data_path.join("workspace")
}

async fn existing_snap_ids(snap_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut ids = Vec::new();
    if !tokio::fs::try_exists(snap_dir).await? {
        return Ok(ids);
    }
    let mut entries = tokio::fs::read_dir(snap_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                if name.len() == 6 && name.chars().all(|c| c.is_ascii_digit()) {
                    ids.push(name.to_string());
                }
            }
        }
    }
    ids.sort();
    Ok(ids)
}

async fn next_snap_id(snap_dir: &Path) -> std::io::Result<String> {
    let existing = existing_snap_ids(snap_dir).await?;
    match existing.last() {
        Some(last) => Ok(format!("{:06}", last.parse::<u64>().unwrap_or(0) + 1)),
        None => Ok("000001".to_string()),
    }
}

async fn sha256_file(path: &Path) -> std::io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("sha256:{digest:x}"))
}

/// Tar the workspace directory and compress it with zstd into
/// `data_path/snapshots/<snap_id>/files.tar.zst`, writing a sibling
/// `manifest.json`. Returns the manifest.
pub async fn create_snapshot(
    user_id: &str,
    data_path: &Path,
    source: &str,
) -> Result<Manifest, SnapshotError> {
    let ws_dir = workspace_dir(data_path);
    if !tokio::fs::try_exists(&ws_dir).await? {
        return Err(SnapshotError::WorkspaceNotFound(ws_dir));
    }

    let snap_dir = snapshots_dir(data_path);
    tokio::fs::create_dir_all(&snap_dir).await?;
    let snap_id = next_snap_id(&snap_dir).await?;
    let dest = snap_dir.join(&snap_id);
    tokio::fs::create_dir_all(&dest).await?;

    let archive_path = dest.join("files.tar.zst");
    let file = tokio::fs::File::create(&archive_path).await?;
    let mut encoder = ZstdEncoder::new(file);
    {
        let mut builder = tokio_tar::Builder::new(&mut encoder);
        builder.append_dir_all(".", &ws_dir).await?;
        builder.finish().await?;
    }
    tokio::io::AsyncWriteExt::shutdown(&mut encoder).await?;

    let files_hash = sha256_file(&archive_path).await?;
    let files_size_bytes = tokio::fs::metadata(&archive_path).await?.len();

    let existing = existing_snap_ids(&snap_dir).await?;
    let prev_snap_id = existing
        .iter()
        .rev()
        .find(|id| id.as_str() != snap_id.as_str())
        .cloned();

    let manifest = Manifest {
        user_id: user_id.to_string(),
        snap_id: snap_id.clone(),
        created_at: chrono::Utc::now(),
        source: source.to_string(),
        files_hash,
        files_size_bytes,
        prev_snap_id,
    };
    tokio::fs::write(dest.join("manifest.json"), serde_json::to_vec_pretty(&manifest)?).await?;

    tracing::info!(%snap_id, source, files_size_bytes, "workspace snapshot created");
    Ok(manifest)
}

/// List every snapshot's manifest for a user, oldest first, skipping
/// entries whose manifest is missing or unreadable.
pub async fn list_snapshots(data_path: &Path) -> std::io::Result<Vec<Manifest>> {
    let snap_dir = snapshots_dir(data_path);
    let mut manifests = Vec::new();
    for id in existing_snap_ids(&snap_dir).await? {
        let manifest_path = snap_dir.join(&id).join("manifest.json");
        if let Ok(bytes) = tokio::fs::read(&manifest_path).await {
            if let Ok(manifest) = serde_json::from_slice(&bytes) {
                manifests.push(manifest);
            }
        }
    }
    Ok(manifests)
}

/// Restore a snapshot's archive into the workspace directory, verifying the
/// archive's SHA-256 against the manifest first.
pub async fn restore_snapshot(data_path: &Path, snap_id: &str) -> Result<(), SnapshotError> {
    let snap_dir = snapshots_dir(data_path);
    let archive_path = snap_dir.join(snap_id).join("files.tar.zst");
    if !tokio::fs::try_exists(&archive_path).await? {
        return Err(SnapshotError::SnapshotNotFound(snap_id.to_string()));
    }

    let manifest_path = snap_dir.join(snap_id).join("manifest.json");
    if let Ok(bytes) = tokio::fs::read(&manifest_path).await {
        if let Ok(manifest) = serde_json::from_slice::<Manifest>(&bytes) {
            let actual = sha256_file(&archive_path).await?;
            if !manifest.files_hash.is_empty() && actual != manifest.files_hash {
                return Err(SnapshotError::IntegrityMismatch {
                    expected: manifest.files_hash,
                    actual,
                });
            }
        }
    }

    let ws_dir = workspace_dir(data_path);
    tokio::fs::create_dir_all(&ws_dir).await?;
    let file = tokio::fs::File::open(&archive_path).await?;
    let decoder: Box<dyn AsyncRead + Unpin + Send> = Box::new(ZstdDecoder::new(BufReader::new(file)));
    let mut archive = tokio_tar::Archive::new(decoder);
    archive.unpack(&ws_dir).await?;

    tracing::info!(snap_id, "workspace snapshot restored");
    Ok(())
}

/// Remove every snapshot beyond the newest `keep_count`, returning the
/// number of directories removed.
pub async fn cleanup_snapshots(data_path: &Path, keep_count: usize) -> std::io::Result<usize> {
    let snap_dir = snapshots_dir(data_path);
    let existing = existing_snap_ids(&snap_dir).await?;
    if existing.len() <= keep_count {
        return Ok(0);
    }
    let to_remove = &existing[..existing.len() - keep_count];
    let mut removed = 0;
    for id in to_remove {
        match tokio::fs::remove_dir_all(snap_dir.join(id)).await {
            Ok(()) => removed += 1,
            Err(err) => tracing::warn!(snap_id = %id, %err, "failed to remove old snapshot"),
        }
    }
    Ok(removed)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
