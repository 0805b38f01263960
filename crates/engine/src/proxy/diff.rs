// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace diffing for `delta.file` detection (spec.md §4.8 "Workspace
//! diff for file detection").

use super::types::{guess_mime, ProxyDelta};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const PRUNED_PATHS: &[&str] = &["media/inbound"];

const PRUNED_BASENAMES: &[&str] = &[
    ".openclaw",
    ".git",
    "__pycache__",
    "memory",
    "skills",
    "excel_env",
    "venv",
    "env",
    ".venv",
    "node_modules",
    "lib",
];

/// `(size, mtime as millis since epoch)` for every file under a workspace,
/// keyed by the path relative to the workspace root.
pub type Snapshot = HashMap<String, (u64, u128)>;

/// Walk `workspace_dir`, pruning the directories spec.md enumerates (and any
/// entry whose name starts with `.` or `_`), and record `(size, mtime)` for
/// every remaining file.
pub async fn snapshot(workspace_dir: &Path) -> Snapshot {
    let mut out = Snapshot::new();
    walk(workspace_dir, workspace_dir, &mut out).await;
    out
}

fn is_pruned(relative: &Path, name: &str) -> bool {
    if name.starts_with('.') || name.starts_with('_') {
        return true;
    }
    if PRUNED_BASENAMES.contains(&name) {
        return true;
    }
    let relative_str = relative.to_string_lossy().replace('\\', "/");
    PRUNED_PATHS.iter().any(|pruned| relative_str == *pruned)
}

fn walk<'a>(
    root: &'a Path,
    dir: &'a Path,
    out: &'a mut Snapshot,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + 'a>> {
    Box::pin(async move {
        let Ok(mut entries) = tokio::fs::read_dir(dir).await else { return };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            let Ok(relative) = path.strip_prefix(root) else { continue };
            if is_pruned(relative, name) {
                continue;
            }
            let Ok(metadata) = entry.metadata().await else { continue };
            if metadata.is_dir() {
                walk(root, &path, out).await;
            } else if metadata.is_file() {
                let size = metadata.len();
                let mtime = metadata
                    .modified()
                    .ok()
                    .and_then(|m| m.duration_since(std::time::UNIX_EPOCH).ok())
                    .map(|d| d.as_millis())
                    .unwrap_or_default();
                out.insert(relative.to_string_lossy().replace('\\', "/"), (size, mtime));
            }
        }
    })
}

/// Compare two snapshots and produce one `delta.file` per path that is new
/// or whose `(size, mtime)` changed.
pub fn diff(before: &Snapshot, after: &Snapshot, workspace_dir: &Path) -> Vec<ProxyDelta> {
    let mut deltas = Vec::new();
    for (relative_path, (size, mtime)) in after {
        let changed = match before.get(relative_path) {
            Some(prior) => prior != &(*size, *mtime),
            None => true,
        };
        if !changed {
            continue;
        }
        let name = PathBuf::from(relative_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| relative_path.clone());
        let extension = PathBuf::from(relative_path)
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();
        deltas.push(ProxyDelta::File {
            name,
            path: workspace_dir.join(relative_path).to_string_lossy().to_string(),
            size: *size,
            mime: guess_mime(&extension).to_string(),
        });
    }
    deltas
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
