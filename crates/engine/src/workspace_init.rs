// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace Initializer (C4).
//!
//! Populates a new sandbox's workspace from a template tree. Idempotent:
//! existing destination files are never overwritten, so re-running `init`
//! on a pre-existing sandbox is a no-op (spec.md §4.4, tested round-trip
//! property in §8).

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum WorkspaceInitError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One template entry: a destination path relative to the workspace root,
/// and file contents that may reference `{user_name}`-style variables.
pub struct TemplateEntry {
    pub relative_path: String,
    pub contents: String,
}

/// Render `{var}` placeholders found in `TemplateEntry::contents`.
pub fn substitute(contents: &str, vars: &HashMap<&str, String>) -> String {
    let mut out = contents.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// Write `entries` under `workspace_dir`, skipping any destination that
/// already exists, then ensure the always-present subdirectories and seed
/// files.
pub async fn init(
    entries: &[TemplateEntry],
    vars: &HashMap<&str, String>,
    workspace_dir: &Path,
    config_dir: &Path,
) -> Result<(), WorkspaceInitError> {
    fs::create_dir_all(workspace_dir).await?;
    fs::create_dir_all(config_dir).await?;

    for entry in entries {
        let dest = workspace_dir.join(&entry.relative_path);
        if fs::metadata(&dest).await.is_ok() {
            continue;
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }
        let rendered = substitute(&entry.contents, vars);
        fs::write(&dest, rendered).await?;
        set_world_readable(&dest).await?;
    }

    ensure_memory_dir(workspace_dir).await?;
    ensure_cron_jobs_file(config_dir).await?;
    Ok(())
}

async fn ensure_memory_dir(workspace_dir: &Path) -> Result<(), WorkspaceInitError> {
    fs::create_dir_all(workspace_dir.join("memory")).await?;
    fs::create_dir_all(workspace_dir.join("media").join("inbound")).await?;
    Ok(())
}

/// Seed `config_dir/cron/jobs.json` with `{version:1, jobs:[]}` if absent.
async fn ensure_cron_jobs_file(config_dir: &Path) -> Result<(), WorkspaceInitError> {
    let cron_dir = config_dir.join("cron");
    fs::create_dir_all(&cron_dir).await?;
    let jobs_path = cron_dir.join("jobs.json");
    if fs::metadata(&jobs_path).await.is_ok() {
        return Ok(());
    }
    fs::write(&jobs_path, r#"{"version":1,"jobs":[]}"#).await?;
    set_world_readable(&jobs_path).await?;
    Ok(())
}

#[cfg(unix)]
async fn set_world_readable(path: &Path) -> Result<(), WorkspaceInitError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path).await?.permissions();
    perms.set_mode(perms.mode() | 0o444);
    fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_world_readable(_path: &Path) -> Result<(), WorkspaceInitError> {
    Ok(())
}

#[cfg(test)]
#[path = "workspace_init_tests.rs"]
mod tests;
