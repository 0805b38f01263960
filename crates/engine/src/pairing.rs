// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pairing Auto-Approver (C5).
//!
//! Promotes device-pairing requests the in-sandbox agent writes to
//! `devices/pending.json` into `devices/paired.json`, so the orchestrator's
//! own provisioned identity doesn't sit blocked behind manual approval
//! (spec.md §4.5).

use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Poll for `config_dir/devices/pending.json`; once it exists and is
/// non-empty, promote every entry into `paired.json` and clear
/// `pending.json`. Gives up silently after `retries` empty polls.
pub async fn auto_approve(config_dir: &Path, retries: u32, now_epoch_ms: impl Fn() -> u64) {
    let pending_path = config_dir.join("devices").join("pending.json");
    let paired_path = config_dir.join("devices").join("paired.json");

    for attempt in 0..retries {
        match read_pending(&pending_path).await {
            Some(entries) if !entries.is_empty() => {
                promote(&paired_path, entries, now_epoch_ms()).await;
                if let Err(e) = fs::write(&pending_path, "[]").await {
                    tracing::warn!(error = %e, "failed to clear pending.json after approval");
                }
                return;
            }
            _ => {
                if attempt + 1 < retries {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
            }
        }
    }
    tracing::warn!(path = %pending_path.display(), "no pairing request appeared within retry budget");
}

async fn read_pending(path: &Path) -> Option<Vec<Value>> {
    let bytes = fs::read(path).await.ok()?;
    serde_json::from_slice::<Vec<Value>>(&bytes).ok()
}

async fn promote(paired_path: &Path, entries: Vec<Value>, paired_at_epoch_ms: u64) {
    let mut existing: Vec<Value> = match fs::read(paired_path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(_) => Vec::new(),
    };

    for mut entry in entries {
        if let Value::Object(ref mut map) = entry {
            map.insert("approved".to_string(), json!(true));
            map.insert("pairedAt".to_string(), json!(paired_at_epoch_ms));
        }
        existing.push(entry);
    }

    if let Some(parent) = paired_path.parent() {
        let _ = fs::create_dir_all(parent).await;
    }
    if let Ok(bytes) = serde_json::to_vec_pretty(&existing) {
        if let Err(e) = fs::write(paired_path, bytes).await {
            tracing::warn!(error = %e, "failed to write paired.json");
        }
    }
}

#[cfg(test)]
#[path = "pairing_tests.rs"]
mod tests;
