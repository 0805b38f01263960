// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Sandbox` record: one per-user container's durable catalog entry.
//!
//! This is the row shape persisted by `clawbowl-storage`. It carries no I/O
//! itself; the catalog and instance manager are the only writers.

use crate::user::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Sandbox lifecycle state. See the instance manager's state machine for the
/// full transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SandboxState {
    Creating,
    Running,
    Stopped,
    Error,
}

impl fmt::Display for SandboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SandboxState::Creating => "creating",
            SandboxState::Running => "running",
            SandboxState::Stopped => "stopped",
            SandboxState::Error => "error",
        };
        write!(f, "{s}")
    }
}

impl SandboxState {
    /// Parse from the catalog's stored string form. Unknown values are
    /// rejected rather than silently coerced — a corrupt row should surface
    /// loudly rather than be treated as e.g. `stopped`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "creating" => Some(Self::Creating),
            "running" => Some(Self::Running),
            "stopped" => Some(Self::Stopped),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// One user's dedicated sandbox container, as tracked by the catalog.
///
/// Invariants (enforced by `clawbowl-storage`, not by this type):
/// - exactly one row per `user_id`
/// - `port` is unique across all rows and within the configured range
/// - `container_name` is unique
/// - `gateway_token` only changes on destroy+recreate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sandbox {
    pub user_id: UserId,
    pub container_name: String,
    pub container_id: Option<String>,
    pub port: u16,
    pub state: SandboxState,
    pub gateway_token: String,
    pub config_path: PathBuf,
    pub data_path: PathBuf,
    pub created_at_epoch_ms: u64,
    pub last_active_at_epoch_ms: u64,
}

impl Sandbox {
    /// `data_path/workspace`, the sandbox's writable, container-shared root.
    pub fn workspace_path(&self) -> PathBuf {
        self.data_path.join("workspace")
    }

    /// `data_path/snapshots`, out of the C8/C9 read path but produced by the
    /// snapshot service.
    pub fn snapshots_path(&self) -> PathBuf {
        self.data_path.join("snapshots")
    }

    /// `config_path/cron/jobs.json`, consulted by the idle reaper.
    pub fn cron_jobs_path(&self) -> PathBuf {
        self.config_path.join("cron").join("jobs.json")
    }

    /// `data_path/workspace/.alerts.jsonl`, tailed by the alert monitor.
    pub fn alerts_path(&self) -> PathBuf {
        self.workspace_path().join(".alerts.jsonl")
    }

    /// The stable session key pinning all of this user's requests to one
    /// upstream agent session.
    pub fn session_key(&self) -> String {
        format!("clawbowl-{}", self.user_id.as_str())
    }
}

/// Derive the conventional container name for a user: `clawbowl-<first 8
/// chars of user id>`.
pub fn container_name_for(user_id: &UserId) -> String {
    format!("clawbowl-{}", crate::id::short(user_id.as_str(), 8))
}

#[cfg(test)]
#[path = "sandbox_tests.rs"]
mod tests;
