// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process configuration (spec.md §6 "Process configuration (enumerated)").
//! Loaded eagerly from environment variables at startup; malformed or
//! missing required values surface as a typed error rather than a panic.

use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{field} must be set")]
    Missing { field: &'static str },
    #[error("{field} is not a valid {kind}: {value:?}")]
    Invalid { field: &'static str, kind: &'static str, value: String },
    #[error("openclaw_port_range_start ({start}) must be <= openclaw_port_range_end ({end})")]
    InvalidPortRange { start: u16, end: u16 },
}

#[derive(Debug, Clone, clap::Args)]
pub struct Settings {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    #[arg(long, env = "JWT_EXPIRE_MINUTES", default_value_t = 60)]
    pub jwt_expire_minutes: u32,

    #[arg(long, env = "ZENMUX_API_KEY")]
    pub zenmux_api_key: String,

    #[arg(long, env = "ZENMUX_BASE_URL", default_value = "https://api.zenmux.ai")]
    pub zenmux_base_url: String,

    #[arg(long, env = "OPENCLAW_IMAGE")]
    pub openclaw_image: String,

    #[arg(long, env = "OPENCLAW_PORT_RANGE_START", default_value_t = 20000)]
    pub openclaw_port_range_start: u16,

    #[arg(long, env = "OPENCLAW_PORT_RANGE_END", default_value_t = 21000)]
    pub openclaw_port_range_end: u16,

    #[arg(long, env = "OPENCLAW_DATA_DIR")]
    pub openclaw_data_dir: PathBuf,

    #[arg(long, env = "OPENCLAW_CONTAINER_MEMORY", default_value_t = 1024)]
    pub openclaw_container_memory: u64,

    #[arg(long, env = "OPENCLAW_CONTAINER_CPUS", default_value_t = 1.0)]
    pub openclaw_container_cpus: f64,

    #[arg(long, env = "OPENCLAW_NODE_MAX_OLD_SPACE", default_value_t = 512)]
    pub openclaw_node_max_old_space: u64,

    #[arg(long, env = "OPENCLAW_IDLE_TIMEOUT_MINUTES", default_value_t = 30)]
    pub openclaw_idle_timeout_minutes: u64,

    #[arg(long, env = "OPENCLAW_HOST_MODULES")]
    pub openclaw_host_modules: Option<PathBuf>,

    #[arg(long, env = "OPENCLAW_HOST_BIN")]
    pub openclaw_host_bin: Option<PathBuf>,

    #[arg(long, env = "APNS_KEY_ID")]
    pub apns_key_id: Option<String>,

    #[arg(long, env = "APNS_TEAM_ID")]
    pub apns_team_id: Option<String>,

    #[arg(long, env = "APNS_PRIVATE_KEY_PATH")]
    pub apns_private_key_path: Option<PathBuf>,

    #[arg(long, env = "TAVILY_API_KEY")]
    pub tavily_api_key: Option<String>,
}

impl Settings {
    /// Validate cross-field invariants eagerly, right after clap has parsed
    /// `std::env`/argv into this struct.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.database_url.is_empty() {
            return Err(SettingsError::Missing { field: "database_url" });
        }
        if self.openclaw_port_range_start > self.openclaw_port_range_end {
            return Err(SettingsError::InvalidPortRange {
                start: self.openclaw_port_range_start,
                end: self.openclaw_port_range_end,
            });
        }
        Ok(())
    }

    pub fn port_range(&self) -> RangeInclusive<u16> {
        self.openclaw_port_range_start..=self.openclaw_port_range_end
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.openclaw_idle_timeout_minutes * 60)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
