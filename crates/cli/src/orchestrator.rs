// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `OrchestratorHandle`: the in-process API surface the explicitly
//! out-of-scope HTTP router would call. Wires together the catalog, the
//! container runtime, the push channel, and the engine's three subsystems
//! from validated `Settings`.

use crate::settings::Settings;
use clawbowl_adapters::{DockerContainerRuntime, HttpPushChannel, RuntimeError};
use clawbowl_core::{default_catalog, SystemClock};
use clawbowl_engine::{AlertMonitor, InstanceManager, InstanceManagerConfig, TemplateEntry};
use clawbowl_storage::{CatalogError, SqliteCatalog, SqliteDeviceTokenStore};
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"{
  "zenmux_api_key": "{{ ZENMUX_API_KEY }}",
  "max_tokens": {{ MAX_TOKENS }},
  "primary_model": "{{ PRIMARY_MODEL }}",
  "gateway_token": "{{ GATEWAY_TOKEN }}",
  "hooks_token": "{{ HOOKS_TOKEN }}"
}
"#;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("container runtime unavailable: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type Manager = InstanceManager<SqliteCatalog, DockerContainerRuntime, SystemClock>;

pub struct OrchestratorHandle {
    pub manager: Arc<Manager>,
    pub catalog: Arc<SqliteCatalog>,
    pub device_tokens: Arc<SqliteDeviceTokenStore>,
    pub alert_monitor: Arc<AlertMonitor<SqliteCatalog, SqliteDeviceTokenStore, HttpPushChannel>>,
}

impl OrchestratorHandle {
    pub async fn from_settings(settings: &Settings) -> Result<Self, OrchestratorError> {
        let catalog = Arc::new(SqliteCatalog::connect(&settings.database_url).await?);

        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&settings.database_url)
            .await?;
        let device_tokens = Arc::new(SqliteDeviceTokenStore::connect(pool).await?);

        let runtime = Arc::new(DockerContainerRuntime::connect_local()?);
        let push = Arc::new(HttpPushChannel::new(format!(
            "{}/v1/push",
            settings.zenmux_base_url.trim_end_matches('/')
        )));

        let config = InstanceManagerConfig {
            data_root: settings.openclaw_data_dir.clone(),
            port_range: settings.port_range(),
            idle_timeout: settings.idle_timeout(),
            zenmux_api_key: settings.zenmux_api_key.clone(),
            openclaw_image: settings.openclaw_image.clone(),
            gateway_container_port: 8080,
            config_template: DEFAULT_CONFIG_TEMPLATE.to_string(),
            workspace_template: default_workspace_template(),
        };

        let manager = Arc::new(InstanceManager::new(
            catalog.clone(),
            runtime,
            SystemClock,
            default_catalog(),
            config,
        ));

        let alert_monitor =
            Arc::new(AlertMonitor::new(catalog.clone(), device_tokens.clone(), push));

        Ok(Self { manager, catalog, device_tokens, alert_monitor })
    }
}

fn default_workspace_template() -> Vec<TemplateEntry> {
    Vec::new()
}
