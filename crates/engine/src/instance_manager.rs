// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance Manager (C7): the sandbox state machine, its catalog-backed
//! persistence, and the two background loops (idle reaper, health
//! reconciler) that drive it without a client request in flight.

use crate::config_materializer::{self, ConfigRenderError, RenderInput};
use crate::pairing;
use crate::port_allocator::{PortAllocError, PortAllocator};
use crate::readiness;
use crate::workspace_init::{self, TemplateEntry, WorkspaceInitError};
use clawbowl_adapters::{
    BindMount, ContainerRuntime, ContainerSpec, MountMode, PortPublish, RestartPolicy, RuntimeError,
    RuntimeStatus,
};
use clawbowl_core::{container_name_for, Clock, Sandbox, SandboxState, TierCatalog, User, UserId};
use clawbowl_storage::{Catalog, CatalogError, NewSandbox};
use rand::Rng;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

const MAX_PORT_RETRIES: u32 = 5;
const COLD_READY_TIMEOUT: Duration = Duration::from_secs(120);
const WARM_READY_TIMEOUT: Duration = Duration::from_secs(30);
const STOP_GRACE: Duration = Duration::from_secs(10);
const PAIRING_RETRIES: u32 = 5;
const IDLE_REAP_INTERVAL: Duration = Duration::from_secs(300);
const HEALTH_RECONCILE_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("no ports available")]
    NoPortsAvailable(#[from] PortAllocError),

    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("config render error: {0}")]
    ConfigRender(#[from] ConfigRenderError),

    #[error("workspace init error: {0}")]
    WorkspaceInit(#[from] WorkspaceInitError),

    #[error("no sandbox record for user {0}")]
    NoInstance(String),
}

impl From<RuntimeError> for InstanceError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::NotFound(name) => InstanceError::RuntimeUnavailable(format!("{name} not found")),
            RuntimeError::Unavailable(msg) => InstanceError::RuntimeUnavailable(msg),
        }
    }
}

pub struct InstanceManagerConfig {
    pub data_root: PathBuf,
    pub port_range: RangeInclusive<u16>,
    pub idle_timeout: Duration,
    pub zenmux_api_key: String,
    pub openclaw_image: String,
    pub gateway_container_port: u16,
    pub config_template: String,
    pub workspace_template: Vec<TemplateEntry>,
}

/// Owns the sandbox state machine and its catalog-backed persistence.
/// Per-user `ensure_running`/`destroy` calls are serialized by a lazily
/// created, never-evicted per-user mutex (spec.md §4.7, §9 "per-user
/// serialization" design note).
pub struct InstanceManager<C, R, CL> {
    catalog: Arc<C>,
    runtime: Arc<R>,
    clock: CL,
    tier_catalog: TierCatalog,
    config: InstanceManagerConfig,
    port_allocator: PortAllocator,
    user_locks: Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl<C, R, CL> InstanceManager<C, R, CL>
where
    C: Catalog,
    R: ContainerRuntime,
    CL: Clock,
{
    pub fn new(catalog: Arc<C>, runtime: Arc<R>, clock: CL, tier_catalog: TierCatalog, config: InstanceManagerConfig) -> Self {
        let port_allocator = PortAllocator::new(config.port_range.clone());
        Self {
            catalog,
            runtime,
            clock,
            tier_catalog,
            config,
            port_allocator,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        self.user_locks
            .lock()
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn data_path(&self, user_id: &UserId) -> PathBuf {
        self.config.data_root.join(user_id.as_str())
    }

    fn config_path(&self, user_id: &UserId) -> PathBuf {
        self.data_path(user_id).join("config")
    }

    /// Idempotent. Concurrent calls for the same user serialize on a
    /// per-user mutex held across the entire transition (spec.md §4.7).
    pub async fn ensure_running(&self, user: &User) -> Result<Sandbox, InstanceError> {
        let lock = self.lock_for(&user.id);
        let _guard = lock.lock().await;

        match self.catalog.get_by_user(&user.id).await? {
            None => self.create(user).await,
            Some(sandbox) => match sandbox.state {
                SandboxState::Running => self.handle_running(user, sandbox).await,
                SandboxState::Stopped => self.start_existing(user, sandbox, false).await,
                SandboxState::Error | SandboxState::Creating => {
                    self.start_existing(user, sandbox, true).await
                }
            },
        }
    }

    async fn handle_running(&self, user: &User, sandbox: Sandbox) -> Result<Sandbox, InstanceError> {
        match self.runtime.inspect(&sandbox.container_name).await {
            Ok(RuntimeStatus::Running) => {
                self.catalog.touch_last_active(&user.id, self.clock.epoch_ms()).await?;
                Ok(sandbox)
            }
            _ => self.start_existing(user, sandbox, false).await,
        }
    }

    async fn start_existing(
        &self,
        user: &User,
        sandbox: Sandbox,
        use_restart: bool,
    ) -> Result<Sandbox, InstanceError> {
        let hooks_token = config_materializer::read_hooks_token(&sandbox.config_path).await;
        let tier = self.resolve_tier(&user.subscription_tier);
        let input = RenderInput {
            user_id: &user.id,
            tier: &tier,
            zenmux_api_key: &self.config.zenmux_api_key,
            gateway_token: &sandbox.gateway_token,
            hooks_token,
        };
        config_materializer::render_to_disk(&self.config.config_template, &input, &sandbox.config_path)
            .await?;

        let result = if use_restart {
            self.runtime.restart(&sandbox.container_name, STOP_GRACE).await
        } else {
            self.runtime.start(&sandbox.container_name).await
        };

        match result {
            Ok(()) => {}
            Err(RuntimeError::NotFound(_)) => {
                self.catalog.delete(&user.id).await?;
                return self.create(user).await;
            }
            Err(e) => {
                self.catalog.mark_error(&user.id).await?;
                return Err(e.into());
            }
        }

        readiness::wait_ready(sandbox.port, &sandbox.gateway_token, WARM_READY_TIMEOUT).await;

        if let Some(container_id) = &sandbox.container_id {
            self.catalog.mark_running(&user.id, container_id).await?;
        }
        self.catalog.touch_last_active(&user.id, self.clock.epoch_ms()).await?;

        self.catalog
            .get_by_user(&user.id)
            .await?
            .ok_or_else(|| InstanceError::NoInstance(user.id.to_string()))
    }

    async fn create(&self, user: &User) -> Result<Sandbox, InstanceError> {
        let tier = self.resolve_tier(&user.subscription_tier);
        let container_name = container_name_for(&user.id);
        let data_path = self.data_path(&user.id);
        let config_path = self.config_path(&user.id);
        let workspace_path = data_path.join("workspace");
        let gateway_token = generate_token();

        let sandbox = self
            .insert_with_port_retry(user, &container_name, &config_path, &data_path, &gateway_token)
            .await?;

        let input = RenderInput {
            user_id: &user.id,
            tier: &tier,
            zenmux_api_key: &self.config.zenmux_api_key,
            gateway_token: &sandbox.gateway_token,
            hooks_token: None,
        };
        config_materializer::render_to_disk(&self.config.config_template, &input, &config_path).await?;

        let vars = workspace_vars(user, self.clock.epoch_ms());
        workspace_init::init(&self.config.workspace_template, &vars, &workspace_path, &config_path).await?;

        let spec = ContainerSpec {
            image: self.config.openclaw_image.clone(),
            name: container_name.clone(),
            ports: vec![PortPublish {
                container_port: self.config.gateway_container_port,
                host_ip: "127.0.0.1".to_string(),
                host_port: sandbox.port,
            }],
            mounts: vec![
                BindMount {
                    host_path: workspace_path.to_string_lossy().to_string(),
                    container_path: "/workspace".to_string(),
                    mode: MountMode::ReadWrite,
                },
                BindMount {
                    host_path: config_path.to_string_lossy().to_string(),
                    container_path: "/config".to_string(),
                    mode: MountMode::ReadWrite,
                },
            ],
            env: HashMap::new(),
            memory_bytes: tier.container_memory_mb * 1024 * 1024,
            cpu_quota: tier.container_cpus,
            restart_policy: RestartPolicy::UnlessStopped,
            init: true,
        };

        match self.runtime.run(spec).await {
            Ok(container_id) => {
                self.catalog.mark_running(&user.id, &container_id).await?;
            }
            Err(e) => {
                self.catalog.mark_error(&user.id).await?;
                return Err(e.into());
            }
        }

        readiness::wait_ready(sandbox.port, &sandbox.gateway_token, COLD_READY_TIMEOUT).await;
        let epoch_ms = self.clock.epoch_ms();
        pairing::auto_approve(&config_path, PAIRING_RETRIES, || epoch_ms).await;
        self.catalog.touch_last_active(&user.id, epoch_ms).await?;

        self.catalog
            .get_by_user(&user.id)
            .await?
            .ok_or_else(|| InstanceError::NoInstance(user.id.to_string()))
    }

    async fn insert_with_port_retry(
        &self,
        user: &User,
        container_name: &str,
        config_path: &std::path::Path,
        data_path: &std::path::Path,
        gateway_token: &str,
    ) -> Result<Sandbox, InstanceError> {
        for _ in 0..MAX_PORT_RETRIES {
            let used: HashSet<u16> = self.catalog.used_ports().await?.into_iter().collect();
            let used: Vec<u16> = used.into_iter().collect();
            let port = self.port_allocator.allocate(&used)?;

            let new_sandbox = NewSandbox {
                user_id: user.id.clone(),
                container_name: container_name.to_string(),
                port,
                gateway_token: gateway_token.to_string(),
                config_path: config_path.to_path_buf(),
                data_path: data_path.to_path_buf(),
                created_at_epoch_ms: self.clock.epoch_ms(),
            };

            match self.catalog.try_insert_creating(new_sandbox).await {
                Ok(sandbox) => return Ok(sandbox),
                Err(CatalogError::PortConflict(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(InstanceError::NoPortsAvailable(PortAllocError::NoPortsAvailable))
    }

    pub async fn destroy(&self, user_id: &UserId) -> Result<(), InstanceError> {
        let lock = self.lock_for(user_id);
        let _guard = lock.lock().await;

        if let Some(sandbox) = self.catalog.get_by_user(user_id).await? {
            let _ = self.runtime.remove(&sandbox.container_name, true).await;
            self.catalog.delete(user_id).await?;
        }
        Ok(())
    }

    /// Idle reaper tick: stop `running` sandboxes idle past the timeout,
    /// unless they have an enabled cron job pending (spec.md §4.7).
    pub async fn reap_idle_once(&self) -> Result<(), InstanceError> {
        let now = self.clock.epoch_ms();
        let idle_ms = self.config.idle_timeout.as_millis() as u64;

        for sandbox in self.catalog.list_running().await? {
            if now.saturating_sub(sandbox.last_active_at_epoch_ms) < idle_ms {
                continue;
            }
            if has_enabled_cron_job(&sandbox.cron_jobs_path()).await {
                continue;
            }
            tracing::info!(user_id = %sandbox.user_id, "reaping idle sandbox");
            if self.runtime.stop(&sandbox.container_name, STOP_GRACE).await.is_ok() {
                self.catalog.mark_stopped(&sandbox.user_id).await?;
            }
        }
        Ok(())
    }

    /// Health reconciler tick: demote `running` sandboxes the runtime no
    /// longer reports as alive to `error`. Never auto-heals (spec.md §4.7).
    pub async fn reconcile_health_once(&self) -> Result<(), InstanceError> {
        for sandbox in self.catalog.list_running().await? {
            match self.runtime.inspect(&sandbox.container_name).await {
                Ok(RuntimeStatus::Running) => {}
                _ => {
                    tracing::warn!(user_id = %sandbox.user_id, "sandbox runtime not alive, marking error");
                    self.catalog.mark_error(&sandbox.user_id).await?;
                }
            }
        }
        Ok(())
    }

    fn resolve_tier(&self, tier: &str) -> clawbowl_core::TierProfile {
        self.tier_catalog
            .resolve(tier)
            .cloned()
            .unwrap_or_else(|| clawbowl_core::default_catalog().resolve("free").unwrap().clone())
    }
}

/// Run `reap_idle_once` on `IDLE_REAP_INTERVAL`, forever, until cancelled.
pub async fn run_idle_reaper_loop<C, R, CL>(manager: Arc<InstanceManager<C, R, CL>>)
where
    C: Catalog,
    R: ContainerRuntime,
    CL: Clock,
{
    loop {
        tokio::time::sleep(IDLE_REAP_INTERVAL).await;
        if let Err(e) = manager.reap_idle_once().await {
            tracing::warn!(error = %e, "idle reaper tick failed");
        }
    }
}

/// Run `reconcile_health_once` on `HEALTH_RECONCILE_INTERVAL`, forever,
/// until cancelled.
pub async fn run_health_reconciler_loop<C, R, CL>(manager: Arc<InstanceManager<C, R, CL>>)
where
    C: Catalog,
    R: ContainerRuntime,
    CL: Clock,
{
    loop {
        tokio::time::sleep(HEALTH_RECONCILE_INTERVAL).await;
        if let Err(e) = manager.reconcile_health_once().await {
            tracing::warn!(error = %e, "health reconciler tick failed");
        }
    }
}

async fn has_enabled_cron_job(path: &std::path::Path) -> bool {
    let Ok(bytes) = tokio::fs::read(path).await else { return false };
    let Ok(doc) = serde_json::from_slice::<Value>(&bytes) else { return false };
    let Some(jobs) = doc.get("jobs").and_then(Value::as_array) else { return false };
    jobs.iter().any(|job| job.get("enabled").and_then(Value::as_bool).unwrap_or(true))
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn workspace_vars(user: &User, now_epoch_ms: u64) -> HashMap<&'static str, String> {
    let mut vars = HashMap::new();
    vars.insert("user_name", user.id.as_str().to_string());
    vars.insert("user_language", "en".to_string());
    vars.insert("user_timezone", "UTC".to_string());
    vars.insert("agent_name", "clawbowl".to_string());
    vars.insert("creation_date", now_epoch_ms.to_string());
    vars
}

#[cfg(test)]
#[path = "instance_manager_tests.rs"]
mod tests;
