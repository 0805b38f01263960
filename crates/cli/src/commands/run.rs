// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clawbowld run`: the long-running process — wires the orchestrator and
//! spawns its three background loops (idle reaper, health reconciler, alert
//! monitor) to run forever alongside whatever out-of-scope HTTP router is
//! fronting it.

use crate::orchestrator::OrchestratorHandle;
use crate::settings::Settings;
use clawbowl_engine::{run_health_reconciler_loop, run_idle_reaper_loop};
use std::future::Future;

pub async fn run(settings: Settings) -> anyhow::Result<()> {
    settings.validate()?;
    let handle = OrchestratorHandle::from_settings(&settings).await?;

    tracing::info!(
        port_range_start = settings.openclaw_port_range_start,
        port_range_end = settings.openclaw_port_range_end,
        "orchestrator starting"
    );

    let idle_reaper = tokio::spawn(run_idle_reaper_loop(handle.manager.clone()));
    let health_reconciler = tokio::spawn(run_health_reconciler_loop(handle.manager.clone()));
    let alert_monitor = tokio::spawn(run_alert_monitor(handle.alert_monitor.clone()));

    tokio::select! {
        res = idle_reaper => forward_join(res, "idle reaper"),
        res = health_reconciler => forward_join(res, "health reconciler"),
        res = alert_monitor => forward_join(res, "alert monitor"),
    }

    Ok(())
}

fn run_alert_monitor(
    monitor: std::sync::Arc<
        clawbowl_engine::AlertMonitor<
            clawbowl_storage::SqliteCatalog,
            clawbowl_storage::SqliteDeviceTokenStore,
            clawbowl_adapters::HttpPushChannel,
        >,
    >,
) -> impl Future<Output = ()> {
    clawbowl_engine::run_alert_monitor_loop(monitor)
}

fn forward_join(res: Result<(), tokio::task::JoinError>, loop_name: &str) {
    if let Err(e) = res {
        tracing::error!(loop_name, error = %e, "background loop panicked");
    }
}
