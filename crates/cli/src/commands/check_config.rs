// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clawbowld check-config`: validate settings and confirm the container
//! runtime is reachable, without starting any background loops.

use crate::orchestrator::OrchestratorHandle;
use crate::settings::Settings;
use clawbowl_storage::Catalog as _;

pub async fn check_config(settings: Settings) -> anyhow::Result<()> {
    settings.validate()?;
    tracing::info!("settings validated");

    let handle = OrchestratorHandle::from_settings(&settings).await?;
    let running = handle.catalog.list_running().await?;
    tracing::info!(running_sandboxes = running.len(), "catalog reachable");

    println!("configuration OK ({} sandboxes currently running)", running.len());
    Ok(())
}
