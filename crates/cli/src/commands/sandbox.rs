// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `clawbowld sandbox {ls,destroy,snapshot}`: operator inspection and
//! maintenance commands, bypassing the (out-of-scope) HTTP router entirely.

use crate::orchestrator::OrchestratorHandle;
use crate::settings::Settings;
use clawbowl_core::UserId;
use clawbowl_engine::{create_snapshot, list_snapshots};
use clawbowl_storage::Catalog as _;

pub async fn sandbox_ls(settings: Settings) -> anyhow::Result<()> {
    let handle = OrchestratorHandle::from_settings(&settings).await?;
    let sandboxes = handle.catalog.list_all().await?;
    for sandbox in &sandboxes {
        println!(
            "{}\t{}\t{}\tport={}",
            sandbox.user_id, sandbox.state, sandbox.container_name, sandbox.port
        );
    }
    if sandboxes.is_empty() {
        println!("no sandboxes recorded");
    }
    Ok(())
}

pub async fn sandbox_destroy(settings: Settings, user: String) -> anyhow::Result<()> {
    let handle = OrchestratorHandle::from_settings(&settings).await?;
    let user_id = UserId::new(user);
    handle.manager.destroy(&user_id).await?;
    println!("destroyed sandbox for {user_id}");
    Ok(())
}

pub async fn sandbox_snapshot(settings: Settings, user: String) -> anyhow::Result<()> {
    let handle = OrchestratorHandle::from_settings(&settings).await?;
    let user_id = UserId::new(user.as_str());
    let sandbox = handle
        .catalog
        .get_by_user(&user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no sandbox recorded for {user}"))?;

    let manifest = create_snapshot(&user, &sandbox.data_path, "manual").await?;
    println!(
        "snapshot {} created for {user} ({} bytes, {})",
        manifest.snap_id, manifest.files_size_bytes, manifest.files_hash
    );

    let snapshots = list_snapshots(&sandbox.data_path).await?;
    println!("{} total snapshot(s) on disk", snapshots.len());
    Ok(())
}
