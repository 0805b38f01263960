// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clawbowl-engine: the three request-facing subsystems built on top of
//! `clawbowl-core`/`clawbowl-storage`/`clawbowl-adapters` — the instance
//! lifecycle manager (C1/C2/C4/C5/C6/C7), the request-aware SSE proxy (C8),
//! and the alert monitor (C9) — plus the warmup handle service (C10) and the
//! supplemented snapshot/tier-strategy facilities.

pub mod alert_monitor;
pub mod config_materializer;
pub mod instance_manager;
pub mod pairing;
pub mod port_allocator;
pub mod proxy;
pub mod readiness;
pub mod snapshot;
pub mod tier;
pub mod warmup;
pub mod workspace_init;

pub use alert_monitor::{run_alert_monitor_loop, AlertMonitor};
pub use config_materializer::{read_hooks_token, render, render_to_disk, ConfigRenderError, RenderInput};
pub use instance_manager::{
    run_health_reconciler_loop, run_idle_reaper_loop, InstanceError, InstanceManager,
    InstanceManagerConfig,
};
pub use port_allocator::{PortAllocError, PortAllocator};
pub use snapshot::{cleanup_snapshots, create_snapshot, list_snapshots, restore_snapshot, SnapshotError};
pub use tier::{ApiKeyStrategy, KeyStrategyResolver};
pub use warmup::{warmup, DeviceIdentity, WarmupHandle};
pub use workspace_init::{TemplateEntry, WorkspaceInitError};
