// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Catalog` trait: the durable, transactional source of truth for
//! `Sandbox` rows (spec.md §3/§5 "Catalog (database)").

use crate::error::CatalogError;
use async_trait::async_trait;
use clawbowl_core::{Sandbox, UserId};
use std::path::PathBuf;

/// Fields needed to insert a brand-new `creating` row. `port` and
/// `container_name` have already been chosen by the caller (typically the
/// port allocator plus `container_name_for`); the catalog is what turns that
/// choice into a durable fact or rejects it on conflict.
#[derive(Debug, Clone)]
pub struct NewSandbox {
    pub user_id: UserId,
    pub container_name: String,
    pub port: u16,
    pub gateway_token: String,
    pub config_path: PathBuf,
    pub data_path: PathBuf,
    pub created_at_epoch_ms: u64,
}

/// The transactional catalog of sandbox records.
///
/// Implementations must enforce the uniqueness invariants from spec.md §3
/// (`port`, `container_name`) at the storage layer, not merely in
/// application code, since `try_insert_creating` is the only place new
/// records are minted and concurrent callers race on it.
#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    /// Ports currently claimed by any sandbox row, used by the port
    /// allocator (C1) to compute the next free port.
    async fn used_ports(&self) -> Result<Vec<u16>, CatalogError>;

    /// Insert a new `creating` row. Fails with `PortConflict`/`NameConflict`
    /// if another row already claims the same port or name — the caller
    /// (instance manager) is expected to retry with a new port allocation.
    async fn try_insert_creating(&self, new: NewSandbox) -> Result<Sandbox, CatalogError>;

    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<Sandbox>, CatalogError>;

    /// Record a successful container start: persist `container_id` and flip
    /// to `running`.
    async fn mark_running(
        &self,
        user_id: &UserId,
        container_id: &str,
    ) -> Result<(), CatalogError>;

    async fn mark_stopped(&self, user_id: &UserId) -> Result<(), CatalogError>;

    async fn mark_error(&self, user_id: &UserId) -> Result<(), CatalogError>;

    /// Touch `last_active_at` to the given epoch-ms timestamp. Called on
    /// every successful client-facing operation (spec.md §3 invariants).
    async fn touch_last_active(
        &self,
        user_id: &UserId,
        epoch_ms: u64,
    ) -> Result<(), CatalogError>;

    /// Delete the row outright (explicit `destroy`, or re-creation after the
    /// runtime reports `not_found`).
    async fn delete(&self, user_id: &UserId) -> Result<(), CatalogError>;

    async fn list_running(&self) -> Result<Vec<Sandbox>, CatalogError>;

    async fn list_all(&self) -> Result<Vec<Sandbox>, CatalogError>;
}
