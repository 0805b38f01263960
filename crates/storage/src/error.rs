// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors from catalog operations.
///
/// `PortConflict`/`NameConflict` are distinguished from other database
/// errors so the instance manager can retry allocation with a fresh port
/// rather than surfacing a raw constraint violation (spec.md §4.1: "the
/// uniqueness constraint on `Sandbox.port` is the ground truth").
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("port {0} is already in use")]
    PortConflict(u16),

    #[error("container name {0:?} is already in use")]
    NameConflict(String),

    #[error("no sandbox record for user {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt sandbox row: {0}")]
    CorruptRow(String),
}
