// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `sqlx`-backed `Catalog` implementation over SQLite.
//!
//! Connection pooling (`SqlitePool`) is the external collaborator spec.md
//! calls out as out of scope; this module is the in-scope surface that owns
//! the schema, the transactional insert, and the uniqueness-conflict
//! classification the rest of the core depends on.

use crate::catalog::{Catalog, NewSandbox};
use crate::error::CatalogError;
use async_trait::async_trait;
use clawbowl_core::{Sandbox, SandboxState, UserId};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sandboxes (
    user_id                TEXT PRIMARY KEY,
    container_name          TEXT NOT NULL UNIQUE,
    container_id            TEXT,
    port                    INTEGER NOT NULL UNIQUE,
    state                   TEXT NOT NULL,
    gateway_token           TEXT NOT NULL,
    config_path             TEXT NOT NULL,
    data_path               TEXT NOT NULL,
    created_at_epoch_ms     INTEGER NOT NULL,
    last_active_at_epoch_ms INTEGER NOT NULL
);
"#;

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Connect to `url` (e.g. `sqlite://clawbowl.db` or `sqlite::memory:`)
    /// and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, CatalogError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_sandbox(row: &sqlx::sqlite::SqliteRow) -> Result<Sandbox, CatalogError> {
        let state_str: String = row.try_get("state")?;
        let state = SandboxState::parse(&state_str)
            .ok_or_else(|| CatalogError::CorruptRow(format!("unknown state {state_str:?}")))?;
        Ok(Sandbox {
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            container_name: row.try_get("container_name")?,
            container_id: row.try_get("container_id")?,
            port: row.try_get::<i64, _>("port")? as u16,
            state,
            gateway_token: row.try_get("gateway_token")?,
            config_path: PathBuf::from(row.try_get::<String, _>("config_path")?),
            data_path: PathBuf::from(row.try_get::<String, _>("data_path")?),
            created_at_epoch_ms: row.try_get::<i64, _>("created_at_epoch_ms")? as u64,
            last_active_at_epoch_ms: row.try_get::<i64, _>("last_active_at_epoch_ms")? as u64,
        })
    }

    /// Classify a unique-constraint violation by inspecting the SQLite
    /// error message, which names the offending column.
    fn classify_conflict(err: sqlx::Error, new: &NewSandbox) -> CatalogError {
        if let sqlx::Error::Database(db_err) = &err {
            let msg = db_err.message();
            if msg.contains("sandboxes.port") {
                return CatalogError::PortConflict(new.port);
            }
            if msg.contains("sandboxes.container_name") {
                return CatalogError::NameConflict(new.container_name.clone());
            }
        }
        CatalogError::Database(err)
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn used_ports(&self) -> Result<Vec<u16>, CatalogError> {
        let rows = sqlx::query("SELECT port FROM sandboxes")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(|r| r.get::<i64, _>("port") as u16).collect())
    }

    async fn try_insert_creating(&self, new: NewSandbox) -> Result<Sandbox, CatalogError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO sandboxes
                (user_id, container_name, container_id, port, state, gateway_token,
                 config_path, data_path, created_at_epoch_ms, last_active_at_epoch_ms)
            VALUES (?, ?, NULL, ?, 'creating', ?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id.as_str())
        .bind(&new.container_name)
        .bind(new.port as i64)
        .bind(&new.gateway_token)
        .bind(new.config_path.to_string_lossy().to_string())
        .bind(new.data_path.to_string_lossy().to_string())
        .bind(new.created_at_epoch_ms as i64)
        .bind(new.created_at_epoch_ms as i64)
        .execute(&mut *tx)
        .await;

        if let Err(err) = result {
            return Err(Self::classify_conflict(err, &new));
        }
        tx.commit().await?;

        Ok(Sandbox {
            user_id: new.user_id,
            container_name: new.container_name,
            container_id: None,
            port: new.port,
            state: SandboxState::Creating,
            gateway_token: new.gateway_token,
            config_path: new.config_path,
            data_path: new.data_path,
            created_at_epoch_ms: new.created_at_epoch_ms,
            last_active_at_epoch_ms: new.created_at_epoch_ms,
        })
    }

    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<Sandbox>, CatalogError> {
        let row = sqlx::query("SELECT * FROM sandboxes WHERE user_id = ?")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::row_to_sandbox).transpose()
    }

    async fn mark_running(
        &self,
        user_id: &UserId,
        container_id: &str,
    ) -> Result<(), CatalogError> {
        let result = sqlx::query(
            "UPDATE sandboxes SET container_id = ?, state = 'running' WHERE user_id = ?",
        )
        .bind(container_id)
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn mark_stopped(&self, user_id: &UserId) -> Result<(), CatalogError> {
        self.set_state(user_id, "stopped").await
    }

    async fn mark_error(&self, user_id: &UserId) -> Result<(), CatalogError> {
        self.set_state(user_id, "error").await
    }

    async fn touch_last_active(
        &self,
        user_id: &UserId,
        epoch_ms: u64,
    ) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE sandboxes SET last_active_at_epoch_ms = ? WHERE user_id = ?")
            .bind(epoch_ms as i64)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), CatalogError> {
        sqlx::query("DELETE FROM sandboxes WHERE user_id = ?")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_running(&self) -> Result<Vec<Sandbox>, CatalogError> {
        let rows = sqlx::query("SELECT * FROM sandboxes WHERE state = 'running'")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_sandbox).collect()
    }

    async fn list_all(&self) -> Result<Vec<Sandbox>, CatalogError> {
        let rows = sqlx::query("SELECT * FROM sandboxes").fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_sandbox).collect()
    }
}

impl SqliteCatalog {
    async fn set_state(&self, user_id: &UserId, state: &str) -> Result<(), CatalogError> {
        let result = sqlx::query("UPDATE sandboxes SET state = ? WHERE user_id = ?")
            .bind(state)
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(user_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "sqlite_catalog_tests.rs"]
mod tests;
