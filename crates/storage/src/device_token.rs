// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device-token lookup for the push channel (C9's alert fan-out target).
//!
//! Registration itself is driven by the collaborating mobile client /
//! auth service; this store is just the orchestrator's read/write surface
//! over the same sqlite pool the catalog uses.

use crate::error::CatalogError;
use async_trait::async_trait;
use clawbowl_core::{DeviceToken, PushPlatform, UserId};
use sqlx::{Row, SqlitePool};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS device_tokens (
    user_id                 TEXT NOT NULL,
    platform                TEXT NOT NULL,
    token                   TEXT NOT NULL,
    registered_at_epoch_ms  INTEGER NOT NULL,
    PRIMARY KEY (user_id, platform, token)
);
"#;

#[async_trait]
pub trait DeviceTokenStore: Send + Sync + 'static {
    async fn register(&self, token: DeviceToken) -> Result<(), CatalogError>;

    async fn unregister(
        &self,
        user_id: &UserId,
        platform: PushPlatform,
        token: &str,
    ) -> Result<(), CatalogError>;

    /// All tokens registered for `user_id`, across platforms, in
    /// registration order.
    async fn tokens_for_user(&self, user_id: &UserId) -> Result<Vec<DeviceToken>, CatalogError>;
}

#[derive(Clone)]
pub struct SqliteDeviceTokenStore {
    pool: SqlitePool,
}

impl SqliteDeviceTokenStore {
    pub async fn connect(pool: SqlitePool) -> Result<Self, CatalogError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    fn row_to_token(row: &sqlx::sqlite::SqliteRow) -> Result<DeviceToken, CatalogError> {
        let platform_str: String = row.try_get("platform")?;
        let platform = match platform_str.as_str() {
            "apns" => PushPlatform::Apns,
            "fcm" => PushPlatform::Fcm,
            other => {
                return Err(CatalogError::CorruptRow(format!(
                    "unknown push platform {other:?}"
                )))
            }
        };
        Ok(DeviceToken {
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            platform,
            token: row.try_get("token")?,
            registered_at_epoch_ms: row.try_get::<i64, _>("registered_at_epoch_ms")? as u64,
        })
    }
}

fn platform_str(platform: PushPlatform) -> &'static str {
    match platform {
        PushPlatform::Apns => "apns",
        PushPlatform::Fcm => "fcm",
    }
}

#[async_trait]
impl DeviceTokenStore for SqliteDeviceTokenStore {
    async fn register(&self, token: DeviceToken) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO device_tokens (user_id, platform, token, registered_at_epoch_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (user_id, platform, token)
            DO UPDATE SET registered_at_epoch_ms = excluded.registered_at_epoch_ms
            "#,
        )
        .bind(token.user_id.as_str())
        .bind(platform_str(token.platform))
        .bind(&token.token)
        .bind(token.registered_at_epoch_ms as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unregister(
        &self,
        user_id: &UserId,
        platform: PushPlatform,
        token: &str,
    ) -> Result<(), CatalogError> {
        sqlx::query(
            "DELETE FROM device_tokens WHERE user_id = ? AND platform = ? AND token = ?",
        )
        .bind(user_id.as_str())
        .bind(platform_str(platform))
        .bind(token)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn tokens_for_user(&self, user_id: &UserId) -> Result<Vec<DeviceToken>, CatalogError> {
        let rows = sqlx::query(
            "SELECT * FROM device_tokens WHERE user_id = ? ORDER BY registered_at_epoch_ms",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_token).collect()
    }
}

#[cfg(test)]
#[path = "device_token_tests.rs"]
mod tests;
