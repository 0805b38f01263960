// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Alert monitor (C9): tails every running sandbox's alert journal and
//! dispatches accepted entries through the push channel.

use clawbowl_adapters::{PushChannel, PushPayload};
use clawbowl_core::UserId;
use clawbowl_storage::{Catalog, DeviceTokenStore};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const ALERT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Tails `data_path/workspace/.alerts.jsonl` files across every running
/// sandbox and forwards well-formed entries to the push channel.
pub struct AlertMonitor<C, D, P> {
    catalog: Arc<C>,
    device_tokens: Arc<D>,
    push: Arc<P>,
    offsets: Mutex<HashMap<String, u64>>,
}

impl<C, D, P> AlertMonitor<C, D, P>
where
    C: Catalog,
    D: DeviceTokenStore,
    P: PushChannel,
{
    pub fn new(catalog: Arc<C>, device_tokens: Arc<D>, push: Arc<P>) -> Self {
        Self { catalog, device_tokens, push, offsets: Mutex::new(HashMap::new()) }
    }

    /// One polling pass over every running sandbox's alert journal.
    pub async fn tick_once(&self) {
        let sandboxes = match self.catalog.list_running().await {
            Ok(sandboxes) => sandboxes,
            Err(err) => {
                tracing::warn!(%err, "alert monitor failed to list running sandboxes");
                return;
            }
        };

        for sandbox in sandboxes {
            let alerts_path = sandbox.alerts_path();
            let alerts = match self.read_new_alerts(sandbox.user_id.as_str(), &alerts_path).await {
                Ok(alerts) => alerts,
                Err(err) => {
                    tracing::warn!(user_id = %sandbox.user_id, %err, "failed to tail alerts journal");
                    continue;
                }
            };

            for alert in alerts {
                self.dispatch(&sandbox.user_id, &alert).await;
            }
        }
    }

    async fn read_new_alerts(
        &self,
        user_key: &str,
        alerts_path: &Path,
    ) -> std::io::Result<Vec<Value>> {
        let metadata = match tokio::fs::metadata(alerts_path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let size = metadata.len();

        let mut offset = {
            let offsets = self.offsets.lock();
            offsets.get(user_key).copied().unwrap_or(0)
        };
        if size < offset {
            offset = 0;
        }
        if size <= offset {
            self.offsets.lock().insert(user_key.to_string(), offset);
            return Ok(Vec::new());
        }

        let contents = tokio::fs::read(alerts_path).await?;
        let unread = &contents[offset as usize..];
        let text = String::from_utf8_lossy(unread);

        let mut alerts = Vec::new();
        let mut consumed = 0u64;
        for line in text.split_inclusive('\n') {
            consumed += line.len() as u64;
            let trimmed = line.trim_end_matches(['\n', '\r']);
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) if value.get("title").is_some() => alerts.push(value),
                Ok(_) => tracing::debug!("dropping alert line with no title"),
                Err(err) => tracing::debug!(%err, "dropping invalid alert line"),
            }
        }

        self.offsets.lock().insert(user_key.to_string(), offset + consumed);
        Ok(alerts)
    }

    async fn dispatch(&self, user_id: &UserId, alert: &Value) {
        let title = alert.get("title").and_then(Value::as_str).unwrap_or_default();
        let body = alert.get("body").and_then(Value::as_str).unwrap_or_default();
        let alert_type = alert.get("type").and_then(Value::as_str).unwrap_or("cron");

        let tokens = match self.device_tokens.tokens_for_user(user_id).await {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::warn!(%user_id, %err, "failed to load device tokens for alert dispatch");
                return;
            }
        };

        for token in tokens {
            let payload = PushPayload {
                device_token: &token.token,
                title,
                body,
                data: serde_json::json!({ "alert_type": alert_type }),
            };
            if let Err(err) = self.push.send(payload).await {
                tracing::warn!(%user_id, %err, "alert push dispatch failed");
            }
        }
    }
}

/// Runs [`AlertMonitor::tick_once`] forever on [`ALERT_POLL_INTERVAL`].
pub async fn run_alert_monitor_loop<C, D, P>(monitor: Arc<AlertMonitor<C, D, P>>)
where
    C: Catalog,
    D: DeviceTokenStore,
    P: PushChannel,
{
    loop {
        tokio::time::sleep(ALERT_POLL_INTERVAL).await;
        monitor.tick_once().await;
    }
}

#[cfg(test)]
#[path = "alert_monitor_tests.rs"]
mod tests;
