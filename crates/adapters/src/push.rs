// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `PushChannel`: the blind `send(token, title, body, data)` sink C9
//! dispatches through. The transport itself (APNs/FCM) is an external
//! collaborator out of scope; this is the trait boundary plus an HTTP
//! forwarding implementation for a collaborating push gateway, mirroring
//! how the teacher workspace pairs `NotifyAdapter` with a concrete sender.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PushError {
    #[error("push send failed: {0}")]
    SendFailed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct PushPayload<'a> {
    pub device_token: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub data: serde_json::Value,
}

/// Dispatch is best-effort from the caller's perspective (C9 §4.9): failures
/// are logged and never rewind the alert offset, so this trait only needs a
/// pass/fail result, not a retry policy of its own.
#[async_trait]
pub trait PushChannel: Send + Sync + 'static {
    async fn send(&self, payload: PushPayload<'_>) -> Result<(), PushError>;
}

/// Forwards to a collaborating HTTP push gateway. A 10s timeout matches
/// spec's push timeout budget (§5).
pub struct HttpPushChannel {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPushChannel {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait]
impl PushChannel for HttpPushChannel {
    async fn send(&self, payload: PushPayload<'_>) -> Result<(), PushError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| PushError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PushError::SendFailed(format!("gateway returned {}", response.status())));
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{PushChannel, PushError, PushPayload};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PushCall {
        pub device_token: String,
        pub title: String,
        pub body: String,
        pub data: serde_json::Value,
    }

    #[derive(Clone, Default)]
    pub struct FakePushChannel {
        calls: Arc<Mutex<Vec<PushCall>>>,
    }

    impl FakePushChannel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<PushCall> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl PushChannel for FakePushChannel {
        async fn send(&self, payload: PushPayload<'_>) -> Result<(), PushError> {
            self.calls.lock().push(PushCall {
                device_token: payload.device_token.to_string(),
                title: payload.title.to_string(),
                body: payload.body.to_string(),
                data: payload.data,
            });
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePushChannel, PushCall};

#[cfg(test)]
#[path = "push_tests.rs"]
mod tests;
