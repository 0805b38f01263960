// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Low-level HTTP plumbing for the readiness probe (C6). The polling loop,
//! retry cadence, and timeout budget live in `clawbowl-engine`; this module
//! only knows how to make one attempt and classify the outcome.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProbeError {
    #[error("connect failed")]
    ConnectFailed,

    #[error("connect timed out")]
    ConnectTimeout,

    #[error("read failed")]
    ReadFailed,
}

/// POST a trivially small payload to the sandbox gateway. **Any** HTTP
/// response — including 4xx/5xx — counts as ready; only a failure to
/// establish or complete the connection is a probe failure.
pub async fn probe_once(port: u16, token: &str, per_attempt_timeout: Duration) -> Result<(), ProbeError> {
    let client = reqwest::Client::builder()
        .timeout(per_attempt_timeout)
        .build()
        .map_err(|_| ProbeError::ConnectFailed)?;

    let result = client
        .post(format!("http://127.0.0.1:{port}/v1/chat/completions"))
        .bearer_auth(token)
        .json(&serde_json::json!({"probe": true}))
        .send()
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_timeout() && e.is_connect() => Err(ProbeError::ConnectTimeout),
        Err(e) if e.is_connect() => Err(ProbeError::ConnectFailed),
        Err(_) => Err(ProbeError::ReadFailed),
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
