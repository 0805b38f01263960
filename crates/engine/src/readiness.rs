// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness Prober (C6) orchestration: the polling cadence and timeout
//! budget around `clawbowl_adapters::probe_once`'s single-attempt HTTP
//! plumbing.

use clawbowl_adapters::probe_once;
use std::time::Duration;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_secs(2);
const PER_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(3);

/// Poll the sandbox gateway until any HTTP response is observed or
/// `timeout` elapses. Never fails the caller: on timeout this logs a
/// warning and returns, since the caller retries transparently at its own
/// layer (spec.md §4.6). Driven by `tokio::time` so tests can exercise the
/// full timeout budget under `tokio::time::pause()` without real delay.
pub async fn wait_ready(port: u16, token: &str, timeout: Duration) {
    let deadline = Instant::now() + timeout;

    loop {
        match probe_once(port, token, PER_ATTEMPT_TIMEOUT).await {
            Ok(()) => {
                tracing::info!(port, "sandbox gateway is ready");
                return;
            }
            Err(e) => {
                tracing::debug!(port, error = %e, "readiness probe attempt failed");
            }
        }

        if Instant::now() >= deadline {
            tracing::warn!(port, "readiness probe timed out");
            return;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
