// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The request-aware SSE proxy (C8): the densest subsystem, converting a
//! chat-completion request with heterogeneous content parts into an
//! instrumented, typed delta stream.

pub mod attachments;
pub mod context;
pub mod diff;
pub mod retry;
pub mod turns;
pub mod types;

use self::context::SessionPin;
use self::diff::Snapshot;
use self::retry::FailureClass;
use self::turns::TurnTracker;
use self::types::{ChatRequest, ProxyDelta};
use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;

/// Everything the proxy needs to know about where a request is headed and
/// whose workspace it runs against.
pub struct UpstreamTarget {
    pub base_url: String,
    pub gateway_token: String,
    pub user_id: String,
    pub workspace_dir: PathBuf,
}

/// A chat-completion chunk's `choices[0]`, the only part of the upstream
/// SSE envelope the proxy inspects.
#[derive(Debug, Default, serde::Deserialize)]
struct UpstreamChunk {
    #[serde(default)]
    choices: Vec<UpstreamChoice>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct UpstreamChoice {
    #[serde(default)]
    delta: UpstreamDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct UpstreamDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<UpstreamToolCall>,
}

#[derive(Debug, Default, serde::Deserialize)]
struct UpstreamToolCall {
    #[serde(default)]
    function: UpstreamToolFunction,
}

#[derive(Debug, Default, serde::Deserialize)]
struct UpstreamToolFunction {
    #[serde(default)]
    name: String,
}

/// Handle one chat-completion request end to end: materialize attachments,
/// inject temporal context and session pinning, then stream the upstream
/// call's typed deltas back over the returned channel. The channel closes
/// after the terminal sentinel; the proxy never surfaces an error to the
/// caller — exhausted retries degrade to a friendly `delta.content` instead.
pub fn handle_chat_completion(
    client: reqwest::Client,
    mut request: ChatRequest,
    target: UpstreamTarget,
) -> mpsc::Receiver<ProxyDelta> {
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        attachments::materialize(&mut request.messages, &target.workspace_dir).await;
        context::inject_temporal_context(&mut request);
        context::pin_session(&mut request, &target.user_id);

        let inbound_count = request.messages.len();
        let before = diff::snapshot(&target.workspace_dir).await;

        let tracker = run_with_retry(&client, &request, &target, &tx).await;

        if let Some(tracker) = tracker {
            if !tracker.emitted_any_content() {
                for delta in TurnTracker::empty_stream_deltas(inbound_count) {
                    if tx.send(delta).await.is_err() {
                        return;
                    }
                }
            }
        }

        let after: Snapshot = diff::snapshot(&target.workspace_dir).await;
        for delta in diff::diff(&before, &after, &target.workspace_dir) {
            if tx.send(delta).await.is_err() {
                return;
            }
        }

        // The channel closing here is the in-process signal for the terminal
        // `data: [DONE]` sentinel the HTTP layer writes to its own client.
    });

    rx
}

/// Attempt the upstream call up to [`retry::MAX_ATTEMPTS`] times. Returns
/// the tracker from whichever attempt actually streamed, or `None` once
/// retries are exhausted and a friendly terminal message has already been
/// sent in its place.
async fn run_with_retry(
    client: &reqwest::Client,
    request: &ChatRequest,
    target: &UpstreamTarget,
    tx: &mpsc::Sender<ProxyDelta>,
) -> Option<TurnTracker> {
    let mut last_class = FailureClass::Unknown;
    for attempt in 0..retry::MAX_ATTEMPTS {
        match stream_once(client, request, target, tx).await {
            Ok(tracker) => return Some(tracker),
            Err(class) => {
                last_class = class;
                tracing::warn!(attempt, ?class, "upstream chat completion attempt failed");
                if attempt + 1 < retry::MAX_ATTEMPTS {
                    tokio::time::sleep(retry::RETRY_BACKOFF).await;
                }
            }
        }
    }

    let _ = tx
        .send(ProxyDelta::Content { text: last_class.friendly_message().to_string(), filtered: false })
        .await;
    None
}

async fn stream_once(
    client: &reqwest::Client,
    request: &ChatRequest,
    target: &UpstreamTarget,
    tx: &mpsc::Sender<ProxyDelta>,
) -> Result<TurnTracker, FailureClass> {
    let url = format!("{}/v1/chat/completions", target.base_url.trim_end_matches('/'));
    let pin = SessionPin::new(&target.user_id, &target.gateway_token);
    let response = client
        .post(url)
        .bearer_auth(&pin.bearer_token)
        .header("x-openclaw-session-key", pin.session_key_header.as_str())
        .json(request)
        .send()
        .await
        .map_err(|err| retry::classify(&err))?;

    if let Some(class) = retry::classify_status(response.status()) {
        return Err(class);
    }

    let mut tracker = TurnTracker::new();
    let mut byte_stream = response.bytes_stream();
    let mut pending = String::new();

    loop {
        let chunk = match byte_stream.next().await {
            Some(Ok(bytes)) => bytes,
            Some(Err(err)) => return Err(retry::classify(&err)),
            None => break,
        };
        pending.push_str(&String::from_utf8_lossy(&chunk));

        while let Some(newline) = pending.find('\n') {
            let line = pending[..newline].trim_end_matches('\r').to_string();
            pending.drain(..=newline);
            if let Some(done) = handle_sse_line(&line, &mut tracker, tx).await {
                if done {
                    for delta in tracker.finalize() {
                        let _ = tx.send(delta).await;
                    }
                    return Ok(tracker);
                }
            }
        }
    }

    for delta in tracker.finalize() {
        let _ = tx.send(delta).await;
    }
    Ok(tracker)
}

/// Process one raw SSE line. Returns `Some(true)` once the terminal `[DONE]`
/// sentinel is observed.
async fn handle_sse_line(
    line: &str,
    tracker: &mut TurnTracker,
    tx: &mpsc::Sender<ProxyDelta>,
) -> Option<bool> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }
    if payload == "[DONE]" {
        return Some(true);
    }

    let chunk: UpstreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::debug!(%err, "ignoring malformed upstream SSE chunk");
            return None;
        }
    };
    let Some(choice) = chunk.choices.into_iter().next() else { return None };

    for tool_call in &choice.delta.tool_calls {
        if tool_call.function.name.is_empty() {
            continue;
        }
        if let Some(delta) = tracker.on_tool_call(&tool_call.function.name) {
            let _ = tx.send(delta).await;
        }
    }

    if let Some(content) = &choice.delta.content {
        if !content.is_empty() {
            for delta in tracker.on_content(content, Instant::now()) {
                let _ = tx.send(delta).await;
            }
        }
    }

    if let Some(finish_reason) = &choice.finish_reason {
        for delta in tracker.on_finish_reason(finish_reason) {
            let _ = tx.send(delta).await;
        }
    }

    None
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
