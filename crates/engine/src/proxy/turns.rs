// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Turn-boundary detection and thinking-delta coalescing (spec.md §4.8
//! "SSE delta shaping" / "Turn-boundary detection").

use super::types::ProxyDelta;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Interarrival gap beyond which two `delta.content` chunks are treated as
/// belonging to different agent turns even without an explicit marker.
pub const TURN_GAP_THRESHOLD: Duration = Duration::from_secs_f64(3.0);

/// Thinking deltas are coalesced until roughly this many characters
/// accumulate, cutting event count by roughly an order of magnitude.
const THINKING_COALESCE_CHARS: usize = 80;

fn tool_status(name: &str) -> String {
    match name {
        "image" => "正在分析图片...".to_string(),
        "web_search" => "正在搜索网页...".to_string(),
        "read" => "正在读取文件...".to_string(),
        "write" => "正在写入文件...".to_string(),
        "edit" => "正在编辑文件...".to_string(),
        "exec" => "正在执行命令...".to_string(),
        "process" => "正在处理任务...".to_string(),
        "cron" => "正在设置定时任务...".to_string(),
        "memory" => "正在检索记忆...".to_string(),
        "web_fetch" => "正在读取网页...".to_string(),
        other => format!("正在执行 {other}..."),
    }
}

/// Drives the turn-boundary state machine for a single SSE stream. Each
/// upstream chunk is fed through [`TurnTracker::on_content`] or
/// [`TurnTracker::on_finish_reason`]; both return the deltas to forward to
/// the orchestrator's own client, in causal order.
pub struct TurnTracker {
    buffer: String,
    thinking_accum: String,
    last_content_at: Option<Instant>,
    turn_count: u32,
    seen_tools: HashSet<String>,
    emitted_any_content: bool,
}

impl Default for TurnTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnTracker {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            thinking_accum: String::new(),
            last_content_at: None,
            turn_count: 0,
            seen_tools: HashSet::new(),
            emitted_any_content: false,
        }
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn emitted_any_content(&self) -> bool {
        self.emitted_any_content
    }

    /// Feed one `delta.content` text chunk, observed at `now`. Returns the
    /// deltas to forward: an implicit-boundary separator if the temporal gap
    /// was exceeded, followed by the coalesced thinking delta for this
    /// chunk's text.
    pub fn on_content(&mut self, text: &str, now: Instant) -> Vec<ProxyDelta> {
        let mut out = Vec::new();

        if let Some(last) = self.last_content_at {
            if now.saturating_duration_since(last) > TURN_GAP_THRESHOLD {
                self.buffer.clear();
                self.turn_count += 1;
                out.push(ProxyDelta::Thinking { text: "\n\n".to_string() });
            }
        }
        self.last_content_at = Some(now);

        self.buffer.push_str(text);
        self.thinking_accum.push_str(text);
        if self.thinking_accum.chars().count() >= THINKING_COALESCE_CHARS {
            out.push(ProxyDelta::Thinking { text: std::mem::take(&mut self.thinking_accum) });
        }
        out
    }

    /// Feed a tool call's name the first time it is observed in this stream.
    /// Subsequent occurrences of the same name are suppressed.
    pub fn on_tool_call(&mut self, name: &str) -> Option<ProxyDelta> {
        if self.seen_tools.insert(name.to_string()) {
            Some(ProxyDelta::Thinking { text: tool_status(name) })
        } else {
            None
        }
    }

    /// Feed a `finish_reason` value. `tool_calls` discards the buffer and
    /// advances the turn count without emitting content; `stop` flushes the
    /// buffer as a final `delta.content`.
    pub fn on_finish_reason(&mut self, finish_reason: &str) -> Vec<ProxyDelta> {
        match finish_reason {
            "tool_calls" => {
                self.buffer.clear();
                self.turn_count += 1;
                Vec::new()
            }
            "stop" => {
                let mut out = Vec::new();
                if !self.thinking_accum.is_empty() {
                    out.push(ProxyDelta::Thinking {
                        text: std::mem::take(&mut self.thinking_accum),
                    });
                }
                if !self.buffer.is_empty() {
                    self.emitted_any_content = true;
                    out.push(ProxyDelta::Content {
                        text: std::mem::take(&mut self.buffer),
                        filtered: false,
                    });
                }
                out
            }
            _ => Vec::new(),
        }
    }

    /// Flush whatever is left in the buffer when the stream ends without an
    /// explicit `finish_reason: "stop"` (e.g. `[DONE]` arriving right after a
    /// temporal gap reset the buffer's turn but not its content, or the
    /// upstream simply closing the connection). Idempotent: calling this
    /// after `on_finish_reason("stop")` already flushed is a no-op.
    pub fn finalize(&mut self) -> Vec<ProxyDelta> {
        let mut out = Vec::new();
        if !self.thinking_accum.is_empty() {
            out.push(ProxyDelta::Thinking { text: std::mem::take(&mut self.thinking_accum) });
        }
        if !self.buffer.is_empty() {
            self.emitted_any_content = true;
            out.push(ProxyDelta::Content { text: std::mem::take(&mut self.buffer), filtered: false });
        }
        out
    }

    /// Deltas for a stream that produced no content chunks at all (spec.md's
    /// "empty-stream handling"), distinguishing content-safety refusals from
    /// not-yet-warm sandboxes by the inbound message count.
    pub fn empty_stream_deltas(inbound_message_count: usize) -> Vec<ProxyDelta> {
        if inbound_message_count > 4 {
            vec![ProxyDelta::Content {
                text: "该内容暂时无法处理，已自动清理相关对话记录，请换个话题继续。".to_string(),
                filtered: true,
            }]
        } else {
            vec![ProxyDelta::Content {
                text: "出了一点小问题，请稍后重试".to_string(),
                filtered: false,
            }]
        }
    }
}

#[cfg(test)]
#[path = "turns_tests.rs"]
mod tests;
