// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry and friendly-error classification for the upstream call (spec.md
//! §4.8 "Retry and friendly-error policy").

use std::time::Duration;

pub const MAX_ATTEMPTS: u32 = 2;
pub const RETRY_BACKOFF: Duration = Duration::from_secs(3);

/// The broad classifier from spec.md §9's Open Question resolution: connect,
/// timeout, read, server (5xx), and a catch-all `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Connect,
    Timeout,
    Read,
    Server,
    Unknown,
}

impl FailureClass {
    /// The literal, user-visible Chinese message for this class.
    pub fn friendly_message(self) -> &'static str {
        match self {
            FailureClass::Connect => "网络连接异常，正在重试...",
            FailureClass::Timeout => "AI 响应超时，请稍后重试",
            FailureClass::Read => "网络波动，数据读取中断",
            FailureClass::Server => "AI 服务暂时繁忙，请稍后再试",
            FailureClass::Unknown => "出了一点小问题，请稍后重试",
        }
    }
}

/// Classify a `reqwest::Error` from the upstream call into a `FailureClass`.
pub fn classify(error: &reqwest::Error) -> FailureClass {
    if error.is_connect() {
        if error.is_timeout() {
            FailureClass::Timeout
        } else {
            FailureClass::Connect
        }
    } else if error.is_timeout() {
        FailureClass::Timeout
    } else if let Some(status) = error.status() {
        if status.is_server_error() {
            FailureClass::Server
        } else {
            FailureClass::Unknown
        }
    } else if error.is_body() || error.is_decode() {
        FailureClass::Read
    } else {
        FailureClass::Unknown
    }
}

/// Classify a plain HTTP status code observed on the upstream response.
pub fn classify_status(status: reqwest::StatusCode) -> Option<FailureClass> {
    if status.is_server_error() {
        Some(FailureClass::Server)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
