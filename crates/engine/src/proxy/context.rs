// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Temporal context injection and session pinning (spec.md §4.8).

use super::types::{ChatRequest, ContentPart, Message, MessageContent, Role};
use chrono::{Datelike, Timelike, Utc};

const WEEKDAYS: [&str; 7] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Prepend a synthetic system message stating the current UTC date/time, and
/// append a short note to the last user message if its text lacks the
/// current year, so that it survives upstream configurations which drop
/// system messages.
pub fn inject_temporal_context(request: &mut ChatRequest) {
    let now = Utc::now();
    let year = now.year();
    let weekday = WEEKDAYS[now.weekday().num_days_from_monday() as usize];

    let system_text = format!(
        "Current UTC date and time: {:04}-{:02}-{:02} {:02}:{:02}:{:02}, {weekday}, {year}.",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
    );
    request.messages.insert(
        0,
        Message { role: Role::System, content: MessageContent::Text(system_text) },
    );

    let year_str = year.to_string();
    if let Some(index) = request.messages.iter().rposition(|m| m.role == Role::User) {
        let message = &mut request.messages[index];
        let already_present = match &message.content {
            MessageContent::Text(text) => text.contains(&year_str),
            MessageContent::Parts(parts) => parts.iter().any(|part| match part {
                ContentPart::Text { text } => text.contains(&year_str),
                _ => false,
            }),
        };
        if !already_present {
            let tail = format!("\n\n[System note: current date is {weekday}, year {year}]");
            match &mut message.content {
                MessageContent::Text(text) => text.push_str(&tail),
                MessageContent::Parts(parts) => parts.push(ContentPart::Text { text: tail }),
            }
        }
    }
}

/// Headers/body fields binding every forwarded request to a single upstream
/// session for the given user.
pub struct SessionPin {
    pub session_key_header: String,
    pub bearer_token: String,
}

impl SessionPin {
    pub fn new(user_id: &str, gateway_token: &str) -> Self {
        Self {
            session_key_header: format!("clawbowl-{user_id}"),
            bearer_token: gateway_token.to_string(),
        }
    }
}

/// Stamp `request.user` with the pinned user id, completing the session
/// pinning contract (the header/bearer portions are applied by the HTTP
/// client building the upstream request).
pub fn pin_session(request: &mut ChatRequest, user_id: &str) {
    request.user = Some(user_id.to_string());
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
