// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config Materializer (C2).
//!
//! Renders a tier-selected template into `config_path/openclaw.json`,
//! substituting the enumerated placeholders and preserving any existing
//! `hooks_token` across re-syncs (spec.md §3, §4.2).

use clawbowl_core::{TierProfile, UserId};
use rand::Rng;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum ConfigRenderError {
    #[error("rendered config is not well-formed: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct RenderInput<'a> {
    pub user_id: &'a UserId,
    pub tier: &'a TierProfile,
    pub zenmux_api_key: &'a str,
    pub gateway_token: &'a str,
    pub hooks_token: Option<String>,
}

/// Substitute the enumerated placeholders in `template` and validate the
/// result parses as JSON. A fresh `hooks_token` is generated when
/// `input.hooks_token` is `None`.
pub fn render(template: &str, input: &RenderInput<'_>) -> Result<String, ConfigRenderError> {
    let hooks_token = input.hooks_token.clone().unwrap_or_else(generate_hooks_token);

    let rendered = template
        .replace("{{ ZENMUX_API_KEY }}", input.zenmux_api_key)
        .replace("{{ MAX_TOKENS }}", &input.tier.max_tokens.to_string())
        .replace("{{ PRIMARY_MODEL }}", &input.tier.primary_model)
        .replace("{{ GATEWAY_TOKEN }}", input.gateway_token)
        .replace("{{ HOOKS_TOKEN }}", &hooks_token);

    // Unknown placeholders pass through unchanged; just validate shape.
    let _: serde_json::Value = serde_json::from_str(&rendered)?;
    let _ = input.user_id;
    Ok(rendered)
}

/// Render and write to `config_dir/openclaw.json`.
pub async fn render_to_disk(
    template: &str,
    input: &RenderInput<'_>,
    config_dir: &Path,
) -> Result<(), ConfigRenderError> {
    let rendered = render(template, input)?;
    fs::create_dir_all(config_dir).await?;
    fs::write(config_dir.join("openclaw.json"), rendered).await?;
    Ok(())
}

/// Read back the `hooks_token` field from a previously rendered config, if
/// one exists, so callers can preserve it across re-syncs.
pub async fn read_hooks_token(config_dir: &Path) -> Option<String> {
    let bytes = fs::read(config_dir.join("openclaw.json")).await.ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("hooks_token")?.as_str().map(str::to_string)
}

fn generate_hooks_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 24] = rng.gen();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[path = "config_materializer_tests.rs"]
mod tests;
