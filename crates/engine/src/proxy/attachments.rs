// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Attachment materialization: extract non-text parts of the last `user`
//! message, decode them to `workspace/media/inbound/`, and rewrite the
//! message into a single plain-text string referencing them by path
//! (spec.md §4.8 "Attachment materialization").

use super::types::{ContentPart, Message, MessageContent, Role};
use base64::Engine;
use rand::Rng;
use std::path::Path;
use tokio::fs;

const INBOUND_DIR: &str = "media/inbound";

/// Rewrite `messages` in place, materializing attachments from the last
/// `user` message to disk. Messages with no structured content, or with no
/// `user` message at all, are left untouched.
pub async fn materialize(messages: &mut [Message], workspace_dir: &Path) {
    let Some(index) = messages.iter().rposition(|m| m.role == Role::User) else { return };
    let MessageContent::Parts(parts) = messages[index].content.clone() else { return };

    let mut reference_lines = Vec::new();
    let mut text_parts = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text } => text_parts.push(text),
            ContentPart::ImageUrl { image_url } => {
                if let Some((extension, bytes)) = decode_data_url(&image_url.url) {
                    let name = format!("{}.{extension}", random_hex(6));
                    if write_inbound(workspace_dir, &name, &bytes).await.is_ok() {
                        reference_lines.push(reference_line(&name));
                    } else {
                        tracing::warn!(name, "failed to write materialized image attachment");
                    }
                } else {
                    tracing::warn!("failed to decode image_url attachment, dropping");
                }
            }
            ContentPart::File { filename, data } => {
                let safe_name = sanitize_filename(&filename);
                match base64::engine::general_purpose::STANDARD.decode(data.as_bytes()) {
                    Ok(bytes) => {
                        if write_inbound(workspace_dir, &safe_name, &bytes).await.is_ok() {
                            reference_lines.push(reference_line(&safe_name));
                        } else {
                            tracing::warn!(name = %safe_name, "failed to write materialized file attachment");
                        }
                    }
                    Err(_) => tracing::warn!(name = %safe_name, "failed to decode file attachment, dropping"),
                }
            }
        }
    }

    if reference_lines.is_empty() && text_parts.is_empty() {
        return;
    }

    let mut rebuilt = reference_lines.join("\n");
    if !text_parts.is_empty() {
        if !rebuilt.is_empty() {
            rebuilt.push_str("\n\n");
        }
        rebuilt.push_str(&text_parts.join(""));
    }
    messages[index].content = MessageContent::Text(rebuilt);
}

fn reference_line(safe_name: &str) -> String {
    format!("[用户发送了文件: {INBOUND_DIR}/{safe_name}]")
}

fn sanitize_filename(filename: &str) -> String {
    filename.replace(['/', '\\'], "_")
}

async fn write_inbound(workspace_dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<()> {
    let dir = workspace_dir.join(INBOUND_DIR);
    fs::create_dir_all(&dir).await?;
    fs::write(dir.join(name), bytes).await
}

fn random_hex(bytes: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..bytes).map(|_| format!("{:02x}", rng.gen::<u8>())).collect()
}

/// Decode a `data:image/<ext>;base64,<payload>` URL into `(extension, bytes)`.
fn decode_data_url(url: &str) -> Option<(&'static str, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let extension = match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => return None,
    };
    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.as_bytes()).ok()?;
    Some((extension, bytes))
}

#[cfg(test)]
#[path = "attachments_tests.rs"]
mod tests;
