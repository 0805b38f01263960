// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Warmup handle service (C10): ensures a user's sandbox is running and
//! hands back everything a client needs to either route through the proxy
//! or connect to the sandbox gateway directly.

use crate::instance_manager::{InstanceError, InstanceManager};
use clawbowl_adapters::device_crypto::{self, DeviceKeypair};
use clawbowl_adapters::ContainerRuntime;
use clawbowl_core::{Clock, User};
use clawbowl_storage::Catalog;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// A device identity provisioned for direct-to-gateway connection,
/// bypassing the proxy.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceIdentity {
    pub device_id: String,
    pub public_key_hex: String,
}

/// Everything a client needs after a warmup call.
#[derive(Debug, Clone, Serialize)]
pub struct WarmupHandle {
    pub port: u16,
    pub gateway_token: String,
    pub session_key: String,
    pub device: Option<DeviceIdentity>,
}

/// `warmup(user) -> WarmupHandle`: runs `ensure_running` and optionally
/// provisions (or reuses) an Ed25519 device identity on disk under
/// `config_path/devices/`.
pub async fn warmup<C, R, CL>(
    manager: &InstanceManager<C, R, CL>,
    user: &User,
    provision_device: bool,
) -> Result<WarmupHandle, InstanceError>
where
    C: Catalog,
    R: ContainerRuntime,
    CL: Clock,
{
    let sandbox = manager.ensure_running(user).await?;

    let device = if provision_device {
        match provision_device_identity(&sandbox.config_path).await {
            Ok(device) => Some(device),
            Err(err) => {
                tracing::warn!(user_id = %sandbox.user_id, %err, "device provisioning failed");
                None
            }
        }
    } else {
        None
    };

    Ok(WarmupHandle {
        port: sandbox.port,
        gateway_token: sandbox.gateway_token.clone(),
        session_key: sandbox.session_key(),
        device,
    })
}

fn paired_path(config_path: &Path) -> std::path::PathBuf {
    config_path.join("devices").join("paired.json")
}

fn private_key_path(config_path: &Path, device_id: &str) -> std::path::PathBuf {
    config_path.join("devices").join(format!("{device_id}.key"))
}

/// Reuse a previously provisioned device if one is present in the paired
/// set and its private key is also on disk; otherwise generate a new
/// Ed25519 keypair and persist both files.
async fn provision_device_identity(config_path: &Path) -> std::io::Result<DeviceIdentity> {
    if let Some(existing) = find_existing_device(config_path).await? {
        return Ok(existing);
    }

    let keypair = device_crypto::generate();
    persist_device(config_path, &keypair).await?;
    Ok(DeviceIdentity {
        device_id: keypair.device_id,
        public_key_hex: hex_encode(&keypair.public_key_bytes),
    })
}

async fn find_existing_device(config_path: &Path) -> std::io::Result<Option<DeviceIdentity>> {
    let paired_path = paired_path(config_path);
    let bytes = match tokio::fs::read(&paired_path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    let Ok(entries) = serde_json::from_slice::<Vec<Value>>(&bytes) else { return Ok(None) };

    for entry in entries {
        let Some(device_id) = entry.get("deviceId").and_then(Value::as_str) else { continue };
        let key_path = private_key_path(config_path, device_id);
        if let Ok(key_bytes) = tokio::fs::read(&key_path).await {
            if let Ok(bytes32) = <[u8; 32]>::try_from(key_bytes.as_slice()) {
                let keypair = device_crypto::from_private_key_bytes(&bytes32);
                if keypair.device_id == device_id {
                    return Ok(Some(DeviceIdentity {
                        device_id: keypair.device_id,
                        public_key_hex: hex_encode(&keypair.public_key_bytes),
                    }));
                }
            }
        }
    }
    Ok(None)
}

async fn persist_device(config_path: &Path, keypair: &DeviceKeypair) -> std::io::Result<()> {
    let devices_dir = config_path.join("devices");
    tokio::fs::create_dir_all(&devices_dir).await?;

    tokio::fs::write(private_key_path(config_path, &keypair.device_id), keypair.private_key_bytes)
        .await?;

    let paired_path = paired_path(config_path);
    let mut entries: Vec<Value> = match tokio::fs::read(&paired_path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
        Err(_) => Vec::new(),
    };
    entries.push(serde_json::json!({
        "deviceId": keypair.device_id,
        "publicKey": hex_encode(&keypair.public_key_bytes),
    }));
    tokio::fs::write(&paired_path, serde_json::to_vec_pretty(&entries)?).await?;
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
#[path = "warmup_tests.rs"]
mod tests;
