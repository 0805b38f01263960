// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ed25519 device-key provisioning for C10's warmup handle.
//!
//! Device id is the SHA-256 of the raw 32-byte public key, matching
//! `original_source/backend/app/services/instance_manager.py`'s pairing
//! scheme. Provisioning is deterministic only in the sense that it is
//! idempotent at the filesystem layer (`clawbowl-engine::warmup` decides
//! whether to reuse or regenerate); this module just does the crypto.

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

pub struct DeviceKeypair {
    pub device_id: String,
    pub public_key_bytes: [u8; 32],
    pub private_key_bytes: [u8; 32],
}

/// Generate a fresh Ed25519 keypair and derive its device id.
pub fn generate() -> DeviceKeypair {
    let signing_key = SigningKey::generate(&mut OsRng);
    from_signing_key(&signing_key)
}

/// Reconstruct a `DeviceKeypair` (and its device id) from a previously
/// persisted 32-byte private key, so a caller can verify provenance before
/// reuse.
pub fn from_private_key_bytes(bytes: &[u8; 32]) -> DeviceKeypair {
    let signing_key = SigningKey::from_bytes(bytes);
    from_signing_key(&signing_key)
}

fn from_signing_key(signing_key: &SigningKey) -> DeviceKeypair {
    let public_key_bytes = signing_key.verifying_key().to_bytes();
    let device_id = device_id_for(&public_key_bytes);
    DeviceKeypair {
        device_id,
        public_key_bytes,
        private_key_bytes: signing_key.to_bytes(),
    }
}

pub fn device_id_for(public_key_bytes: &[u8; 32]) -> String {
    let digest = Sha256::digest(public_key_bytes);
    hex_encode(&digest)
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
#[path = "device_crypto_tests.rs"]
mod tests;
