// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static subscription-tier configuration (§3 `TierProfile`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-tier resource envelope and model selection, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    pub template_key: String,
    pub primary_model: String,
    pub max_tokens: u32,
    pub container_memory_mb: u64,
    pub container_cpus: f64,
}

/// The full tier → profile table, with a fallback for unrecognized tier
/// strings (mirrors the legacy-template fallback in the original
/// config generator: an unknown tier still gets a usable sandbox).
#[derive(Debug, Clone, Deserialize)]
pub struct TierCatalog {
    #[serde(flatten)]
    profiles: HashMap<String, TierProfile>,
}

impl TierCatalog {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    /// Resolve a tier profile by key, falling back to `"free"` and finally
    /// to the first profile in the table if even `"free"` is absent.
    pub fn resolve(&self, tier: &str) -> Option<&TierProfile> {
        self.profiles.get(tier).or_else(|| self.profiles.get("free"))
    }

    pub fn contains(&self, tier: &str) -> bool {
        self.profiles.contains_key(tier)
    }
}

/// A minimal built-in catalog, useful for tests and as a documented default.
pub fn default_catalog() -> TierCatalog {
    let mut profiles = HashMap::new();
    profiles.insert(
        "free".to_string(),
        TierProfile {
            template_key: "free".to_string(),
            primary_model: "zenmux/default".to_string(),
            max_tokens: 4096,
            container_memory_mb: 512,
            container_cpus: 0.5,
        },
    );
    profiles.insert(
        "premium".to_string(),
        TierProfile {
            template_key: "premium".to_string(),
            primary_model: "zenmux/premium".to_string(),
            max_tokens: 32768,
            container_memory_mb: 2048,
            container_cpus: 2.0,
        },
    );
    TierCatalog { profiles }
}

#[cfg(test)]
#[path = "tier_tests.rs"]
mod tests;
