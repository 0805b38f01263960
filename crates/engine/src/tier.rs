// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream API key selection strategy by subscription tier, expanding the
//! static `TierProfile` table with the key-sharing policy used at the
//! zenmux upstream: premium tiers get a dedicated key, free tiers share a
//! pooled one.

/// Which upstream API key a sandbox's config should be rendered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeyStrategy {
    /// A key dedicated to this user, not shared with any other tenant.
    Dedicated(String),
    /// A key drawn from a small pool shared by free-tier users.
    Pooled(String),
}

impl ApiKeyStrategy {
    pub fn api_key(&self) -> &str {
        match self {
            ApiKeyStrategy::Dedicated(key) => key,
            ApiKeyStrategy::Pooled(key) => key,
        }
    }
}

/// Resolves the key strategy for a tier. `dedicated_keys` maps a tier name
/// to its dedicated key (populated from settings for premium tiers);
/// anything absent from that map falls back to the shared pool, rotated by
/// a simple hash of the user id so load spreads across the pool without
/// per-request randomness.
pub struct KeyStrategyResolver {
    pooled_keys: Vec<String>,
}

impl KeyStrategyResolver {
    pub fn new(pooled_keys: Vec<String>) -> Self {
        Self { pooled_keys }
    }

    pub fn resolve(
        &self,
        tier: &str,
        user_id: &str,
        dedicated_key: Option<&str>,
    ) -> ApiKeyStrategy {
        if let Some(key) = dedicated_key {
            if tier != "free" {
                return ApiKeyStrategy::Dedicated(key.to_string());
            }
        }
        let index = self.pool_index(user_id);
        let key = self.pooled_keys.get(index).cloned().unwrap_or_default();
        ApiKeyStrategy::Pooled(key)
    }

    fn pool_index(&self, user_id: &str) -> usize {
        if self.pooled_keys.is_empty() {
            return 0;
        }
        let hash: u64 = user_id.bytes().fold(0u64, |acc, byte| {
            acc.wrapping_mul(31).wrapping_add(u64::from(byte))
        });
        (hash as usize) % self.pooled_keys.len()
    }
}

#[cfg(test)]
#[path = "tier_tests.rs"]
mod tests;
