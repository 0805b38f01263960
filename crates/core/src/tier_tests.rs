// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn default_catalog_resolves_known_tiers() {
    let cat = default_catalog();
    assert_eq!(cat.resolve("free").unwrap().template_key, "free");
    assert_eq!(cat.resolve("premium").unwrap().template_key, "premium");
}

#[test]
fn unknown_tier_falls_back_to_free() {
    let cat = default_catalog();
    let resolved = cat.resolve("enterprise-trial").unwrap();
    assert_eq!(resolved.template_key, "free");
}

#[test]
fn contains_reports_exact_membership_without_fallback() {
    let cat = default_catalog();
    assert!(cat.contains("premium"));
    assert!(!cat.contains("enterprise-trial"));
}

#[test]
fn from_toml_parses_a_tier_table() {
    let toml = r#"
        [free]
        template_key = "free"
        primary_model = "zenmux/default"
        max_tokens = 4096
        container_memory_mb = 512
        container_cpus = 0.5
    "#;
    let cat = TierCatalog::from_toml(toml).expect("valid toml");
    assert_eq!(cat.resolve("free").unwrap().max_tokens, 4096);
}
