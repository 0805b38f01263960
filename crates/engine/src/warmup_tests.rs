use super::*;
use crate::instance_manager::InstanceManagerConfig;
use clawbowl_adapters::test_support::FakeContainerRuntime;
use clawbowl_core::{default_catalog, FakeClock};
use clawbowl_storage::SqliteCatalog;
use std::sync::Arc;
use std::time::Duration;

const TEMPLATE: &str = r#"{
  "zenmux_api_key": "{{ ZENMUX_API_KEY }}",
  "max_tokens": {{ MAX_TOKENS }},
  "primary_model": "{{ PRIMARY_MODEL }}",
  "gateway_token": "{{ GATEWAY_TOKEN }}",
  "hooks_token": "{{ HOOKS_TOKEN }}"
}"#;

async fn manager(
    data_root: &std::path::Path,
) -> InstanceManager<SqliteCatalog, FakeContainerRuntime, FakeClock> {
    let catalog = Arc::new(SqliteCatalog::connect("sqlite::memory:").await.unwrap());
    let runtime = Arc::new(FakeContainerRuntime::new());
    let clock = FakeClock::new();
    let config = InstanceManagerConfig {
        data_root: data_root.to_path_buf(),
        port_range: 20000..=20010,
        idle_timeout: Duration::from_secs(600),
        zenmux_api_key: "zk-test".to_string(),
        openclaw_image: "openclaw:latest".to_string(),
        gateway_container_port: 8080,
        config_template: TEMPLATE.to_string(),
        workspace_template: vec![],
    };
    InstanceManager::new(catalog, runtime, clock, default_catalog(), config)
}

#[tokio::test(start_paused = true)]
async fn warmup_returns_a_handle_with_the_sandbox_coordinates() {
    let root = tempfile::tempdir().unwrap();
    let manager = manager(root.path()).await;

    let handle = warmup(&manager, &User::new("alice", "free"), false).await.unwrap();

    assert_eq!(handle.session_key, "clawbowl-alice");
    assert!(!handle.gateway_token.is_empty());
    assert!(handle.device.is_none());
}

#[tokio::test(start_paused = true)]
async fn warmup_with_provisioning_creates_a_device_identity_on_disk() {
    let root = tempfile::tempdir().unwrap();
    let manager = manager(root.path()).await;

    let handle = warmup(&manager, &User::new("bob", "free"), true).await.unwrap();

    let device = handle.device.expect("device identity should be provisioned");
    assert_eq!(device.device_id.len(), 64);
}

#[tokio::test(start_paused = true)]
async fn a_second_warmup_reuses_the_same_device_identity() {
    let root = tempfile::tempdir().unwrap();
    let manager = manager(root.path()).await;
    let user = User::new("carol", "free");

    let first = warmup(&manager, &user, true).await.unwrap();
    let second = warmup(&manager, &user, true).await.unwrap();

    assert_eq!(first.device.unwrap().device_id, second.device.unwrap().device_id);
}
