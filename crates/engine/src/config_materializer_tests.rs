use super::*;
use clawbowl_core::default_catalog;

const TEMPLATE: &str = r#"{
  "zenmux_api_key": "{{ ZENMUX_API_KEY }}",
  "max_tokens": {{ MAX_TOKENS }},
  "primary_model": "{{ PRIMARY_MODEL }}",
  "gateway_token": "{{ GATEWAY_TOKEN }}",
  "hooks_token": "{{ HOOKS_TOKEN }}"
}"#;

fn tier() -> TierProfile {
    default_catalog().resolve("free").unwrap().clone()
}

#[test]
fn substitutes_all_enumerated_placeholders() {
    let tier = tier();
    let user_id = UserId::new("u-1");
    let input = RenderInput {
        user_id: &user_id,
        tier: &tier,
        zenmux_api_key: "zk-123",
        gateway_token: "gw-456",
        hooks_token: Some("hk-789".to_string()),
    };
    let rendered = render(TEMPLATE, &input).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed["zenmux_api_key"], "zk-123");
    assert_eq!(parsed["max_tokens"], tier.max_tokens);
    assert_eq!(parsed["primary_model"], tier.primary_model);
    assert_eq!(parsed["gateway_token"], "gw-456");
    assert_eq!(parsed["hooks_token"], "hk-789");
}

#[test]
fn generates_a_fresh_hooks_token_when_none_given() {
    let tier = tier();
    let user_id = UserId::new("u-1");
    let input = RenderInput {
        user_id: &user_id,
        tier: &tier,
        zenmux_api_key: "zk-123",
        gateway_token: "gw-456",
        hooks_token: None,
    };
    let rendered = render(TEMPLATE, &input).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert!(!parsed["hooks_token"].as_str().unwrap().is_empty());
}

#[test]
fn rejects_output_that_is_not_valid_json() {
    let tier = tier();
    let user_id = UserId::new("u-1");
    let input = RenderInput {
        user_id: &user_id,
        tier: &tier,
        zenmux_api_key: "zk-123",
        gateway_token: "gw-456",
        hooks_token: Some("hk".to_string()),
    };
    let broken_template = "{ not json";
    let err = render(broken_template, &input).unwrap_err();
    assert!(matches!(err, ConfigRenderError::InvalidJson(_)));
}

#[tokio::test]
async fn read_hooks_token_round_trips_through_render_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let tier = tier();
    let user_id = UserId::new("u-1");
    let input = RenderInput {
        user_id: &user_id,
        tier: &tier,
        zenmux_api_key: "zk-123",
        gateway_token: "gw-456",
        hooks_token: Some("preserve-me".to_string()),
    };
    render_to_disk(TEMPLATE, &input, dir.path()).await.unwrap();

    let token = read_hooks_token(dir.path()).await;
    assert_eq!(token, Some("preserve-me".to_string()));
}

#[tokio::test]
async fn read_hooks_token_is_none_when_config_absent() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(read_hooks_token(dir.path()).await, None);
}
