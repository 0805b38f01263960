use super::*;

#[test]
fn serializes_platform_as_snake_case() {
    let json = serde_json::to_string(&PushPlatform::Apns).unwrap();
    assert_eq!(json, "\"apns\"");
}

#[test]
fn round_trips_through_json() {
    let token = DeviceToken {
        user_id: UserId::new("u-1"),
        platform: PushPlatform::Fcm,
        token: "abc123".to_string(),
        registered_at_epoch_ms: 42,
    };
    let json = serde_json::to_string(&token).unwrap();
    let back: DeviceToken = serde_json::from_str(&json).unwrap();
    assert_eq!(back, token);
}
