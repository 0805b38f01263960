use super::*;
use serde_json::json;

#[tokio::test(start_paused = true)]
async fn promotes_pending_entries_into_paired_json() {
    let config_dir = tempfile::tempdir().unwrap();
    let devices_dir = config_dir.path().join("devices");
    tokio::fs::create_dir_all(&devices_dir).await.unwrap();
    tokio::fs::write(
        devices_dir.join("pending.json"),
        serde_json::to_vec(&vec![json!({"client": "ios", "publicKey": "abc"})]).unwrap(),
    )
    .await
    .unwrap();

    auto_approve(config_dir.path(), 5, || 42).await;

    let paired: Vec<Value> =
        serde_json::from_slice(&tokio::fs::read(devices_dir.join("paired.json")).await.unwrap()).unwrap();
    assert_eq!(paired.len(), 1);
    assert_eq!(paired[0]["approved"], json!(true));
    assert_eq!(paired[0]["pairedAt"], json!(42));

    let pending: Vec<Value> =
        serde_json::from_slice(&tokio::fs::read(devices_dir.join("pending.json")).await.unwrap()).unwrap();
    assert!(pending.is_empty());
}

#[tokio::test(start_paused = true)]
async fn gives_up_silently_when_pending_never_appears() {
    let config_dir = tempfile::tempdir().unwrap();
    // Should not panic or hang; just exhaust the retry budget.
    auto_approve(config_dir.path(), 3, || 0).await;
    assert!(tokio::fs::metadata(config_dir.path().join("devices").join("paired.json")).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn empty_pending_array_is_treated_as_not_yet_appeared() {
    let config_dir = tempfile::tempdir().unwrap();
    let devices_dir = config_dir.path().join("devices");
    tokio::fs::create_dir_all(&devices_dir).await.unwrap();
    tokio::fs::write(devices_dir.join("pending.json"), "[]").await.unwrap();

    auto_approve(config_dir.path(), 2, || 0).await;

    assert!(tokio::fs::metadata(devices_dir.join("paired.json")).await.is_err());
}
