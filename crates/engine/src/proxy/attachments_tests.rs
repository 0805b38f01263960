use super::*;
use crate::proxy::types::{ContentPart, ImageUrlPart, Message, MessageContent, Role};

fn png_data_url() -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode("AAA");
    format!("data:image/png;base64,{payload}")
}

#[tokio::test]
async fn materializes_an_image_and_rewrites_the_message_to_plain_text() {
    let workspace = tempfile::tempdir().unwrap();
    let mut messages = vec![Message {
        role: Role::User,
        content: MessageContent::Parts(vec![
            ContentPart::Text { text: "describe".to_string() },
            ContentPart::ImageUrl { image_url: ImageUrlPart { url: png_data_url() } },
        ]),
    }];

    materialize(&mut messages, workspace.path()).await;

    let MessageContent::Text(text) = &messages[0].content else { panic!("expected text content") };
    assert!(text.starts_with("[用户发送了文件: media/inbound/"));
    assert!(text.ends_with(".png]\n\ndescribe"));

    let inbound_dir = workspace.path().join("media").join("inbound");
    let mut entries = tokio::fs::read_dir(&inbound_dir).await.unwrap();
    let entry = entries.next_entry().await.unwrap().unwrap();
    let bytes = tokio::fs::read(entry.path()).await.unwrap();
    assert_eq!(bytes, b"AAA");
}

#[tokio::test]
async fn materializes_a_named_file_with_sanitized_filename() {
    let workspace = tempfile::tempdir().unwrap();
    let data = base64::engine::general_purpose::STANDARD.encode("hello world");
    let mut messages = vec![Message {
        role: Role::User,
        content: MessageContent::Parts(vec![ContentPart::File {
            filename: "../../etc/notes.txt".to_string(),
            data,
        }]),
    }];

    materialize(&mut messages, workspace.path()).await;

    let MessageContent::Text(text) = &messages[0].content else { panic!("expected text content") };
    assert_eq!(text, "[用户发送了文件: media/inbound/.._.._etc_notes.txt]");

    let bytes =
        tokio::fs::read(workspace.path().join("media").join("inbound").join(".._.._etc_notes.txt"))
            .await
            .unwrap();
    assert_eq!(bytes, b"hello world");
}

#[tokio::test]
async fn leaves_plain_string_content_untouched() {
    let workspace = tempfile::tempdir().unwrap();
    let mut messages =
        vec![Message { role: Role::User, content: MessageContent::Text("hi there".to_string()) }];

    materialize(&mut messages, workspace.path()).await;

    let MessageContent::Text(text) = &messages[0].content else { panic!("expected text content") };
    assert_eq!(text, "hi there");
}

#[tokio::test]
async fn only_the_last_user_message_is_materialized() {
    let workspace = tempfile::tempdir().unwrap();
    let mut messages = vec![
        Message {
            role: Role::User,
            content: MessageContent::Parts(vec![ContentPart::ImageUrl {
                image_url: ImageUrlPart { url: png_data_url() },
            }]),
        },
        Message { role: Role::Assistant, content: MessageContent::Text("ok".to_string()) },
        Message { role: Role::User, content: MessageContent::Text("second".to_string()) },
    ];

    materialize(&mut messages, workspace.path()).await;

    let MessageContent::Parts(_) = &messages[0].content else {
        panic!("first user message should be untouched")
    };
    let MessageContent::Text(text) = &messages[2].content else { panic!("expected text content") };
    assert_eq!(text, "second");
}

#[tokio::test]
async fn invalid_base64_is_dropped_without_failing() {
    let workspace = tempfile::tempdir().unwrap();
    let mut messages = vec![Message {
        role: Role::User,
        content: MessageContent::Parts(vec![
            ContentPart::Text { text: "hi".to_string() },
            ContentPart::File { filename: "bad.txt".to_string(), data: "not-base64!!!".to_string() },
        ]),
    }];

    materialize(&mut messages, workspace.path()).await;

    let MessageContent::Text(text) = &messages[0].content else { panic!("expected text content") };
    assert_eq!(text, "hi");
}
