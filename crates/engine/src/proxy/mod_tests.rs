use super::*;
use crate::proxy::types::{Message, MessageContent, Role};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(text: &str) -> ChatRequest {
    ChatRequest {
        model: "zenmux".to_string(),
        messages: vec![Message { role: Role::User, content: MessageContent::Text(text.to_string()) }],
        stream: true,
        user: None,
    }
}

async fn drain(mut rx: mpsc::Receiver<ProxyDelta>) -> Vec<ProxyDelta> {
    let mut out = Vec::new();
    while let Some(delta) = rx.recv().await {
        out.push(delta);
    }
    out
}

#[tokio::test]
async fn streams_a_single_turn_as_one_content_delta() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"hi\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" there\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let workspace = tempfile::tempdir().unwrap();
    let target = UpstreamTarget {
        base_url: server.uri(),
        gateway_token: "tok".to_string(),
        user_id: "alice".to_string(),
        workspace_dir: workspace.path().to_path_buf(),
    };

    let rx = handle_chat_completion(reqwest::Client::new(), request("hello"), target);
    let deltas = drain(rx).await;

    assert!(deltas
        .iter()
        .any(|d| matches!(d, ProxyDelta::Content { text, filtered: false } if text == "hi there")));
}

#[tokio::test]
async fn a_stream_that_ends_without_an_explicit_stop_still_flushes_its_buffer() {
    let server = MockServer::start().await;
    let body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"A\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"B\"},\"finish_reason\":null}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let workspace = tempfile::tempdir().unwrap();
    let target = UpstreamTarget {
        base_url: server.uri(),
        gateway_token: "tok".to_string(),
        user_id: "alice".to_string(),
        workspace_dir: workspace.path().to_path_buf(),
    };

    let rx = handle_chat_completion(reqwest::Client::new(), request("hello"), target);
    let deltas = drain(rx).await;

    assert!(deltas
        .iter()
        .any(|d| matches!(d, ProxyDelta::Content { text, filtered: false } if text == "AB")));
    assert!(!deltas.iter().any(
        |d| matches!(d, ProxyDelta::Content { text, filtered: false } if text == "出了一点小问题，请稍后重试")
    ));
}

#[tokio::test]
async fn exhausted_retries_surface_a_friendly_message_instead_of_an_error() {
    let workspace = tempfile::tempdir().unwrap();
    let target = UpstreamTarget {
        base_url: "http://127.0.0.1:1".to_string(),
        gateway_token: "tok".to_string(),
        user_id: "alice".to_string(),
        workspace_dir: workspace.path().to_path_buf(),
    };

    let rx = handle_chat_completion(reqwest::Client::new(), request("hello"), target);
    let deltas = drain(rx).await;

    assert!(deltas.iter().any(|d| matches!(d, ProxyDelta::Content { filtered: false, .. })));
}

#[tokio::test]
async fn a_new_workspace_file_produced_during_the_stream_is_reported() {
    let server = MockServer::start().await;
    let workspace = tempfile::tempdir().unwrap();
    let workspace_path = workspace.path().to_path_buf();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(move |_req: &wiremock::Request| {
            std::fs::write(workspace_path.join("output.txt"), "result").unwrap();
            ResponseTemplate::new(200).set_body_raw(
                "data: {\"choices\":[{\"delta\":{\"content\":\"done\"},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n",
                "text/event-stream",
            )
        })
        .mount(&server)
        .await;

    let target = UpstreamTarget {
        base_url: server.uri(),
        gateway_token: "tok".to_string(),
        user_id: "alice".to_string(),
        workspace_dir: workspace.path().to_path_buf(),
    };

    let rx = handle_chat_completion(reqwest::Client::new(), request("hello"), target);
    let deltas = drain(rx).await;

    assert!(deltas.iter().any(|d| matches!(d, ProxyDelta::File { name, .. } if name == "output.txt")));
}
