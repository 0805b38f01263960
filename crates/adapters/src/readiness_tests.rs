use super::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn any_http_response_counts_as_ready() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let port: u16 = server.uri().rsplit(':').next().unwrap().parse().unwrap();
    let result = probe_once(port, "tok", Duration::from_secs(3)).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn connection_refused_is_connect_failed() {
    // Port 1 is reserved and nothing should be listening on it in test environments.
    let result = probe_once(1, "tok", Duration::from_millis(500)).await;
    assert!(matches!(result, Err(ProbeError::ConnectFailed) | Err(ProbeError::ConnectTimeout)));
}
