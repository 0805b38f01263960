use super::*;

#[test]
fn server_error_status_classifies_as_server() {
    assert_eq!(classify_status(reqwest::StatusCode::BAD_GATEWAY), Some(FailureClass::Server));
}

#[test]
fn client_error_status_does_not_classify_as_server() {
    assert_eq!(classify_status(reqwest::StatusCode::NOT_FOUND), None);
}

#[test]
fn friendly_messages_match_the_literal_table() {
    assert_eq!(FailureClass::Connect.friendly_message(), "网络连接异常，正在重试...");
    assert_eq!(FailureClass::Timeout.friendly_message(), "AI 响应超时，请稍后重试");
    assert_eq!(FailureClass::Read.friendly_message(), "网络波动，数据读取中断");
    assert_eq!(FailureClass::Server.friendly_message(), "AI 服务暂时繁忙，请稍后再试");
    assert_eq!(FailureClass::Unknown.friendly_message(), "出了一点小问题，请稍后重试");
}

#[tokio::test]
async fn connect_refused_classifies_as_connect() {
    let client = reqwest::Client::new();
    let err = client.get("http://127.0.0.1:1").send().await.unwrap_err();
    assert_eq!(classify(&err), FailureClass::Connect);
}
