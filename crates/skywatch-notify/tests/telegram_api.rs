//! Integration tests for the Telegram transport using wiremock.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skywatch_notify::{Messenger, NotifyError, TelegramMessenger};

#[tokio::test]
async fn send_posts_chat_id_and_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .and(body_partial_json(json!({
            "chat_id": "42",
            "text": "rain incoming"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let messenger = TelegramMessenger::with_base_url("test-token", server.uri()).unwrap();
    messenger.send("42", "rain incoming").await.unwrap();
}

#[tokio::test]
async fn api_level_rejection_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "chat not found"
        })))
        .mount(&server)
        .await;

    let messenger = TelegramMessenger::with_base_url("test-token", server.uri()).unwrap();
    let err = messenger.send("42", "hello").await.unwrap_err();
    match err {
        NotifyError::Rejected(desc) => assert_eq!(desc, "chat not found"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn http_error_status_maps_to_http_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let messenger = TelegramMessenger::with_base_url("test-token", server.uri()).unwrap();
    let err = messenger.send("42", "hello").await.unwrap_err();
    assert!(matches!(err, NotifyError::Http(_)));
}
