//! Publish and health endpoint tests
//!
//! Run with: cargo test -p integration-tests

use integration_tests::*;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/health").await.unwrap();
    let body: HealthBody = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body.status, "ok");
    assert_eq!(body.bus, "up");
    assert_eq!(body.ws_connections, 0);
    assert_eq!(body.messages_pushed, 0);
}

#[tokio::test]
async fn test_publish_without_subscribers() {
    let server = TestServer::start().await.unwrap();
    let channel = unique_channel("lonely");

    let response = server
        .post("/messages", &PublishBody::text(&channel, "hello"))
        .await
        .unwrap();
    let body: PublishResult = assert_json(response, StatusCode::ACCEPTED).await.unwrap();

    assert_eq!(body.subscribers, 0);
}

#[tokio::test]
async fn test_publish_malformed_body() {
    let server = TestServer::start().await.unwrap();

    let response = server.post_raw("/messages", "not json").await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();

    assert_eq!(body.error, "Invalid request body");
}

#[tokio::test]
async fn test_publish_missing_fields() {
    let server = TestServer::start().await.unwrap();

    for raw in [r#"{"channel":"news"}"#, r#"{"message":"hi"}"#, r#"{"channel":"","message":"hi"}"#] {
        let response = server.post_raw("/messages", raw).await.unwrap();
        let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
        assert_eq!(body.error, "Invalid request body", "body: {raw}");
    }
}

#[tokio::test]
async fn test_publish_structured_message_is_serialized() {
    let server = TestServer::start().await.unwrap();
    let channel = unique_channel("structured");
    let mut stream = server.subscribe_sse(&channel).await.unwrap();

    let body = json!({ "channel": channel, "message": { "price": 42 } });
    let response = server.post("/messages", &body).await.unwrap();
    let result: PublishResult = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
    assert_eq!(result.subscribers, 1);

    let event = stream.next_named("message").await.unwrap();
    let data = event.message_data().unwrap();
    assert_eq!(data.channel, channel);
    assert_eq!(data.message, r#"{"price":42}"#);
}

#[tokio::test]
async fn test_unknown_route() {
    let server = TestServer::start().await.unwrap();

    let response = server.get("/nope").await.unwrap();
    assert_status(&response, StatusCode::NOT_FOUND);
}
