//! WebSocket subscription tests

use integration_tests::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_ws_requires_channels() {
    let server = TestServer::start().await.unwrap();
    let mut ws = server.connect_ws(None).await.unwrap();

    match ws.next().await.unwrap() {
        WsReceived::Error(error) => assert_eq!(error, "'channels' query parameter required"),
        other => panic!("Expected error frame, got {other:?}"),
    }
    assert_eq!(ws.wait_closed().await.unwrap(), Some(1008));
}

#[tokio::test]
async fn test_ws_receives_messages_on_all_channels() {
    let server = TestServer::start().await.unwrap();
    let foo = unique_channel("foo");
    let bar = unique_channel("bar");

    let mut ws = server.connect_ws(Some(&format!("{foo},{bar}"))).await.unwrap();

    // The first ping means the subscription is live
    let ping = ws.next_event("ping").await.unwrap();
    assert_eq!(ping, WsFrame::control("ping"));
    ws.send(&WsFrame::control("pong")).await.unwrap();

    for (channel, text) in [(&foo, "one"), (&bar, "two")] {
        let response = server
            .post("/messages", &PublishBody::text(channel, text))
            .await
            .unwrap();
        let result: PublishResult = assert_json(response, StatusCode::ACCEPTED).await.unwrap();
        assert_eq!(result.subscribers, 1);
    }

    let mut received = Vec::new();
    while received.len() < 2 {
        let frame = ws.next_event("message").await.unwrap();
        received.push(frame.message_data().unwrap());
    }
    received.sort_by(|a, b| a.message.cmp(&b.message));
    assert_eq!(received[0].channel, foo);
    assert_eq!(received[0].message, "one");
    assert_eq!(received[1].channel, bar);
    assert_eq!(received[1].message, "two");

    let response = server.get("/health").await.unwrap();
    let health: HealthBody = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(health.ws_connections, 1);
    assert!(health.messages_pushed >= 2);

    ws.close().await.unwrap();
}

#[tokio::test]
async fn test_ws_client_ping_gets_pong() {
    let server = TestServer::start().await.unwrap();
    let mut ws = server
        .connect_ws(Some(&unique_channel("pingpong")))
        .await
        .unwrap();

    ws.send(&WsFrame::control("ping")).await.unwrap();
    let pong = ws.next_event("pong").await.unwrap();
    assert_eq!(pong, WsFrame::control("pong"));
}

#[tokio::test]
async fn test_ws_session_lifecycle() {
    let server = TestServer::start_with(SHORT_LIFETIME).await.unwrap();
    let mut ws = server
        .connect_ws(Some(&unique_channel("lifecycle")))
        .await
        .unwrap();

    // next_event answers pings, keeping the session alive until its lifetime ends
    let reconnect = ws.next_event("reconnect").await.unwrap();
    assert_eq!(reconnect, WsFrame::control("reconnect"));
    assert_eq!(ws.wait_closed().await.unwrap(), Some(1000));
}

#[tokio::test]
async fn test_ws_unanswered_ping_times_out() {
    let server = TestServer::start_with(&[("PUSH_HEARTBEAT_INTERVAL_SECS", "1")])
        .await
        .unwrap();
    let mut ws = server
        .connect_ws(Some(&unique_channel("silent")))
        .await
        .unwrap();

    assert_eq!(ws.wait_closed().await.unwrap(), Some(4009));
}
