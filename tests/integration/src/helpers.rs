//! Test helper functions

use crate::fixtures::{SseEvent, WsFrame};
use anyhow::{anyhow, bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use push_common::AppConfig;
use push_gateway::{create_app, create_gateway_state, GatewayState};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Upper bound for any single read from a stream under test
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Push settings small enough for a test to watch a whole session
pub const SHORT_LIFETIME: &[(&str, &str)] = &[
    ("PUSH_RECONNECT_DITHER_MIN_SECS", "3"),
    ("PUSH_RECONNECT_DITHER_MAX_SECS", "3"),
    ("PUSH_CLIENT_CLOSE_GRACE_PERIOD_SECS", "1"),
    ("PUSH_HEARTBEAT_INTERVAL_SECS", "1"),
];

/// Test server wrapper
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: GatewayState,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a gateway backed by the in-process bus
    pub async fn start() -> Result<Self> {
        Self::start_with(&[]).await
    }

    /// Start a gateway with configuration overrides
    pub async fn start_with(overrides: &[(&str, &str)]) -> Result<Self> {
        Self::start_with_config(test_config(overrides)?).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let state = create_gateway_state(config)
            .await
            .context("Failed to build gateway state")?;
        let app = create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Give the server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;

        // No client-wide timeout: SSE bodies outlive any fixed request budget
        let client = Client::builder().build()?;

        Ok(Self {
            addr,
            client,
            state,
            _handle: handle,
        })
    }

    /// Get the base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// WebSocket URL for a channel list; `None` omits the query parameter
    pub fn ws_url(&self, channels: Option<&str>) -> String {
        match channels {
            Some(channels) => format!("ws://{}/ws/messages?channels={channels}", self.addr),
            None => format!("ws://{}/ws/messages", self.addr),
        }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request with a raw JSON-typed body
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?)
    }

    /// Open an SSE subscription and return once response headers arrive
    pub async fn subscribe_sse(&self, channels: &str) -> Result<SseStream> {
        let response = self
            .get(&format!("/sse/messages?channels={channels}"))
            .await?;
        assert_status(&response, StatusCode::OK);
        Ok(SseStream::new(response))
    }

    /// Open a WebSocket subscription
    pub async fn connect_ws(&self, channels: Option<&str>) -> Result<WsClient> {
        let (socket, _) = connect_async(self.ws_url(channels))
            .await
            .context("WebSocket handshake failed")?;
        Ok(WsClient { socket })
    }
}

/// Build a test configuration on top of the in-process bus defaults
pub fn test_config(overrides: &[(&str, &str)]) -> Result<AppConfig> {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("APP_ENV".to_string(), "development".to_string()),
        ("BUS_BACKEND".to_string(), "memory".to_string()),
        ("SERVER_HOST".to_string(), "127.0.0.1".to_string()),
        ("SERVER_PORT".to_string(), "0".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert((*key).to_string(), (*value).to_string());
    }

    Ok(AppConfig::from_lookup(|key| vars.get(key).cloned())?)
}

/// Redis URL for the broker-backed tests, if one is configured
pub fn check_redis_env() -> Option<String> {
    std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty())
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status != expected_status {
        bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse JSON: {body}"))
}

/// Assert response status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Incremental reader over an SSE response body
pub struct SseStream {
    response: Response,
    buffer: String,
}

impl SseStream {
    fn new(response: Response) -> Self {
        Self {
            response,
            buffer: String::new(),
        }
    }

    /// Next event, or `None` once the server ends the body
    pub async fn next_event(&mut self) -> Result<Option<SseEvent>> {
        loop {
            if let Some(pos) = self.buffer.find("\n\n") {
                let block: String = self.buffer.drain(..pos + 2).collect();
                if let Some(event) = SseEvent::parse(&block) {
                    return Ok(Some(event));
                }
                continue;
            }

            let chunk = timeout(READ_TIMEOUT, self.response.chunk())
                .await
                .map_err(|_| anyhow!("Timed out waiting for SSE data"))??;
            match chunk {
                Some(bytes) => self
                    .buffer
                    .push_str(&String::from_utf8_lossy(&bytes).replace("\r\n", "\n")),
                None => return Ok(None),
            }
        }
    }

    /// Skip ahead to the next event with the given name
    pub async fn next_named(&mut self, name: &str) -> Result<SseEvent> {
        while let Some(event) = self.next_event().await? {
            if event.event == name {
                return Ok(event);
            }
        }
        bail!("SSE stream ended before a '{name}' event")
    }

    /// Read every remaining event until the server closes the body
    pub async fn collect_remaining(&mut self) -> Result<Vec<SseEvent>> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await? {
            events.push(event);
        }
        Ok(events)
    }
}

/// What a WebSocket client observed next
#[derive(Debug)]
pub enum WsReceived {
    Frame(WsFrame),
    Error(String),
    Closed(Option<u16>),
}

/// Thin test client over a WebSocket connection
pub struct WsClient {
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Next text frame or close; transport-level ping/pong is skipped
    pub async fn next(&mut self) -> Result<WsReceived> {
        loop {
            let message = timeout(READ_TIMEOUT, self.socket.next())
                .await
                .map_err(|_| anyhow!("Timed out waiting for a WebSocket frame"))?;

            match message {
                Some(Ok(Message::Text(text))) => {
                    let value: serde_json::Value = serde_json::from_str(&text)?;
                    if let Some(error) = value.get("error").and_then(|e| e.as_str()) {
                        return Ok(WsReceived::Error(error.to_string()));
                    }
                    return Ok(WsReceived::Frame(serde_json::from_value(value)?));
                }
                Some(Ok(Message::Close(frame))) => {
                    return Ok(WsReceived::Closed(frame.map(|f: CloseFrame<'_>| u16::from(f.code))));
                }
                Some(Ok(_)) => {}
                Some(Err(_)) | None => return Ok(WsReceived::Closed(None)),
            }
        }
    }

    /// Next application frame with the given event, answering gateway pings
    pub async fn next_event(&mut self, name: &str) -> Result<WsFrame> {
        loop {
            match self.next().await? {
                WsReceived::Frame(frame) if frame.event == name => return Ok(frame),
                WsReceived::Frame(frame) if frame.event == "ping" => {
                    self.send(&WsFrame::control("pong")).await?;
                }
                WsReceived::Frame(_) => {}
                other => bail!("Expected '{name}' frame, got {other:?}"),
            }
        }
    }

    /// Wait for the close frame, ignoring anything before it
    pub async fn wait_closed(&mut self) -> Result<Option<u16>> {
        loop {
            if let WsReceived::Closed(code) = self.next().await? {
                return Ok(code);
            }
        }
    }

    pub async fn send(&mut self, frame: &WsFrame) -> Result<()> {
        let text = serde_json::to_string(frame)?;
        self.socket.send(Message::Text(text)).await?;
        Ok(())
    }

    pub async fn close(mut self) -> Result<()> {
        self.socket.close(None).await?;
        Ok(())
    }
}
