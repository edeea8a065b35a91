//! WebSocket transport

use super::{CloseReason, FrameSink, FrameSource, Transport, TransportError, TransportKind};
use crate::protocol::{ErrorFrame, InboundFrame, PushFrame};
use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};

pub struct WsTransport {
    socket: WebSocket,
}

impl WsTransport {
    #[must_use]
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Transport for WsTransport {
    type Sink = WsSink;
    type Source = WsSource;

    fn kind(&self) -> TransportKind {
        TransportKind::Socket
    }

    fn split(self) -> (WsSink, WsSource) {
        let (sink, stream) = self.socket.split();
        (WsSink { sink }, WsSource { stream })
    }
}

pub struct WsSink {
    sink: SplitSink<WebSocket, Message>,
}

impl WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Socket(e.to_string()))
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn emit(&mut self, frame: &PushFrame) -> Result<(), TransportError> {
        self.send_text(frame.to_json()?).await
    }

    async fn reject(&mut self, error: &ErrorFrame) -> Result<(), TransportError> {
        self.send_text(error.to_json()?).await
    }

    async fn close(&mut self, reason: CloseReason) {
        let code = reason.close_code();
        let frame = CloseFrame {
            code: code.as_u16(),
            reason: code.description().into(),
        };

        if let Err(e) = self.sink.send(Message::Close(Some(frame))).await {
            tracing::debug!(error = %e, "Failed to send close frame");
        }
        let _ = self.sink.close().await;
    }
}

pub struct WsSource {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl FrameSource for WsSource {
    async fn receive(&mut self) -> Option<InboundFrame> {
        while let Some(msg) = self.stream.next().await {
            match msg {
                Ok(Message::Text(text)) => match InboundFrame::from_json(&text) {
                    Ok(frame) => return Some(frame),
                    Err(e) => {
                        tracing::debug!(error = %e, "Ignoring malformed frame");
                    }
                },
                Ok(Message::Binary(_)) => {
                    tracing::debug!("Ignoring binary frame");
                }
                // Protocol-level pings are answered by axum
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => {
                    tracing::debug!("Client closed connection");
                    return None;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket read error");
                    return None;
                }
            }
        }
        None
    }
}
