//! Server-Sent Events transport
//!
//! The sink writes into the channel backing the response body. The source
//! has nothing to read; it resolves once the client drops the body.

use super::{CloseReason, FrameSink, FrameSource, Transport, TransportError, TransportKind};
use crate::protocol::{ErrorFrame, EventName, InboundFrame, PushFrame};
use async_trait::async_trait;
use axum::response::sse::Event;
use futures_util::stream::{self, BoxStream, StreamExt};
use std::convert::Infallible;
use tokio::sync::mpsc;

/// Event stream handed to `axum::response::Sse`
pub type SseBody = BoxStream<'static, Result<Event, Infallible>>;

type EventSender = mpsc::Sender<Result<Event, Infallible>>;

#[derive(Debug)]
pub struct SseTransport {
    tx: EventSender,
}

impl SseTransport {
    /// Create a transport and the response body it writes to
    #[must_use]
    pub fn channel(buffer: usize) -> (Self, SseBody) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        let body = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        })
        .boxed();
        (Self { tx }, body)
    }
}

impl Transport for SseTransport {
    type Sink = SseSink;
    type Source = SseSource;

    fn kind(&self) -> TransportKind {
        TransportKind::Stream
    }

    fn split(self) -> (SseSink, SseSource) {
        (
            SseSink {
                tx: Some(self.tx.clone()),
            },
            SseSource { tx: self.tx },
        )
    }
}

#[derive(Debug)]
pub struct SseSink {
    tx: Option<EventSender>,
}

impl SseSink {
    async fn send(&mut self, event: Event) -> Result<(), TransportError> {
        let tx = self.tx.as_ref().ok_or(TransportError::Disconnected)?;
        tx.send(Ok(event))
            .await
            .map_err(|_| TransportError::Disconnected)
    }
}

#[async_trait]
impl FrameSink for SseSink {
    async fn emit(&mut self, frame: &PushFrame) -> Result<(), TransportError> {
        let event = Event::default()
            .event(frame.event.as_str())
            .data(frame.data_json()?);
        self.send(event).await
    }

    async fn reject(&mut self, error: &ErrorFrame) -> Result<(), TransportError> {
        let event = Event::default()
            .event(EventName::Error.as_str())
            .data(error.to_json()?);
        self.send(event).await
    }

    async fn close(&mut self, _reason: CloseReason) {
        // The body ends once every sender is gone.
        self.tx = None;
    }
}

#[derive(Debug)]
pub struct SseSource {
    tx: EventSender,
}

#[async_trait]
impl FrameSource for SseSource {
    async fn receive(&mut self) -> Option<InboundFrame> {
        self.tx.closed().await;
        None
    }
}
