//! In-memory transport for engine tests

use super::{CloseReason, FrameSink, FrameSource, Transport, TransportError, TransportKind};
use crate::protocol::{ErrorFrame, EventName, InboundFrame, PushFrame};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

/// Something the session wrote to the transport
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Delivered {
    Frame(PushFrame),
    Rejected(ErrorFrame),
    Closed(CloseReason),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Recorded {
    pub at: Duration,
    pub item: Delivered,
}

impl Recorded {
    pub fn event(&self) -> Option<EventName> {
        match &self.item {
            Delivered::Frame(frame) => Some(frame.event),
            _ => None,
        }
    }
}

pub(crate) struct ChannelTransport {
    kind: TransportKind,
    started: Instant,
    stall: Option<(EventName, Duration)>,
    out: mpsc::UnboundedSender<Recorded>,
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
}

/// Client side of a [`ChannelTransport`]
pub(crate) struct Peer {
    pub delivered: mpsc::UnboundedReceiver<Recorded>,
    pub inbound: mpsc::UnboundedSender<InboundFrame>,
}

impl Peer {
    /// Read everything up to and including the close
    pub async fn until_closed(&mut self) -> Vec<Recorded> {
        let mut all = Vec::new();
        while let Some(recorded) = self.delivered.recv().await {
            let closed = matches!(recorded.item, Delivered::Closed(_));
            all.push(recorded);
            if closed {
                break;
            }
        }
        all
    }
}

pub(crate) fn pair(kind: TransportKind) -> (ChannelTransport, Peer) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    (
        ChannelTransport {
            kind,
            started: Instant::now(),
            stall: None,
            out: out_tx,
            inbound: in_rx,
        },
        Peer {
            delivered: out_rx,
            inbound: in_tx,
        },
    )
}

impl ChannelTransport {
    /// Hold the first write of `event` for `delay` before it is recorded
    pub fn stalling(mut self, event: EventName, delay: Duration) -> Self {
        self.stall = Some((event, delay));
        self
    }
}

impl Transport for ChannelTransport {
    type Sink = ChannelSink;
    type Source = ChannelSource;

    fn kind(&self) -> TransportKind {
        self.kind
    }

    fn split(self) -> (ChannelSink, ChannelSource) {
        (
            ChannelSink {
                started: self.started,
                stall: self.stall,
                out: self.out,
            },
            ChannelSource {
                inbound: self.inbound,
            },
        )
    }
}

pub(crate) struct ChannelSink {
    started: Instant,
    stall: Option<(EventName, Duration)>,
    out: mpsc::UnboundedSender<Recorded>,
}

impl ChannelSink {
    fn record(&self, item: Delivered) -> Result<(), TransportError> {
        self.out
            .send(Recorded {
                at: self.started.elapsed(),
                item,
            })
            .map_err(|_| TransportError::Disconnected)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn emit(&mut self, frame: &PushFrame) -> Result<(), TransportError> {
        if let Some((_, delay)) = self.stall.take_if(|(event, _)| *event == frame.event) {
            time::sleep(delay).await;
        }
        self.record(Delivered::Frame(frame.clone()))
    }

    async fn reject(&mut self, error: &ErrorFrame) -> Result<(), TransportError> {
        self.record(Delivered::Rejected(error.clone()))
    }

    async fn close(&mut self, reason: CloseReason) {
        let _ = self.record(Delivered::Closed(reason));
    }
}

pub(crate) struct ChannelSource {
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
}

#[async_trait]
impl FrameSource for ChannelSource {
    async fn receive(&mut self) -> Option<InboundFrame> {
        self.inbound.recv().await
    }
}
