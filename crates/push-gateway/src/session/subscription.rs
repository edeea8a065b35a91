//! Channel subscription feeding a session

use super::events::SessionSignal;
use super::{SessionError, SessionEvent};
use futures_util::StreamExt;
use push_bus::{BusError, ChannelSet, MessageStream, PubSubBus};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One bus subscription covering a session's whole channel set.
///
/// Messages published before [`ChannelSubscription::open`] returns are not seen.
pub struct ChannelSubscription {
    channels: ChannelSet,
    messages: MessageStream,
}

impl std::fmt::Debug for ChannelSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSubscription")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl ChannelSubscription {
    pub async fn open(bus: &dyn PubSubBus, channels: ChannelSet) -> Result<Self, SessionError> {
        let messages = bus.subscribe(&channels).await?;
        Ok(Self { channels, messages })
    }

    #[must_use]
    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Next message event. A finished bus stream is reported as [`BusError::Closed`].
    pub async fn next_event(&mut self) -> Result<SessionEvent, SessionError> {
        match self.messages.next().await {
            Some(Ok(message)) => Ok(SessionEvent::Message(message)),
            Some(Err(e)) => Err(e.into()),
            None => Err(BusError::Closed.into()),
        }
    }

    /// Forward messages into the session queue until cancelled or failed
    pub(crate) async fn pump(mut self, tx: mpsc::Sender<SessionSignal>, cancel: CancellationToken) {
        loop {
            let signal = tokio::select! {
                () = cancel.cancelled() => break,
                event = self.next_event() => match event {
                    Ok(SessionEvent::Message(message)) => SessionSignal::Message(message),
                    Ok(_) => continue,
                    Err(e) => SessionSignal::Failed(e),
                },
            };

            let failed = matches!(signal, SessionSignal::Failed(_));
            if tx.send(signal).await.is_err() || failed {
                break;
            }
        }

        tracing::trace!(channels = %self.channels, "Subscription released");
    }
}
