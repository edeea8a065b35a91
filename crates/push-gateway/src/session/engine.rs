//! Session engine
//!
//! One control loop per connection. Source tasks (bus pump, keep-alive
//! ticker, reconnect timer, inbound reader) feed a single queue; the loop
//! applies each signal in arrival order, writes to the transport and stops at
//! the lifetime deadline. Teardown cancels every source through one token.

use super::events::SessionSignal;
use super::keepalive::{self, KeepAliveMonitor};
use super::{
    ChannelSubscription, GatewayMetrics, ReconnectScheduler, Session, SessionError, SessionEvent,
    SessionOutcome, SessionState,
};
use crate::protocol::ErrorFrame;
use crate::transport::{CloseReason, FrameSink, FrameSource, Transport, TransportKind};
use push_bus::{ChannelSet, SharedBus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Capacity of the per-session signal queue
const SIGNAL_BUFFER: usize = 64;

/// How long the final reconnect frame may take once the lifetime is up
const FINAL_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Deadline used when a lifetime does not fit in an `Instant`
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// A validated session with its bus subscription already open
#[derive(Debug)]
pub struct PendingSession {
    session: Session,
    subscription: ChannelSubscription,
}

impl PendingSession {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.session.id()
    }

    #[must_use]
    pub fn channels(&self) -> &ChannelSet {
        self.subscription.channels()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Drives sessions for every transport
#[derive(Clone)]
pub struct SessionEngine {
    bus: SharedBus,
    scheduler: Arc<ReconnectScheduler>,
    metrics: Arc<GatewayMetrics>,
    heartbeat_interval: Duration,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for SessionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEngine")
            .field("bus", &self.bus.name())
            .field("scheduler", &self.scheduler)
            .field("heartbeat_interval", &self.heartbeat_interval)
            .finish_non_exhaustive()
    }
}

impl SessionEngine {
    #[must_use]
    pub fn new(
        bus: SharedBus,
        scheduler: Arc<ReconnectScheduler>,
        metrics: Arc<GatewayMetrics>,
        heartbeat_interval: Duration,
    ) -> Self {
        Self {
            bus,
            scheduler,
            metrics,
            heartbeat_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// End every running session as if its lifetime had elapsed.
    ///
    /// Clients still get their reconnect request, so they move to another
    /// instance while this one shuts down.
    pub fn drain(&self) {
        self.shutdown.cancel();
    }

    #[must_use]
    pub fn metrics(&self) -> &Arc<GatewayMetrics> {
        &self.metrics
    }

    /// Validate the requested channels and subscribe to them.
    ///
    /// Runs before any response is committed, so callers can still answer
    /// with a plain HTTP error.
    pub async fn open(
        &self,
        raw_channels: Option<&str>,
        kind: TransportKind,
    ) -> Result<PendingSession, SessionError> {
        let mut session = Session::new(kind);
        session.transition(SessionState::Validating);

        let channels = match ChannelSet::parse(raw_channels) {
            Ok(channels) => {
                session.set_channels(channels.clone());
                channels
            }
            Err(e) => {
                tracing::info!(
                    session_id = %session.id(),
                    transport = %kind,
                    error = %e,
                    "Rejected subscription request"
                );
                session.transition(SessionState::BadRequest);
                return Err(e.into());
            }
        };

        match ChannelSubscription::open(self.bus.as_ref(), channels).await {
            Ok(subscription) => Ok(PendingSession {
                session,
                subscription,
            }),
            Err(e) => {
                tracing::error!(
                    session_id = %session.id(),
                    transport = %kind,
                    error = %e,
                    "Failed to subscribe"
                );
                session.transition(SessionState::InternalError);
                Err(e)
            }
        }
    }

    /// Open and run a session, reporting setup failures over the transport itself
    pub async fn serve<T: Transport>(&self, raw_channels: Option<&str>, transport: T) -> SessionOutcome {
        match self.open(raw_channels, transport.kind()).await {
            Ok(pending) => self.run(pending, transport).await,
            Err(error) => Self::refuse(transport, &error).await,
        }
    }

    async fn refuse<T: Transport>(transport: T, error: &SessionError) -> SessionOutcome {
        let (mut sink, _source) = transport.split();
        let reason = error.close_reason();

        if let Err(e) = sink.reject(&ErrorFrame::new(error.to_string())).await {
            tracing::debug!(error = %e, "Failed to send error frame");
        }
        sink.close(reason).await;

        SessionOutcome {
            state: error.terminal_state(),
            reason,
            events_sent: 0,
        }
    }

    /// Run an opened session until it ends
    pub async fn run<T: Transport>(&self, pending: PendingSession, transport: T) -> SessionOutcome {
        let PendingSession {
            mut session,
            subscription,
        } = pending;

        let plan = self.scheduler.plan();
        let _connection = (session.kind() == TransportKind::Socket)
            .then(|| self.metrics.connection_opened());
        session.activate(plan.lifetime);

        tracing::info!(
            session_id = %session.id(),
            transport = %session.kind(),
            channels = %session.channels_display(),
            lifetime_ms = session.lifetime_ms(),
            "Connection established"
        );

        let now = Instant::now();
        let deadline = now
            .checked_add(plan.lifetime)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let (mut sink, source) = transport.split();
        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(SIGNAL_BUFFER);

        let mut tasks = JoinSet::new();
        tasks.spawn(subscription.pump(tx.clone(), cancel.clone()));
        tasks.spawn(keepalive::run_ticker(
            self.heartbeat_interval,
            tx.clone(),
            cancel.clone(),
        ));
        tasks.spawn(run_reconnect_timer(plan.reconnect_offset, tx.clone(), cancel.clone()));
        tasks.spawn(read_inbound(source, tx, cancel.clone()));

        let mut control = ControlLoop {
            session_id: session.id(),
            kind: session.kind(),
            monitor: KeepAliveMonitor::for_transport(session.kind(), self.heartbeat_interval),
            metrics: &self.metrics,
            shutdown: &self.shutdown,
            reconnect_sent: false,
            events_sent: 0,
        };
        let reason = control.run(&mut sink, rx, deadline).await;

        cancel.cancel();
        while tasks.join_next().await.is_some() {}
        sink.close(reason).await;

        let state = session.finish(reason);
        let duration = chrono::Utc::now() - session.established_at();

        tracing::info!(
            session_id = %session.id(),
            transport = %session.kind(),
            channels = %session.channels_display(),
            lifetime_ms = session.lifetime_ms(),
            state = %state,
            reason = %reason,
            events_sent = control.events_sent,
            duration_ms = duration.num_milliseconds(),
            "Connection terminated"
        );

        SessionOutcome {
            state,
            reason,
            events_sent: control.events_sent,
        }
    }
}

/// The single writer for one session
struct ControlLoop<'a> {
    session_id: Uuid,
    kind: TransportKind,
    monitor: KeepAliveMonitor,
    metrics: &'a GatewayMetrics,
    shutdown: &'a CancellationToken,
    reconnect_sent: bool,
    events_sent: u64,
}

impl ControlLoop<'_> {
    async fn run<S: FrameSink>(
        &mut self,
        sink: &mut S,
        mut rx: mpsc::Receiver<SessionSignal>,
        deadline: Instant,
    ) -> CloseReason {
        loop {
            let signal = tokio::select! {
                biased;
                () = time::sleep_until(deadline) => return self.expire(sink).await,
                () = self.shutdown.cancelled() => {
                    tracing::debug!(session_id = %self.session_id, "Draining session");
                    return self.expire(sink).await;
                }
                signal = rx.recv() => signal,
            };

            let event = match signal {
                Some(SessionSignal::Message(message)) => SessionEvent::Message(message),
                Some(SessionSignal::Tick) => match self.monitor.on_tick() {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(session_id = %self.session_id, error = %e, "Liveness check failed");
                        return CloseReason::LivenessTimeout;
                    }
                },
                Some(SessionSignal::Reconnect) => {
                    if self.reconnect_sent {
                        continue;
                    }
                    self.reconnect_sent = true;
                    SessionEvent::Reconnect
                }
                Some(SessionSignal::Inbound(frame)) => match self.monitor.on_inbound(&frame) {
                    Some(reply) => reply,
                    None => continue,
                },
                Some(SessionSignal::PeerGone) | None => return CloseReason::PeerClosed,
                Some(SessionSignal::Failed(error)) => return self.fail(sink, &error).await,
            };

            match time::timeout_at(deadline, self.deliver(sink, &event)).await {
                Ok(Ok(())) => {}
                Ok(Err(reason)) => return reason,
                Err(_) => return self.expire(sink).await,
            }
        }
    }

    async fn deliver<S: FrameSink>(&mut self, sink: &mut S, event: &SessionEvent) -> Result<(), CloseReason> {
        match sink.emit(&event.to_frame()).await {
            Ok(()) => {
                self.events_sent += 1;
                if self.kind == TransportKind::Socket && matches!(event, SessionEvent::Message(_)) {
                    self.metrics.message_pushed();
                }
                Ok(())
            }
            Err(e) if e.is_disconnect() => {
                tracing::debug!(session_id = %self.session_id, error = %e, "Peer went away during write");
                Err(CloseReason::PeerClosed)
            }
            Err(e) => Err(self.fail(sink, &SessionError::from(e)).await),
        }
    }

    /// Lifetime is up. A reconnect that has not gone out yet is sent first.
    async fn expire<S: FrameSink>(&mut self, sink: &mut S) -> CloseReason {
        if !self.reconnect_sent {
            self.reconnect_sent = true;
            let flush = self.deliver(sink, &SessionEvent::Reconnect);
            if let Ok(Err(reason)) = time::timeout(FINAL_FLUSH_TIMEOUT, flush).await {
                return reason;
            }
        }
        CloseReason::LifetimeElapsed
    }

    async fn fail<S: FrameSink>(&self, sink: &mut S, error: &SessionError) -> CloseReason {
        tracing::error!(session_id = %self.session_id, error = %error, "Session failed");

        if let Err(e) = sink.reject(&ErrorFrame::new(error.to_string())).await {
            tracing::debug!(session_id = %self.session_id, error = %e, "Failed to send error frame");
        }
        error.close_reason()
    }
}

/// Signal the reconnect request once `offset` has passed
async fn run_reconnect_timer(
    offset: Duration,
    tx: mpsc::Sender<SessionSignal>,
    cancel: CancellationToken,
) {
    tokio::select! {
        () = cancel.cancelled() => {}
        () = time::sleep(offset) => {
            let _ = tx.send(SessionSignal::Reconnect).await;
        }
    }
}

/// Forward inbound frames until the peer goes away
async fn read_inbound<R: FrameSource>(
    mut source: R,
    tx: mpsc::Sender<SessionSignal>,
    cancel: CancellationToken,
) {
    loop {
        let signal = tokio::select! {
            () = cancel.cancelled() => break,
            frame = source.receive() => match frame {
                Some(frame) => SessionSignal::Inbound(frame),
                None => SessionSignal::PeerGone,
            },
        };

        let gone = matches!(signal, SessionSignal::PeerGone);
        if tx.send(signal).await.is_err() || gone {
            break;
        }
    }
}
