//! Connection lifecycle state machine.
//!
//! [`ConnectionManager`] owns the single live channel to the backend and
//! recovers from any disconnect with a fixed-delay retry. An explicit
//! [`close`](ConnectionManager::close) is the only path that suppresses
//! reconnection; everything else — refused dial, dropped connection,
//! server-initiated close — degrades to "disconnected, retrying" and never
//! escalates to a fatal error.
//!
//! Every state transition is published on a [`tokio::sync::watch`] channel
//! so UI collaborators can drive a connection-status indicator without the
//! manager knowing about them.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::router::MessageRouter;
use crate::config::ClientConfig;
use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;

/// Connection lifecycle state. The sole source of truth for whether sends
/// are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No channel; a reconnect may be pending.
    #[default]
    Disconnected,
    /// A dial is in flight.
    Connecting,
    /// The channel is open.
    Connected,
}

/// Owns the channel to the backend: connect / disconnect / reconnect.
///
/// Cheap to clone; all clones drive the same connection. One manager is
/// created per session and lives until [`close`](Self::close).
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    router: MessageRouter,
    status_tx: watch::Sender<ConnectionState>,
    /// Write half of the channel; `None` whenever disconnected.
    sink: Mutex<Option<WsSink>>,
    /// Read-loop task for the current channel.
    reader: Mutex<Option<JoinHandle<()>>>,
    /// At most one pending reconnect timer, ever.
    reconnect: StdMutex<Option<JoinHandle<()>>>,
    /// Set by `close()`; suppresses all future reconnects.
    closed: AtomicBool,
}

impl ConnectionManager {
    /// Creates a manager in the [`ConnectionState::Disconnected`] state.
    /// No I/O happens until [`connect`](Self::connect).
    #[must_use]
    pub fn new(config: ClientConfig, router: MessageRouter) -> Self {
        let (status_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                config,
                router,
                status_tx,
                sink: Mutex::new(None),
                reader: Mutex::new(None),
                reconnect: StdMutex::new(None),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the router this manager feeds inbound frames into.
    #[must_use]
    pub fn router(&self) -> &MessageRouter {
        &self.inner.router
    }

    /// Subscribes to connection-status transitions. The receiver always
    /// holds the current state, so late subscribers see the latest value.
    #[must_use]
    pub fn status(&self) -> watch::Receiver<ConnectionState> {
        self.inner.status_tx.subscribe()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.status_tx.borrow()
    }

    /// Returns `true` iff the channel is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Returns `true` while a reconnect timer is pending.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.inner
            .reconnect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Opens the channel to the endpoint derived from the configured
    /// origin (`ws(s)://host/ws`).
    ///
    /// On success the state becomes [`ConnectionState::Connected`], any
    /// pending reconnect timer is cancelled, and a read loop starts
    /// feeding the router. On failure the state becomes
    /// [`ConnectionState::Disconnected`] and a reconnect is scheduled —
    /// a malformed or unreachable endpoint is handled exactly like a
    /// mid-session disconnect.
    ///
    /// Callers invoke this once per session; only the reconnect timer
    /// re-invokes it afterwards.
    pub async fn connect(&self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }

        let url = self.inner.config.origin.channel_url();
        self.set_state(ConnectionState::Connecting);
        tracing::info!(url = %url, "connecting to backend");

        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                let (mut sink, stream) = stream.split();

                // Commit the fresh channel under the session locks, in the
                // same order `close()` takes them. `close()` may have landed
                // while the dial was in flight; the flag is re-checked here
                // so a late handshake cannot resurrect a closed client.
                let mut reader_slot = self.inner.reader.lock().await;
                let mut sink_slot = self.inner.sink.lock().await;
                if self.inner.closed.load(Ordering::SeqCst) {
                    drop(sink_slot);
                    drop(reader_slot);
                    let _ = sink.close().await;
                    self.set_state(ConnectionState::Disconnected);
                    tracing::info!(url = %url, "discarding channel opened after close");
                    return;
                }

                // Replace any stale session left over from a previous
                // connection before going live.
                if let Some(old) = reader_slot.take() {
                    old.abort();
                }
                *sink_slot = Some(sink);

                self.cancel_reconnect();
                self.set_state(ConnectionState::Connected);
                tracing::info!(url = %url, "channel open");

                let this = self.clone();
                *reader_slot = Some(tokio::spawn(async move { this.read_loop(stream).await }));
            }
            Err(err) => {
                tracing::warn!(url = %url, error = %err, "channel construction failed");
                self.set_state(ConnectionState::Disconnected);
                self.schedule_reconnect();
            }
        }
    }

    /// Cancels any pending reconnect timer, then closes the channel if
    /// open. After this call no reconnect ever fires; the manager is done
    /// for the session. A dial still in flight when this runs is discarded
    /// when its handshake completes.
    pub async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.cancel_reconnect();

        if let Some(reader) = self.inner.reader.lock().await.take() {
            reader.abort();
        }
        if let Some(mut sink) = self.inner.sink.lock().await.take() {
            let _ = sink.close().await;
        }

        self.set_state(ConnectionState::Disconnected);
        tracing::info!("client closed");
    }

    /// Sends one already-encoded text frame over the open channel.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the channel is not open or
    /// the write fails.
    pub(crate) async fn send_frame(&self, text: String) -> Result<(), ClientError> {
        let mut guard = self.inner.sink.lock().await;
        let Some(sink) = guard.as_mut() else {
            return Err(ClientError::Transport("channel not open".to_string()));
        };
        sink.send(Message::text(text))
            .await
            .map_err(|err| ClientError::Transport(err.to_string()))
    }

    /// Reads frames until the channel dies, then tears the session down
    /// and schedules a reconnect (unless the client was closed).
    async fn read_loop(self, mut stream: SplitStream<WsStream>) {
        while let Some(result) = stream.next().await {
            match result {
                Ok(Message::Text(text)) => {
                    let outcome = self.inner.router.dispatch(text.as_str());
                    tracing::trace!(?outcome, "frame dispatched");
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!(frame = ?frame, "server closed channel");
                    break;
                }
                // Ping/pong are handled by the transport; binary frames
                // are not part of the protocol.
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(error = %err, "channel error");
                    break;
                }
            }
        }

        *self.inner.sink.lock().await = None;
        self.set_state(ConnectionState::Disconnected);
        if !self.inner.closed.load(Ordering::SeqCst) {
            self.schedule_reconnect();
        }
    }

    /// Schedules a single retry after the configured delay. A no-op when
    /// a retry is already pending or the client is closed. The timer
    /// clears its own slot before dialing, so a failed attempt can
    /// schedule the next one.
    fn schedule_reconnect(&self) {
        if self.inner.closed.load(Ordering::SeqCst) {
            return;
        }
        let mut slot = self
            .inner
            .reconnect
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }

        let delay = self.inner.config.reconnect_delay;
        tracing::info!(delay = ?delay, "reconnect scheduled");

        let this = self.clone();
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            *this
                .inner
                .reconnect
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = None;
            this.connect().await;
        }));
    }

    /// Aborts the pending reconnect timer, if any.
    fn cancel_reconnect(&self) {
        let handle = self
            .inner
            .reconnect
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!("pending reconnect cancelled");
        }
    }

    /// Publishes a state transition to all status observers.
    fn set_state(&self, state: ConnectionState) {
        let previous = self.inner.status_tx.send_replace(state);
        if previous != state {
            tracing::debug!(from = ?previous, to = ?state, "connection state changed");
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state())
            .field("reconnect_pending", &self.reconnect_pending())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::endpoint::PageOrigin;

    fn unroutable_config() -> ClientConfig {
        ClientConfig {
            origin: PageOrigin {
                secure: false,
                // Nothing listens on this port.
                host: "127.0.0.1:1".to_string(),
            },
            // Long enough that no timer fires during a test.
            reconnect_delay: Duration::from_secs(3600),
        }
    }

    #[test]
    fn starts_disconnected_with_no_pending_timer() {
        let manager = ConnectionManager::new(unroutable_config(), MessageRouter::new());
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(!manager.is_connected());
        assert!(!manager.reconnect_pending());
    }

    #[tokio::test]
    async fn failed_dial_schedules_exactly_one_reconnect() {
        let manager = ConnectionManager::new(unroutable_config(), MessageRouter::new());
        manager.connect().await;
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert!(manager.reconnect_pending());

        // Scheduling again while one is pending is a no-op: a single
        // cancel drains everything.
        manager.schedule_reconnect();
        manager.cancel_reconnect();
        assert!(!manager.reconnect_pending());
    }

    #[tokio::test]
    async fn close_suppresses_future_scheduling() {
        let manager = ConnectionManager::new(unroutable_config(), MessageRouter::new());
        manager.connect().await;
        assert!(manager.reconnect_pending());

        manager.close().await;
        assert!(!manager.reconnect_pending());
        assert_eq!(manager.state(), ConnectionState::Disconnected);

        manager.schedule_reconnect();
        assert!(!manager.reconnect_pending());

        // connect() after close is inert too.
        manager.connect().await;
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn send_frame_fails_without_channel() {
        let manager = ConnectionManager::new(unroutable_config(), MessageRouter::new());
        let result = manager.send_frame("{}".to_string()).await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }

    #[tokio::test]
    async fn status_observer_sees_transitions() {
        let manager = ConnectionManager::new(unroutable_config(), MessageRouter::new());
        let mut status = manager.status();
        assert_eq!(*status.borrow(), ConnectionState::Disconnected);

        manager.connect().await;
        // Connecting then Disconnected were published; the receiver holds
        // the latest value.
        assert!(status.has_changed().unwrap_or(false));
        assert_eq!(*status.borrow_and_update(), ConnectionState::Disconnected);

        manager.close().await;
    }
}
