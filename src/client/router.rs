//! Message router: decodes inbound frames and fans them out to subscribers.
//!
//! A publish/subscribe boundary between the transport and the presentation
//! layer: statistics display, renderers, and loggers register independently
//! with [`MessageRouter::on`] and the transport never learns about them.
//!
//! Dispatch never raises past its boundary. Decode failures are reported
//! and the frame dropped; a panicking subscriber is isolated so later
//! subscribers in the same dispatch still run.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::protocol::messages::InboundMessage;

/// A subscriber callback. Receives the full decoded message.
type Handler = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

/// Handle returned by [`MessageRouter::on`], usable with
/// [`MessageRouter::off`] to remove the subscription.
///
/// Current consumers register for the whole session and never unsubscribe;
/// the handle exists so longer-lived components do not leak handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Result of one [`MessageRouter::dispatch`] call.
///
/// An explicit value instead of a thrown error, so callers cannot forget
/// the failure cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The frame was decoded and handlers were invoked in registration
    /// order. `faulted` of them panicked and were isolated.
    Delivered {
        /// Handlers that completed normally.
        delivered: usize,
        /// Handlers that panicked.
        faulted: usize,
    },
    /// The frame decoded but no handlers are registered for its type.
    /// A valid steady state, not an error.
    NoSubscribers,
    /// The frame was not a structurally valid message and was dropped.
    DecodeFailed,
}

/// Routes decoded inbound frames to registered subscribers by the `type`
/// discriminator.
///
/// Cheap to clone; all clones share one subscription table. Insertion
/// order per type is invocation order, and registering the same callback
/// twice yields two invocations.
#[derive(Clone, Default)]
pub struct MessageRouter {
    inner: Arc<RouterInner>,
}

#[derive(Default)]
struct RouterInner {
    table: RwLock<HashMap<String, Vec<(SubscriptionId, Handler)>>>,
    next_id: AtomicU64,
}

impl MessageRouter {
    /// Creates a router with an empty subscription table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the ordered list for `msg_type`, creating the
    /// list if absent. All handlers for a type are invoked on every
    /// matching message, in registration order.
    pub fn on<F>(&self, msg_type: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let mut table = self
            .inner
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        table
            .entry(msg_type.to_string())
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes the subscription identified by `id` from `msg_type`.
    ///
    /// Returns `true` if a handler was removed. Other handlers keep their
    /// relative order.
    pub fn off(&self, msg_type: &str, id: SubscriptionId) -> bool {
        let mut table = self
            .inner
            .table
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(handlers) = table.get_mut(msg_type) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() < before
    }

    /// Number of handlers currently registered for `msg_type`.
    #[must_use]
    pub fn handler_count(&self, msg_type: &str) -> usize {
        self.inner
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(msg_type)
            .map_or(0, Vec::len)
    }

    /// Decodes `raw` and dispatches it to all handlers registered for its
    /// type. See [`DispatchOutcome`] for the possible results; this never
    /// panics or returns an error, whatever the frame or the handlers do.
    pub fn dispatch(&self, raw: &str) -> DispatchOutcome {
        let msg = match InboundMessage::decode(raw) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(error = %err, "dropping undecodable frame");
                return DispatchOutcome::DecodeFailed;
            }
        };

        // Snapshot the handler list so subscribers can register or
        // unsubscribe from inside a callback without deadlocking.
        let handlers: Vec<(SubscriptionId, Handler)> = {
            let table = self
                .inner
                .table
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            match table.get(msg.msg_type()) {
                Some(handlers) if !handlers.is_empty() => handlers
                    .iter()
                    .map(|(id, handler)| (*id, Arc::clone(handler)))
                    .collect(),
                _ => {
                    tracing::trace!(msg_type = msg.msg_type(), "no subscribers for message");
                    return DispatchOutcome::NoSubscribers;
                }
            }
        };

        let mut delivered = 0usize;
        let mut faulted = 0usize;
        for (id, handler) in &handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(&msg))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    faulted += 1;
                    tracing::error!(
                        msg_type = msg.msg_type(),
                        subscription = ?id,
                        "subscriber panicked during dispatch; continuing with remaining handlers"
                    );
                }
            }
        }

        DispatchOutcome::Delivered { delivered, faulted }
    }
}

impl fmt::Debug for MessageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self
            .inner
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("MessageRouter")
            .field("types", &table.len())
            .field(
                "handlers",
                &table.values().map(Vec::len).sum::<usize>(),
            )
            .finish()
    }
}
