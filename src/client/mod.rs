//! Transport client: connection lifecycle, message routing, command sending.
//!
//! [`ConnectionManager`] owns the single live channel and the reconnect
//! policy; [`MessageRouter`] fans decoded frames out to subscribers;
//! [`CommandSender`] guards outbound commands on connection state. Each is
//! an explicitly constructed value (cheap to clone, `Arc` inside) — no
//! process-wide singletons, so tests can run many independent clients.

pub mod connection;
pub mod endpoint;
pub mod router;
pub mod sender;

pub use connection::{ConnectionManager, ConnectionState};
pub use endpoint::PageOrigin;
pub use router::{DispatchOutcome, MessageRouter, SubscriptionId};
pub use sender::{CommandSender, SendOutcome};
