//! # vivarium-client
//!
//! Reconnecting WebSocket client and console front end for the Vivarium
//! simulation backend.
//!
//! The backend streams simulation snapshots (`world_state`), status updates
//! (`status`), and aggregate statistics (`statistics`) over a WebSocket at
//! `/ws`; the operator steers the simulation with `command` frames
//! (`pause`, `resume`, `step`, `reset`). This crate owns the live channel,
//! recovers from disconnects with a fixed-delay retry, and routes inbound
//! typed messages to registered subscribers. Presentation is a thin console
//! layer on top — all genuine state lives in the transport client.
//!
//! ## Architecture
//!
//! ```text
//! Operator (stdin, Ctrl-C)       Backend (WebSocket /ws)
//!     │                              │
//!     ├── CommandSender (client/) ───┤
//!     │                              │
//!     ├── ConnectionManager (client/)┘
//!     │       │
//!     │   MessageRouter (client/)
//!     │       │
//!     ├── WorldStore (state)
//!     └── console glue (main)
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod state;
