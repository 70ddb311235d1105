//! Wire protocol: inbound message envelope and outbound command frames.
//!
//! The backend speaks JSON text frames discriminated by a `type` field.
//! Inbound types are `world_state`, `status`, and `statistics`; the only
//! outbound type is `command`.

pub mod commands;
pub mod messages;

pub use commands::CommandFrame;
pub use messages::{
    EntitySnapshot, FoodSnapshot, InboundMessage, StatsSummary, StatusUpdate, WorldSnapshot,
};
