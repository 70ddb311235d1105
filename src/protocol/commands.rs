//! Outbound command frames.
//!
//! The only client → backend message shape. The backend matches on the
//! `command` string; the client forwards any name without restricting the
//! set, so new backend commands need no client release.

use serde::{Deserialize, Serialize};

/// Pause the simulation loop.
pub const PAUSE: &str = "pause";
/// Resume the simulation loop.
pub const RESUME: &str = "resume";
/// Advance exactly one tick while paused.
pub const STEP: &str = "step";
/// Reset the world to its initial population.
pub const RESET: &str = "reset";
/// Request a one-shot `statistics` message.
pub const GET_STATISTICS: &str = "get_statistics";

/// Outbound operator command: `{ "type": "command", "command": ..., "params": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandFrame {
    /// Always `"command"`.
    #[serde(rename = "type")]
    pub frame_type: String,
    /// Command name (e.g. [`PAUSE`]).
    pub command: String,
    /// Command-specific parameters; empty object when the command takes none.
    pub params: serde_json::Value,
}

impl CommandFrame {
    /// Builds a command frame with the given name and parameters.
    #[must_use]
    pub fn new(command: &str, params: serde_json::Value) -> Self {
        Self {
            frame_type: "command".to_string(),
            command: command.to_string(),
            params,
        }
    }

    /// Builds a command frame with no parameters (`{}`).
    #[must_use]
    pub fn bare(command: &str) -> Self {
        Self::new(command, serde_json::json!({}))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn bare_command_wire_shape() {
        let frame = CommandFrame::bare(PAUSE);
        let json = serde_json::to_value(&frame).ok();
        let Some(json) = json else {
            panic!("frame should serialize");
        };
        assert_eq!(
            json,
            serde_json::json!({"type": "command", "command": "pause", "params": {}})
        );
    }

    #[test]
    fn params_pass_through_untouched() {
        let frame = CommandFrame::new("spawn", serde_json::json!({"count": 3}));
        let json = serde_json::to_value(&frame).ok();
        let Some(json) = json else {
            panic!("frame should serialize");
        };
        assert_eq!(json["params"]["count"], 3);
        assert_eq!(json["command"], "spawn");
    }
}
