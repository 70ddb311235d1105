//! Inbound message envelope and typed payloads.
//!
//! Every frame from the backend is a JSON object with a `type` string
//! discriminator; the rest of the body is type-dependent and flattened
//! into the same object. [`InboundMessage`] keeps the fully decoded value
//! so the router can hand the whole message to every subscriber — shape
//! validation beyond the discriminator is each subscriber's responsibility,
//! via the typed accessors below.

use serde::{Deserialize, Serialize};

/// Inbound message type: full simulation snapshot.
pub const WORLD_STATE: &str = "world_state";
/// Inbound message type: human-readable status update.
pub const STATUS: &str = "status";
/// Inbound message type: aggregate statistics.
pub const STATISTICS: &str = "statistics";

/// Why an inbound frame failed to decode.
#[derive(Debug, thiserror::Error)]
pub enum FrameDecodeError {
    /// The frame was not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame decoded but carries no `type` string discriminator.
    #[error("frame has no `type` string field")]
    MissingType,
}

/// A decoded inbound frame.
///
/// Transient by design: produced by [`decode`](InboundMessage::decode),
/// consumed once by dispatch, never persisted.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    msg_type: String,
    body: serde_json::Value,
}

impl InboundMessage {
    /// Decodes a raw text frame into a message.
    ///
    /// # Errors
    ///
    /// Returns [`FrameDecodeError`] if the frame is not valid JSON or has
    /// no `type` string field.
    pub fn decode(raw: &str) -> Result<Self, FrameDecodeError> {
        let body: serde_json::Value = serde_json::from_str(raw)?;
        let msg_type = body
            .get("type")
            .and_then(serde_json::Value::as_str)
            .ok_or(FrameDecodeError::MissingType)?
            .to_string();
        Ok(Self { msg_type, body })
    }

    /// Returns the `type` discriminator.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// Returns the full decoded body, `type` field included.
    #[must_use]
    pub const fn body(&self) -> &serde_json::Value {
        &self.body
    }

    /// Decodes the body as a [`WorldSnapshot`].
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body does not match the
    /// snapshot shape.
    pub fn world_state(&self) -> Result<WorldSnapshot, serde_json::Error> {
        WorldSnapshot::deserialize(&self.body)
    }

    /// Decodes the body as a [`StatusUpdate`].
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body does not match.
    pub fn status(&self) -> Result<StatusUpdate, serde_json::Error> {
        StatusUpdate::deserialize(&self.body)
    }

    /// Decodes the body as a [`StatsSummary`] (the nested `stats` object).
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the body does not match.
    pub fn statistics(&self) -> Result<StatsSummary, serde_json::Error> {
        #[derive(Deserialize)]
        struct Wrapper {
            stats: StatsSummary,
        }
        Wrapper::deserialize(&self.body).map(|w| w.stats)
    }
}

/// One creature as serialized by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySnapshot {
    /// Entity identifier (backend-generated UUID string).
    pub id: String,
    /// X position in world coordinates.
    pub x: f64,
    /// Y position in world coordinates.
    pub y: f64,
    /// Heading in radians.
    pub angle: f64,
    /// Body radius.
    pub radius: f64,
    /// Current energy.
    pub energy: f64,
    /// Energy ceiling.
    pub max_energy: f64,
    /// Age in ticks.
    pub age: u64,
    /// Generation number.
    pub generation: u32,
    /// RGB color triple.
    pub color: (u8, u8, u8),
    /// Recent positions (newest last); the backend sends at most five.
    #[serde(default)]
    pub trail: Vec<(f64, f64)>,
}

/// One food particle as serialized by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodSnapshot {
    /// Food identifier.
    pub id: String,
    /// X position in world coordinates.
    pub x: f64,
    /// Y position in world coordinates.
    pub y: f64,
    /// Particle radius.
    pub radius: f64,
    /// RGB color triple.
    pub color: (u8, u8, u8),
}

/// Full simulation snapshot carried by a `world_state` message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Simulation tick counter.
    pub tick: u64,
    /// Current generation.
    pub generation: u32,
    /// Number of living entities.
    pub population: u32,
    /// Number of food particles.
    pub food_count: u32,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// All living entities.
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
    /// All food particles.
    #[serde(default)]
    pub foods: Vec<FoodSnapshot>,
    /// World width in world coordinates.
    pub world_width: f64,
    /// World height in world coordinates.
    pub world_height: f64,
}

impl WorldSnapshot {
    /// Mean energy across living entities, `0.0` when the world is empty.
    #[must_use]
    pub fn avg_energy(&self) -> f64 {
        if self.entities.is_empty() {
            return 0.0;
        }
        let total: f64 = self.entities.iter().map(|e| e.energy).sum();
        total / self.entities.len() as f64
    }
}

/// Body of a `status` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Human-readable status line.
    pub message: String,
    /// New paused flag, when the status changes it.
    #[serde(default)]
    pub paused: Option<bool>,
}

/// Aggregate statistics carried inside a `statistics` message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of living entities.
    pub population: u32,
    /// Mean entity energy.
    pub avg_energy: f64,
    /// Mean entity age in ticks.
    pub avg_age: f64,
    /// Current generation.
    pub generation: u32,
    /// Number of food particles (absent when the world is empty).
    #[serde(default)]
    pub food_count: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn decode_world_state_frame() {
        let raw = r#"{
            "type": "world_state",
            "tick": 120, "generation": 3, "population": 1, "food_count": 1,
            "paused": false,
            "entities": [{
                "id": "e-1", "x": 10.0, "y": 20.0, "angle": 1.5,
                "radius": 8.0, "energy": 42.0, "max_energy": 100.0,
                "age": 55, "generation": 3, "color": [200, 100, 50],
                "trail": [[9.0, 19.0], [10.0, 20.0]]
            }],
            "foods": [{"id": "f-1", "x": 5.0, "y": 6.0, "radius": 5.0, "color": [50, 255, 50]}],
            "world_width": 800, "world_height": 600
        }"#;
        let msg = InboundMessage::decode(raw).ok();
        let Some(msg) = msg else {
            panic!("frame should decode");
        };
        assert_eq!(msg.msg_type(), WORLD_STATE);

        let snapshot = msg.world_state().ok();
        let Some(snapshot) = snapshot else {
            panic!("snapshot should decode");
        };
        assert_eq!(snapshot.tick, 120);
        assert_eq!(snapshot.entities.len(), 1);
        assert_eq!(snapshot.foods.len(), 1);
        assert!((snapshot.avg_energy() - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn decode_status_frame() {
        let raw = r#"{"type": "status", "message": "Simulation paused", "paused": true}"#;
        let msg = InboundMessage::decode(raw).ok();
        let Some(msg) = msg else {
            panic!("frame should decode");
        };
        let status = msg.status().ok();
        let Some(status) = status else {
            panic!("status should decode");
        };
        assert_eq!(status.message, "Simulation paused");
        assert_eq!(status.paused, Some(true));
    }

    #[test]
    fn decode_statistics_frame() {
        let raw = r#"{"type": "statistics", "stats": {
            "population": 12, "avg_energy": 48.5, "avg_age": 230.0,
            "generation": 4, "food_count": 30
        }}"#;
        let msg = InboundMessage::decode(raw).ok();
        let Some(msg) = msg else {
            panic!("frame should decode");
        };
        let stats = msg.statistics().ok();
        let Some(stats) = stats else {
            panic!("stats should decode");
        };
        assert_eq!(stats.population, 12);
        assert_eq!(stats.food_count, Some(30));
    }

    #[test]
    fn decode_rejects_invalid_json() {
        let result = InboundMessage::decode("{not json");
        assert!(matches!(result, Err(FrameDecodeError::Json(_))));
    }

    #[test]
    fn decode_rejects_missing_type() {
        let result = InboundMessage::decode(r#"{"tick": 1}"#);
        assert!(matches!(result, Err(FrameDecodeError::MissingType)));

        // A non-string `type` is just as malformed.
        let result = InboundMessage::decode(r#"{"type": 7}"#);
        assert!(matches!(result, Err(FrameDecodeError::MissingType)));
    }

    #[test]
    fn avg_energy_empty_world_is_zero() {
        let snapshot = WorldSnapshot::default();
        assert!((snapshot.avg_energy() - 0.0).abs() < f64::EPSILON);
    }
}
