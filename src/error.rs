//! Client error types.
//!
//! [`ClientError`] is the central error type for the crate. The transport
//! client itself never escalates to a fatal error — disconnects degrade to
//! "disconnected, retrying" — so these variants only surface at explicit
//! fallible boundaries (configuration loading, frame encoding).

/// Client-side error enum.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A configuration value could not be parsed.
    #[error("invalid configuration for {key}: {reason}")]
    InvalidConfig {
        /// Environment variable name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An outbound frame could not be serialized to JSON.
    #[error("frame encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Underlying WebSocket transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_display() {
        let err = ClientError::InvalidConfig {
            key: "VIVARIUM_HOST".to_string(),
            reason: "empty host".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("VIVARIUM_HOST"));
        assert!(msg.contains("empty host"));
    }

    #[test]
    fn transport_display() {
        let err = ClientError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "transport error: connection refused");
    }
}
