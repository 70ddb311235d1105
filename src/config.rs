//! Client configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`), with defaults matching the original
//! deployment (local backend, plain scheme, 3 s retry).

use std::time::Duration;

use crate::client::endpoint::PageOrigin;
use crate::error::ClientError;

/// Delay between reconnect attempts when none is configured.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 3000;

/// Top-level client configuration.
///
/// Loaded once at startup via [`ClientConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin the client is "hosted" at; the channel endpoint is derived
    /// from it (scheme upgrade + fixed `/ws` path).
    pub origin: PageOrigin,

    /// Fixed delay between reconnect attempts.
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidConfig`] if `VIVARIUM_HOST` is set to
    /// an empty string.
    pub fn from_env() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let host = std::env::var("VIVARIUM_HOST").unwrap_or_else(|_| "localhost:8000".to_string());
        if host.trim().is_empty() {
            return Err(ClientError::InvalidConfig {
                key: "VIVARIUM_HOST".to_string(),
                reason: "host must not be empty".to_string(),
            });
        }

        let secure = parse_env_bool("VIVARIUM_SECURE", false);
        let reconnect_delay_ms = parse_env("VIVARIUM_RECONNECT_DELAY_MS", DEFAULT_RECONNECT_DELAY_MS);

        Ok(Self {
            origin: PageOrigin { secure, host },
            reconnect_delay: Duration::from_millis(reconnect_delay_ms),
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: PageOrigin {
                secure: false,
                host: "localhost:8000".to_string(),
            },
            reconnect_delay: Duration::from_millis(DEFAULT_RECONNECT_DELAY_MS),
        }
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some("true") | Some("TRUE") | Some("1") => true,
        Some("false") | Some("FALSE") | Some("0") => false,
        _ => default,
    }
}
