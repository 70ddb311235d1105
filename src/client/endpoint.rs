//! Channel endpoint derivation.
//!
//! The channel URL is derived from the hosting origin the same way the
//! browser front end derived it from `window.location`: the scheme is
//! upgraded (`http → ws`, `https → wss`), the host is kept, and the path
//! is the fixed well-known suffix `/ws`.

/// Fixed channel path on the backend.
pub const CHANNEL_PATH: &str = "/ws";

/// Origin the client is hosted at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOrigin {
    /// Whether the hosting page is served over a secure scheme.
    pub secure: bool,
    /// Host (and optional port), e.g. `example.com` or `localhost:8000`.
    pub host: String,
}

impl PageOrigin {
    /// Derives the WebSocket endpoint URL for this origin.
    ///
    /// A secure origin yields `wss://`, a plain one `ws://`.
    #[must_use]
    pub fn channel_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{host}{CHANNEL_PATH}", host = self.host)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn secure_origin_uses_wss() {
        let origin = PageOrigin {
            secure: true,
            host: "example.com".to_string(),
        };
        assert_eq!(origin.channel_url(), "wss://example.com/ws");
    }

    #[test]
    fn plain_origin_uses_ws() {
        let origin = PageOrigin {
            secure: false,
            host: "localhost:8000".to_string(),
        };
        assert_eq!(origin.channel_url(), "ws://localhost:8000/ws");
    }

    #[test]
    fn host_port_is_preserved() {
        let origin = PageOrigin {
            secure: true,
            host: "sim.example.com:8443".to_string(),
        };
        assert_eq!(origin.channel_url(), "wss://sim.example.com:8443/ws");
    }
}
