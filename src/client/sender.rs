//! Command sender: operator intent → outbound command frame.
//!
//! Commands are transmitted only while the channel is open. A command sent
//! while disconnected is dropped with a warning — there is no buffering or
//! replay queue, because operator commands (pause/resume/step/reset) are
//! momentary intents and a stale replay after reconnection would be
//! surprising.

use serde_json::json;

use super::connection::ConnectionManager;
use crate::error::ClientError;
use crate::protocol::commands::CommandFrame;

/// Result of one [`CommandSender::send`] call.
///
/// Dropping a command while disconnected is an accepted loss, not an
/// error, so it is a value rather than an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame went out over the channel.
    Sent,
    /// The channel was not open; the command was dropped.
    NotConnected,
}

/// Formats and transmits operator commands through a [`ConnectionManager`].
#[derive(Debug, Clone)]
pub struct CommandSender {
    connection: ConnectionManager,
}

impl CommandSender {
    /// Creates a sender bound to the given connection.
    #[must_use]
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// Sends `{ "type": "command", "command": name, "params": params }`.
    ///
    /// Any command name is forwarded; the backend decides what it means.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] only when the channel reports a
    /// write failure mid-send. A closed channel is not an error — the
    /// command is dropped and [`SendOutcome::NotConnected`] returned.
    pub async fn send(
        &self,
        name: &str,
        params: serde_json::Value,
    ) -> Result<SendOutcome, ClientError> {
        if !self.connection.is_connected() {
            tracing::warn!(command = name, "not connected; dropping command");
            return Ok(SendOutcome::NotConnected);
        }

        let frame = CommandFrame::new(name, params);
        let text = serde_json::to_string(&frame)?;
        match self.connection.send_frame(text).await {
            Ok(()) => {
                tracing::debug!(command = name, "command sent");
                Ok(SendOutcome::Sent)
            }
            Err(ClientError::Transport(reason)) => {
                // The channel died between the state check and the write;
                // same accepted loss as sending while disconnected.
                tracing::warn!(command = name, reason = %reason, "send failed; dropping command");
                Ok(SendOutcome::NotConnected)
            }
            Err(other) => Err(other),
        }
    }

    /// Sends a command with no parameters.
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn send_bare(&self, name: &str) -> Result<SendOutcome, ClientError> {
        self.send(name, json!({})).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::client::endpoint::PageOrigin;
    use crate::client::router::MessageRouter;
    use crate::config::ClientConfig;
    use crate::protocol::commands;

    fn offline_sender() -> CommandSender {
        let config = ClientConfig {
            origin: PageOrigin {
                secure: false,
                host: "127.0.0.1:1".to_string(),
            },
            reconnect_delay: Duration::from_secs(3600),
        };
        CommandSender::new(ConnectionManager::new(config, MessageRouter::new()))
    }

    #[tokio::test]
    async fn send_while_disconnected_drops_without_error() {
        let sender = offline_sender();
        let outcome = sender.send_bare(commands::PAUSE).await;
        assert!(matches!(outcome, Ok(SendOutcome::NotConnected)));
    }

    #[tokio::test]
    async fn arbitrary_command_names_are_accepted() {
        let sender = offline_sender();
        let outcome = sender.send("future_command", json!({"level": 2})).await;
        // Still dropped (disconnected), but never rejected by name.
        assert!(matches!(outcome, Ok(SendOutcome::NotConnected)));
    }
}
