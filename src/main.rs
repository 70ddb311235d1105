//! vivarium-client console entry point.
//!
//! Stands in for the browser front end: connects to the backend, mirrors
//! world state into a [`WorldStore`], logs status and statistics, and maps
//! operator input lines to control commands the way the dashboard buttons
//! did.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use vivarium_client::client::{CommandSender, ConnectionManager, MessageRouter};
use vivarium_client::config::ClientConfig;
use vivarium_client::protocol::{commands, messages};
use vivarium_client::state::WorldStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ClientConfig::from_env()?;
    tracing::info!(endpoint = %config.origin.channel_url(), "starting vivarium client");

    // Build the router and register the presentation subscribers
    let router = MessageRouter::new();
    let store = Arc::new(WorldStore::new());
    register_subscribers(&router, &store);

    // Build the transport client
    let connection = ConnectionManager::new(config, router);
    let sender = CommandSender::new(connection.clone());

    // Connection-status indicator (the console's version of the badge)
    let mut status = connection.status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let state = *status.borrow_and_update();
            tracing::info!(state = ?state, "connection status");
        }
    });

    connection.connect().await;

    // Operator input loop until EOF or Ctrl-C (the page-unload analogue)
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => handle_input(&sender, line.trim()).await,
                    Ok(None) | Err(_) => break,
                }
            }
        }
    }

    connection.close().await;
    Ok(())
}

/// Wires the three inbound message types to the console presentation.
fn register_subscribers(router: &MessageRouter, store: &Arc<WorldStore>) {
    {
        let store = Arc::clone(store);
        router.on(messages::WORLD_STATE, move |msg| match msg.world_state() {
            Ok(snapshot) => {
                tracing::info!(
                    tick = snapshot.tick,
                    generation = snapshot.generation,
                    population = snapshot.population,
                    food = snapshot.food_count,
                    avg_energy = snapshot.avg_energy(),
                    paused = snapshot.paused,
                    "world state"
                );
                store.update(snapshot);
            }
            Err(err) => {
                tracing::warn!(error = %err, "world_state payload did not match snapshot shape");
            }
        });
    }

    {
        let store = Arc::clone(store);
        router.on(messages::STATUS, move |msg| match msg.status() {
            Ok(status) => {
                tracing::info!(message = %status.message, "status update");
                if let Some(paused) = status.paused {
                    store.set_paused(paused);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "status payload did not match expected shape");
            }
        });
    }

    router.on(messages::STATISTICS, |msg| match msg.statistics() {
        Ok(stats) => {
            tracing::info!(
                population = stats.population,
                avg_energy = stats.avg_energy,
                avg_age = stats.avg_age,
                generation = stats.generation,
                "statistics"
            );
        }
        Err(err) => {
            tracing::warn!(error = %err, "statistics payload did not match expected shape");
        }
    });
}

/// Maps one operator input line to a backend command.
async fn handle_input(sender: &CommandSender, input: &str) {
    let command = match input {
        "" => return,
        "pause" => commands::PAUSE,
        "resume" => commands::RESUME,
        "step" => commands::STEP,
        "reset" => commands::RESET,
        "stats" => commands::GET_STATISTICS,
        other => {
            tracing::warn!(input = other, "unknown command (try pause/resume/step/reset/stats)");
            return;
        }
    };
    // Drop outcomes are already logged by the sender.
    let _ = sender.send_bare(command).await;
}
