//! Explicit world-state container with read-only views.
//!
//! One component owns the latest [`WorldSnapshot`]; everyone else gets a
//! [`tokio::sync::watch`] receiver. Consumers see only the most recent
//! snapshot and must tolerate zero, one, or many updates between reads —
//! exactly the contract the transport offers for `world_state` messages.

use tokio::sync::watch;

use crate::protocol::messages::WorldSnapshot;

/// Owns the latest world snapshot.
#[derive(Debug)]
pub struct WorldStore {
    tx: watch::Sender<WorldSnapshot>,
}

impl WorldStore {
    /// Creates a store holding an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(WorldSnapshot::default());
        Self { tx }
    }

    /// Replaces the held snapshot and notifies all views.
    pub fn update(&self, snapshot: WorldSnapshot) {
        self.tx.send_replace(snapshot);
    }

    /// Overrides the paused flag in place (driven by `status` messages,
    /// which may flip it between full snapshots).
    pub fn set_paused(&self, paused: bool) {
        self.tx.send_modify(|snapshot| snapshot.paused = paused);
    }

    /// Returns a read-only view of the snapshot. The receiver always
    /// holds the latest value.
    #[must_use]
    pub fn view(&self) -> watch::Receiver<WorldSnapshot> {
        self.tx.subscribe()
    }

    /// Clones the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.tx.borrow().clone()
    }
}

impl Default for WorldStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_snapshot() {
        let store = WorldStore::new();
        assert_eq!(store.snapshot().tick, 0);

        store.update(WorldSnapshot {
            tick: 42,
            population: 7,
            ..WorldSnapshot::default()
        });
        let snapshot = store.snapshot();
        assert_eq!(snapshot.tick, 42);
        assert_eq!(snapshot.population, 7);
    }

    #[test]
    fn set_paused_flips_flag_only() {
        let store = WorldStore::new();
        store.update(WorldSnapshot {
            tick: 10,
            ..WorldSnapshot::default()
        });

        store.set_paused(true);
        let snapshot = store.snapshot();
        assert!(snapshot.paused);
        assert_eq!(snapshot.tick, 10);
    }

    #[test]
    fn views_see_the_latest_value_only() {
        let store = WorldStore::new();
        let view = store.view();

        // Two updates between reads: only the newest survives.
        store.update(WorldSnapshot {
            tick: 1,
            ..WorldSnapshot::default()
        });
        store.update(WorldSnapshot {
            tick: 2,
            ..WorldSnapshot::default()
        });
        assert_eq!(view.borrow().tick, 2);
    }
}
