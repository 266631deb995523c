//! Connection Set
//!
//! The live set of open connections, keyed by stable index, plus the
//! owned snapshots the poll loop iterates. Removing a connection only
//! affects snapshots taken afterwards.

use tracing::debug;

use super::Connection;

/// Ordered, monotonically shrinking set of live connections
#[derive(Debug)]
pub struct ConnectionSet {
    slots: Vec<Option<Connection>>,
}

impl ConnectionSet {
    /// Build the set from the connections opened during setup. The
    /// position of each connection is its stable index for the run.
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            slots: connections.into_iter().map(Some).collect(),
        }
    }

    /// Number of connections still live
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// True once every connection has been removed
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Owned copy of the currently-live indices. Later mutation of the
    /// set cannot affect a snapshot already taken.
    pub fn snapshot(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|_| index))
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Connection> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Connection> {
        self.slots.get_mut(index).and_then(|slot| slot.as_mut())
    }

    /// Remove a connection; its socket closes when the returned value
    /// drops. Removing an already-removed index is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Connection> {
        let removed = self.slots.get_mut(index).and_then(|slot| slot.take());
        if let Some(connection) = &removed {
            debug!(
                "Removed connection {} to {} from the live set",
                index,
                connection.target()
            );
        }
        removed
    }
}
