//! Fan-Out Engine

use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use futures_util::future::select_all;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tracing::{debug, info};

use super::connection::{Connection, Drained};
use super::session::{FanoutSession, SessionStats};
use super::set::ConnectionSet;
use super::MuxEvent;
use crate::config::Config;
use crate::protocol::build_request;
use crate::Result;

/// Drives the fan-out: opens every connection, writes the request, then
/// polls and drains until the live set is empty.
pub struct FanoutEngine {
    config: Arc<Config>,
    payload: Bytes,
}

impl FanoutEngine {
    /// Create an engine from configuration
    pub fn from_config(config: Arc<Config>) -> Self {
        let payload = build_request(&config.request);
        Self { config, payload }
    }

    /// The request payload written to every connection
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Setup phase: open one connection per target, in order, and write
    /// the request to each. Any failure aborts the whole run before any
    /// polling starts; connections opened so far close as they drop.
    pub async fn connect_all(&self) -> Result<ConnectionSet> {
        let mut connections = Vec::with_capacity(self.config.targets.len());

        for (index, target) in self.config.targets.iter().enumerate() {
            let mut connection = Connection::open(index, target).await?;
            connection.send_request(&self.payload).await?;
            connections.push(connection);
        }

        info!(
            "Opened {} connections and wrote {} request bytes to each",
            connections.len(),
            self.payload.len()
        );

        Ok(ConnectionSet::new(connections))
    }

    /// Poll loop: runs until every connection has reached end-of-stream.
    ///
    /// Each round takes a snapshot of the live set, races readiness over
    /// the snapshot bounded by the poll interval, and on any positive
    /// signal drains every snapshot member once. Removal of a closed
    /// connection takes effect from the next snapshot onward.
    pub async fn run(
        &self,
        mut set: ConnectionSet,
        events: UnboundedSender<MuxEvent>,
    ) -> Result<SessionStats> {
        let session = FanoutSession::new(set.live_count());
        let mut buf = vec![0u8; self.config.poll.read_buffer_size];

        info!(
            session_id = %session.session_id,
            "Starting poll loop over {} connections",
            set.live_count()
        );

        while !set.is_empty() {
            let snapshot = set.snapshot();

            let ready = self.poll_ready(&set, &snapshot).await?;
            if ready == 0 {
                continue;
            }

            for &index in &snapshot {
                let Some(connection) = set.get_mut(index) else {
                    continue;
                };

                match connection.drain(&mut buf) {
                    Drained::Empty => {}
                    Drained::Chunk(chunk) => {
                        session.add_chunk(index, chunk.len() as u64);
                        let _ = events.send(MuxEvent::Data { index, chunk });
                    }
                    Drained::Eof => {
                        set.remove(index);
                        let _ = events.send(MuxEvent::Closed { index });
                    }
                }
            }
        }

        let _ = events.send(MuxEvent::Done);
        session.log_stats();

        Ok(session.to_stats())
    }

    /// Readiness check: wait up to the poll interval for any snapshot
    /// member to become readable. Returns the number of ready
    /// connections observed, zero when the interval elapses quietly.
    async fn poll_ready(&self, set: &ConnectionSet, snapshot: &[usize]) -> Result<usize> {
        let mut members = Vec::with_capacity(snapshot.len());
        let mut readiness = Vec::with_capacity(snapshot.len());

        for &index in snapshot {
            if let Some(connection) = set.get(index) {
                members.push(index);
                readiness.push(Box::pin(connection.readable()));
            }
        }

        if readiness.is_empty() {
            return Ok(0);
        }

        match timeout(self.config.poll.interval, select_all(readiness)).await {
            Ok((Ok(()), position, _remaining)) => {
                debug!("Readiness check: connection {} readable", members[position]);
                Ok(1)
            }
            Ok((Err(e), _, _)) => Err(e).context("readiness check failed"),
            Err(_) => Ok(0),
        }
    }
}
