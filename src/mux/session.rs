//! Fan-Out Session

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

/// Transfer statistics for one active fan-out run
#[derive(Debug)]
pub struct FanoutSession {
    pub session_id: String,
    pub start_time: Instant,
    bytes_received: Vec<AtomicU64>,
    chunks_received: Vec<AtomicU64>,
}

/// Statistics snapshot for a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,
    pub connection_count: usize,
    pub duration_ms: u64,
    pub bytes_received: Vec<u64>,
    pub chunks_received: Vec<u64>,
    pub total_bytes: u64,
}

impl FanoutSession {
    /// Create a session covering `connection_count` connections
    pub fn new(connection_count: usize) -> Self {
        let session_id = format!("fanout_{}", Uuid::new_v4().simple());
        debug!(
            "Creating fan-out session {} over {} connections",
            session_id, connection_count
        );

        Self {
            session_id,
            start_time: Instant::now(),
            bytes_received: (0..connection_count).map(|_| AtomicU64::new(0)).collect(),
            chunks_received: (0..connection_count).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    /// Credit one drained chunk to a connection
    pub fn add_chunk(&self, index: usize, bytes: u64) {
        if let Some(counter) = self.bytes_received.get(index) {
            counter.fetch_add(bytes, Ordering::Relaxed);
        }
        if let Some(counter) = self.chunks_received.get(index) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Bytes drained from one connection so far
    pub fn bytes_received(&self, index: usize) -> u64 {
        self.bytes_received
            .get(index)
            .map(|counter| counter.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Total bytes drained across every connection
    pub fn total_bytes(&self) -> u64 {
        self.bytes_received
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }

    /// Session duration so far
    pub fn duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Generate the statistics snapshot
    pub fn to_stats(&self) -> SessionStats {
        SessionStats {
            session_id: self.session_id.clone(),
            connection_count: self.bytes_received.len(),
            duration_ms: self.duration().as_millis() as u64,
            bytes_received: self
                .bytes_received
                .iter()
                .map(|counter| counter.load(Ordering::Relaxed))
                .collect(),
            chunks_received: self
                .chunks_received
                .iter()
                .map(|counter| counter.load(Ordering::Relaxed))
                .collect(),
            total_bytes: self.total_bytes(),
        }
    }

    /// Log session statistics
    pub fn log_stats(&self) {
        let duration = self.duration();
        let total_bytes = self.total_bytes();

        info!(
            session_id = %self.session_id,
            connection_count = self.bytes_received.len(),
            duration_ms = duration.as_millis() as u64,
            total_bytes = total_bytes,
            "Fan-out session completed"
        );

        info!(
            "Session {} completed: {} connections | Duration: {:?} | Received: {} bytes",
            self.session_id,
            self.bytes_received.len(),
            duration,
            total_bytes
        );
    }
}
