//! Fanout Library
//!
//! Readiness-polled concurrent HTTP fan-out client.
//!
//! Opens one TCP connection per configured target, writes the same
//! request to each, then drives a single poll loop that drains whatever
//! data is readable until every peer has closed its side of the stream.

pub mod config;
pub mod mux;
pub mod protocol;
pub mod shutdown;

pub use config::Config;
pub use mux::{ConnectionSet, FanoutEngine, MuxEvent, SessionStats};

/// Common error type for the fan-out client
pub type Result<T> = anyhow::Result<T>;
