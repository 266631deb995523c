//! Outbound Connection

use std::io;

use anyhow::Context;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::config::TargetConfig;
use crate::Result;

/// Outcome of a single bounded drain call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drained {
    /// No data available right now; the connection stays live
    Empty,
    /// One chunk of drained bytes
    Chunk(Bytes),
    /// The peer closed its side; the connection must be removed
    Eof,
}

/// One outbound TCP connection owned by the multiplexer
#[derive(Debug)]
pub struct Connection {
    index: usize,
    target: String,
    stream: TcpStream,
    bytes_received: u64,
}

impl Connection {
    /// Open a connection to the target. A failure here is fatal for the
    /// whole run; the caller aborts before any polling starts.
    pub async fn open(index: usize, target: &TargetConfig) -> Result<Self> {
        let addr = target.addr();
        debug!("Opening connection {} to {}", index, addr);

        let stream = TcpStream::connect(&addr)
            .await
            .with_context(|| format!("Failed to open connection {} to {}", index, addr))?;

        info!("Connection {} established to {}", index, addr);
        Ok(Self {
            index,
            target: addr,
            stream,
            bytes_received: 0,
        })
    }

    /// Write the full request payload. Called once, immediately after
    /// the connection opens.
    pub async fn send_request(&mut self, payload: &[u8]) -> Result<()> {
        self.stream.write_all(payload).await.with_context(|| {
            format!(
                "Failed to write request on connection {} to {}",
                self.index, self.target
            )
        })?;

        debug!(
            "Wrote {} request bytes on connection {}",
            payload.len(),
            self.index
        );
        Ok(())
    }

    /// Resolve once the connection has data available to read, or the
    /// peer has closed. Used by the engine's readiness check.
    pub async fn readable(&self) -> io::Result<()> {
        self.stream.readable().await
    }

    /// Drain whatever is available with a single bounded read.
    ///
    /// A read error other than "would block" is treated like
    /// end-of-stream: the connection is past saving and gets removed.
    pub fn drain(&mut self, buf: &mut [u8]) -> Drained {
        match self.stream.try_read(buf) {
            Ok(0) => {
                debug!(
                    "Connection {} reached end-of-stream after {} bytes",
                    self.index, self.bytes_received
                );
                Drained::Eof
            }
            Ok(n) => {
                self.bytes_received += n as u64;
                Drained::Chunk(Bytes::copy_from_slice(&buf[..n]))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Drained::Empty,
            Err(e) => {
                warn!(
                    "Read error on connection {} to {}, treating as end-of-stream: {}",
                    self.index, self.target, e
                );
                Drained::Eof
            }
        }
    }

    /// Stable index of this connection for the whole run
    pub fn index(&self) -> usize {
        self.index
    }

    /// Target address this connection was opened against
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Total bytes drained from this connection so far
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }
}
