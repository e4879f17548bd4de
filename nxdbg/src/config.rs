//! Client tuning knobs.
//!
//! The defaults match the reference stub build, whose network stack cannot
//! reassemble a request spread over several inbound segments.

use std::time::Duration;

use nxdbg_proto::RECV_LIMIT;
use serde::{Deserialize, Serialize};

/// Default bytes per MEM_READ exchange.
pub const READ_CHUNK: usize = 100;

/// Default bytes per MEM_WRITE exchange.
pub const WRITE_CHUNK: usize = 200;

/// Default connect timeout in milliseconds.
pub const CONNECT_TIMEOUT_MS: u64 = 5000;

/// Largest receive limit the client honours; larger values are clamped.
pub const MAX_RECV_LIMIT: usize = 1 << 16;

/// Default byte offset of the return value inside a CALL register dump.
///
/// Eighth 32-bit slot, holding the accumulator at return. The stub's
/// register save order is undocumented; builds that differ override this.
pub const RESULT_OFFSET: usize = 28;

/// Client configuration.
///
/// Chunk bounds are properties of the stub build, not of the protocol, so
/// they can be changed to suit a different target. A bound of zero is
/// treated as one byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// Largest number of bytes requested by a single MEM_READ.
    pub read_chunk: usize,
    /// Largest number of bytes carried by a single MEM_WRITE.
    pub write_chunk: usize,
    /// Size of the single receive used to collect a response, at most
    /// [`MAX_RECV_LIMIT`].
    pub recv_limit: usize,
    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Byte offset of the result register inside a CALL register dump.
    pub result_offset: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            read_chunk: READ_CHUNK,
            write_chunk: WRITE_CHUNK,
            recv_limit: RECV_LIMIT,
            connect_timeout_ms: CONNECT_TIMEOUT_MS,
            result_offset: RESULT_OFFSET,
        }
    }
}

impl Config {
    /// Sets the read-chunk bound.
    #[must_use]
    pub const fn with_read_chunk(mut self, bytes: usize) -> Self {
        self.read_chunk = bytes;
        self
    }

    /// Sets the write-chunk bound.
    #[must_use]
    pub const fn with_write_chunk(mut self, bytes: usize) -> Self {
        self.write_chunk = bytes;
        self
    }

    /// Sets the receive limit.
    #[must_use]
    pub const fn with_recv_limit(mut self, bytes: usize) -> Self {
        self.recv_limit = bytes;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Sets the CALL result offset.
    #[must_use]
    pub const fn with_result_offset(mut self, offset: usize) -> Self {
        self.result_offset = offset;
        self
    }

    /// The connect timeout as a [`Duration`].
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}
