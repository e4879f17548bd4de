//! Exchange engine and simple commands.
//!
//! Every operation is built from [`Client::exchange`]: encode one request,
//! send it, receive one response in a single bounded read, decode it, and
//! turn an ERROR response into [`Error::Protocol`].

use std::io;
use std::net::ToSocketAddrs;

use nxdbg_proto::{Reply, Request, Response, SysInfo};
use tracing::{debug, info, warn};

use crate::config::{Config, MAX_RECV_LIMIT};
use crate::error::{Error, FrameError, Result};
use crate::transport::{TcpTransport, Transport};

/// A block of target memory returned by [`Client::malloc`].
///
/// The client does not track allocations. Releasing them with
/// [`Client::free`] is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Allocation {
    /// Start of the block on the target.
    pub address: u32,
    /// Requested size in bytes.
    pub size: u32,
}

/// A connection to a debug stub.
///
/// One exchange is in flight at a time; methods take `&mut self`, so
/// sharing a client between threads requires an outer lock. Independent
/// connections share nothing.
#[derive(Debug)]
pub struct Client<T = TcpTransport> {
    /// Underlying byte transport.
    transport: T,
    /// Chunk bounds, receive limit and CALL layout.
    pub(crate) config: Config,
    /// Receive buffer, reused across exchanges.
    buf: Vec<u8>,
}

impl Client {
    /// Connects to the stub at `addr` using `config.connect_timeout_ms`.
    pub fn connect(addr: impl ToSocketAddrs, config: Config) -> Result<Self> {
        let transport = TcpTransport::connect(addr, config.connect_timeout())?;
        info!("connected to debug stub");
        Ok(Self::with_transport(transport, config))
    }

    /// Closes the connection.
    pub fn disconnect(self) -> Result<()> {
        self.transport.disconnect()?;
        info!("disconnected from debug stub");
        Ok(())
    }
}

impl<T: Transport> Client<T> {
    /// Wraps an existing transport.
    pub const fn with_transport(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            buf: Vec::new(),
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Consumes the client and returns its transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Sends `req` and waits for its response.
    ///
    /// Returns the payload of an OK response. An ERROR response becomes
    /// [`Error::Protocol`] carrying the stub's message.
    pub fn exchange(&mut self, req: &Request) -> Result<Reply> {
        self.send(req)?;
        match self.receive()? {
            Response::Ok(reply) => Ok(reply),
            Response::Error { code, msg } => {
                warn!(kind = req.kind(), %code, "target error: {msg}");
                Err(Error::Protocol { code, message: msg })
            }
            _ => Err(FrameError::UnexpectedResponse {
                request: req.kind(),
            }
            .into()),
        }
    }

    /// Encodes and sends `req` without waiting for a response.
    fn send(&mut self, req: &Request) -> Result<()> {
        let bytes = nxdbg_proto::encode(req)?;
        self.transport.send(&bytes)?;
        debug!(kind = req.kind(), len = bytes.len(), "request sent");
        Ok(())
    }

    /// Reads one response in a single receive.
    ///
    /// The buffer holds one byte more than the limit so that a response
    /// exceeding it is reported instead of silently cut. The limit is
    /// clamped to [`MAX_RECV_LIMIT`].
    fn receive(&mut self) -> Result<Response> {
        let limit = self.config.recv_limit.min(MAX_RECV_LIMIT);
        self.buf.resize(limit.saturating_add(1), 0);
        let n = self.transport.receive(&mut self.buf)?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by target",
            )
            .into());
        }
        if n > limit {
            return Err(FrameError::Oversized { limit }.into());
        }
        debug!(len = n, "response received");
        Ok(nxdbg_proto::decode(&self.buf[..n])?)
    }

    /// Queries system information.
    pub fn sysinfo(&mut self) -> Result<SysInfo> {
        self.exchange(&Request::SysInfo)?
            .info
            .ok_or_else(|| missing("SYSINFO", "info"))
    }

    /// Reboots the target.
    ///
    /// The target restarts before it can reply, so no response is awaited.
    /// The connection is dead afterwards.
    pub fn reboot(&mut self) -> Result<()> {
        self.send(&Request::Reboot)
    }

    /// Allocates `size` bytes of target memory.
    pub fn malloc(&mut self, size: u32) -> Result<Allocation> {
        let address = self
            .exchange(&Request::Malloc { size })?
            .address
            .ok_or_else(|| missing("MALLOC", "address"))?;
        debug!("allocated {size} bytes at {address:#010x}");
        Ok(Allocation { address, size })
    }

    /// Frees target memory at `address`.
    pub fn free(&mut self, address: u32) -> Result<()> {
        self.exchange(&Request::Free { address }).map(drop)
    }

    /// Prints `text` on the target's debug screen.
    pub fn debug_print(&mut self, text: &str) -> Result<()> {
        self.exchange(&Request::DebugPrint { msg: text.into() })
            .map(drop)
    }

    /// Switches the target display to the debug screen.
    pub fn show_debug_screen(&mut self) -> Result<()> {
        self.exchange(&Request::ShowDebugScreen).map(drop)
    }

    /// Switches the target display to the front screen.
    pub fn show_front_screen(&mut self) -> Result<()> {
        self.exchange(&Request::ShowFrontScreen).map(drop)
    }
}

/// Builds a [`FrameError::MissingField`].
pub(crate) fn missing(request: &'static str, field: &'static str) -> Error {
    FrameError::MissingField { request, field }.into()
}
