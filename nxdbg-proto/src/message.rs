//! Protocol message types exchanged between host and debug stub.

use std::fmt;

use serde::{Deserialize, Serialize};

/// TCP port the debug stub listens on.
pub const DEFAULT_PORT: u16 = 9269;

/// Largest response the host accepts in one receive.
pub const RECV_LIMIT: usize = 4096;

/// Request sent from host to stub.
///
/// Each variant carries only the fields meaningful to that command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Request {
    /// Query system information.
    SysInfo,
    /// Reboot the target. The stub does not reply.
    Reboot,
    /// Allocate target memory.
    Malloc {
        /// Number of bytes to allocate.
        size: u32,
    },
    /// Release memory previously returned by [`Request::Malloc`].
    Free {
        /// Address of the allocation.
        address: u32,
    },
    /// Read a range of target memory.
    MemRead {
        /// First byte to read.
        address: u32,
        /// Number of bytes to read.
        size: u32,
    },
    /// Write bytes into target memory.
    MemWrite {
        /// First byte to write.
        address: u32,
        /// Bytes to store at `address`.
        data: Vec<u8>,
    },
    /// Print a line on the target's debug screen.
    DebugPrint {
        /// Text to print.
        msg: String,
    },
    /// Switch the target display to the debug screen.
    ShowDebugScreen,
    /// Switch the target display to the front screen.
    ShowFrontScreen,
    /// Invoke code at `address`, optionally with a prepared stack image.
    Call {
        /// Entry point.
        address: u32,
        /// Raw bytes placed at the target stack pointer before the call.
        stack: Option<Vec<u8>>,
    },
}

impl Request {
    /// Short upper-case name of the command, as used in logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SysInfo => "SYSINFO",
            Self::Reboot => "REBOOT",
            Self::Malloc { .. } => "MALLOC",
            Self::Free { .. } => "FREE",
            Self::MemRead { .. } => "MEM_READ",
            Self::MemWrite { .. } => "MEM_WRITE",
            Self::DebugPrint { .. } => "DEBUG_PRINT",
            Self::ShowDebugScreen => "SHOW_DEBUG_SCREEN",
            Self::ShowFrontScreen => "SHOW_FRONT_SCREEN",
            Self::Call { .. } => "CALL",
        }
    }
}

/// Response sent from stub to host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Response {
    /// The request succeeded.
    Ok(Reply),
    /// The request failed on the target.
    Error {
        /// Failure category reported by the stub.
        code: ErrorCode,
        /// Human-readable cause.
        msg: String,
    },
}

impl Response {
    /// An empty success reply.
    pub fn ok() -> Self {
        Self::Ok(Reply::default())
    }

    /// A failure reply with the generic [`ErrorCode::Failed`] code.
    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            code: ErrorCode::Failed,
            msg: msg.into(),
        }
    }
}

/// Payload of a successful [`Response`].
///
/// Which fields are populated depends on the request kind: `address` for
/// MALLOC and MEM_READ, `data` for MEM_READ and CALL, `info` for SYSINFO.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Returned target address.
    pub address: Option<u32>,
    /// Returned bytes (memory contents or register dump).
    pub data: Option<Vec<u8>>,
    /// System information.
    pub info: Option<SysInfo>,
}

/// System information reported by the stub.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysInfo {
    /// Milliseconds since the target booted.
    pub tick_count: u32,
}

impl fmt::Display for SysInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick_count: {}", self.tick_count)
    }
}

/// Failure category of a [`Response::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The handler ran and failed.
    Failed,
    /// A field required by the request kind was missing.
    IncompleteRequest,
    /// The stub does not implement the request kind.
    Unsupported,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Failed => "failed",
            Self::IncompleteRequest => "incomplete request",
            Self::Unsupported => "unsupported",
        })
    }
}
