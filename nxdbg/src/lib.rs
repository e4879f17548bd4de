//! Host-side client for the nxdbg remote debug stub.
//!
//! A [`Client`] owns one TCP connection to the stub running on the target
//! and issues typed requests over it: query system info, allocate and free
//! target memory, read and write memory of any size, print to the target
//! screen, and call code at a target address.
//!
//! # Quick start
//!
//! ```no_run
//! use nxdbg::{Client, Config};
//!
//! let mut xbox = Client::connect(("192.168.1.20", nxdbg::DEFAULT_PORT), Config::default())
//!     .expect("connect failed");
//! println!("{}", xbox.sysinfo().expect("sysinfo failed"));
//!
//! let block = xbox.malloc(1024).expect("malloc failed");
//! xbox.write_u32(block.address, 0xdead_beef).expect("write failed");
//! assert_eq!(xbox.read_u32(block.address).expect("read failed"), 0xdead_beef);
//! xbox.free(block.address).expect("free failed");
//! ```
//!
//! Memory transfers are split into chunks the stub can digest (see
//! [`Config::read_chunk`] and [`Config::write_chunk`]); exchanges are
//! strictly sequential, one request in flight at a time.

mod client;
mod config;
mod error;
mod invoke;
mod memory;
mod scalar;
mod transport;

#[cfg(test)]
mod fake;

pub use client::{Allocation, Client};
pub use config::{
    CONNECT_TIMEOUT_MS, Config, MAX_RECV_LIMIT, READ_CHUNK, RESULT_OFFSET, WRITE_CHUNK,
};
pub use error::{Error, FrameError, Result};
pub use invoke::RegisterDump;
pub use memory::{Chunk, ChunkPlan};
pub use nxdbg_proto::{DEFAULT_PORT, ErrorCode, RECV_LIMIT, Reply, Request, Response, SysInfo};
pub use transport::{TcpTransport, Transport};
