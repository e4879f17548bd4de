//! Wire protocol for the nxdbg remote debug stub.
//!
//! Messages are serialized with [`postcard`]. There is no length prefix:
//! every request and every response travels as exactly one buffer, and the
//! stub assumes a response fits in a single bounded receive of
//! [`RECV_LIMIT`] bytes.

mod codec;
mod message;

pub use codec::{CodecError, decode, encode};
pub use message::{DEFAULT_PORT, ErrorCode, RECV_LIMIT, Reply, Request, Response, SysInfo};
