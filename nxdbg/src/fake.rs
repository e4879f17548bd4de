//! In-process stand-in for the debug stub, used by unit tests.

use std::collections::HashMap;
use std::io;

use nxdbg_proto::{ErrorCode, Reply, Request, Response, SysInfo};

use crate::transport::Transport;

/// Scripted stub with sparse simulated memory.
///
/// Every decoded request is recorded in `requests`. Replies are produced
/// on `send` and handed out by the next `receive`.
#[derive(Debug, Default)]
pub(crate) struct FakeStub {
    /// Requests in the order they were received.
    pub(crate) requests: Vec<Request>,
    /// Simulated target memory; unset bytes read as zero.
    memory: HashMap<u32, u8>,
    /// Request index that answers with ERROR, and its message.
    fail_at: Option<(usize, String)>,
    /// Request index answered with raw bytes instead of a computed reply.
    raw_reply: Option<(usize, Vec<u8>)>,
    /// Register dump returned by CALL.
    dump: Option<Vec<u8>>,
    /// Return one byte less than requested from MEM_READ.
    short_reads: bool,
    /// Report the connection as closed on receive.
    closed: bool,
    /// Next address handed out by MALLOC.
    heap: u32,
    /// Encoded reply waiting for `receive`.
    pending: Option<Vec<u8>>,
}

impl FakeStub {
    /// Tick count reported by SYSINFO.
    pub(crate) const TICK_COUNT: u32 = 1234;

    /// A stub with empty memory and a heap at `0x0030_0000`.
    pub(crate) fn new() -> Self {
        Self {
            heap: 0x0030_0000,
            ..Self::default()
        }
    }

    /// Answers request number `index` (zero-based) with an ERROR.
    pub(crate) fn fail_at(mut self, index: usize, msg: &str) -> Self {
        self.fail_at = Some((index, msg.into()));
        self
    }

    /// Replies to the first request with `bytes` verbatim.
    pub(crate) fn with_raw_reply(self, bytes: Vec<u8>) -> Self {
        self.with_raw_reply_at(0, bytes)
    }

    /// Replies to request number `index` with `bytes` verbatim.
    pub(crate) fn with_raw_reply_at(mut self, index: usize, bytes: Vec<u8>) -> Self {
        self.raw_reply = Some((index, bytes));
        self
    }

    /// Returns `dump` as the register dump of every CALL.
    pub(crate) fn with_dump(mut self, dump: Vec<u8>) -> Self {
        self.dump = Some(dump);
        self
    }

    /// Makes MEM_READ return one byte less than requested.
    pub(crate) const fn short_reads(mut self) -> Self {
        self.short_reads = true;
        self
    }

    /// Makes every receive report a closed connection.
    pub(crate) const fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    /// Reads simulated memory without going through the protocol.
    pub(crate) fn peek(&self, address: u32, len: usize) -> Vec<u8> {
        (0..len)
            .map(|i| {
                let at = address.wrapping_add(u32::try_from(i).unwrap());
                self.memory.get(&at).copied().unwrap_or(0)
            })
            .collect()
    }

    /// The encoded reply not yet collected by `receive`.
    pub(crate) fn pending_reply(&self) -> Option<&[u8]> {
        self.pending.as_deref()
    }

    fn handle(&mut self, req: &Request) -> Option<Response> {
        let index = self.requests.len() - 1;
        if let Some((_, msg)) = self.fail_at.as_ref().filter(|(at, _)| *at == index) {
            return Some(Response::error(msg.clone()));
        }

        let reply = match req {
            Request::Reboot => return None,
            Request::SysInfo => Reply {
                info: Some(SysInfo {
                    tick_count: Self::TICK_COUNT,
                }),
                ..Reply::default()
            },
            Request::Malloc { size } => {
                let address = self.heap;
                self.heap += size.next_multiple_of(16);
                Reply {
                    address: Some(address),
                    ..Reply::default()
                }
            }
            Request::MemRead { address, size } => {
                let len = *size as usize - usize::from(self.short_reads);
                Reply {
                    address: Some(*address),
                    data: Some(self.peek(*address, len)),
                    ..Reply::default()
                }
            }
            Request::MemWrite { address, data } => {
                for (at, byte) in (*address..).zip(data) {
                    self.memory.insert(at, *byte);
                }
                Reply::default()
            }
            Request::Call { .. } => Reply {
                data: Some(self.dump.clone().unwrap_or_else(|| vec![0; 32])),
                ..Reply::default()
            },
            Request::Free { .. }
            | Request::DebugPrint { .. }
            | Request::ShowDebugScreen
            | Request::ShowFrontScreen => Reply::default(),
            _ => {
                return Some(Response::Error {
                    code: ErrorCode::Unsupported,
                    msg: "Unsupported".into(),
                });
            }
        };
        Some(Response::Ok(reply))
    }
}

impl Transport for FakeStub {
    fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        let req: Request = nxdbg_proto::decode(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.requests.push(req.clone());
        let resp = self.handle(&req);
        let index = self.requests.len() - 1;
        self.pending = match self.raw_reply.take() {
            Some((at, raw)) if at == index => Some(raw),
            other => {
                self.raw_reply = other;
                resp.map(|r| nxdbg_proto::encode(&r).unwrap())
            }
        };
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Ok(0);
        }
        let reply = self
            .pending
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::WouldBlock, "no reply pending"))?;
        let n = reply.len().min(buf.len());
        buf[..n].copy_from_slice(&reply[..n]);
        Ok(n)
    }
}
