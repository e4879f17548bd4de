//! Remote code invocation.
//!
//! A CALL request runs code at a target address, optionally on a stack
//! image supplied by the host, and answers with a dump of the CPU state
//! after the code returns. The result register sits at a fixed byte offset
//! in that dump, [`Config::result_offset`].
//!
//! [`Config::result_offset`]: crate::Config::result_offset

use nxdbg_proto::Request;
use tracing::debug;

use crate::client::{Client, missing};
use crate::error::{Error, FrameError, Result};
use crate::transport::Transport;

/// Register and state dump returned by a CALL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterDump(Vec<u8>);

impl RegisterDump {
    /// Wraps raw dump bytes.
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The raw dump.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// The little-endian `u32` at byte `offset`, if the dump is long enough.
    pub fn word(&self, offset: usize) -> Option<u32> {
        let bytes = self.0.get(offset..offset.checked_add(4)?)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        Some(u32::from_le_bytes(word))
    }

    /// The word at `offset`, or [`FrameError::ShortDump`] if it is missing.
    pub fn result(&self, offset: usize) -> Result<u32> {
        self.word(offset).ok_or_else(|| {
            FrameError::ShortDump {
                len: self.0.len(),
                needed: offset.saturating_add(4),
            }
            .into()
        })
    }
}

impl<T: Transport> Client<T> {
    /// Calls code at `address` and returns the full register dump.
    ///
    /// `stack` is copied to the target stack pointer before the call.
    pub fn call_raw(&mut self, address: u32, stack: Option<&[u8]>) -> Result<RegisterDump> {
        let data = self
            .exchange(&Request::Call {
                address,
                stack: stack.map(<[u8]>::to_vec),
            })?
            .data
            .ok_or_else(|| missing("CALL", "data"))?;
        debug!("call {address:#010x} returned {} byte dump", data.len());
        Ok(RegisterDump::new(data))
    }

    /// Calls code at `address` and returns the result register.
    pub fn call(&mut self, address: u32, stack: Option<&[u8]>) -> Result<u32> {
        let offset = self.config.result_offset;
        self.call_raw(address, stack)?.result(offset)
    }

    /// Injects `code` into freshly allocated target memory, calls it, and
    /// frees the memory again.
    ///
    /// The block is freed even if writing or calling failed, as long as the
    /// error left the connection usable. After a fatal error no free is
    /// attempted, and the block leaks for the lifetime of the connection.
    pub fn execute(&mut self, code: &[u8], stack: Option<&[u8]>) -> Result<u32> {
        let size = u32::try_from(code.len())
            .map_err(|_| Error::CodeTooLarge { len: code.len() })?;
        let block = self.malloc(size)?;
        let outcome = self
            .write(block.address, code)
            .and_then(|()| self.call(block.address, stack));
        match outcome {
            Err(e) if e.is_fatal() => Err(e),
            outcome => {
                let freed = self.free(block.address);
                let value = outcome?;
                freed?;
                Ok(value)
            }
        }
    }
}
