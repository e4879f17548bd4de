//! Chunked memory transfers.
//!
//! The stub's network stack drops requests that span more than one inbound
//! segment, so large reads and writes are split into bounded chunks and
//! issued one exchange at a time in increasing address order.

use nxdbg_proto::Request;
use tracing::trace;

use crate::client::{Client, missing};
use crate::error::{Error, FrameError, Result};
use crate::transport::Transport;

/// One sub-range of a transfer, relative to its start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub struct Chunk {
    /// Byte offset from the start of the transfer.
    pub offset: usize,
    /// Number of bytes in this chunk.
    pub len: usize,
}

/// Iterator over the chunks covering `len` bytes with at most `bound`
/// bytes each.
///
/// Chunks are contiguous, non-overlapping, and ordered by offset. Every
/// chunk except possibly the last is exactly `bound` bytes long.
#[derive(Debug, Clone)]
pub struct ChunkPlan {
    /// Total transfer length.
    len: usize,
    /// Largest chunk length, at least one.
    bound: usize,
    /// Offset of the next chunk.
    next: usize,
}

impl ChunkPlan {
    /// Plans a transfer of `len` bytes. A `bound` of zero counts as one.
    pub fn new(len: usize, bound: usize) -> Self {
        Self {
            len,
            bound: bound.max(1),
            next: 0,
        }
    }
}

impl Iterator for ChunkPlan {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let remaining = self.len - self.next;
        if remaining == 0 {
            return None;
        }
        let chunk = Chunk {
            offset: self.next,
            len: remaining.min(self.bound),
        };
        self.next += chunk.len;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = (self.len - self.next).div_ceil(self.bound);
        (n, Some(n))
    }
}

impl ExactSizeIterator for ChunkPlan {}

/// Rejects ranges that run past the end of the 32-bit address space.
///
/// A range may end exactly at the top, e.g. 16 bytes at `0xffff_fff0`.
fn check_range(address: u32, size: usize) -> Result<()> {
    let end = u64::try_from(size)
        .ok()
        .and_then(|size| size.checked_add(u64::from(address)));
    if end.is_some_and(|end| end <= 1 << 32) && u32::try_from(size).is_ok() {
        Ok(())
    } else {
        Err(Error::Range { address, size })
    }
}

/// Target address of the chunk at `offset` within a checked range.
#[allow(clippy::cast_possible_truncation)]
const fn chunk_address(address: u32, offset: usize) -> u32 {
    address.wrapping_add(offset as u32)
}

impl<T: Transport> Client<T> {
    /// Reads `size` bytes of target memory starting at `address`.
    ///
    /// Issues one MEM_READ per chunk of at most [`Config::read_chunk`]
    /// bytes. The first failing chunk aborts the read and its error is
    /// returned; no partial data is handed back.
    ///
    /// [`Config::read_chunk`]: crate::Config::read_chunk
    #[allow(clippy::cast_possible_truncation)]
    pub fn read(&mut self, address: u32, size: usize) -> Result<Vec<u8>> {
        check_range(address, size)?;
        let mut out = Vec::with_capacity(size);
        for chunk in ChunkPlan::new(size, self.config.read_chunk) {
            let at = chunk_address(address, chunk.offset);
            trace!("read chunk {at:#010x}+{}", chunk.len);
            let data = self
                .exchange(&Request::MemRead {
                    address: at,
                    size: chunk.len as u32,
                })?
                .data
                .ok_or_else(|| missing("MEM_READ", "data"))?;
            if data.len() != chunk.len {
                return Err(FrameError::LengthMismatch {
                    expected: chunk.len,
                    actual: data.len(),
                }
                .into());
            }
            out.extend_from_slice(&data);
        }
        Ok(out)
    }

    /// Writes `data` to target memory starting at `address`.
    ///
    /// Issues one MEM_WRITE per chunk of at most [`Config::write_chunk`]
    /// bytes. A failing chunk aborts the write: earlier chunks stay written
    /// and later ones are never sent, leaving the range partially updated.
    ///
    /// [`Config::write_chunk`]: crate::Config::write_chunk
    pub fn write(&mut self, address: u32, data: &[u8]) -> Result<()> {
        check_range(address, data.len())?;
        for chunk in ChunkPlan::new(data.len(), self.config.write_chunk) {
            let at = chunk_address(address, chunk.offset);
            trace!("write chunk {at:#010x}+{}", chunk.len);
            self.exchange(&Request::MemWrite {
                address: at,
                data: data[chunk.offset..chunk.offset + chunk.len].to_vec(),
            })?;
        }
        Ok(())
    }
}
