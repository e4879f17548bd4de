//! Single-buffer postcard codec.
//!
//! A buffer holds exactly one message: decoding fails if the message is cut
//! short or if bytes are left over after it.

use serde::{Deserialize, Serialize};

/// Errors produced while encoding or decoding a message.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The message could not be serialized.
    #[error("encode failed: {0}")]
    Encode(#[source] postcard::Error),

    /// The buffer ended before the message was complete.
    #[error("message truncated")]
    Truncated,

    /// Bytes remained after a complete message.
    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    /// The buffer does not hold a valid message.
    #[error("malformed message: {0}")]
    Malformed(#[source] postcard::Error),
}

/// Serializes `msg` into a freshly allocated buffer.
pub fn encode(msg: &impl Serialize) -> Result<Vec<u8>, CodecError> {
    postcard::to_allocvec(msg).map_err(CodecError::Encode)
}

/// Decodes one message that must span all of `buf`.
pub fn decode<T: for<'de> Deserialize<'de>>(buf: &[u8]) -> Result<T, CodecError> {
    let (msg, rest) = postcard::take_from_bytes::<T>(buf).map_err(|e| match e {
        postcard::Error::DeserializeUnexpectedEnd => CodecError::Truncated,
        other => CodecError::Malformed(other),
    })?;
    if !rest.is_empty() {
        return Err(CodecError::TrailingBytes(rest.len()));
    }
    Ok(msg)
}
