//! Error types for nxdbg operations.

use std::io;

use nxdbg_proto::{CodecError, ErrorCode};

/// Alias for `Result<T, nxdbg::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by client operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Connecting, sending or receiving failed. The connection is unusable.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The stub answered with an ERROR response.
    #[error("target reported {code}: {message}")]
    Protocol {
        /// Failure category sent by the stub.
        code: ErrorCode,
        /// Message text sent by the stub.
        message: String,
    },

    /// A response broke the framing or schema assumptions of the protocol.
    #[error("framing error: {0}")]
    Framing(#[from] FrameError),

    /// A memory range does not fit the 32-bit target address space.
    #[error("range {address:#010x}+{size:#x} exceeds the target address space")]
    Range {
        /// Start of the rejected range.
        address: u32,
        /// Length of the rejected range.
        size: usize,
    },

    /// A code buffer is too large to be placed in target memory.
    #[error("code of {len} bytes does not fit the target address space")]
    CodeTooLarge {
        /// Length of the rejected buffer.
        len: usize,
    },
}

impl Error {
    /// Whether the connection should be dropped after this error.
    ///
    /// Connection errors are fatal, and so are responses that overran the
    /// receive limit or failed to decode: the stream position is unknown
    /// after them. A well-formed response that breaks the schema (a missing
    /// field, a short dump) was consumed whole and leaves the connection
    /// usable, as does a protocol error.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::Framing(FrameError::Oversized { .. } | FrameError::Codec(_))
        )
    }

    /// The target-supplied message of a [`Error::Protocol`].
    pub fn target_message(&self) -> Option<&str> {
        match self {
            Self::Protocol { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Self::Framing(FrameError::Codec(e))
    }
}

/// Ways a response can violate the protocol.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    /// The response did not fit in one bounded receive.
    #[error("response exceeds the {limit}-byte receive limit")]
    Oversized {
        /// Configured receive limit.
        limit: usize,
    },

    /// The response bytes could not be decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// An OK reply lacks a field its request kind always carries.
    #[error("{request} reply is missing `{field}`")]
    MissingField {
        /// Request kind, e.g. `MALLOC`.
        request: &'static str,
        /// Name of the absent field.
        field: &'static str,
    },

    /// A memory read returned a different number of bytes than requested.
    #[error("expected {expected} bytes, target returned {actual}")]
    LengthMismatch {
        /// Requested chunk length.
        expected: usize,
        /// Length of the returned data.
        actual: usize,
    },

    /// A register dump is too short to hold the result slot.
    #[error("register dump is {len} bytes, result slot needs {needed}")]
    ShortDump {
        /// Length of the dump.
        len: usize,
        /// Minimum length required.
        needed: usize,
    },

    /// The stub answered with a response shape this client does not know.
    #[error("unrecognised response to {request}")]
    UnexpectedResponse {
        /// Request kind, e.g. `SYSINFO`.
        request: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_error_is_not_fatal() {
        let e = Error::Protocol {
            code: ErrorCode::Failed,
            message: "out of memory".into(),
        };
        assert!(!e.is_fatal());
        assert_eq!(e.target_message(), Some("out of memory"));
        assert!(e.to_string().contains("out of memory"));
    }

    #[test]
    fn transport_errors_are_fatal() {
        let conn = Error::from(io::Error::from(io::ErrorKind::ConnectionReset));
        assert!(conn.is_fatal());
        assert!(conn.target_message().is_none());

        let framing = Error::from(CodecError::Truncated);
        assert!(framing.is_fatal());
        assert!(matches!(framing, Error::Framing(FrameError::Codec(_))));

        let oversized = Error::from(FrameError::Oversized { limit: 4096 });
        assert!(oversized.is_fatal());
    }

    #[test]
    fn schema_errors_leave_connection_usable() {
        let schema = [
            FrameError::MissingField {
                request: "MALLOC",
                field: "address",
            },
            FrameError::LengthMismatch {
                expected: 100,
                actual: 99,
            },
            FrameError::ShortDump { len: 4, needed: 32 },
            FrameError::UnexpectedResponse { request: "SYSINFO" },
        ];
        for e in schema {
            let e = Error::from(e);
            assert!(!e.is_fatal(), "{e}");
        }
    }

    #[test]
    fn oversized_code_is_its_own_error() {
        let e = Error::CodeTooLarge { len: 1 << 33 };
        assert!(!e.is_fatal());
        assert!(e.target_message().is_none());
        assert!(e.to_string().contains("8589934592 bytes"));
    }
}
