//! Error types for sift-core

use thiserror::Error;

use crate::parser::ParseState;

/// Result type alias for sift operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised while parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Grammar violation; fatal to the current message
    #[error("bad format: {0}")]
    BadFormat(#[from] BadFormat),

    /// Stream ended while the parser still needed bytes
    #[error("unexpected end of input in state {state:?}")]
    UnexpectedEof { state: ParseState },

    /// Bytes arrived after the connection was closed or upgraded
    #[error("connection closed")]
    ConnectionClosed,

    /// Unreachable parser branch
    #[error("invalid parser state: {0}")]
    InvalidState(&'static str),
}

/// Specific grammar violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BadFormat {
    #[error("expected {expected}, found {found:?}")]
    UnexpectedByte { expected: &'static str, found: char },

    #[error("unknown method at byte {found:?}")]
    UnknownMethod { found: char },

    #[error("second '@' in authority")]
    DoubleAtInAuthority,

    #[error("status code exceeds 999")]
    StatusCodeOverflow,

    #[error("content length overflow")]
    ContentLengthOverflow,

    #[error("invalid content length")]
    InvalidContentLength,

    #[error("duplicate content length")]
    DuplicateContentLength,

    #[error("chunk size overflow")]
    ChunkSizeOverflow,

    #[error("both chunked transfer encoding and content length present")]
    ChunkedWithContentLength,

    #[error("header section exceeds {limit} bytes")]
    HeaderTooLarge { limit: usize },
}

/// Flat error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadFormat,
    UnexpectedEof,
    ConnectionClosed,
    InvalidState,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BadFormat(_) => ErrorKind::BadFormat,
            Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Error::ConnectionClosed => ErrorKind::ConnectionClosed,
            Error::InvalidState(_) => ErrorKind::InvalidState,
        }
    }

    pub(crate) fn unexpected(expected: &'static str, found: u8) -> Self {
        Error::BadFormat(BadFormat::UnexpectedByte {
            expected,
            found: found as char,
        })
    }
}
