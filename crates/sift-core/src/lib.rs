//! sift-core: Incremental HTTP/1.x and WebSocket frame parser
//!
//! Every parser here is fed whatever bytes the transport happens to have and
//! never blocks or buffers more than an unterminated token:
//! - [`HttpParser`] - the HTTP/1.x state machine, reporting through [`HttpHandler`]
//! - [`HttpProtocol`] - assembles [`HttpMessage`]s and decides keep-alive/upgrade
//! - [`WebSocketProtocol`] - frame header state machine with streamed payloads
//!
//! Socket I/O, buffering and TLS belong to the caller.
//!
//! ```
//! use sift_core::HttpProtocol;
//!
//! let mut protocol = HttpProtocol::request();
//! let (_, complete) = protocol.parse(b"GET /x HTTP/1.1\r\nHost: a\r\n\r\n").unwrap();
//! assert!(complete);
//! assert_eq!(protocol.message().url, b"/x");
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod body;
pub mod config;
pub mod crypto;
pub mod error;
pub mod flags;
pub mod handshake;
pub mod headers;
pub mod interop;
pub mod matcher;
pub mod message;
pub mod parser;
pub mod protocol;
pub mod websocket;

// Re-exports
pub use body::BodySink;
pub use config::{ParserConfig, ParserKind, DEFAULT_MAX_HEADER_SIZE};
pub use error::{BadFormat, Error, ErrorKind, Result};
pub use flags::Flags;
pub use handshake::{accept_key, is_websocket_upgrade, upgrade_response};
pub use headers::HttpHeaders;
pub use message::HttpMessage;
pub use parser::{
    HeadersAction, HttpHandler, HttpParser, MessageHead, MessageKind, ParseState,
    CONTENT_LENGTH_UNKNOWN,
};
pub use protocol::HttpProtocol;
pub use websocket::{apply_mask, FrameHandler, FrameHeader, FrameState, Opcode, WebSocketProtocol};

pub use sift_lex::{reason_phrase, Method};
