//! sift-lex: Static lexical tables for HTTP/1.x
//!
//! Read-only classification data shared by the sift parsers:
//! - RFC 7230 token characters (validated and lower-cased in one lookup)
//! - request-target characters
//! - hexadecimal digits
//! - request methods and their canonical text
//! - status reason phrases
//!
//! Everything here is `const`/`static` data; there is no lifecycle.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod chars;
mod method;
mod status;

pub use chars::{is_header_value_char, is_url_char, is_userinfo_char, token, unhex, TOKENS};
pub use method::Method;
pub use status::{reason_phrase, REASON_PHRASES};
