//! Cryptographic utilities - SHA-1 and Base64 for the WebSocket handshake.
//!
//! Neither is used for anything security-relevant: RFC 6455 only needs them
//! to prove that the server understood the upgrade request.

mod base64;
mod sha1;

pub use base64::{base64_decode, base64_encode};
pub use sha1::{sha1, Sha1};
