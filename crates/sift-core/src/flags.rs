//! Per-message framing flags

use bitflags::bitflags;

bitflags! {
    /// Signals gathered from the header section that decide framing,
    /// persistence and protocol hand-off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u8 {
        /// Final transfer coding is `chunked`
        const CHUNKED = 1 << 0;
        /// `Connection: keep-alive`
        const CONNECTION_KEEP_ALIVE = 1 << 1;
        /// `Connection: close`
        const CONNECTION_CLOSE = 1 << 2;
        /// `Connection: upgrade`
        const CONNECTION_UPGRADE = 1 << 3;
        /// Reading trailer headers after the last chunk
        const TRAILING = 1 << 4;
        /// An `Upgrade` header was seen
        const UPGRADE = 1 << 5;
        /// The handler asked to skip the body
        const SKIP_BODY = 1 << 6;
        /// A `Content-Length` header was seen
        const CONTENT_LENGTH = 1 << 7;
    }
}
