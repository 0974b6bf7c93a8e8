//! WebSocket frame reader/writer (RFC 6455 §5.2)
//!
//! [`WebSocketProtocol`] is a byte-at-a-time state machine over frame
//! headers that streams payload bytes straight from the caller's slice. It
//! is independent of the HTTP parser: once an upgrade completes, the caller
//! feeds the remaining bytes here instead.
//!
//! Payloads are delivered exactly as received. Unmasking is left to the
//! caller, see [`apply_mask`].

use bytes::BufMut;
use tracing::{event, Level};

/// WebSocket opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
}

impl Opcode {
    /// Registered opcode for the low nibble of `byte`
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte & 0x0F {
            0x0 => Some(Opcode::Continuation),
            0x1 => Some(Opcode::Text),
            0x2 => Some(Opcode::Binary),
            0x8 => Some(Opcode::Close),
            0x9 => Some(Opcode::Ping),
            0xA => Some(Opcode::Pong),
            _ => None,
        }
    }

    /// Close, ping and pong
    pub fn is_control(self) -> bool {
        (self as u8) & 0x8 != 0
    }
}

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHeader {
    pub fin: bool,
    /// RSV1..RSV3
    pub reserved: [bool; 3],
    /// 4-bit opcode, kept raw so unregistered values survive
    pub opcode: u8,
    pub mask: bool,
    pub payload_length: u64,
    /// Meaningful only when `mask` is set
    pub mask_key: [u8; 4],
}

impl FrameHeader {
    /// Final, unmasked frame
    pub fn new(opcode: Opcode, payload_length: u64) -> Self {
        Self {
            fin: true,
            opcode: opcode as u8,
            payload_length,
            ..Self::default()
        }
    }

    /// Set the masking key
    pub fn masked(mut self, key: [u8; 4]) -> Self {
        self.mask = true;
        self.mask_key = key;
        self
    }

    pub fn opcode(&self) -> Option<Opcode> {
        Opcode::from_u8(self.opcode)
    }

    /// Bytes the serialized header occupies
    pub fn encoded_len(&self) -> usize {
        let length = match self.payload_length {
            0..=125 => 0,
            126..=0xFFFF => 2,
            _ => 8,
        };
        2 + length + if self.mask { 4 } else { 0 }
    }

    /// Write the header using the shortest length encoding.
    pub fn serialize_to<B: BufMut>(&self, out: &mut B) {
        let mut b0 = self.opcode & 0x0F;
        if self.fin {
            b0 |= 0x80;
        }
        for (i, &rsv) in self.reserved.iter().enumerate() {
            if rsv {
                b0 |= 0x40 >> i;
            }
        }
        out.put_u8(b0);

        let mask_bit = if self.mask { 0x80 } else { 0 };
        match self.payload_length {
            len @ 0..=125 => out.put_u8(mask_bit | len as u8),
            len @ 126..=0xFFFF => {
                out.put_u8(mask_bit | 126);
                out.put_u16(len as u16);
            }
            len => {
                out.put_u8(mask_bit | 127);
                out.put_u64(len);
            }
        }

        if self.mask {
            out.put_slice(&self.mask_key);
        }
    }
}

/// XOR `payload` with `key`, where `offset` is the position of
/// `payload[0]` within the frame's payload.
pub fn apply_mask(payload: &mut [u8], key: [u8; 4], offset: u64) {
    let shift = (offset % 4) as usize;
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte ^= key[(shift + i) % 4];
    }
}

/// Frame event handler
pub trait FrameHandler {
    fn on_header_complete(&mut self, _header: &FrameHeader) {}

    /// A run of payload bytes, possibly one of several per frame
    fn on_payload(&mut self, _data: &[u8]) {}

    fn on_frame_complete(&mut self) {}
}

/// Position inside the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// FIN, RSV1-3, opcode
    Opcode,
    /// MASK and the 7-bit length
    Length,
    /// Byte `i` of the 16-bit extended length
    ExtLength16(u8),
    /// Byte `i` of the 64-bit extended length
    ExtLength64(u8),
    /// Byte `i` of the masking key
    MaskKey(u8),
    Body,
}

/// Incremental WebSocket frame parser
#[derive(Debug, Clone)]
pub struct WebSocketProtocol {
    state: FrameState,
    header: FrameHeader,
    /// Payload bytes of the current frame already delivered
    body_read: u64,
}

impl Default for WebSocketProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl WebSocketProtocol {
    pub fn new() -> Self {
        Self {
            state: FrameState::Opcode,
            header: FrameHeader::default(),
            body_read: 0,
        }
    }

    /// Drop any partial frame and wait for a new header.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Header of the frame being read, or the one to serialize.
    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut FrameHeader {
        &mut self.header
    }

    pub fn body_read(&self) -> u64 {
        self.body_read
    }

    /// Consume all of `data`. Frames may span calls at any byte.
    pub fn parse<H: FrameHandler>(&mut self, handler: &mut H, data: &[u8]) {
        let mut p = 0;
        while p < data.len() {
            let c = data[p];
            self.state = match self.state {
                FrameState::Body => {
                    let remaining = self.header.payload_length - self.body_read;
                    let n = remaining.min((data.len() - p) as u64) as usize;
                    handler.on_payload(&data[p..p + n]);
                    self.body_read += n as u64;
                    p += n;
                    if self.body_read == self.header.payload_length {
                        handler.on_frame_complete();
                        self.state = FrameState::Opcode;
                    }
                    continue;
                }
                FrameState::Opcode => {
                    self.header = FrameHeader {
                        fin: c & 0x80 != 0,
                        reserved: [c & 0x40 != 0, c & 0x20 != 0, c & 0x10 != 0],
                        opcode: c & 0x0F,
                        ..FrameHeader::default()
                    };
                    FrameState::Length
                }
                FrameState::Length => {
                    self.header.mask = c & 0x80 != 0;
                    match c & 0x7F {
                        126 => FrameState::ExtLength16(0),
                        127 => FrameState::ExtLength64(0),
                        len => {
                            self.header.payload_length = u64::from(len);
                            self.after_length(handler)
                        }
                    }
                }
                FrameState::ExtLength16(i) => {
                    self.push_length_byte(c);
                    if i < 1 {
                        FrameState::ExtLength16(i + 1)
                    } else {
                        self.after_length(handler)
                    }
                }
                FrameState::ExtLength64(i) => {
                    self.push_length_byte(c);
                    if i < 7 {
                        FrameState::ExtLength64(i + 1)
                    } else {
                        self.after_length(handler)
                    }
                }
                FrameState::MaskKey(i) => {
                    self.header.mask_key[i as usize] = c;
                    if i < 3 {
                        FrameState::MaskKey(i + 1)
                    } else {
                        self.header_complete(handler)
                    }
                }
            };
            p += 1;
        }
    }

    /// Big-endian accumulation of the extended length
    #[inline]
    fn push_length_byte(&mut self, c: u8) {
        self.header.payload_length = self.header.payload_length << 8 | u64::from(c);
    }

    /// Next state once the payload length is known.
    fn after_length<H: FrameHandler>(&mut self, handler: &mut H) -> FrameState {
        if self.header.mask {
            FrameState::MaskKey(0)
        } else {
            self.header_complete(handler)
        }
    }

    fn header_complete<H: FrameHandler>(&mut self, handler: &mut H) -> FrameState {
        event!(
            Level::DEBUG,
            opcode = self.header.opcode,
            fin = self.header.fin,
            masked = self.header.mask,
            length = self.header.payload_length,
            "websocket frame header"
        );
        handler.on_header_complete(&self.header);
        self.body_read = 0;
        if self.header.payload_length == 0 {
            handler.on_frame_complete();
            FrameState::Opcode
        } else {
            FrameState::Body
        }
    }

    /// Serialize the header held by this instance.
    pub fn serialize_to<B: BufMut>(&self, out: &mut B) {
        self.header.serialize_to(out);
    }
}
