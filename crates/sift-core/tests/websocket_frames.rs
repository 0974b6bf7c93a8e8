//! WebSocket frame parsing through the public API.

use sift_core::{apply_mask, FrameHandler, FrameHeader, Opcode, WebSocketProtocol};

#[derive(Default)]
struct Frames {
    headers: Vec<FrameHeader>,
    payloads: Vec<Vec<u8>>,
    payload_events: usize,
    completed: usize,
}

impl FrameHandler for Frames {
    fn on_header_complete(&mut self, header: &FrameHeader) {
        self.headers.push(*header);
        self.payloads.push(Vec::new());
    }

    fn on_payload(&mut self, data: &[u8]) {
        self.payload_events += 1;
        if let Some(current) = self.payloads.last_mut() {
            current.extend_from_slice(data);
        }
    }

    fn on_frame_complete(&mut self) {
        self.completed += 1;
    }
}

#[test]
fn unmasked_text_frame() {
    let mut ws = WebSocketProtocol::new();
    let mut frames = Frames::default();
    ws.parse(&mut frames, b"\x81\x05hello");

    let header = frames.headers[0];
    assert!(header.fin);
    assert_eq!(header.opcode(), Some(Opcode::Text));
    assert!(!header.mask);
    assert_eq!(header.payload_length, 5);
    assert_eq!(frames.payloads[0], b"hello");
    assert_eq!(frames.payload_events, 1);
    assert_eq!(frames.completed, 1);
}

#[test]
fn client_frames_across_calls() {
    let key = [0x37, 0xfa, 0x21, 0x3d];
    let mut wire = Vec::new();
    for (opcode, text) in [(Opcode::Text, &b"Hel"[..]), (Opcode::Continuation, &b"lo"[..])] {
        let mut header = FrameHeader::new(opcode, text.len() as u64).masked(key);
        header.fin = opcode == Opcode::Continuation;
        header.serialize_to(&mut wire);
        let mut payload = text.to_vec();
        apply_mask(&mut payload, key, 0);
        wire.extend_from_slice(&payload);
    }

    let mut ws = WebSocketProtocol::new();
    let mut frames = Frames::default();
    let (a, b) = wire.split_at(5);
    ws.parse(&mut frames, a);
    ws.parse(&mut frames, b);

    assert_eq!(frames.completed, 2);
    assert!(!frames.headers[0].fin);
    assert!(frames.headers[1].fin);
    let mut message = Vec::new();
    for (header, payload) in frames.headers.iter().zip(&frames.payloads) {
        let mut payload = payload.clone();
        apply_mask(&mut payload, header.mask_key, 0);
        message.extend_from_slice(&payload);
    }
    assert_eq!(message, b"Hello");
}

#[test]
fn large_payload_streams_without_buffering() {
    let header = FrameHeader::new(Opcode::Binary, 70_000);
    let mut wire = Vec::new();
    header.serialize_to(&mut wire);
    assert_eq!(wire.len(), 10);
    wire.resize(10 + 70_000, 0x5a);

    let mut ws = WebSocketProtocol::new();
    let mut frames = Frames::default();
    for piece in wire.chunks(4096) {
        ws.parse(&mut frames, piece);
    }
    assert_eq!(frames.headers, [header]);
    assert_eq!(frames.payloads[0].len(), 70_000);
    assert_eq!(frames.completed, 1);
    assert!(frames.payload_events > 1);
}
