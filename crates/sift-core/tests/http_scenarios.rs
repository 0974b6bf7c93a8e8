//! End-to-end behaviour of the HTTP parser and assembler through the public API.

use sift_core::{
    BadFormat, Error, ErrorKind, HeadersAction, HttpHandler, HttpMessage, HttpParser,
    HttpProtocol, MessageHead, Method,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Begin,
    Url(String),
    Field(String),
    Value(String),
    HeadersComplete,
    Body(String),
    ChunkHeader(u64),
    ChunkComplete,
    Complete,
}

#[derive(Default)]
struct Log(Vec<Event>);

impl Log {
    fn text(&mut self, event: fn(String) -> Event, data: &[u8]) {
        let piece = String::from_utf8_lossy(data).into_owned();
        if let Some(last) = self.0.last_mut() {
            if let (Event::Url(a), Event::Url(b))
            | (Event::Field(a), Event::Field(b))
            | (Event::Value(a), Event::Value(b))
            | (Event::Body(a), Event::Body(b)) = (last, &event(piece.clone()))
            {
                a.push_str(b);
                return;
            }
        }
        self.0.push(event(piece));
    }
}

impl HttpHandler for Log {
    fn on_message_begin(&mut self) {
        self.0.push(Event::Begin);
    }
    fn on_url(&mut self, url: &[u8]) {
        self.text(Event::Url, url);
    }
    fn on_header_field(&mut self, field: &[u8]) {
        self.text(Event::Field, field);
    }
    fn on_header_value(&mut self, value: &[u8]) {
        self.text(Event::Value, value);
    }
    fn on_headers_complete(&mut self, _head: &MessageHead) -> HeadersAction {
        self.0.push(Event::HeadersComplete);
        HeadersAction::Default
    }
    fn on_body(&mut self, body: &[u8]) {
        self.text(Event::Body, body);
    }
    fn on_chunk_header(&mut self, length: u64) {
        self.0.push(Event::ChunkHeader(length));
    }
    fn on_chunk_complete(&mut self) {
        self.0.push(Event::ChunkComplete);
    }
    fn on_message_complete(&mut self) {
        self.0.push(Event::Complete);
    }
}

const REQUEST: &[u8] = b"GET /x?y=1 HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhello";

fn expected_request_events() -> Vec<Event> {
    vec![
        Event::Begin,
        Event::Url("/x?y=1".into()),
        Event::Field("Host".into()),
        Event::Value("a".into()),
        Event::Field("Content-Length".into()),
        Event::Value("5".into()),
        Event::HeadersComplete,
        Event::Body("hello".into()),
        Event::Complete,
    ]
}

#[test]
fn single_call_request() {
    let mut parser = HttpParser::request();
    let mut log = Log::default();
    let consumed = parser.parse(&mut log, REQUEST).unwrap();
    assert_eq!(consumed, REQUEST.len());
    assert_eq!(log.0, expected_request_events());
}

#[test]
fn request_split_in_three() {
    let mut parser = HttpParser::request();
    let mut log = Log::default();
    let mut consumed = 0;
    for piece in [&REQUEST[..10], &REQUEST[10..30], &REQUEST[30..]] {
        consumed += parser.parse(&mut log, piece).unwrap();
    }
    assert_eq!(consumed, REQUEST.len());
    assert_eq!(log.0, expected_request_events());
}

#[test]
fn chunked_body() {
    let head = b"POST /upload HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
    let body = b"5\r\nhello\r\n0\r\n\r\n";
    let mut parser = HttpParser::request();
    let mut log = Log::default();
    assert_eq!(parser.parse(&mut log, head).unwrap(), head.len());
    assert_eq!(parser.parse(&mut log, body).unwrap(), body.len());

    let bodies: Vec<_> = log.0.iter().filter(|e| matches!(e, Event::Body(_))).collect();
    assert_eq!(bodies, [&Event::Body("hello".into())]);
    assert_eq!(
        log.0[log.0.len() - 4..],
        [
            Event::ChunkComplete,
            Event::ChunkHeader(0),
            Event::ChunkComplete,
            Event::Complete
        ]
    );
}

#[test]
fn non_digit_status_code() {
    let mut parser = HttpParser::response();
    let err = parser
        .parse(&mut Log::default(), b"HTTP/1.1  XYZ OK\r\n\r\n")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadFormat);
    assert!(matches!(
        err,
        Error::BadFormat(BadFormat::UnexpectedByte { found: 'X', .. })
    ));
}

#[test]
fn content_length_exactness() {
    let mut protocol = HttpProtocol::request();
    let (n, complete) = protocol
        .parse(b"PUT /f HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcGET")
        .unwrap();
    assert!(complete);
    assert_eq!(n, 41);
    assert_eq!(protocol.sink(), b"abc");

    let mut protocol = HttpProtocol::request();
    let (_, complete) = protocol
        .parse(b"PUT /f HTTP/1.1\r\nContent-Length: 3\r\n\r\nab")
        .unwrap();
    assert!(!complete);
    let err = protocol.parse(b"").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
}

#[test]
fn keep_alive_table() {
    let requests: &[(&[u8], bool)] = &[
        (b"GET / HTTP/1.1\r\n\r\n", true),
        (b"GET / HTTP/1.1\r\nConnection: close\r\n\r\n", false),
        (b"GET / HTTP/1.0\r\n\r\n", false),
        (b"GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n", true),
    ];
    for &(data, keep_alive) in requests {
        let mut parser = HttpParser::request();
        parser.parse(&mut Log::default(), data).unwrap();
        assert_eq!(parser.should_keep_alive(), keep_alive, "{data:?}");

        let mut protocol = HttpProtocol::request();
        protocol.parse(data).unwrap();
        assert_eq!(protocol.is_keep_alive(), keep_alive, "{data:?}");
    }

    let responses: &[(&[u8], bool)] = &[
        (b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n", true),
        (b"HTTP/1.1 200 OK\r\nConnection: close\r\nContent-Length: 0\r\n\r\n", false),
        (b"HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n", false),
        (b"HTTP/1.0 200 OK\r\nConnection: keep-alive\r\nContent-Length: 0\r\n\r\n", true),
    ];
    for &(data, keep_alive) in responses {
        let mut parser = HttpParser::response();
        parser.parse(&mut Log::default(), data).unwrap();
        assert_eq!(parser.should_keep_alive(), keep_alive, "{data:?}");

        let mut protocol = HttpProtocol::response();
        protocol.parse(data).unwrap();
        assert_eq!(protocol.is_keep_alive(), keep_alive, "{data:?}");
    }
}

#[test]
fn serialize_then_parse_round_trip() {
    let messages = [
        HttpMessage::request(Method::Propfind, "/dav/a b".replace(' ', "%20"))
            .header("Depth", "1")
            .header("Host", "dav.example"),
        HttpMessage::request(Method::Options, "*").version(1, 0),
        HttpMessage::response(301)
            .header("Location", "/elsewhere")
            .header("Content-Length", "0"),
    ];
    for original in messages {
        let wire = original.to_bytes().unwrap();
        let mut protocol = if original.is_request() {
            HttpProtocol::request()
        } else {
            HttpProtocol::response()
        };
        let (n, complete) = protocol.parse(&wire).unwrap();
        assert!(complete);
        assert_eq!(n, wire.len());
        assert_eq!(protocol.message(), &original);
    }
}

#[test]
fn upgrade_hands_off_remaining_bytes() {
    let mut wire = b"GET /chat HTTP/1.1\r\nHost: h\r\nUpgrade: websocket\r\n\
                     Connection: Upgrade\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\
                     Sec-WebSocket-Version: 13\r\n\r\n"
        .to_vec();
    let head_len = wire.len();
    wire.extend_from_slice(b"\x81\x05hello");

    let mut protocol = HttpProtocol::request();
    let (n, complete) = protocol.parse(&wire).unwrap();
    assert!(complete);
    assert_eq!(n, head_len);
    assert!(protocol.is_upgraded());
    assert!(sift_core::is_websocket_upgrade(protocol.message()));

    let res = sift_core::upgrade_response(protocol.message()).unwrap();
    assert_eq!(
        res.headers.get_str("Sec-WebSocket-Accept"),
        Some("s3pPLMBiTxaQ9kYGzzhZRbK+xOo=")
    );
}
