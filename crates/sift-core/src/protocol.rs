//! HTTP/1.x message assembler
//!
//! [`HttpProtocol`] drives an [`HttpParser`] with its own handler and builds
//! an [`HttpMessage`] from the events: the request target, the headers in
//! wire order (duplicates kept, trailers included) and the version, method
//! or status code. Body bytes are forwarded to a [`BodySink`] instead of
//! being buffered. The sink is told when each message begins, so the
//! built-in `Vec<u8>` and `BytesMut` sinks hold the current body only. The
//! reason phrase of a response is not retained.

use bytes::{BufMut, Bytes};
use sift_lex::Method;

use crate::body::BodySink;
use crate::config::{ParserConfig, ParserKind};
use crate::error::Result;
use crate::message::HttpMessage;
use crate::parser::{
    HeadersAction, HttpHandler, HttpParser, MessageHead, MessageKind, ParseState,
};

/// Event handler that accumulates one message
#[derive(Debug)]
struct Assembler<S> {
    message: HttpMessage,
    /// Header name being read
    field: Vec<u8>,
    /// Header value being read
    value: Vec<u8>,
    /// A value event arrived since the last field event
    in_value: bool,
    skip_body: bool,
    complete: bool,
    sink: S,
}

impl<S> Assembler<S> {
    fn new(sink: S) -> Self {
        Self {
            message: HttpMessage::default(),
            field: Vec::new(),
            value: Vec::new(),
            in_value: false,
            skip_body: false,
            complete: false,
            sink,
        }
    }

    fn clear(&mut self) {
        self.message = HttpMessage::default();
        self.field.clear();
        self.value.clear();
        self.in_value = false;
        self.complete = false;
    }

    /// Move the pending name/value pair into the header list.
    fn flush_header(&mut self) {
        if self.field.is_empty() && !self.in_value {
            return;
        }
        let name = String::from_utf8_lossy(&self.field).into_owned();
        let value = Bytes::copy_from_slice(&self.value);
        self.message.headers.append(name, value);
        self.field.clear();
        self.value.clear();
        self.in_value = false;
    }
}

impl<S: BodySink> HttpHandler for Assembler<S> {
    fn on_message_begin(&mut self) {
        self.clear();
        self.sink.begin_body();
    }

    fn on_url(&mut self, url: &[u8]) {
        self.message.url.extend_from_slice(url);
    }

    fn on_header_field(&mut self, field: &[u8]) {
        if self.in_value {
            self.flush_header();
        }
        self.field.extend_from_slice(field);
    }

    fn on_header_value(&mut self, value: &[u8]) {
        self.in_value = true;
        self.value.extend_from_slice(value);
    }

    fn on_headers_complete(&mut self, head: &MessageHead) -> HeadersAction {
        self.flush_header();
        let message = &mut self.message;
        message.kind = head.kind;
        message.method = head.method;
        message.status_code = head.status_code;
        message.http_major = head.http_major;
        message.http_minor = head.http_minor;
        if self.skip_body {
            HeadersAction::SkipBody
        } else {
            HeadersAction::Default
        }
    }

    fn on_body(&mut self, body: &[u8]) {
        self.sink.write_body(body);
    }

    fn on_message_complete(&mut self) {
        // trailers
        self.flush_header();
        self.sink.finish_body();
        self.skip_body = false;
        self.complete = true;
    }
}

/// Incremental HTTP/1.x message reader/writer
#[derive(Debug)]
pub struct HttpProtocol<S = Vec<u8>> {
    parser: HttpParser,
    assembler: Assembler<S>,
}

impl HttpProtocol<Vec<u8>> {
    /// Protocol collecting bodies into a `Vec<u8>`
    pub fn new(config: ParserConfig) -> Self {
        Self::with_sink(config, Vec::new())
    }

    pub fn request() -> Self {
        Self::new(ParserConfig::request())
    }

    pub fn response() -> Self {
        Self::new(ParserConfig::response())
    }
}

impl<S: BodySink> HttpProtocol<S> {
    pub fn with_sink(config: ParserConfig, sink: S) -> Self {
        Self {
            parser: HttpParser::new(config),
            assembler: Assembler::new(sink),
        }
    }

    /// Feed the next fragment; an empty slice signals end of input.
    ///
    /// Returns the bytes consumed and whether a message is complete. After a
    /// complete message the next non-empty call starts a fresh one, so one
    /// instance serves a whole connection, and can be reused after a message
    /// that closed it. Only an upgrade ends the stream for good.
    pub fn parse(&mut self, data: &[u8]) -> Result<(usize, bool)> {
        if self.assembler.complete && !data.is_empty() {
            self.assembler.clear();
            if self.parser.state() == ParseState::Dead && !self.parser.is_upgrade() {
                self.parser.reset(self.parser.kind());
            }
        }
        let consumed = self.parser.parse(&mut self.assembler, data)?;
        Ok((consumed, self.assembler.complete))
    }

    /// Treat the next response as bodiless, as for a reply to HEAD.
    pub fn set_skip_body(&mut self, skip: bool) {
        self.assembler.skip_body = skip;
    }

    pub fn is_complete(&self) -> bool {
        self.assembler.complete
    }

    /// Persistence judged from the assembled headers.
    ///
    /// HTTP/1.1 and later persist unless `Connection: close` is present;
    /// older versions only with `Connection: keep-alive`. Interim (1xx),
    /// 204 and 304 responses never count as keep-alive.
    pub fn is_keep_alive(&self) -> bool {
        let message = &self.assembler.message;
        let headers = &message.headers;
        if message.kind == MessageKind::Response {
            let status = message.status_code;
            if status / 100 == 1 || status == 204 || status == 304 {
                return false;
            }
        }
        if message.http_version() >= (1, 1) {
            !headers.has_token("connection", "close")
        } else {
            headers.has_token("connection", "keep-alive")
        }
    }

    /// Protocol switch judged from the assembled headers.
    pub fn is_upgraded(&self) -> bool {
        let message = &self.assembler.message;
        if message.method == Some(Method::Connect) {
            return true;
        }
        let headers = &message.headers;
        headers.contains("upgrade")
            && headers.has_token("connection", "upgrade")
            && (message.is_request() || message.status_code == 101)
    }

    pub fn message(&self) -> &HttpMessage {
        &self.assembler.message
    }

    /// Take the assembled message, leaving an empty one behind.
    pub fn take_message(&mut self) -> HttpMessage {
        std::mem::take(&mut self.assembler.message)
    }

    pub fn sink(&self) -> &S {
        &self.assembler.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.assembler.sink
    }

    pub fn into_sink(self) -> S {
        self.assembler.sink
    }

    pub fn parser(&self) -> &HttpParser {
        &self.parser
    }

    /// Start over with an empty message and a fresh parser.
    pub fn reset(&mut self, kind: ParserKind) {
        self.parser.reset(kind);
        self.assembler.clear();
        self.assembler.skip_body = false;
    }

    /// Serialize the current message head.
    pub fn serialize_to<B: BufMut>(&self, out: &mut B) -> Result<()> {
        self.assembler.message.serialize_to(out)
    }
}
