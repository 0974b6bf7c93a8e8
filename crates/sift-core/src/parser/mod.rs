//! Incremental HTTP/1.x parser
//!
//! [`HttpParser`] consumes a byte slice one byte at a time and reports what it
//! sees through an [`HttpHandler`]. It can be fed arbitrarily fragmented
//! input: all continuation state lives in the parser, and a token that is
//! still open when a call ends (URL, reason phrase, header name or value) is
//! delivered as a partial data event and resumed at offset 0 of the next
//! slice. Callers that need a token whole concatenate the pieces.
//!
//! `parse` stops right after a message completes. Bytes after that boundary
//! belong to the next message, or to the new protocol after an upgrade.

mod state;
mod url;

pub use state::ParseState;

use memchr::memchr2;
use sift_lex::{is_header_value_char, token, unhex, Method};
use tracing::{event, Level};

use crate::config::{ParserConfig, ParserKind};
use crate::error::{BadFormat, Error, Result};
use crate::flags::Flags;
use crate::matcher::{Completed, HeaderMatchState};

/// Content length sentinel meaning "not known".
pub const CONTENT_LENGTH_UNKNOWN: u64 = u64::MAX;

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const HTTP_TEMPLATE: &[u8; 5] = b"HTTP/";

/// Kind of the message being parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Response,
}

/// Answer to [`HttpHandler::on_headers_complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadersAction {
    #[default]
    Default,
    /// The message has no body (e.g. a response to HEAD)
    SkipBody,
    /// Hand the connection to another protocol after this message
    Upgrade,
}

/// Start line data and framing signals of the current message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHead {
    pub kind: MessageKind,
    pub method: Option<Method>,
    pub status_code: u16,
    pub http_major: u8,
    pub http_minor: u8,
    pub flags: Flags,
    pub upgrade: bool,
}

impl MessageHead {
    fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            method: None,
            status_code: 0,
            http_major: 0,
            http_minor: 0,
            flags: Flags::empty(),
            upgrade: false,
        }
    }
}

/// Parser event handler.
///
/// Data callbacks may fire several times for one token when the token spans
/// calls to [`HttpParser::parse`]; the slices are only valid for the call.
pub trait HttpHandler {
    fn on_message_begin(&mut self) {}

    fn on_url(&mut self, _url: &[u8]) {}

    fn on_status(&mut self, _status: &[u8]) {}

    fn on_header_field(&mut self, _field: &[u8]) {}

    fn on_header_value(&mut self, _value: &[u8]) {}

    /// Called once the header section ends; the answer decides body framing.
    fn on_headers_complete(&mut self, _head: &MessageHead) -> HeadersAction {
        HeadersAction::Default
    }

    fn on_body(&mut self, _body: &[u8]) {}

    fn on_chunk_header(&mut self, _length: u64) {}

    fn on_chunk_complete(&mut self) {}

    fn on_message_complete(&mut self) {}
}

/// Outcome of one state-machine step
enum Step {
    /// Consume the current byte
    Advance,
    /// Run the current byte again in the new state
    Reexecute,
    /// Consume this many bytes
    Skip(usize),
    /// The message completed after consuming this many bytes
    Done(usize),
}

/// Open token offsets into the current slice
#[derive(Default)]
struct Marks {
    url: Option<usize>,
    status: Option<usize>,
    field: Option<usize>,
    value: Option<usize>,
}

impl Marks {
    fn resume(state: ParseState) -> Self {
        let mut marks = Marks::default();
        match state {
            s if s.is_url() => marks.url = Some(0),
            ParseState::ResReason => marks.status = Some(0),
            ParseState::HeaderField => marks.field = Some(0),
            ParseState::HeaderValue => marks.value = Some(0),
            _ => {}
        }
        marks
    }

    fn flush<H: HttpHandler>(&mut self, handler: &mut H, data: &[u8]) {
        let end = data.len();
        if let Some(m) = self.url.take().filter(|&m| m < end) {
            handler.on_url(&data[m..]);
        }
        if let Some(m) = self.status.take().filter(|&m| m < end) {
            handler.on_status(&data[m..]);
        }
        if let Some(m) = self.field.take().filter(|&m| m < end) {
            handler.on_header_field(&data[m..]);
        }
        if let Some(m) = self.value.take().filter(|&m| m < end) {
            handler.on_header_value(&data[m..]);
        }
    }
}

/// Incremental HTTP/1.x request/response parser
#[derive(Debug, Clone)]
pub struct HttpParser {
    config: ParserConfig,
    kind: ParserKind,
    state: ParseState,
    header_state: HeaderMatchState,
    head: MessageHead,
    content_length: u64,
    /// Position inside the method name, or status digits read
    index: usize,
    /// Header-phase bytes read for the current message
    nread: usize,
}

impl Default for HttpParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl HttpParser {
    pub fn new(config: ParserConfig) -> Self {
        let kind = config.kind;
        Self {
            config,
            kind,
            state: start_state(kind),
            header_state: HeaderMatchState::General,
            head: MessageHead::new(MessageKind::Request),
            content_length: CONTENT_LENGTH_UNKNOWN,
            index: 0,
            nread: 0,
        }
    }

    pub fn request() -> Self {
        Self::new(ParserConfig::request())
    }

    pub fn response() -> Self {
        Self::new(ParserConfig::response())
    }

    /// Reinitialize for a new stream of the given kind.
    pub fn reset(&mut self, kind: ParserKind) {
        self.kind = kind;
        self.state = start_state(kind);
        self.header_state = HeaderMatchState::General;
        self.head = MessageHead::new(MessageKind::Request);
        self.content_length = CONTENT_LENGTH_UNKNOWN;
        self.index = 0;
        self.nread = 0;
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn kind(&self) -> ParserKind {
        self.kind
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn head(&self) -> &MessageHead {
        &self.head
    }

    pub fn method(&self) -> Option<Method> {
        self.head.method
    }

    pub fn status_code(&self) -> u16 {
        self.head.status_code
    }

    pub fn http_version(&self) -> (u8, u8) {
        (self.head.http_major, self.head.http_minor)
    }

    pub fn flags(&self) -> Flags {
        self.head.flags
    }

    /// Remaining bytes of the identity body or current chunk.
    pub fn content_length(&self) -> Option<u64> {
        (self.content_length != CONTENT_LENGTH_UNKNOWN).then_some(self.content_length)
    }

    pub fn is_upgrade(&self) -> bool {
        self.head.upgrade
    }

    /// The body of this message runs until the connection closes.
    pub fn needs_eof(&self) -> bool {
        if self.head.kind == MessageKind::Request {
            return false;
        }
        let status = self.head.status_code;
        if status / 100 == 1
            || status == 204
            || status == 304
            || self.head.flags.contains(Flags::SKIP_BODY)
        {
            return false;
        }
        !self.head.flags.contains(Flags::CHUNKED) && self.content_length == CONTENT_LENGTH_UNKNOWN
    }

    /// The connection may carry another message after this one.
    pub fn should_keep_alive(&self) -> bool {
        let flags = self.head.flags;
        let persistent = if (self.head.http_major, self.head.http_minor) >= (1, 1) {
            !flags.contains(Flags::CONNECTION_CLOSE)
        } else {
            flags.contains(Flags::CONNECTION_KEEP_ALIVE)
        };
        persistent && !self.needs_eof()
    }

    /// Feed the next fragment of the stream.
    ///
    /// Returns the number of bytes consumed. This is `data.len()` unless a
    /// message completed inside `data`, in which case parsing stops at the
    /// message boundary. An empty slice signals end of input.
    pub fn parse<H: HttpHandler>(&mut self, handler: &mut H, data: &[u8]) -> Result<usize> {
        let result = if data.is_empty() {
            self.finish(handler).map(|()| 0)
        } else {
            self.run(handler, data)
        };
        if let Err(err) = &result {
            event!(Level::DEBUG, error = %err, state = ?self.state, "http parse error");
            self.state = ParseState::Dead;
        }
        result
    }

    fn finish<H: HttpHandler>(&mut self, handler: &mut H) -> Result<()> {
        match self.state {
            ParseState::BodyIdentityEof => {
                self.complete_message(handler);
                Ok(())
            }
            s if s.is_message_boundary() => Ok(()),
            state => Err(Error::UnexpectedEof { state }),
        }
    }

    fn run<H: HttpHandler>(&mut self, handler: &mut H, data: &[u8]) -> Result<usize> {
        let mut marks = Marks::resume(self.state);
        let mut p = 0;

        while p < data.len() {
            let before = self.state;
            let consumed = match self.step(handler, data, p, &mut marks)? {
                Step::Advance => 1,
                Step::Reexecute => 0,
                Step::Skip(n) => n,
                Step::Done(n) => return Ok(p + n),
            };
            if before.is_header_phase() && self.state.is_header_phase() {
                self.nread += consumed;
                if self.nread > self.config.max_header_size {
                    return Err(BadFormat::HeaderTooLarge {
                        limit: self.config.max_header_size,
                    }
                    .into());
                }
            }
            p += consumed;
        }

        marks.flush(handler, data);
        Ok(data.len())
    }

    fn begin_message<H: HttpHandler>(&mut self, handler: &mut H, kind: MessageKind) {
        self.head = MessageHead::new(kind);
        self.header_state = HeaderMatchState::General;
        self.content_length = CONTENT_LENGTH_UNKNOWN;
        self.index = 0;
        handler.on_message_begin();
    }

    fn complete_message<H: HttpHandler>(&mut self, handler: &mut H) {
        self.state = ParseState::MessageDone;
        handler.on_message_complete();

        let keep_alive = self.should_keep_alive();
        event!(
            Level::TRACE,
            keep_alive,
            upgrade = self.head.upgrade,
            "http message complete"
        );
        self.nread = 0;
        self.state = if self.head.upgrade || !keep_alive {
            ParseState::Dead
        } else {
            start_state(self.kind)
        };
    }

    fn step<H: HttpHandler>(
        &mut self,
        handler: &mut H,
        data: &[u8],
        p: usize,
        marks: &mut Marks,
    ) -> Result<Step> {
        use ParseState::*;

        let ch = data[p];
        let strict_url = self.config.strict_url_token;

        match self.state {
            Dead => match ch {
                CR | LF => {}
                _ => return Err(Error::ConnectionClosed),
            },

            StartBoth => match ch {
                CR | LF => {}
                b'H' => {
                    self.begin_message(handler, MessageKind::Response);
                    self.state = BothH;
                }
                _ => {
                    self.state = StartReq;
                    return Ok(Step::Reexecute);
                }
            },

            BothH => match ch {
                b'T' => {
                    self.head.kind = MessageKind::Response;
                    self.state = ResHttpVersion(2);
                }
                b'E' => {
                    self.head.kind = MessageKind::Request;
                    self.head.method = Some(Method::Head);
                    self.index = 2;
                    self.state = ReqMethod;
                }
                _ => return Err(Error::unexpected("HTTP/ or HEAD", ch)),
            },

            // ---- request line ----
            StartReq => match ch {
                CR | LF => {}
                _ => {
                    self.begin_message(handler, MessageKind::Request);
                    let method = Method::from_first_byte(ch)
                        .ok_or(BadFormat::UnknownMethod { found: ch as char })?;
                    self.head.method = Some(method);
                    self.index = 1;
                    self.state = ReqMethod;
                }
            },

            ReqMethod => {
                let method = self
                    .head
                    .method
                    .ok_or(Error::InvalidState("method not selected"))?;
                let text = method.as_bytes();
                if ch == b' ' && self.index == text.len() {
                    self.state = ReqSpacesBeforeUrl;
                } else if text.get(self.index) == Some(&ch) {
                    self.index += 1;
                } else {
                    let alternate = method
                        .alternate(self.index, ch)
                        .ok_or(BadFormat::UnknownMethod { found: ch as char })?;
                    self.head.method = Some(alternate);
                    self.index += 1;
                }
            }

            ReqSpacesBeforeUrl => {
                if ch != b' ' {
                    marks.url = Some(p);
                    if self.head.method == Some(Method::Connect) {
                        self.state = ReqServerStart;
                        return Ok(Step::Reexecute);
                    }
                    self.state = url::url_start(ch)?;
                }
            }

            ReqSchema | ReqSchemaSlash | ReqSchemaSlashSlash | ReqServerStart | ReqServer
            | ReqServerWithAt | ReqPath | ReqQueryStringStart | ReqQueryString
            | ReqFragmentStart | ReqFragment => match ch {
                b' ' | CR | LF => {
                    if !url::url_can_end(self.state) {
                        return Err(Error::unexpected("URL character", ch));
                    }
                    if let Some(m) = marks.url.take().filter(|&m| m < p) {
                        handler.on_url(&data[m..p]);
                    }
                    self.state = match ch {
                        b' ' => ReqHttpStart,
                        _ => {
                            // HTTP/0.9: no version, headers follow immediately
                            self.head.http_major = 0;
                            self.head.http_minor = 9;
                            if ch == CR {
                                ReqLineAlmostDone
                            } else {
                                HeaderFieldStart
                            }
                        }
                    };
                }
                _ => self.state = url::url_step(self.state, ch, strict_url)?,
            },

            ReqHttpStart => match ch {
                b' ' => {}
                b'H' => self.state = ReqHttpVersion(1),
                _ => return Err(Error::unexpected("HTTP version", ch)),
            },

            ReqHttpVersion(8) => match ch {
                CR => self.state = ReqLineAlmostDone,
                LF => self.state = HeaderFieldStart,
                _ => return Err(Error::unexpected("CRLF after HTTP version", ch)),
            },

            ReqHttpVersion(i) => {
                self.version_byte(i, ch)?;
                self.state = ReqHttpVersion(i + 1);
            }

            ReqLineAlmostDone => {
                expect(ch, LF, "LF after request line")?;
                self.state = HeaderFieldStart;
            }

            // ---- status line ----
            StartRes => match ch {
                CR | LF => {}
                b'H' => {
                    self.begin_message(handler, MessageKind::Response);
                    self.state = ResHttpVersion(1);
                }
                _ => return Err(Error::unexpected("HTTP/", ch)),
            },

            ResHttpVersion(8) => {
                expect(ch, b' ', "space after HTTP version")?;
                self.state = ResCodeStart;
            }

            ResHttpVersion(i) => {
                self.version_byte(i, ch)?;
                self.state = ResHttpVersion(i + 1);
            }

            ResCodeStart => match ch {
                b' ' => {}
                b'0'..=b'9' => {
                    self.head.status_code = u16::from(ch - b'0');
                    self.index = 1;
                    self.state = ResCode;
                }
                _ => return Err(Error::unexpected("status code digit", ch)),
            },

            ResCode => match ch {
                b'0'..=b'9' => {
                    if self.index == 3 {
                        return Err(BadFormat::StatusCodeOverflow.into());
                    }
                    self.head.status_code = self.head.status_code * 10 + u16::from(ch - b'0');
                    self.index += 1;
                }
                // exactly three digits
                _ if self.index < 3 => return Err(Error::unexpected("status code digit", ch)),
                b' ' => self.state = ResReasonStart,
                CR => self.state = ResLineAlmostDone,
                LF => self.state = HeaderFieldStart,
                _ => return Err(Error::unexpected("status code digit", ch)),
            },

            ResReasonStart => match ch {
                CR => self.state = ResLineAlmostDone,
                LF => self.state = HeaderFieldStart,
                _ => {
                    marks.status = Some(p);
                    self.state = ResReason;
                    return Ok(Step::Reexecute);
                }
            },

            ResReason => match ch {
                CR | LF => {
                    if let Some(m) = marks.status.take().filter(|&m| m < p) {
                        handler.on_status(&data[m..p]);
                    }
                    self.state = if ch == CR {
                        ResLineAlmostDone
                    } else {
                        HeaderFieldStart
                    };
                }
                _ => return skip_line(data, p, self.config.lenient_header_values, "reason phrase"),
            },

            ResLineAlmostDone => {
                expect(ch, LF, "LF after status line")?;
                self.state = HeaderFieldStart;
            }

            // ---- header section ----
            HeaderFieldStart => match ch {
                CR => self.state = HeadersAlmostDone,
                LF => {
                    self.state = HeadersAlmostDone;
                    return Ok(Step::Reexecute);
                }
                _ => {
                    let lc = token(ch, self.config.strict_header_token)
                        .ok_or_else(|| Error::unexpected("header name", ch))?;
                    marks.field = Some(p);
                    self.header_state = HeaderMatchState::name();
                    self.header_state.push_name(lc);
                    self.state = HeaderField;
                }
            },

            HeaderField => {
                let strict = self.config.strict_header_token;
                let mut i = p;
                while let Some(lc) = data.get(i).and_then(|&c| token(c, strict)) {
                    self.header_state.push_name(lc);
                    i += 1;
                }
                match data.get(i) {
                    None => return Ok(Step::Skip(i - p)),
                    Some(b':') => {
                        if let Some(m) = marks.field.take().filter(|&m| m < i) {
                            handler.on_header_field(&data[m..i]);
                        }
                        self.begin_value()?;
                        self.state = HeaderValueDiscardWs;
                        return Ok(Step::Skip(i - p + 1));
                    }
                    Some(&c) => return Err(Error::unexpected("header name or ':'", c)),
                }
            }

            HeaderValueDiscardWs => match ch {
                b' ' | b'\t' => {}
                CR => self.state = HeaderValueDiscardWsAlmostDone,
                LF => self.state = HeaderValueDiscardLws,
                _ => {
                    self.state = HeaderValueStart;
                    return Ok(Step::Reexecute);
                }
            },

            HeaderValueDiscardWsAlmostDone => {
                expect(ch, LF, "LF after header value")?;
                self.state = HeaderValueDiscardLws;
            }

            HeaderValueDiscardLws => match ch {
                b' ' | b'\t' => self.state = HeaderValueDiscardWs,
                _ => {
                    handler.on_header_value(&[]);
                    self.end_value()?;
                    self.state = HeaderFieldStart;
                    return Ok(Step::Reexecute);
                }
            },

            HeaderValueStart => {
                marks.value = Some(p);
                self.state = HeaderValue;
                return Ok(Step::Reexecute);
            }

            HeaderValue => match ch {
                CR | LF => {
                    if let Some(m) = marks.value.take().filter(|&m| m < p) {
                        handler.on_header_value(&data[m..p]);
                    }
                    self.state = HeaderAlmostDone;
                    if ch == LF {
                        return Ok(Step::Reexecute);
                    }
                }
                _ => {
                    let lenient = self.config.lenient_header_values;
                    match &mut self.header_state {
                        HeaderMatchState::Connection(tokens) => {
                            check_value_byte(ch, lenient)?;
                            if let Some(done) = tokens.push(ch) {
                                self.head.flags |= connection_flag(done);
                            }
                        }
                        HeaderMatchState::TransferEncoding(codings) => {
                            check_value_byte(ch, lenient)?;
                            if let Some(done) = codings.push(ch) {
                                self.head.flags.set(Flags::CHUNKED, done != Completed::Other);
                            }
                        }
                        HeaderMatchState::ContentLength(digits) => {
                            digits.push(ch, &mut self.content_length)?;
                        }
                        HeaderMatchState::General
                        | HeaderMatchState::Upgrade
                        | HeaderMatchState::Name { .. } => {
                            return skip_line(data, p, lenient, "header value");
                        }
                    }
                }
            },

            HeaderAlmostDone => {
                expect(ch, LF, "LF after header value")?;
                self.state = HeaderValueLws;
            }

            HeaderValueLws => match ch {
                b' ' | b'\t' => {
                    // obs-fold: the value continues on this line
                    self.state = HeaderValueStart;
                    return Ok(Step::Reexecute);
                }
                _ => {
                    self.end_value()?;
                    self.state = HeaderFieldStart;
                    return Ok(Step::Reexecute);
                }
            },

            HeadersAlmostDone => {
                expect(ch, LF, "LF after header section")?;
                if self.head.flags.contains(Flags::TRAILING) {
                    handler.on_chunk_complete();
                    self.complete_message(handler);
                    return Ok(Step::Done(1));
                }
                return self.headers_done(handler);
            }

            HeadersDone => return Err(Error::InvalidState("headers already complete")),

            // ---- chunked body ----
            ChunkSizeStart => {
                let digit = unhex(ch).ok_or_else(|| Error::unexpected("chunk size", ch))?;
                self.content_length = u64::from(digit);
                self.state = ChunkSize;
            }

            ChunkSize => match ch {
                CR => self.state = ChunkSizeAlmostDone,
                b';' | b' ' => self.state = ChunkParameters,
                _ => {
                    let digit = unhex(ch).ok_or_else(|| Error::unexpected("chunk size", ch))?;
                    self.content_length = self
                        .content_length
                        .checked_mul(16)
                        .and_then(|v| v.checked_add(u64::from(digit)))
                        .filter(|&v| v != CONTENT_LENGTH_UNKNOWN)
                        .ok_or(BadFormat::ChunkSizeOverflow)?;
                }
            },

            ChunkParameters => {
                if ch == CR {
                    self.state = ChunkSizeAlmostDone;
                }
            }

            ChunkSizeAlmostDone => {
                expect(ch, LF, "LF after chunk size")?;
                handler.on_chunk_header(self.content_length);
                if self.content_length == 0 {
                    self.head.flags |= Flags::TRAILING;
                    self.nread = 0;
                    self.state = HeaderFieldStart;
                } else {
                    self.state = ChunkData;
                }
            }

            ChunkData => {
                let n = self.take_body(handler, data, p);
                if self.content_length == 0 {
                    self.state = ChunkDataAlmostDone;
                }
                return Ok(Step::Skip(n));
            }

            ChunkDataAlmostDone => {
                expect(ch, CR, "CR after chunk data")?;
                self.state = ChunkDataDone;
            }

            ChunkDataDone => {
                expect(ch, LF, "LF after chunk data")?;
                handler.on_chunk_complete();
                self.state = ChunkSizeStart;
            }

            // ---- identity body ----
            BodyIdentity => {
                let n = self.take_body(handler, data, p);
                if self.content_length == 0 {
                    self.complete_message(handler);
                    return Ok(Step::Done(n));
                }
                return Ok(Step::Skip(n));
            }

            BodyIdentityEof => {
                handler.on_body(&data[p..]);
                return Ok(Step::Skip(data.len() - p));
            }

            MessageDone => return Err(Error::InvalidState("message already complete")),
        }

        Ok(Step::Advance)
    }

    /// Byte `i` of `HTTP/M.m`, for `i < 8`.
    fn version_byte(&mut self, i: u8, ch: u8) -> Result<()> {
        match i {
            0..=4 => expect(ch, HTTP_TEMPLATE[i as usize], "HTTP/"),
            5 if ch.is_ascii_digit() => {
                self.head.http_major = ch - b'0';
                Ok(())
            }
            6 => expect(ch, b'.', "'.' in HTTP version"),
            7 if ch.is_ascii_digit() => {
                self.head.http_minor = ch - b'0';
                Ok(())
            }
            _ => Err(Error::unexpected("HTTP version digit", ch)),
        }
    }

    /// Deliver up to the rest of the current body or chunk.
    fn take_body<H: HttpHandler>(&mut self, handler: &mut H, data: &[u8], p: usize) -> usize {
        let available = (data.len() - p) as u64;
        let n = self.content_length.min(available) as usize;
        handler.on_body(&data[p..p + n]);
        self.content_length -= n as u64;
        n
    }

    /// Header name finished; seed the value automaton.
    fn begin_value(&mut self) -> Result<()> {
        if self.head.flags.contains(Flags::TRAILING) {
            // trailers never change framing
            self.header_state = HeaderMatchState::General;
            return Ok(());
        }
        self.header_state = self.header_state.for_value();
        match self.header_state {
            HeaderMatchState::ContentLength(_) => {
                if self.head.flags.contains(Flags::CONTENT_LENGTH) {
                    return Err(BadFormat::DuplicateContentLength.into());
                }
                self.head.flags |= Flags::CONTENT_LENGTH;
            }
            HeaderMatchState::Upgrade => self.head.flags |= Flags::UPGRADE,
            _ => {}
        }
        Ok(())
    }

    /// Header value finished (no fold follows); settle its tokens.
    fn end_value(&mut self) -> Result<()> {
        match self.header_state {
            HeaderMatchState::Connection(tokens) => {
                if let Some(done) = tokens.finish() {
                    self.head.flags |= connection_flag(done);
                }
            }
            HeaderMatchState::TransferEncoding(codings) => {
                if let Some(done) = codings.finish() {
                    self.head.flags.set(Flags::CHUNKED, done != Completed::Other);
                }
            }
            HeaderMatchState::ContentLength(digits) => digits.finish()?,
            _ => {}
        }
        self.header_state = HeaderMatchState::General;
        Ok(())
    }

    fn headers_done<H: HttpHandler>(&mut self, handler: &mut H) -> Result<Step> {
        let flags = self.head.flags;
        if flags.contains(Flags::CHUNKED | Flags::CONTENT_LENGTH) {
            return Err(BadFormat::ChunkedWithContentLength.into());
        }

        self.state = ParseState::HeadersDone;
        self.nread = 0;

        let is_connect = self.head.method == Some(Method::Connect);
        self.head.upgrade = (flags.contains(Flags::UPGRADE | Flags::CONNECTION_UPGRADE)
            && (self.head.kind == MessageKind::Request || self.head.status_code == 101))
            || is_connect;

        match handler.on_headers_complete(&self.head) {
            HeadersAction::Default => {}
            HeadersAction::SkipBody => self.head.flags |= Flags::SKIP_BODY,
            HeadersAction::Upgrade => self.head.upgrade = true,
        }

        let flags = self.head.flags;
        let chunked = flags.contains(Flags::CHUNKED);
        let skip_body = flags.contains(Flags::SKIP_BODY);
        let has_body = chunked
            || (self.content_length != CONTENT_LENGTH_UNKNOWN && self.content_length > 0);

        if self.head.upgrade {
            event!(
                Level::DEBUG,
                method = ?self.head.method,
                status = self.head.status_code,
                "http connection upgrade"
            );
            if is_connect || skip_body || !has_body {
                self.complete_message(handler);
                return Ok(Step::Done(1));
            }
        }

        if skip_body {
            self.complete_message(handler);
            return Ok(Step::Done(1));
        }
        if chunked {
            self.state = ParseState::ChunkSizeStart;
        } else if self.content_length == 0 {
            self.complete_message(handler);
            return Ok(Step::Done(1));
        } else if self.content_length != CONTENT_LENGTH_UNKNOWN {
            self.state = ParseState::BodyIdentity;
        } else if self.needs_eof() {
            self.state = ParseState::BodyIdentityEof;
        } else {
            self.complete_message(handler);
            return Ok(Step::Done(1));
        }
        Ok(Step::Advance)
    }
}

fn start_state(kind: ParserKind) -> ParseState {
    match kind {
        ParserKind::Request => ParseState::StartReq,
        ParserKind::Response => ParseState::StartRes,
        ParserKind::Both => ParseState::StartBoth,
    }
}

#[inline]
fn expect(ch: u8, wanted: u8, what: &'static str) -> Result<()> {
    if ch == wanted {
        Ok(())
    } else {
        Err(Error::unexpected(what, ch))
    }
}

/// Bulk-skip line text up to the next CR or LF.
fn skip_line(data: &[u8], p: usize, lenient: bool, what: &'static str) -> Result<Step> {
    let rest = &data[p..];
    let end = memchr2(CR, LF, rest).unwrap_or(rest.len());
    if !lenient {
        if let Some(&bad) = rest[..end].iter().find(|&&c| !is_header_value_char(c)) {
            return Err(Error::unexpected(what, bad));
        }
    }
    Ok(Step::Skip(end))
}

#[inline]
fn check_value_byte(ch: u8, lenient: bool) -> Result<()> {
    if lenient || is_header_value_char(ch) {
        Ok(())
    } else {
        Err(Error::unexpected("header value", ch))
    }
}

fn connection_flag(done: Completed) -> Flags {
    match done {
        Completed::Known(0) => Flags::CONNECTION_KEEP_ALIVE,
        Completed::Known(1) => Flags::CONNECTION_CLOSE,
        Completed::Known(2) => Flags::CONNECTION_UPGRADE,
        _ => Flags::empty(),
    }
}
