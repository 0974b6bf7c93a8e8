//! HTTP message model

use bytes::{BufMut, Bytes, BytesMut};
use sift_lex::{reason_phrase, Method};

use crate::error::{Error, Result};
use crate::headers::HttpHeaders;
use crate::parser::MessageKind;

/// A request or response head assembled from parser events.
///
/// The body is not stored here; it goes to a [`crate::BodySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage {
    pub kind: MessageKind,
    /// Request method (requests only)
    pub method: Option<Method>,
    /// Raw request target (requests only)
    pub url: Vec<u8>,
    /// Status code (responses only)
    pub status_code: u16,
    pub http_major: u8,
    pub http_minor: u8,
    pub headers: HttpHeaders,
}

impl HttpMessage {
    /// Empty HTTP/1.1 message of the given kind
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            method: None,
            url: Vec::new(),
            status_code: 0,
            http_major: 1,
            http_minor: 1,
            headers: HttpHeaders::new(),
        }
    }

    pub fn request(method: Method, url: impl AsRef<[u8]>) -> Self {
        Self {
            method: Some(method),
            url: url.as_ref().to_vec(),
            ..Self::new(MessageKind::Request)
        }
    }

    pub fn response(status_code: u16) -> Self {
        Self {
            status_code,
            ..Self::new(MessageKind::Response)
        }
    }

    /// Set the HTTP version
    pub fn version(mut self, major: u8, minor: u8) -> Self {
        self.http_major = major;
        self.http_minor = minor;
        self
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn is_request(&self) -> bool {
        self.kind == MessageKind::Request
    }

    /// Request target as text, if it is valid UTF-8
    pub fn url_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.url).ok()
    }

    pub fn http_version(&self) -> (u8, u8) {
        (self.http_major, self.http_minor)
    }

    /// Reason phrase for the status code, empty when unregistered
    pub fn reason(&self) -> &'static str {
        reason_phrase(self.status_code).unwrap_or("")
    }

    /// Write the start line, the headers and the blank line.
    ///
    /// The body is the caller's concern; no framing headers are added.
    pub fn serialize_to<B: BufMut>(&self, out: &mut B) -> Result<()> {
        match self.kind {
            MessageKind::Request => {
                let method = self
                    .method
                    .ok_or(Error::InvalidState("request without method"))?;
                out.put_slice(method.as_bytes());
                out.put_u8(b' ');
                out.put_slice(&self.url);
                out.put_slice(format!(" HTTP/{}.{}\r\n", self.http_major, self.http_minor).as_bytes());
            }
            MessageKind::Response => {
                let line = format!(
                    "HTTP/{}.{} {:03} {}\r\n",
                    self.http_major,
                    self.http_minor,
                    self.status_code,
                    self.reason()
                );
                out.put_slice(line.as_bytes());
            }
        }
        self.headers.serialize_to(out);
        out.put_slice(b"\r\n");
        Ok(())
    }

    /// Serialize into a fresh buffer
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(128 + self.url.len() + 32 * self.headers.len());
        self.serialize_to(&mut buf)?;
        Ok(buf.freeze())
    }
}

impl Default for HttpMessage {
    fn default() -> Self {
        Self::new(MessageKind::Request)
    }
}
