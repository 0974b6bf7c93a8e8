//! Conversions to and from the `http` crate

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode, Version};
use sift_lex::Method;

use crate::headers::HttpHeaders;
use crate::message::HttpMessage;

/// Standard methods map to `http` constants; extension methods are
/// carried as tokens.
pub fn to_http_method(method: Method) -> Result<http::Method, http::method::InvalidMethod> {
    Ok(match method {
        Method::Get => http::Method::GET,
        Method::Post => http::Method::POST,
        Method::Put => http::Method::PUT,
        Method::Delete => http::Method::DELETE,
        Method::Head => http::Method::HEAD,
        Method::Options => http::Method::OPTIONS,
        Method::Connect => http::Method::CONNECT,
        Method::Patch => http::Method::PATCH,
        Method::Trace => http::Method::TRACE,
        other => http::Method::from_bytes(other.as_bytes())?,
    })
}

/// Inverse of [`to_http_method`]; `None` for methods the parser does not know.
pub fn from_http_method(method: &http::Method) -> Option<Method> {
    Method::parse(method.as_str().as_bytes())
}

fn to_http_version(major: u8, minor: u8) -> Version {
    match (major, minor) {
        (0, 9) => Version::HTTP_09,
        (1, 0) => Version::HTTP_10,
        (2, _) => Version::HTTP_2,
        (3, _) => Version::HTTP_3,
        _ => Version::HTTP_11,
    }
}

impl HttpHeaders {
    /// Copy into a [`HeaderMap`], validating names and values.
    pub fn to_header_map(&self) -> Result<HeaderMap, http::Error> {
        let mut map = HeaderMap::with_capacity(self.len());
        for (name, value) in self.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_bytes(value)?;
            map.append(name, value);
        }
        Ok(map)
    }
}

impl From<&HeaderMap> for HttpHeaders {
    fn from(map: &HeaderMap) -> Self {
        map.iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_owned(),
                    Bytes::copy_from_slice(value.as_bytes()),
                )
            })
            .collect()
    }
}

impl HttpMessage {
    /// Status code as an `http` type
    pub fn status(&self) -> Result<StatusCode, http::status::InvalidStatusCode> {
        StatusCode::from_u16(self.status_code)
    }

    /// Build an [`http::Request`] from this request head and `body`.
    pub fn to_http_request<T>(&self, body: T) -> Result<http::Request<T>, http::Error> {
        let method = self.method.unwrap_or(Method::Get);
        let mut builder = http::Request::builder()
            .method(to_http_method(method)?)
            .uri(self.url.as_slice())
            .version(to_http_version(self.http_major, self.http_minor));
        if let Some(headers) = builder.headers_mut() {
            *headers = self.headers.to_header_map()?;
        }
        builder.body(body)
    }

    /// Build an [`http::Response`] from this response head and `body`.
    pub fn to_http_response<T>(&self, body: T) -> Result<http::Response<T>, http::Error> {
        let mut builder = http::Response::builder()
            .status(self.status()?)
            .version(to_http_version(self.http_major, self.http_minor));
        if let Some(headers) = builder.headers_mut() {
            *headers = self.headers.to_header_map()?;
        }
        builder.body(body)
    }
}
