//! Ordered header multi-map
//!
//! Names keep their wire spelling; every lookup compares them
//! case-insensitively. Values are raw bytes because `obs-text` is not UTF-8.

use bytes::{BufMut, Bytes};
use smallvec::SmallVec;

/// HTTP header collection (stack-allocated for small header counts)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    entries: SmallVec<[(String, Bytes); 16]>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, keeping any existing ones with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<Bytes>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replace every entry named `name` with a single one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Bytes>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }

    /// First value for `name`, if it is valid UTF-8
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Every value for `name`, in insertion order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Whether any `name` value lists `token` in its comma-separated list.
    pub fn has_token(&self, name: &str, token: &str) -> bool {
        self.get_all(name).any(|value| {
            value
                .split(|&c| c == b',')
                .any(|item| trim_ows(item).eq_ignore_ascii_case(token.as_bytes()))
        })
    }

    /// Remove every entry named `name`, returning how many were dropped.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write `Name: Value\r\n` per entry.
    pub fn serialize_to<B: BufMut>(&self, out: &mut B) {
        for (name, value) in &self.entries {
            out.put_slice(name.as_bytes());
            out.put_slice(b": ");
            out.put_slice(value);
            out.put_slice(b"\r\n");
        }
    }
}

impl<N: Into<String>, V: Into<Bytes>> FromIterator<(N, V)> for HttpHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = HttpHeaders::new();
        headers.extend(iter);
        headers
    }
}

impl<N: Into<String>, V: Into<Bytes>> Extend<(N, V)> for HttpHeaders {
    fn extend<I: IntoIterator<Item = (N, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.append(name, value);
        }
    }
}

fn trim_ows(mut s: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = s {
        s = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = s {
        s = rest;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HttpHeaders {
        [
            ("Host", "example.com"),
            ("Set-Cookie", "a=1"),
            ("set-cookie", "b=2"),
            ("Connection", "keep-alive, Upgrade"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers = sample();
        assert_eq!(headers.get("HOST"), Some(&b"example.com"[..]));
        assert_eq!(headers.get_str("host"), Some("example.com"));
        assert!(headers.contains("connection"));
        assert!(!headers.contains("content-length"));
        assert_eq!(headers.get("missing"), None);
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let headers = sample();
        let cookies: Vec<_> = headers.get_all("Set-Cookie").collect();
        assert_eq!(cookies, [&b"a=1"[..], &b"b=2"[..]]);
        assert_eq!(headers.len(), 4);
    }

    #[test]
    fn test_has_token() {
        let headers = sample();
        assert!(headers.has_token("connection", "upgrade"));
        assert!(headers.has_token("Connection", "KEEP-ALIVE"));
        assert!(!headers.has_token("connection", "close"));
        assert!(!headers.has_token("host", "example"));
    }

    #[test]
    fn test_insert_and_remove() {
        let mut headers = sample();
        headers.insert("SET-COOKIE", "c=3");
        assert_eq!(headers.get_all("set-cookie").count(), 1);
        assert_eq!(headers.remove("host"), 1);
        assert_eq!(headers.remove("host"), 0);
        assert_eq!(headers.len(), 2);
        headers.clear();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_serialize_keeps_spelling() {
        let mut headers = HttpHeaders::new();
        headers.append("X-Trace", "abc");
        headers.append("x-empty", "");
        let mut out = Vec::new();
        headers.serialize_to(&mut out);
        assert_eq!(out, b"X-Trace: abc\r\nx-empty: \r\n");
    }

    #[test]
    fn test_non_utf8_value() {
        let mut headers = HttpHeaders::new();
        headers.append("X-Raw", Bytes::from_static(b"caf\xe9"));
        assert_eq!(headers.get("x-raw"), Some(&b"caf\xe9"[..]));
        assert_eq!(headers.get_str("x-raw"), None);
    }
}
