//! Incremental recognition of the headers that drive framing.
//!
//! Header names and the tokens inside their values are matched one byte at a
//! time against small candidate tables, so nothing is buffered and nothing
//! is re-scanned. A candidate set is a bitmask over the table; a byte that
//! disagrees with a candidate at the current index drops it, and once the
//! mask is empty the name or token is "general" for the rest of its length.

use crate::error::{BadFormat, Result};

/// Header names with framing semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownHeader {
    Connection,
    ContentLength,
    TransferEncoding,
    Upgrade,
}

const NAMES: &[(&[u8], KnownHeader)] = &[
    (b"connection", KnownHeader::Connection),
    (b"proxy-connection", KnownHeader::Connection),
    (b"content-length", KnownHeader::ContentLength),
    (b"transfer-encoding", KnownHeader::TransferEncoding),
    (b"upgrade", KnownHeader::Upgrade),
];

/// Tokens of interest in a `Connection` value: keep-alive, close, upgrade.
pub(crate) const CONNECTION_TOKENS: &[&[u8]] = &[b"keep-alive", b"close", b"upgrade"];

/// The only transfer coding the parser frames by.
pub(crate) const TRANSFER_CODINGS: &[&[u8]] = &[b"chunked"];

#[inline]
const fn full_mask(len: usize) -> u8 {
    ((1u16 << len) - 1) as u8
}

/// Narrow `live` to the candidates whose byte at `index` equals `c`.
#[inline]
fn narrow<'a, I>(live: u8, index: u8, c: u8, candidates: I) -> u8
where
    I: Iterator<Item = &'a [u8]>,
{
    let mut next = 0;
    for (i, text) in candidates.enumerate() {
        if live & (1 << i) != 0 && text.get(index as usize) == Some(&c) {
            next |= 1 << i;
        }
    }
    next
}

/// Secondary automaton that runs alongside the main parse state while a
/// header field or value is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderMatchState {
    /// Nothing of interest; value bytes are skipped in bulk
    General,
    /// Reading a header name
    Name { live: u8, index: u8 },
    /// Reading a `Connection` value
    Connection(TokenMatch),
    /// Reading a `Transfer-Encoding` value
    TransferEncoding(TokenMatch),
    /// Reading a `Content-Length` value
    ContentLength(DigitsState),
    /// Reading an `Upgrade` value
    Upgrade,
}

impl HeaderMatchState {
    /// Fresh state for the first byte of a header name.
    pub fn name() -> Self {
        HeaderMatchState::Name {
            live: full_mask(NAMES.len()),
            index: 0,
        }
    }

    /// Advance with one lower-cased header-name byte.
    #[inline]
    pub fn push_name(&mut self, c: u8) {
        if let HeaderMatchState::Name { live, index } = self {
            if *live != 0 {
                *live = narrow(*live, *index, c, NAMES.iter().map(|&(n, _)| n));
            }
            *index = index.saturating_add(1);
        }
    }

    /// The recognised header once the name is complete.
    pub fn known_header(&self) -> Option<KnownHeader> {
        match *self {
            HeaderMatchState::Name { live, index } => NAMES
                .iter()
                .enumerate()
                .find(|&(i, &(n, _))| live & (1 << i) != 0 && n.len() == index as usize)
                .map(|(_, &(_, h))| h),
            _ => None,
        }
    }

    /// Value-phase state seeded from the name just read.
    pub fn for_value(&self) -> Self {
        match self.known_header() {
            Some(KnownHeader::Connection) => {
                HeaderMatchState::Connection(TokenMatch::new(CONNECTION_TOKENS))
            }
            Some(KnownHeader::TransferEncoding) => {
                HeaderMatchState::TransferEncoding(TokenMatch::new(TRANSFER_CODINGS))
            }
            Some(KnownHeader::ContentLength) => HeaderMatchState::ContentLength(DigitsState::Start),
            Some(KnownHeader::Upgrade) => HeaderMatchState::Upgrade,
            None => HeaderMatchState::General,
        }
    }
}

/// A token that ended inside a comma-separated value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completed {
    /// Index into the candidate table
    Known(usize),
    Other,
}

/// Case-insensitive matcher for a comma-separated token list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    candidates: &'static [&'static [u8]],
    live: u8,
    index: u8,
    trailing_ws: bool,
}

impl TokenMatch {
    pub fn new(candidates: &'static [&'static [u8]]) -> Self {
        Self {
            candidates,
            live: full_mask(candidates.len()),
            index: 0,
            trailing_ws: false,
        }
    }

    /// Feed one value byte. Returns the token that a `,` just closed.
    #[inline]
    pub fn push(&mut self, c: u8) -> Option<Completed> {
        match c {
            b',' => {
                let done = self.finish();
                *self = Self::new(self.candidates);
                done
            }
            b' ' | b'\t' => {
                if self.index > 0 {
                    self.trailing_ws = true;
                }
                None
            }
            _ => {
                if self.trailing_ws {
                    self.live = 0;
                } else if self.live != 0 {
                    let lc = c.to_ascii_lowercase();
                    self.live = narrow(self.live, self.index, lc, self.candidates.iter().copied());
                }
                self.index = self.index.saturating_add(1);
                None
            }
        }
    }

    /// Close the token in progress at the end of the value.
    pub fn finish(&self) -> Option<Completed> {
        if self.index == 0 {
            return None;
        }
        let known = self
            .candidates
            .iter()
            .enumerate()
            .find(|&(i, t)| self.live & (1 << i) != 0 && t.len() == self.index as usize)
            .map(|(i, _)| i);
        Some(known.map_or(Completed::Other, Completed::Known))
    }
}

/// `Content-Length` value grammar: `OWS 1*DIGIT OWS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitsState {
    Start,
    Digits,
    TrailingWs,
}

impl DigitsState {
    /// Feed one value byte, accumulating into `value`.
    #[inline]
    pub fn push(&mut self, c: u8, value: &mut u64) -> Result<()> {
        match (*self, c) {
            (DigitsState::Start, b' ' | b'\t') => {}
            (DigitsState::Start | DigitsState::Digits, b'0'..=b'9') => {
                let start = if *self == DigitsState::Start { 0 } else { *value };
                *value = start
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(u64::from(c - b'0')))
                    .filter(|&v| v != u64::MAX)
                    .ok_or(BadFormat::ContentLengthOverflow)?;
                *self = DigitsState::Digits;
            }
            (DigitsState::Digits | DigitsState::TrailingWs, b' ' | b'\t') => {
                *self = DigitsState::TrailingWs;
            }
            _ => return Err(BadFormat::InvalidContentLength.into()),
        }
        Ok(())
    }

    pub fn finish(&self) -> Result<()> {
        match self {
            DigitsState::Start => Err(BadFormat::InvalidContentLength.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn match_name(name: &[u8]) -> Option<KnownHeader> {
        let mut state = HeaderMatchState::name();
        for &c in name {
            state.push_name(c.to_ascii_lowercase());
        }
        state.known_header()
    }

    #[test]
    fn test_known_names() {
        assert_eq!(match_name(b"Connection"), Some(KnownHeader::Connection));
        assert_eq!(match_name(b"PROXY-CONNECTION"), Some(KnownHeader::Connection));
        assert_eq!(match_name(b"content-length"), Some(KnownHeader::ContentLength));
        assert_eq!(match_name(b"Transfer-Encoding"), Some(KnownHeader::TransferEncoding));
        assert_eq!(match_name(b"Upgrade"), Some(KnownHeader::Upgrade));
    }

    #[test]
    fn test_general_names() {
        assert_eq!(match_name(b"Content-Type"), None);
        assert_eq!(match_name(b"Connections"), None);
        assert_eq!(match_name(b"Conn"), None);
        assert_eq!(match_name(b"Upgrade-Insecure-Requests"), None);
        assert_eq!(match_name(b"X-Transfer-Encoding"), None);
    }

    #[test]
    fn test_mismatch_is_permanent() {
        let mut state = HeaderMatchState::name();
        for &c in b"cXnnection" {
            state.push_name(c);
        }
        assert_eq!(state, HeaderMatchState::Name { live: 0, index: 10 });
        assert_eq!(state.known_header(), None);
    }

    fn tokens(value: &[u8]) -> Vec<Completed> {
        let mut m = TokenMatch::new(CONNECTION_TOKENS);
        let mut out: Vec<_> = value.iter().filter_map(|&c| m.push(c)).collect();
        out.extend(m.finish());
        out
    }

    #[test]
    fn test_connection_tokens() {
        assert_eq!(tokens(b"keep-alive"), vec![Completed::Known(0)]);
        assert_eq!(tokens(b"Close"), vec![Completed::Known(1)]);
        assert_eq!(
            tokens(b" Upgrade , keep-alive"),
            vec![Completed::Known(2), Completed::Known(0)]
        );
        assert_eq!(tokens(b"keep alive"), vec![Completed::Other]);
        assert_eq!(tokens(b"closed, x"), vec![Completed::Other, Completed::Other]);
        assert_eq!(tokens(b""), Vec::<Completed>::new());
        assert_eq!(tokens(b" , "), Vec::<Completed>::new());
    }

    fn content_length(value: &[u8]) -> Result<u64> {
        let mut state = DigitsState::Start;
        let mut n = 0;
        for &c in value {
            state.push(c, &mut n)?;
        }
        state.finish()?;
        Ok(n)
    }

    #[test]
    fn test_content_length_digits() {
        assert_eq!(content_length(b"5"), Ok(5));
        assert_eq!(content_length(b"  1234  "), Ok(1234));
        assert_eq!(content_length(b"18446744073709551614"), Ok(u64::MAX - 1));
    }

    #[test]
    fn test_content_length_rejects() {
        let invalid = Err(Error::BadFormat(BadFormat::InvalidContentLength));
        assert_eq!(content_length(b"1 2"), invalid);
        assert_eq!(content_length(b""), invalid);
        assert_eq!(content_length(b"12a"), invalid);
        assert_eq!(
            content_length(b"18446744073709551615"),
            Err(Error::BadFormat(BadFormat::ContentLengthOverflow))
        );
        assert_eq!(
            content_length(b"99999999999999999999"),
            Err(Error::BadFormat(BadFormat::ContentLengthOverflow))
        );
    }
}
