//! HTTP Method enum - SSOT
//!
//! Method names are recognised incrementally: the first byte picks a
//! candidate, and every later byte either matches the candidate's canonical
//! text or is looked up in [`ALTERNATES`] to switch to a sibling method that
//! shares the prefix seen so far.

/// HTTP Method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Method {
    Delete = 0,
    Get = 1,
    Head = 2,
    Post = 3,
    Put = 4,
    Connect = 5,
    Options = 6,
    Trace = 7,
    Copy = 8,
    Lock = 9,
    Mkcol = 10,
    Move = 11,
    Propfind = 12,
    Proppatch = 13,
    Search = 14,
    Unlock = 15,
    Bind = 16,
    Rebind = 17,
    Unbind = 18,
    Acl = 19,
    Report = 20,
    Mkactivity = 21,
    Checkout = 22,
    Merge = 23,
    MSearch = 24,
    Notify = 25,
    Subscribe = 26,
    Unsubscribe = 27,
    Patch = 28,
    Purge = 29,
    Mkcalendar = 30,
    Link = 31,
    Unlink = 32,
    Source = 33,
}

/// `(current, index, byte, replacement)`: when `byte` at `index` diverges from
/// `current`'s text, the method being read is `replacement`.
const ALTERNATES: &[(Method, u8, u8, Method)] = &[
    (Method::Post, 1, b'U', Method::Put),
    (Method::Post, 1, b'A', Method::Patch),
    (Method::Post, 1, b'R', Method::Propfind),
    (Method::Put, 2, b'R', Method::Purge),
    (Method::Connect, 1, b'H', Method::Checkout),
    (Method::Connect, 2, b'P', Method::Copy),
    (Method::Mkcol, 1, b'O', Method::Move),
    (Method::Mkcol, 1, b'E', Method::Merge),
    (Method::Mkcol, 1, b'-', Method::MSearch),
    (Method::Mkcol, 2, b'A', Method::Mkactivity),
    (Method::Mkcol, 3, b'A', Method::Mkcalendar),
    (Method::Subscribe, 1, b'E', Method::Search),
    (Method::Subscribe, 1, b'O', Method::Source),
    (Method::Report, 2, b'B', Method::Rebind),
    (Method::Propfind, 4, b'P', Method::Proppatch),
    (Method::Lock, 1, b'I', Method::Link),
    (Method::Unlock, 2, b'S', Method::Unsubscribe),
    (Method::Unlock, 2, b'B', Method::Unbind),
    (Method::Unlock, 3, b'I', Method::Unlink),
];

impl Method {
    /// Every method, in discriminant order.
    pub const ALL: [Method; 34] = [
        Method::Delete,
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Connect,
        Method::Options,
        Method::Trace,
        Method::Copy,
        Method::Lock,
        Method::Mkcol,
        Method::Move,
        Method::Propfind,
        Method::Proppatch,
        Method::Search,
        Method::Unlock,
        Method::Bind,
        Method::Rebind,
        Method::Unbind,
        Method::Acl,
        Method::Report,
        Method::Mkactivity,
        Method::Checkout,
        Method::Merge,
        Method::MSearch,
        Method::Notify,
        Method::Subscribe,
        Method::Unsubscribe,
        Method::Patch,
        Method::Purge,
        Method::Mkcalendar,
        Method::Link,
        Method::Unlink,
        Method::Source,
    ];

    /// First candidate for a method starting with `c`.
    #[inline]
    pub fn from_first_byte(c: u8) -> Option<Self> {
        Some(match c {
            b'A' => Method::Acl,
            b'B' => Method::Bind,
            b'C' => Method::Connect,
            b'D' => Method::Delete,
            b'G' => Method::Get,
            b'H' => Method::Head,
            b'L' => Method::Lock,
            b'M' => Method::Mkcol,
            b'N' => Method::Notify,
            b'O' => Method::Options,
            b'P' => Method::Post,
            b'R' => Method::Report,
            b'S' => Method::Subscribe,
            b'T' => Method::Trace,
            b'U' => Method::Unlock,
            _ => return None,
        })
    }

    /// Sibling method for a byte that diverges from this method's text at `index`.
    #[inline]
    pub fn alternate(self, index: usize, c: u8) -> Option<Self> {
        ALTERNATES
            .iter()
            .find(|&&(from, at, byte, _)| from == self && at as usize == index && byte == c)
            .map(|&(_, _, _, to)| to)
    }

    /// Parse a complete method name (case-sensitive, as on the wire).
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let mut method = Self::from_first_byte(*bytes.first()?)?;
        for (i, &c) in bytes.iter().enumerate().skip(1) {
            if method.as_bytes().get(i) != Some(&c) {
                method = method.alternate(i, c)?;
            }
        }
        (method.as_bytes().len() == bytes.len()).then_some(method)
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Delete => "DELETE",
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Copy => "COPY",
            Method::Lock => "LOCK",
            Method::Mkcol => "MKCOL",
            Method::Move => "MOVE",
            Method::Propfind => "PROPFIND",
            Method::Proppatch => "PROPPATCH",
            Method::Search => "SEARCH",
            Method::Unlock => "UNLOCK",
            Method::Bind => "BIND",
            Method::Rebind => "REBIND",
            Method::Unbind => "UNBIND",
            Method::Acl => "ACL",
            Method::Report => "REPORT",
            Method::Mkactivity => "MKACTIVITY",
            Method::Checkout => "CHECKOUT",
            Method::Merge => "MERGE",
            Method::MSearch => "M-SEARCH",
            Method::Notify => "NOTIFY",
            Method::Subscribe => "SUBSCRIBE",
            Method::Unsubscribe => "UNSUBSCRIBE",
            Method::Patch => "PATCH",
            Method::Purge => "PURGE",
            Method::Mkcalendar => "MKCALENDAR",
            Method::Link => "LINK",
            Method::Unlink => "UNLINK",
            Method::Source => "SOURCE",
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &'static [u8] {
        self.as_str().as_bytes()
    }

    /// Convert from u8 code
    pub fn from_u8(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

impl core::fmt::Display for Method {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse_bytes() {
        assert_eq!(Method::parse(b"GET"), Some(Method::Get));
        assert_eq!(Method::parse(b"POST"), Some(Method::Post));
        assert_eq!(Method::parse(b"PUT"), Some(Method::Put));
        assert_eq!(Method::parse(b"PURGE"), Some(Method::Purge));
        assert_eq!(Method::parse(b"PATCH"), Some(Method::Patch));
        assert_eq!(Method::parse(b"PROPPATCH"), Some(Method::Proppatch));
        assert_eq!(Method::parse(b"M-SEARCH"), Some(Method::MSearch));
        assert_eq!(Method::parse(b"MKCALENDAR"), Some(Method::Mkcalendar));
        assert_eq!(Method::parse(b"UNLINK"), Some(Method::Unlink));
        assert_eq!(Method::parse(b"INVALID"), None);
        assert_eq!(Method::parse(b"GE"), None);
        assert_eq!(Method::parse(b"GETS"), None);
        assert_eq!(Method::parse(b"get"), None);
    }

    #[test]
    fn test_every_method_round_trips() {
        for method in Method::ALL {
            assert_eq!(Method::parse(method.as_bytes()), Some(method), "{method}");
        }
    }

    #[test]
    fn test_method_from_u8() {
        assert_eq!(Method::from_u8(0), Some(Method::Delete));
        assert_eq!(Method::from_u8(1), Some(Method::Get));
        assert_eq!(Method::from_u8(33), Some(Method::Source));
        assert_eq!(Method::from_u8(34), None);
    }

    #[test]
    fn test_method_repr() {
        for (i, method) in Method::ALL.iter().enumerate() {
            assert_eq!(*method as usize, i);
        }
    }
}
