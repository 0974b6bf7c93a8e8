//! Character class tables

/// Token table: 0 for bytes that are not `tchar`, otherwise the lower-cased byte.
pub static TOKENS: [u8; 256] = build_tokens();

const fn build_tokens() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        let c = i as u8;
        table[i] = match c {
            b'A'..=b'Z' => c + (b'a' - b'A'),
            b'a'..=b'z' | b'0'..=b'9' => c,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
            | b'`' | b'|' | b'~' => c,
            _ => 0,
        };
        i += 1;
    }
    table
}

/// Classify a header-name byte.
///
/// Returns the lower-cased byte for a valid token character. Outside strict
/// mode a space is passed through as-is.
#[inline(always)]
pub fn token(c: u8, strict: bool) -> Option<u8> {
    match TOKENS[c as usize] {
        0 if c == b' ' && !strict => Some(b' '),
        0 => None,
        t => Some(t),
    }
}

/// Request-target byte, excluding the `?` and `#` delimiters.
#[inline(always)]
pub fn is_url_char(c: u8, strict: bool) -> bool {
    match c {
        b'?' | b'#' => false,
        0x21..=0x7e => true,
        b'\t' | 0x0c | 0x80..=0xff => !strict,
        _ => false,
    }
}

/// Byte allowed in the userinfo/host part of an authority.
#[inline]
pub fn is_userinfo_char(c: u8) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')' | b'%' | b';' | b':'
                | b'&' | b'=' | b'+' | b'$' | b','
        )
}

/// Byte allowed inside a header value (`field-vchar`, SP, HTAB, obs-text).
#[inline(always)]
pub fn is_header_value_char(c: u8) -> bool {
    c == b'\t' || (c >= 0x20 && c != 0x7f)
}

/// Value of a hexadecimal digit.
#[inline(always)]
pub const fn unhex(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
