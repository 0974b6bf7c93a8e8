//! Request-target sub-automaton

use sift_lex::{is_url_char, is_userinfo_char};

use super::ParseState;
use crate::error::{BadFormat, Error, Result};

/// Next URL state for one non-terminator byte of the request target.
pub(super) fn url_step(state: ParseState, c: u8, strict: bool) -> Result<ParseState> {
    use ParseState::*;

    let next = match state {
        ReqSchema if c.is_ascii_alphabetic() => ReqSchema,
        ReqSchema if c == b':' => ReqSchemaSlash,
        ReqSchemaSlash if c == b'/' => ReqSchemaSlashSlash,
        ReqSchemaSlashSlash if c == b'/' => ReqServerStart,

        ReqServerWithAt if c == b'@' => return Err(BadFormat::DoubleAtInAuthority.into()),
        ReqServerStart | ReqServer | ReqServerWithAt => match c {
            b'/' => ReqPath,
            b'?' => ReqQueryStringStart,
            b'@' => ReqServerWithAt,
            _ if is_userinfo_char(c) || c == b'[' || c == b']' => {
                if state == ReqServerWithAt {
                    ReqServerWithAt
                } else {
                    ReqServer
                }
            }
            _ => return Err(Error::unexpected("authority character", c)),
        },

        ReqPath if is_url_char(c, strict) => ReqPath,
        ReqPath if c == b'?' => ReqQueryStringStart,
        ReqPath if c == b'#' => ReqFragmentStart,

        ReqQueryStringStart | ReqQueryString if is_url_char(c, strict) || c == b'?' => {
            ReqQueryString
        }
        ReqQueryStringStart | ReqQueryString if c == b'#' => ReqFragmentStart,

        ReqFragmentStart if is_url_char(c, strict) || c == b'?' => ReqFragment,
        ReqFragmentStart if c == b'#' => ReqFragmentStart,
        ReqFragment if is_url_char(c, strict) || c == b'?' || c == b'#' => ReqFragment,

        ReqSchema | ReqSchemaSlash | ReqSchemaSlashSlash | ReqPath | ReqQueryStringStart
        | ReqQueryString | ReqFragmentStart | ReqFragment => {
            return Err(Error::unexpected("URL character", c))
        }
        _ => return Err(Error::InvalidState("url_step outside request target")),
    };
    Ok(next)
}

/// First byte of an origin-form, asterisk-form or absolute-form target.
pub(super) fn url_start(c: u8) -> Result<ParseState> {
    match c {
        b'/' | b'*' => Ok(ParseState::ReqPath),
        _ if c.is_ascii_alphabetic() => Ok(ParseState::ReqSchema),
        _ => Err(Error::unexpected("request target", c)),
    }
}

/// The target may end on SP, CR or LF in this state.
pub(super) fn url_can_end(state: ParseState) -> bool {
    !matches!(
        state,
        ParseState::ReqSchema
            | ParseState::ReqSchemaSlash
            | ParseState::ReqSchemaSlashSlash
            | ParseState::ReqServerStart
    )
}
