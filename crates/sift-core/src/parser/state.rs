//! Parser states

/// Current position in the HTTP/1.x state machine.
///
/// `ReqHttpVersion(i)` and `ResHttpVersion(i)` walk the template `HTTP/M.m`:
/// indices 0..=4 are the literal `HTTP/`, 5 is the major digit, 6 the dot,
/// 7 the minor digit and 8 the byte that terminates the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Closed, upgraded or failed; only CR/LF are tolerated
    Dead,

    StartBoth,
    /// Saw `H` while detecting: `HTTP/` or `HEAD`
    BothH,

    // Request line
    StartReq,
    ReqMethod,
    ReqSpacesBeforeUrl,
    ReqSchema,
    ReqSchemaSlash,
    ReqSchemaSlashSlash,
    ReqServerStart,
    ReqServer,
    ReqServerWithAt,
    ReqPath,
    ReqQueryStringStart,
    ReqQueryString,
    ReqFragmentStart,
    ReqFragment,
    ReqHttpStart,
    ReqHttpVersion(u8),
    ReqLineAlmostDone,

    // Status line
    StartRes,
    ResHttpVersion(u8),
    ResCodeStart,
    ResCode,
    ResReasonStart,
    ResReason,
    ResLineAlmostDone,

    // Header section
    HeaderFieldStart,
    HeaderField,
    HeaderValueDiscardWs,
    HeaderValueDiscardWsAlmostDone,
    HeaderValueDiscardLws,
    HeaderValueStart,
    HeaderValue,
    HeaderAlmostDone,
    HeaderValueLws,
    HeadersAlmostDone,
    HeadersDone,

    // Chunked body
    ChunkSizeStart,
    ChunkSize,
    ChunkParameters,
    ChunkSizeAlmostDone,
    ChunkData,
    ChunkDataAlmostDone,
    ChunkDataDone,

    // Identity body
    BodyIdentity,
    BodyIdentityEof,

    MessageDone,
}

impl ParseState {
    /// Bytes read in this state count towards the header size limit.
    pub fn is_header_phase(&self) -> bool {
        !matches!(
            self,
            ParseState::Dead
                | ParseState::ChunkSizeStart
                | ParseState::ChunkSize
                | ParseState::ChunkParameters
                | ParseState::ChunkSizeAlmostDone
                | ParseState::ChunkData
                | ParseState::ChunkDataAlmostDone
                | ParseState::ChunkDataDone
                | ParseState::BodyIdentity
                | ParseState::BodyIdentityEof
                | ParseState::MessageDone
        )
    }

    /// Inside the request target.
    pub fn is_url(&self) -> bool {
        matches!(
            self,
            ParseState::ReqSchema
                | ParseState::ReqSchemaSlash
                | ParseState::ReqSchemaSlashSlash
                | ParseState::ReqServerStart
                | ParseState::ReqServer
                | ParseState::ReqServerWithAt
                | ParseState::ReqPath
                | ParseState::ReqQueryStringStart
                | ParseState::ReqQueryString
                | ParseState::ReqFragmentStart
                | ParseState::ReqFragment
        )
    }

    /// Input may legally end here.
    pub fn is_message_boundary(&self) -> bool {
        matches!(
            self,
            ParseState::Dead
                | ParseState::StartBoth
                | ParseState::StartReq
                | ParseState::StartRes
                | ParseState::MessageDone
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases() {
        assert!(ParseState::StartReq.is_header_phase());
        assert!(ParseState::HeaderValue.is_header_phase());
        assert!(!ParseState::BodyIdentity.is_header_phase());
        assert!(!ParseState::ChunkSize.is_header_phase());
        assert!(ParseState::ReqPath.is_url());
        assert!(!ParseState::ReqSpacesBeforeUrl.is_url());
        assert!(ParseState::StartBoth.is_message_boundary());
        assert!(!ParseState::BodyIdentityEof.is_message_boundary());
    }
}
