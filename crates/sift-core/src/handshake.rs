//! WebSocket opening handshake (RFC 6455 §4)

use sift_lex::Method;

use crate::crypto::{base64_decode, base64_encode, sha1};
use crate::message::HttpMessage;

const ACCEPT_GUID: &[u8] = b"258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Check if a request asks to switch to WebSocket.
///
/// Requires `GET`, HTTP/1.1 or later, `Upgrade: websocket`, an `upgrade`
/// token in `Connection` and a `Sec-WebSocket-Key` carrying 16 bytes.
pub fn is_websocket_upgrade(req: &HttpMessage) -> bool {
    let headers = &req.headers;
    req.is_request()
        && req.method == Some(Method::Get)
        && req.http_version() >= (1, 1)
        && headers.has_token("upgrade", "websocket")
        && headers.has_token("connection", "upgrade")
        && headers
            .get("sec-websocket-key")
            .and_then(|key| base64_decode(key.trim_ascii()))
            .is_some_and(|nonce| nonce.len() == 16)
}

/// `Sec-WebSocket-Accept` value for a client key
pub fn accept_key(key: &str) -> String {
    base64_encode(&sha1(&[key.trim().as_bytes(), ACCEPT_GUID]))
}

/// `101 Switching Protocols` answer to an upgrade request.
///
/// Returns `None` when `req` is not a valid WebSocket upgrade.
pub fn upgrade_response(req: &HttpMessage) -> Option<HttpMessage> {
    if !is_websocket_upgrade(req) {
        return None;
    }
    let key = req.headers.get_str("sec-websocket-key")?;

    let mut res = HttpMessage::response(101)
        .header("Upgrade", "websocket")
        .header("Connection", "Upgrade")
        .header("Sec-WebSocket-Accept", accept_key(key));
    if let Some(protocol) = req.headers.get("sec-websocket-protocol") {
        // echo the client's first choice
        let first = protocol.split(|&c| c == b',').next().unwrap_or_default();
        res.headers.append(
            "Sec-WebSocket-Protocol",
            bytes::Bytes::copy_from_slice(first.trim_ascii()),
        );
    }
    Some(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::HttpProtocol;

    const RFC_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

    fn upgrade_request() -> HttpMessage {
        HttpMessage::request(Method::Get, "/chat")
            .header("Host", "server.example.com")
            .header("Upgrade", "websocket")
            .header("Connection", "keep-alive, Upgrade")
            .header("Sec-WebSocket-Key", RFC_KEY)
            .header("Sec-WebSocket-Version", "13")
    }

    #[test]
    fn test_accept_key() {
        // RFC 6455 test vector
        assert_eq!(accept_key(RFC_KEY), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
    }

    #[test]
    fn test_is_websocket_upgrade() {
        assert!(is_websocket_upgrade(&upgrade_request()));

        let mut req = upgrade_request();
        req.method = Some(Method::Post);
        assert!(!is_websocket_upgrade(&req));

        let mut req = upgrade_request();
        req.headers.insert("Sec-WebSocket-Key", "c2hvcnQ=");
        assert!(!is_websocket_upgrade(&req));

        let mut req = upgrade_request();
        req.headers.remove("connection");
        assert!(!is_websocket_upgrade(&req));

        assert!(!is_websocket_upgrade(&upgrade_request().version(1, 0)));
    }

    #[test]
    fn test_upgrade_response() {
        let res = upgrade_response(&upgrade_request()).unwrap();
        assert_eq!(res.status_code, 101);
        assert_eq!(
            res.headers.get_str("sec-websocket-accept"),
            Some("s3pPLMBiTxaQ9kYGzzhZRbK+xOo=")
        );
        assert!(res.headers.has_token("connection", "upgrade"));
        assert!(!res.headers.contains("sec-websocket-protocol"));

        let req = upgrade_request().header("Sec-WebSocket-Protocol", "chat, superchat");
        let res = upgrade_response(&req).unwrap();
        assert_eq!(res.headers.get_str("sec-websocket-protocol"), Some("chat"));

        assert!(upgrade_response(&HttpMessage::request(Method::Get, "/")).is_none());
    }

    #[test]
    fn test_response_upgrades_client_parser() {
        let res = upgrade_response(&upgrade_request()).unwrap();
        let mut wire = res.to_bytes().unwrap().to_vec();
        wire.extend_from_slice(b"\x81\x02hi");

        let mut client = HttpProtocol::response();
        let (n, complete) = client.parse(&wire).unwrap();
        assert!(complete);
        assert!(client.is_upgraded());
        assert_eq!(&wire[n..], b"\x81\x02hi");
    }
}
