//! Body sinks

use bytes::BytesMut;

/// Destination for body bytes forwarded by [`crate::HttpProtocol`].
///
/// Chunks arrive in order and already de-chunked; a sink never sees
/// chunk-size lines or trailers.
pub trait BodySink {
    /// A new message starts; buffering sinks drop the previous body.
    fn begin_body(&mut self) {}

    fn write_body(&mut self, data: &[u8]);

    /// The message that owned the preceding bytes is complete.
    fn finish_body(&mut self) {}
}

impl BodySink for Vec<u8> {
    fn begin_body(&mut self) {
        self.clear();
    }

    fn write_body(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

impl BodySink for BytesMut {
    fn begin_body(&mut self) {
        self.clear();
    }

    fn write_body(&mut self, data: &[u8]) {
        self.extend_from_slice(data);
    }
}

/// Discards the body
impl BodySink for () {
    fn write_body(&mut self, _data: &[u8]) {}
}

impl<T: BodySink + ?Sized> BodySink for &mut T {
    fn begin_body(&mut self) {
        (**self).begin_body();
    }

    fn write_body(&mut self, data: &[u8]) {
        (**self).write_body(data);
    }

    fn finish_body(&mut self) {
        (**self).finish_body();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed<S: BodySink>(mut sink: S) {
        sink.begin_body();
        sink.write_body(b"hel");
        sink.write_body(b"lo");
        sink.finish_body();
    }

    #[test]
    fn test_sinks_accumulate() {
        let mut vec: Vec<u8> = Vec::new();
        feed(&mut vec);
        assert_eq!(vec, b"hello");

        let mut buf = BytesMut::new();
        feed(&mut buf);
        assert_eq!(&buf[..], b"hello");

        feed(());
    }

    #[test]
    fn test_begin_body_drops_previous() {
        let mut vec = b"stale".to_vec();
        feed(&mut vec);
        assert_eq!(vec, b"hello");

        let mut buf = BytesMut::from(&b"stale"[..]);
        feed(&mut buf);
        assert_eq!(&buf[..], b"hello");
    }
}
