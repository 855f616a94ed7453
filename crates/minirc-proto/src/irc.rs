//! Message codec for tokio.
//!
//! Wraps [`LineCodec`] so a framed transport yields and accepts [`Message`]
//! values directly.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::error;
use crate::line::LineCodec;
use crate::message::Message;

/// Tokio codec for encoding/decoding protocol messages.
///
/// Blank lines decode to an empty [`Message`]; callers drop those. Encoding a
/// message without a command writes nothing.
#[derive(Default)]
pub struct IrcCodec {
    inner: LineCodec,
}

impl IrcCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }

    /// Cut outgoing data at its first line break so one message is always
    /// exactly one line, then re-terminate it.
    pub fn sanitize(mut data: String) -> String {
        if let Some(pos) = data.find(&['\r', '\n'][..]) {
            data.truncate(pos);
            data.push_str("\r\n");
        }
        data
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Message>> {
        Ok(self.inner.decode(src)?.map(|line| Message::parse(&line)))
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> error::Result<()> {
        let wire = msg.to_wire();
        if wire.is_empty() {
            return Ok(());
        }
        self.inner.encode(Self::sanitize(wire), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_newline() {
        let result = IrcCodec::sanitize("PRIVMSG #test :hello\r\nworld\r\n".to_string());
        assert_eq!(result, "PRIVMSG #test :hello\r\n");
    }

    #[test]
    fn test_sanitize_clean() {
        let result = IrcCodec::sanitize("PRIVMSG #test :hello\r\n".to_string());
        assert_eq!(result, "PRIVMSG #test :hello\r\n");
    }

    #[test]
    fn test_decode_yields_messages() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::from(":x NICK alice\r\n\r\n");

        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(first.prefix, "x");
        assert_eq!(first.command, "nick");
        assert_eq!(first.args, vec!["alice"]);

        let blank = codec.decode(&mut buf).unwrap().unwrap();
        assert!(blank.is_empty());
    }

    #[test]
    fn test_encode_embedded_newline_in_trailing() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();
        let msg = Message::new("NOTICE").with_arg("bob").with_trailing("one\ntwo");

        codec.encode(msg, &mut buf).unwrap();
        assert_eq!(&buf[..], b"NOTICE bob :one\r\n");
    }

    #[test]
    fn test_encode_skips_empty_message() {
        let mut codec = IrcCodec::new();
        let mut buf = BytesMut::new();

        codec.encode(Message::default(), &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
