//! Line-based codec for tokio.
//!
//! Splits a byte stream on `\n`, tolerating an optional `\r` before it, and
//! writes lines back verbatim.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error;

/// Default maximum line length in bytes, terminator included.
pub const MAX_LINE_LEN: usize = 512;

/// Line-based codec that handles newline-terminated messages.
///
/// Decoded lines have their terminator stripped. A line longer than the
/// limit is cut at the limit and the rest of it, up to the next newline, is
/// thrown away. Invalid UTF-8 is replaced rather than rejected.
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    /// Maximum line length
    max_len: usize,
    /// Dropping the tail of an overlong line
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default 512 byte limit.
    pub fn new() -> Self {
        Self::with_max_len(MAX_LINE_LEN)
    }

    /// Create a new codec with custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len: max_len.max(2),
            discarding: false,
        }
    }

    /// The configured limit.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn to_text(raw: &[u8]) -> String {
        let text = String::from_utf8_lossy(raw);
        text.trim_end_matches(&['\r', '\n'][..]).to_string()
    }

    /// Longest prefix of `raw` within `limit` bytes that does not split a
    /// UTF-8 sequence.
    fn cut(raw: &[u8], limit: usize) -> &[u8] {
        let mut end = limit.min(raw.len());
        while end > 0 && end < raw.len() && (raw[end] & 0xC0) == 0x80 {
            end -= 1;
        }
        &raw[..end]
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<String>> {
        loop {
            // Look for newline starting from where we left off
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                if self.discarding {
                    src.advance(src.len());
                    self.next_index = 0;
                    return Ok(None);
                }

                if src.len() > self.max_len {
                    let line = src.split_to(src.len());
                    self.next_index = 0;
                    self.discarding = true;
                    return Ok(Some(Self::to_text(Self::cut(&line, self.max_len))));
                }

                // No complete line yet - remember where we stopped
                self.next_index = src.len();
                return Ok(None);
            };

            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if self.discarding {
                self.discarding = false;
                continue;
            }

            return Ok(Some(Self::to_text(Self::cut(&line, self.max_len))));
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> error::Result<()> {
        dst.extend_from_slice(line.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_complete_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\n");

        let result = codec.decode(&mut buf).unwrap();
        assert_eq!(result, Some("PING :test".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_bare_newline() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("NICK a\nUSER b\r\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("NICK a".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("USER b".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");

        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"abc\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :abc".to_string()));
    }

    #[test]
    fn test_decode_too_long_is_truncated() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\nPING\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("this is wa".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING".to_string()));
    }

    #[test]
    fn test_decode_too_long_across_reads() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("0123456789abcdef");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("0123456789".to_string()));
        assert!(buf.is_empty());

        buf.extend_from_slice(b"still the same line\r\nNEXT\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("NEXT".to_string()));
    }

    #[test]
    fn test_decode_invalid_utf8_is_replaced() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG a :\xff\r\n"[..]);

        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert!(line.starts_with("PRIVMSG a :"));
        assert!(line.ends_with('\u{FFFD}'));
    }

    #[test]
    fn test_cut_respects_char_boundary() {
        let raw = "aé".as_bytes();
        assert_eq!(LineCodec::cut(raw, 2), b"a");
    }

    #[test]
    fn test_encode() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test\r\n".to_string(), &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\r\n");
    }
}
