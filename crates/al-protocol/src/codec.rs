//! Tokio codec for length-bounded protocol lines

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;

/// Maximum length of a single request or response line, in bytes
pub const MAX_LINE_LEN: usize = 1024;

/// Codec yielding one trimmed line per decode.
///
/// CR/LF and bare LF terminators are both accepted; the terminator and any
/// trailing CR are stripped from the yielded line. A buffer that grows past
/// [`MAX_LINE_LEN`] without a terminator is a protocol error, not a stall.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Scan position within the buffer from previous partial decodes
    scanned: usize,
}

impl LineCodec {
    /// Create a new codec
    pub fn new() -> Self {
        Self { scanned: 0 }
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let newline = src[self.scanned..]
            .iter()
            .position(|&b| b == b'\n')
            .map(|pos| self.scanned + pos);

        match newline {
            Some(pos) => {
                if pos > MAX_LINE_LEN {
                    return Err(ProtocolError::LineTooLong {
                        len: pos,
                        max: MAX_LINE_LEN,
                    });
                }

                let line = src.split_to(pos + 1);
                self.scanned = 0;

                let mut end = pos;
                if end > 0 && line[end - 1] == b'\r' {
                    end -= 1;
                }
                let text = std::str::from_utf8(&line[..end])?;
                Ok(Some(text.to_string()))
            }
            None => {
                if src.len() > MAX_LINE_LEN {
                    return Err(ProtocolError::LineTooLong {
                        len: src.len(),
                        max: MAX_LINE_LEN,
                    });
                }
                // Remember how far we scanned so the next decode resumes there
                self.scanned = src.len();
                Ok(None)
            }
        }
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        self.encode(line.as_str(), dst)
    }
}

impl Encoder<&str> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        if line.len() > MAX_LINE_LEN {
            return Err(ProtocolError::LineTooLong {
                len: line.len(),
                max: MAX_LINE_LEN,
            });
        }
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_roundtrip() {
        let mut codec = LineCodec::new();

        let mut buf = BytesMut::new();
        codec.encode("propose_channel 149", &mut buf).unwrap();

        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, "propose_channel 149");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_codec_strips_crlf() {
        let mut codec = LineCodec::new();

        let mut buf = BytesMut::from("confirm_channel\r\n");
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, "confirm_channel");
    }

    #[test]
    fn test_codec_partial_read() {
        let mut codec = LineCodec::new();

        let mut buf = BytesMut::from("propose_chan");
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"nel 36\n");
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, "propose_channel 36");
    }

    #[test]
    fn test_codec_multiple_lines() {
        let mut codec = LineCodec::new();

        let mut buf = BytesMut::from("status\nconfirm_channel\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "status");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), "confirm_channel");
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_codec_rejects_oversized_line() {
        let mut codec = LineCodec::new();

        let mut buf = BytesMut::from(vec![b'x'; MAX_LINE_LEN + 1].as_slice());
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { .. })
        ));
    }
}
