//! Tokio codec for the kiosk line protocol.
//!
//! This module provides a Tokio-compatible codec that splits a byte stream
//! into newline-terminated text lines, enabling automatic message encoding
//! and decoding using Tokio's `Framed` streams.
//!
//! # Overview
//!
//! `LineCodec` implements:
//! - [`Decoder`]: Extracts complete lines from a byte stream
//! - [`Encoder<Event>`]: Writes an outbound event in wire format
//! - [`Encoder<String>`]: Writes a raw line
//!
//! # Wire Format
//!
//! ```text
//! CHECK:9E863AAA\n     <- kiosk
//! ALLOW\r\n            -> kiosk (CR tolerated)
//! ```
//!
//! Decoded lines have the terminator (`\n` or `\r\n`) removed and surrounding
//! whitespace trimmed. Bytes that are not valid UTF-8 are replaced rather than
//! rejected; the result simply won't match any known command.
//!
//! # Usage with Tokio Framed
//!
//! ```rust,no_run
//! use futures::{SinkExt, StreamExt};
//! use tokio::net::TcpStream;
//! use tokio_util::codec::Framed;
//! use votekiosk_core::Event;
//! use votekiosk_protocol::LineCodec;
//!
//! # async fn example() -> votekiosk_core::Result<()> {
//! let stream = TcpStream::connect("127.0.0.1:7878").await?;
//! let mut framed = Framed::new(stream, LineCodec::new());
//!
//! framed.send(Event::Ready).await?;
//!
//! if let Some(Ok(line)) = framed.next().await {
//!     println!("Host said: {line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Oversized Lines
//!
//! A line longer than the configured maximum (default
//! [`MAX_LINE_LENGTH`]) is never surfaced and never an error: the codec
//! drops everything up to the next terminator, logs a warning and carries on
//! with the following line. A noisy host link therefore cannot stall the
//! kiosk loop or grow the read buffer without bound.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

use votekiosk_core::constants::{LINE_TERMINATOR, MAX_LINE_LENGTH};
use votekiosk_core::{Error, Event, Result};

/// Tokio codec for newline-delimited kiosk messages.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Longest accepted line, excluding the terminator.
    max_length: usize,

    /// Index already scanned for a terminator, so a partial line is not
    /// rescanned on every call.
    next_index: usize,

    /// Dropping an oversized line until its terminator arrives.
    discarding: bool,
}

impl LineCodec {
    /// Create a codec with the default maximum line length.
    ///
    /// # Example
    ///
    /// ```
    /// use votekiosk_protocol::LineCodec;
    ///
    /// let codec = LineCodec::new();
    /// assert_eq!(codec.max_length(), 256);
    /// ```
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    /// Create a codec with a custom maximum line length.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }

    /// Get the maximum line length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    fn finish_line(&self, raw: &[u8]) -> Option<String> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.len() > self.max_length {
            warn!("Discarding {}-byte line (limit {})", raw.len(), self.max_length);
            return None;
        }

        let line = String::from_utf8_lossy(raw).trim().to_string();
        trace!("<- {:?}", line);
        Some(line)
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = Error;

    /// Decode one line from the byte stream.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))` - A complete, trimmed line (possibly empty)
    /// - `Ok(None)` - Need more data
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Decoder;
    /// use votekiosk_protocol::LineCodec;
    ///
    /// let mut codec = LineCodec::new();
    /// let mut buffer = BytesMut::from(&b" ALLOW \r\nDE"[..]);
    ///
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), Some("ALLOW".to_string()));
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    /// ```
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        loop {
            let terminator = src[self.next_index..]
                .iter()
                .position(|b| *b == LINE_TERMINATOR as u8)
                .map(|offset| self.next_index + offset);

            match terminator {
                Some(pos) if self.discarding => {
                    src.advance(pos + 1);
                    self.next_index = 0;
                    self.discarding = false;
                }
                Some(pos) => {
                    let raw = src.split_to(pos + 1);
                    self.next_index = 0;
                    if let Some(line) = self.finish_line(&raw[..pos]) {
                        return Ok(Some(line));
                    }
                }
                None if self.discarding => {
                    src.clear();
                    self.next_index = 0;
                    return Ok(None);
                }
                // One spare byte for a trailing CR
                None if src.len() > self.max_length + 1 => {
                    warn!("Discarding unterminated line over {} bytes", self.max_length);
                    src.clear();
                    self.next_index = 0;
                    self.discarding = true;
                    return Ok(None);
                }
                None => {
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    /// At end of stream an unterminated final line is still delivered.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;

        if self.discarding || src.is_empty() {
            self.discarding = false;
            src.clear();
            return Ok(None);
        }

        let raw = src.split();
        Ok(self.finish_line(&raw))
    }
}

impl Encoder<String> for LineCodec {
    type Error = Error;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        trace!("-> {:?}", item);
        dst.reserve(item.len() + 1);
        dst.put_slice(item.as_bytes());
        dst.put_u8(LINE_TERMINATOR as u8);
        Ok(())
    }
}

impl Encoder<Event> for LineCodec {
    type Error = Error;

    /// Encode an event in wire format.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Encoder;
    /// use votekiosk_core::{Button, Event};
    /// use votekiosk_protocol::LineCodec;
    ///
    /// let mut codec = LineCodec::new();
    /// let mut buffer = BytesMut::new();
    ///
    /// codec.encode(Event::Vote(Button::Two), &mut buffer).unwrap();
    /// assert_eq!(&buffer[..], b"VOTE:2\n");
    /// ```
    fn encode(&mut self, item: Event, dst: &mut BytesMut) -> Result<()> {
        Encoder::<String>::encode(self, item.to_string(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use votekiosk_core::{Button, Identifier};

    fn decode_all(codec: &mut LineCodec, buffer: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(buffer).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_codec_default() {
        let codec = LineCodec::default();
        assert_eq!(codec.max_length(), MAX_LINE_LENGTH);
    }

    #[rstest]
    #[case(b"ALLOW\n", "ALLOW")]
    #[case(b"ALLOW\r\n", "ALLOW")]
    #[case(b"  DENY \t\n", "DENY")]
    #[case(b"\n", "")]
    #[case(b"\r\n", "")]
    fn test_decode_single_line(#[case] input: &[u8], #[case] expected: &str) {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::from(input);

        assert_eq!(codec.decode(&mut buffer).unwrap().as_deref(), Some(expected));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::from(&b"RESET_"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"CARD\n");
        assert_eq!(
            codec.decode(&mut buffer).unwrap(),
            Some("RESET_CARD".to_string())
        );
    }

    #[test]
    fn test_decode_multiple_lines_in_buffer() {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::from(&b"STORE\nCLEAR\nENABLE_VOTING\n"[..]);

        assert_eq!(
            decode_all(&mut codec, &mut buffer),
            vec!["STORE", "CLEAR", "ENABLE_VOTING"]
        );
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::from(&b"AL\xffLOW\n"[..]);

        let line = codec.decode(&mut buffer).unwrap().unwrap();
        assert_ne!(line, "ALLOW");
        assert!(line.contains('\u{FFFD}'));
    }

    #[test]
    fn test_oversized_terminated_line_is_skipped() {
        let mut codec = LineCodec::with_max_length(8);
        let mut buffer = BytesMut::from(&b"WAY_TOO_LONG_LINE\nALLOW\n"[..]);

        assert_eq!(decode_all(&mut codec, &mut buffer), vec!["ALLOW"]);
    }

    #[test]
    fn test_oversized_unterminated_line_is_discarded_until_newline() {
        let mut codec = LineCodec::with_max_length(8);
        let mut buffer = BytesMut::from(&b"0123456789ABCDEF"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());

        // Tail of the same line is still dropped
        buffer.extend_from_slice(b"GHIJ\nDENY\n");
        assert_eq!(decode_all(&mut codec, &mut buffer), vec!["DENY"]);
    }

    #[test]
    fn test_line_at_limit_with_cr_is_kept() {
        let mut codec = LineCodec::with_max_length(5);
        let mut buffer = BytesMut::from(&b"ALLOW\r"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        buffer.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some("ALLOW".to_string()));
    }

    #[test]
    fn test_decode_eof_flushes_final_line() {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::from(&b"STORE\nCLEAR"[..]);

        assert_eq!(codec.decode_eof(&mut buffer).unwrap(), Some("STORE".to_string()));
        assert_eq!(codec.decode_eof(&mut buffer).unwrap(), Some("CLEAR".to_string()));
        assert_eq!(codec.decode_eof(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_decode_eof_while_discarding() {
        let mut codec = LineCodec::with_max_length(4);
        let mut buffer = BytesMut::from(&b"TOO_LONG"[..]);

        assert!(codec.decode(&mut buffer).unwrap().is_none());
        assert_eq!(codec.decode_eof(&mut buffer).unwrap(), None);
    }

    #[rstest]
    #[case(Event::Ready, "READY\n")]
    #[case(Event::Allowed, "ALLOWED\n")]
    #[case(Event::Vote(Button::One), "VOTE:1\n")]
    #[case(Event::ResetCard, "RESET_CARD\n")]
    fn test_encode_event(#[case] event: Event, #[case] expected: &str) {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(event, &mut buffer).unwrap();
        assert_eq!(&buffer[..], expected.as_bytes());
    }

    #[test]
    fn test_encode_check_event() {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::new();
        let id = Identifier::new(vec![0x9E, 0x86, 0x3A, 0xAA]).unwrap();

        codec.encode(Event::Check(id), &mut buffer).unwrap();
        codec.encode(Event::Timeout, &mut buffer).unwrap();
        assert_eq!(&buffer[..], b"CHECK:9E863AAA\nTIMEOUT\n");
    }

    #[test]
    fn test_encoded_event_decodes_to_same_text() {
        let mut codec = LineCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(Event::Stored, &mut buffer).unwrap();
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some("STORED".to_string()));
    }
}
