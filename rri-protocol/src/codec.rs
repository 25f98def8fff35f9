//! Encoder and decoder for RRI frames and messages.

use crate::error::ProtocolError;
use crate::frame::{Frame, FRAME_HEADER_SIZE};
use crate::query::{parse_query, Query};
use crate::response::{parse_response, Response};
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Reads exactly one framed message from the stream.
///
/// Partial reads are retried until the full frame has arrived. I/O errors,
/// including end of stream, are returned unchanged.
pub async fn read_message<R>(reader: &mut R) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut header = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut header).await?;
    let len = Frame::check_len(u32::from_be_bytes(header))?;

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    String::from_utf8(payload).map_err(|_| ProtocolError::InvalidUtf8)
}

/// Frames and writes one message, then flushes the stream.
pub async fn write_message<W>(writer: &mut W, message: &str) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let buf = Frame::from_text(message).encode()?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Encodes queries and responses into frames.
pub struct Encoder;

impl Encoder {
    /// Encodes a query into a frame.
    pub fn encode_query(query: &Query) -> Result<BytesMut, ProtocolError> {
        Frame::from_text(&query.encode_kv()).encode()
    }

    /// Encodes a response into a frame.
    pub fn encode_response(response: &Response) -> Result<BytesMut, ProtocolError> {
        Frame::from_text(&response.encode_kv()).encode()
    }
}

/// Decodes buffered frames into queries and responses.
pub struct Decoder {
    buffer: BytesMut,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next frame from the buffer.
    pub fn decode_frame(&mut self) -> Result<Option<Frame>, ProtocolError> {
        Frame::decode(&mut self.buffer)
    }

    /// Attempts to decode the next query from the buffer.
    pub fn decode_query(&mut self) -> Result<Option<Query>, ProtocolError> {
        match self.decode_frame()? {
            Some(frame) => Ok(Some(parse_query(frame.text()?)?)),
            None => Ok(None),
        }
    }

    /// Attempts to decode the next response from the buffer.
    pub fn decode_response(&mut self) -> Result<Option<Response>, ProtocolError> {
        match self.decode_frame()? {
            Some(frame) => Ok(Some(parse_response(frame.text()?)?)),
            None => Ok(None),
        }
    }

    /// Returns the number of buffered bytes.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::Action;

    #[tokio::test]
    async fn test_read_message() {
        let expected = "version: 5.0\naction: LOGIN\nuser: user\npassword: secret";
        let buf = Frame::from_text(expected).encode().unwrap();
        let mut reader = &buf[..];
        assert_eq!(read_message(&mut reader).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_read_message_fragmented() {
        let mut reader = tokio_test::io::Builder::new()
            .read(&[0, 0])
            .read(&[0, 5])
            .read(b"he")
            .read(b"l")
            .read(b"lo")
            .build();
        assert_eq!(read_message(&mut reader).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_read_message_empty() {
        let buf = Frame::from_text("").encode().unwrap();
        let mut reader = &buf[..];
        assert!(matches!(
            read_message(&mut reader).await,
            Err(ProtocolError::EmptyMessage)
        ));
    }

    #[tokio::test]
    async fn test_read_message_too_long() {
        let buf = Frame::from_text(&"a".repeat(70000)).encode().unwrap();
        let mut reader = &buf[..];
        assert!(matches!(
            read_message(&mut reader).await,
            Err(ProtocolError::MessageTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_message_no_data() {
        let mut reader: &[u8] = &[];
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(err.is_end_of_stream());
    }

    #[tokio::test]
    async fn test_read_message_incomplete_size() {
        let mut reader: &[u8] = &[0];
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(err.is_end_of_stream());
    }

    #[tokio::test]
    async fn test_read_message_incomplete_message() {
        let mut reader: &[u8] = b"\x00\x00\x00\x36versi";
        let err = read_message(&mut reader).await.unwrap_err();
        assert!(err.is_end_of_stream());
    }

    #[tokio::test]
    async fn test_write_message() {
        let mut writer = tokio_test::io::Builder::new()
            .write(&[0, 0, 0, 13])
            .write(b"action: LOGIN")
            .build();
        write_message(&mut writer, "action: LOGIN").await.unwrap();
    }

    #[test]
    fn test_decoder_query_and_response() {
        let mut decoder = Decoder::new();
        decoder.extend(&Encoder::encode_query(&Query::login("user", "secret")).unwrap());
        decoder.extend(&Encoder::encode_response(&Response::success()).unwrap());

        let query = decoder.decode_query().unwrap().unwrap();
        assert_eq!(query.action(), Action::Login);

        let response = decoder.decode_response().unwrap().unwrap();
        assert!(response.is_successful());

        assert_eq!(decoder.buffered(), 0);
        assert!(decoder.decode_frame().unwrap().is_none());
    }

    #[test]
    fn test_decoder_partial_data() {
        let encoded = Encoder::encode_query(&Query::logout()).unwrap();
        let mut decoder = Decoder::default();
        decoder.extend(&encoded[..6]);
        assert!(decoder.decode_query().unwrap().is_none());
        decoder.extend(&encoded[6..]);
        assert!(decoder.decode_query().unwrap().is_some());
    }

    #[test]
    fn test_decoder_clear() {
        let mut decoder = Decoder::new();
        decoder.extend(b"\x00\x00");
        assert_eq!(decoder.buffered(), 2);
        decoder.clear();
        assert_eq!(decoder.buffered(), 0);
    }
}
