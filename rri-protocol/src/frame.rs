//! Length-prefixed frame format for RRI.
//!
//! Frame layout (4 bytes header + payload):
//!
//! ```text
//! +-------------+----------------------------+
//! | payload_len | payload (UTF-8 text)       |
//! | 4 bytes, BE | payload_len bytes          |
//! +-------------+----------------------------+
//! ```
//!
//! A length of zero is rejected as an empty message, a length above
//! [`MAX_MESSAGE_SIZE`] is rejected as too large.

use crate::error::ProtocolError;
use crate::MAX_MESSAGE_SIZE;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Size of the frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 4;

/// A single RRI message on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame payload (UTF-8 text).
    pub payload: Bytes,
}

impl Frame {
    /// Creates a new frame with the given payload.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Creates a frame carrying a copy of the given text.
    pub fn from_text(text: &str) -> Self {
        Self::new(Bytes::copy_from_slice(text.as_bytes()))
    }

    /// Returns the payload as text.
    pub fn text(&self) -> Result<&str, ProtocolError> {
        std::str::from_utf8(&self.payload).map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Encodes the frame into bytes.
    ///
    /// Only payloads beyond the range of the u32 header are rejected; the
    /// protocol size limit is enforced by the receiving side.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        let len = Self::header_len(self.payload.len())?;
        let mut buf = BytesMut::with_capacity(FRAME_HEADER_SIZE + self.payload.len());
        buf.put_u32(len);
        buf.put_slice(&self.payload);
        Ok(buf)
    }

    fn header_len(len: usize) -> Result<u32, ProtocolError> {
        u32::try_from(len).map_err(|_| ProtocolError::PayloadOverflow { len })
    }

    /// Validates a payload length read from a frame header.
    pub(crate) fn check_len(len: u32) -> Result<usize, ProtocolError> {
        if len == 0 {
            return Err(ProtocolError::EmptyMessage);
        }
        if len > MAX_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: len,
                max: MAX_MESSAGE_SIZE,
            });
        }
        Ok(len as usize)
    }

    /// Decodes a frame from bytes.
    ///
    /// Returns `Ok(Some(frame))` if a complete frame was decoded,
    /// `Ok(None)` if more data is needed, or `Err` on protocol errors.
    pub fn decode(buf: &mut BytesMut) -> Result<Option<Self>, ProtocolError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }

        let len = Self::check_len(u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]))?;
        if buf.len() < FRAME_HEADER_SIZE + len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let payload = buf.split_to(len).freeze();
        if std::str::from_utf8(&payload).is_err() {
            return Err(ProtocolError::InvalidUtf8);
        }

        Ok(Some(Self { payload }))
    }
}
