//! Protocol error types.

use thiserror::Error;

/// Errors raised while framing, parsing or building RRI messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: u32, max: u32 },

    #[error("payload of {len} bytes does not fit a frame header")]
    PayloadOverflow { len: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid UTF-8 in payload")]
    InvalidUtf8,

    #[error("malformed key-value pair in line {index}: {line:?}")]
    MalformedLine { index: usize, line: String },

    #[error("{0} key is missing")]
    MissingField(String),

    #[error("multiple {0} values")]
    DuplicateField(String),

    #[error("invalid business message {value:?}: {reason}")]
    InvalidBusinessMessage { value: String, reason: &'static str },

    #[error("invalid handle: {0:?}")]
    InvalidHandle(String),

    #[error("invalid contact type: {0:?}")]
    InvalidContactType(String),

    #[error("invalid {field}: {value:?}")]
    InvalidVerification { field: &'static str, value: String },

    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

impl ProtocolError {
    /// Returns true when the peer closed the stream before a full message arrived.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ProtocolError::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::MessageTooLarge {
            size: 70000,
            max: 65536,
        };
        assert!(err.to_string().contains("70000"));

        let err = ProtocolError::MalformedLine {
            index: 3,
            line: "foo".to_string(),
        };
        assert!(err.to_string().contains("line 3"));

        let err = ProtocolError::MissingField("version".to_string());
        assert_eq!(err.to_string(), "version key is missing");

        let err = ProtocolError::DuplicateField("action".to_string());
        assert_eq!(err.to_string(), "multiple action values");

        let err = ProtocolError::InvalidUtf8;
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_end_of_stream() {
        let eof = std::io::Error::from(std::io::ErrorKind::UnexpectedEof);
        assert!(ProtocolError::Io(eof).is_end_of_stream());

        let reset = std::io::Error::from(std::io::ErrorKind::ConnectionReset);
        assert!(!ProtocolError::Io(reset).is_end_of_stream());
        assert!(!ProtocolError::EmptyMessage.is_end_of_stream());
    }
}
