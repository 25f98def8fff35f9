//! Client error types.

use rri_protocol::{Action, ProtocolError};
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("not connected")]
    NotConnected,

    #[error("connection closed")]
    ConnectionClosed,

    #[error("need to log in before sending action {action}")]
    NotAuthenticated { action: Action },

    #[error("already logged in")]
    AlreadyLoggedIn,

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("received malformed response: {0}")]
    MalformedResponse(ProtocolError),

    #[error("{0} not yet supported")]
    Unsupported(&'static str),

    #[error("failed to connect to {address}: {reason}")]
    Dial { address: String, reason: String },

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),
}

impl ClientError {
    /// Returns whether the peer closed the connection.
    pub fn is_connection_closed(&self) -> bool {
        match self {
            ClientError::ConnectionClosed => true,
            ClientError::Io(err) => err.kind() == std::io::ErrorKind::UnexpectedEof,
            ClientError::Protocol(err) => err.is_end_of_stream(),
            _ => false,
        }
    }

    /// Returns whether the failed exchange may succeed on a fresh connection.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Io(_) => true,
            ClientError::ConnectionClosed => true,
            ClientError::NotConnected => true,
            ClientError::Protocol(_) => true,
            _ => false,
        }
    }
}
