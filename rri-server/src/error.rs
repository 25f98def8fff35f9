//! Server error types.

use thiserror::Error;

/// Server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] rri_protocol::ProtocolError),

    /// Returned by a handler to end the connection without reporting a failure.
    #[error("close connection")]
    CloseConnection,

    #[error("no RRI query handler defined")]
    NoHandler,

    #[error("handler error: {0}")]
    Handler(String),

    #[error("server already running")]
    AlreadyRunning,

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),
}

impl ServerError {
    /// Returns whether the connection ended normally.
    pub fn is_graceful(&self) -> bool {
        match self {
            ServerError::CloseConnection => true,
            ServerError::Protocol(e) => e.is_end_of_stream(),
            _ => false,
        }
    }
}
