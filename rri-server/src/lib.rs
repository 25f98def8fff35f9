//! # rri-server
//!
//! TLS server for the RRI protocol.
//!
//! This crate provides:
//! - TCP/TLS connection handling with async I/O
//! - Length-prefixed framing and query dispatch to a [`QueryHandler`]
//! - Per-connection sessions
//! - A mock registry server with user authentication, for tests
//! - YAML/environment configuration for the `rri-mock` binary

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod mock;
pub mod server;
pub mod session;
pub mod stream;
pub mod tls;

pub use auth::UserStore;
pub use config::{Config, ConfigError, MockConfig, MockUser, NetworkConfig, TlsConfig};
pub use error::ServerError;
pub use handler::QueryHandler;
pub use mock::{with_mock_server, MockQueryHandler, MockServer};
pub use server::{Server, ServerStats};
pub use session::{Session, SessionValue};
