//! # rri-client
//!
//! Client library for RRI registry servers.
//!
//! This crate provides:
//! - A stateful TLS client holding one connection and one session
//! - Login/logout bookkeeping with cached credentials
//! - A single transparent reconnect, session restore and resend after a
//!   failed exchange
//! - Hooks for raw traffic, recovered errors and query rewriting
//! - A pluggable [`Dialer`] for custom transports

pub mod client;
pub mod connection;
pub mod error;
pub mod tls;

pub use client::{Client, Direction, InnerErrorHook, QueryProcessor, RawTrafficHook};
pub use connection::{ClientConfig, Dialer, TlsDialer, TlsVersion, Transport};
pub use error::ClientError;
