//! Connection configuration and dialing.

use crate::error::ClientError;
use futures::future::BoxFuture;
use rri_protocol::DEFAULT_PORT;
use rustls::pki_types::ServerName;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

/// A bidirectional byte stream carrying RRI frames.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Opens transports to an RRI server.
///
/// The default [`TlsDialer`] connects over TCP and performs a TLS handshake.
/// Tests and embedders can supply their own implementation through
/// [`ClientConfig::with_dialer`].
pub trait Dialer: Send + Sync {
    fn dial<'a>(
        &'a self,
        address: &'a str,
        server_name: ServerName<'static>,
        tls: Arc<rustls::ClientConfig>,
    ) -> BoxFuture<'a, Result<Box<dyn Transport>, ClientError>>;
}

/// Dials TCP and wraps the stream in TLS.
#[derive(Debug, Default, Clone, Copy)]
pub struct TlsDialer;

impl Dialer for TlsDialer {
    fn dial<'a>(
        &'a self,
        address: &'a str,
        server_name: ServerName<'static>,
        tls: Arc<rustls::ClientConfig>,
    ) -> BoxFuture<'a, Result<Box<dyn Transport>, ClientError>> {
        Box::pin(async move {
            tracing::debug!("Connecting to {}...", address);

            let tcp_stream = TcpStream::connect(address).await.map_err(|e| {
                tracing::debug!("Connection failed: {}", e);
                ClientError::Dial {
                    address: address.to_string(),
                    reason: e.to_string(),
                }
            })?;
            tcp_stream.set_nodelay(true)?;

            let connector = TlsConnector::from(tls);
            let tls_stream = connector
                .connect(server_name, tcp_stream)
                .await
                .map_err(|e| ClientError::TlsHandshake(e.to_string()))?;

            tracing::debug!("TLS connection established with {}", address);
            Ok(Box::new(tls_stream) as Box<dyn Transport>)
        })
    }
}

/// Lowest TLS protocol version the client will negotiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVersion {
    Tls12,
    #[default]
    Tls13,
}

/// Client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Skip server certificate verification (INSECURE - development only).
    pub insecure: bool,
    /// Minimum TLS version.
    pub min_tls_version: TlsVersion,
    /// Disable the single reconnect-and-resend after a failed exchange.
    pub no_auto_retry: bool,
    /// Path to PEM-encoded CA certificate(s) for server verification.
    /// If None, the webpki roots are used.
    pub ca_cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client certificate (for mTLS).
    pub client_cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client private key (for mTLS).
    pub client_key_path: Option<PathBuf>,
    /// Server name for SNI (defaults to hostname from address).
    pub server_name: Option<String>,
    /// Transport factory.
    pub dialer: Arc<dyn Dialer>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            insecure: false,
            min_tls_version: TlsVersion::default(),
            no_auto_retry: false,
            ca_cert_path: None,
            client_cert_path: None,
            client_key_path: None,
            server_name: None,
            dialer: Arc::new(TlsDialer),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("insecure", &self.insecure)
            .field("min_tls_version", &self.min_tls_version)
            .field("no_auto_retry", &self.no_auto_retry)
            .field("ca_cert_path", &self.ca_cert_path)
            .field("client_cert_path", &self.client_cert_path)
            .field("client_key_path", &self.client_key_path)
            .field("server_name", &self.server_name)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_insecure(mut self) -> Self {
        self.insecure = true;
        self
    }

    pub fn with_min_tls_version(mut self, version: TlsVersion) -> Self {
        self.min_tls_version = version;
        self
    }

    pub fn with_no_auto_retry(mut self) -> Self {
        self.no_auto_retry = true;
        self
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    pub fn with_client_cert(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.client_cert_path = Some(cert_path.into());
        self.client_key_path = Some(key_path.into());
        self
    }

    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    pub fn with_dialer(mut self, dialer: Arc<dyn Dialer>) -> Self {
        self.dialer = dialer;
        self
    }
}

/// Appends the default RRI port to an address without one. Bare IPv6
/// literals are bracketed.
pub fn with_default_port(address: &str) -> String {
    match split_host_port(address) {
        (_, Some(_)) => address.to_string(),
        (host, None) if host.contains(':') && !host.starts_with('[') => {
            format!("[{}]:{}", host, DEFAULT_PORT)
        }
        (host, None) => format!("{}:{}", host, DEFAULT_PORT),
    }
}

/// Returns the host part of an address, without brackets for IPv6 literals.
pub fn host_of(address: &str) -> &str {
    let host = split_host_port(address).0;
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

fn split_host_port(address: &str) -> (&str, Option<&str>) {
    if address.starts_with('[') {
        // [v6]:port
        return match address.rfind("]:") {
            Some(idx) => (&address[..idx + 1], Some(&address[idx + 2..])),
            None => (address, None),
        };
    }
    match address.rsplit_once(':') {
        // a bare IPv6 literal carries more than one colon
        Some((host, port)) if !host.contains(':') => (host, Some(port)),
        _ => (address, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert!(!config.insecure);
        assert_eq!(config.min_tls_version, TlsVersion::Tls13);
        assert!(!config.no_auto_retry);
        assert!(config.ca_cert_path.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new()
            .with_insecure()
            .with_min_tls_version(TlsVersion::Tls12)
            .with_no_auto_retry()
            .with_server_name("rri.denic.de");
        assert!(config.insecure);
        assert_eq!(config.min_tls_version, TlsVersion::Tls12);
        assert!(config.no_auto_retry);
        assert_eq!(config.server_name.as_deref(), Some("rri.denic.de"));
    }

    #[test]
    fn test_default_port() {
        assert_eq!(with_default_port("localhost"), "localhost:51131");
        assert_eq!(with_default_port("localhost:12345"), "localhost:12345");
        assert_eq!(with_default_port("127.0.0.1"), "127.0.0.1:51131");
        assert_eq!(with_default_port("[::1]:700"), "[::1]:700");
        assert_eq!(with_default_port("[::1]"), "[::1]:51131");
        assert_eq!(with_default_port("::1"), "[::1]:51131");
        assert_eq!(with_default_port("2001:db8::7"), "[2001:db8::7]:51131");
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("rri.denic.de:51131"), "rri.denic.de");
        assert_eq!(host_of("localhost"), "localhost");
        assert_eq!(host_of("[::1]:700"), "::1");
        assert_eq!(host_of(&with_default_port("::1")), "::1");
    }
}
