//! Accepted connection stream, with or without TLS.

use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::server::TlsStream;

pin_project! {
    /// An accepted connection. RRI servers normally speak TLS; plain TCP is
    /// kept for local tooling and tests.
    #[project = ConnStreamProj]
    pub enum ConnStream {
        Plain { #[pin] tcp: TcpStream },
        Tls { #[pin] tls: TlsStream<TcpStream> },
    }
}

impl ConnStream {
    /// Returns a short label for connection logs.
    pub fn describe(&self) -> String {
        match self {
            ConnStream::Plain { .. } => "plain".to_string(),
            ConnStream::Tls { tls } => {
                let (_, conn) = tls.get_ref();
                match conn.protocol_version() {
                    Some(version) => format!("TLS {:?}", version),
                    None => "TLS".to_string(),
                }
            }
        }
    }

    pub fn is_tls(&self) -> bool {
        matches!(self, ConnStream::Tls { .. })
    }
}

impl AsyncRead for ConnStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.project() {
            ConnStreamProj::Plain { tcp } => tcp.poll_read(cx, buf),
            ConnStreamProj::Tls { tls } => tls.poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ConnStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.project() {
            ConnStreamProj::Plain { tcp } => tcp.poll_write(cx, buf),
            ConnStreamProj::Tls { tls } => tls.poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.project() {
            ConnStreamProj::Plain { tcp } => tcp.poll_flush(cx),
            ConnStreamProj::Tls { tls } => tls.poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.project() {
            ConnStreamProj::Plain { tcp } => tcp.poll_shutdown(cx),
            ConnStreamProj::Tls { tls } => tls.poll_shutdown(cx),
        }
    }
}
