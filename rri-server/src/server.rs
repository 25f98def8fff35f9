//! TLS server implementation.

use crate::error::ServerError;
use crate::handler::QueryHandler;
use crate::session::Session;
use crate::stream::ConnStream;
use rri_protocol::{censor_raw_message, parse_query, read_message, write_message};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_rustls::TlsAcceptor;

type HandlerSlot = Arc<RwLock<Option<Arc<dyn QueryHandler>>>>;

/// Server statistics.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections_total: AtomicU64,
    pub connections_active: AtomicU64,
    pub queries_total: AtomicU64,
    pub errors_total: AtomicU64,
}

/// RRI server: accepts connections and answers every query through one
/// [`QueryHandler`].
pub struct Server {
    listener: Mutex<Option<TcpListener>>,
    local_addr: SocketAddr,
    tls_acceptor: Option<TlsAcceptor>,
    handler: HandlerSlot,
    stats: Arc<ServerStats>,
    shutdown: broadcast::Sender<()>,
    closed: AtomicBool,
}

impl Server {
    /// Binds the listening socket. Connections are accepted once [`run`](Self::run)
    /// is called.
    pub async fn bind(addr: &str, tls_acceptor: Option<TlsAcceptor>) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown, _) = broadcast::channel(1);

        Ok(Self {
            listener: Mutex::new(Some(listener)),
            local_addr,
            tls_acceptor,
            handler: Arc::new(RwLock::new(None)),
            stats: Arc::new(ServerStats::default()),
            shutdown,
            closed: AtomicBool::new(false),
        })
    }

    /// Sets the query handler. Takes effect for the next query on every
    /// connection.
    pub fn set_handler<H>(&self, handler: H)
    where
        H: QueryHandler + 'static,
    {
        *self
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Returns the bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Returns the server statistics.
    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    /// Accepts connections until [`close`](Self::close) is called.
    ///
    /// Every connection is served by its own task with its own [`Session`].
    /// A failing connection never affects the others.
    pub async fn run(&self) -> Result<(), ServerError> {
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ServerError::AlreadyRunning)?;

        let mut shutdown_rx = self.shutdown.subscribe();
        if self.closed.load(Ordering::SeqCst) {
            return Ok(());
        }

        let tls_mode = if self.tls_acceptor.is_some() {
            "TLS"
        } else {
            "plain"
        };
        tracing::info!("Server listening on {} ({})", self.local_addr, tls_mode);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((tcp_stream, addr)) => self.spawn_connection(tcp_stream, addr),
                        Err(e) => {
                            if self.closed.load(Ordering::SeqCst) {
                                break;
                            }
                            tracing::error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Stops accepting new connections. Open connections are served until
    /// their clients disconnect.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.shutdown.send(());
        }
    }

    /// Returns whether [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn spawn_connection(&self, tcp_stream: TcpStream, addr: SocketAddr) {
        self.stats.connections_total.fetch_add(1, Ordering::Relaxed);
        self.stats.connections_active.fetch_add(1, Ordering::Relaxed);

        let tls_acceptor = self.tls_acceptor.clone();
        let handler = self.handler.clone();
        let stats = self.stats.clone();

        tokio::spawn(async move {
            let stream = match Self::maybe_tls_accept(tcp_stream, tls_acceptor.as_ref(), addr).await
            {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("[{}] TLS handshake failed: {}", addr, e);
                    stats.errors_total.fetch_add(1, Ordering::Relaxed);
                    stats.connections_active.fetch_sub(1, Ordering::Relaxed);
                    return;
                }
            };

            if let Err(e) = Self::handle_connection(stream, addr, handler, &stats).await {
                tracing::warn!("[{}] Connection error: {}", addr, e);
                stats.errors_total.fetch_add(1, Ordering::Relaxed);
            }

            stats.connections_active.fetch_sub(1, Ordering::Relaxed);
            tracing::info!("Client disconnected: {}", addr);
        });
    }

    async fn maybe_tls_accept(
        tcp_stream: TcpStream,
        acceptor: Option<&TlsAcceptor>,
        addr: SocketAddr,
    ) -> Result<ConnStream, ServerError> {
        match acceptor {
            Some(acceptor) => {
                tracing::debug!("[{}] Performing TLS handshake", addr);
                let tls = acceptor
                    .accept(tcp_stream)
                    .await
                    .map_err(|e| ServerError::TlsHandshake(e.to_string()))?;
                Ok(ConnStream::Tls { tls })
            }
            None => Ok(ConnStream::Plain { tcp: tcp_stream }),
        }
    }

    /// Serves one connection: read a query, hand it to the handler, write
    /// the response, repeat.
    async fn handle_connection(
        mut stream: ConnStream,
        addr: SocketAddr,
        handler: HandlerSlot,
        stats: &ServerStats,
    ) -> Result<(), ServerError> {
        tracing::info!("Client connected: {} ({})", addr, stream.describe());
        let mut session = Session::new(addr);

        let result = Self::serve(&mut stream, &mut session, &handler, stats).await;
        let _ = stream.shutdown().await;

        match result {
            Err(e) if e.is_graceful() => {
                tracing::debug!(
                    "[{}] Session {} closed after {} queries",
                    addr,
                    session.id,
                    session.request_count()
                );
                Ok(())
            }
            other => other,
        }
    }

    async fn serve(
        stream: &mut ConnStream,
        session: &mut Session,
        handler: &HandlerSlot,
        stats: &ServerStats,
    ) -> Result<(), ServerError> {
        loop {
            let msg = read_message(stream).await?;
            session.record_request();
            stats.queries_total.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("[{}] <- {}", session.remote_addr, censor_raw_message(&msg));

            let query = parse_query(&msg)?;
            let handler = handler
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
                .ok_or(ServerError::NoHandler)?;

            let response = handler.handle(session, &query)?;
            let encoded = response.encode_kv();
            tracing::debug!("[{}] -> {}", session.remote_addr, encoded);
            write_message(stream, &encoded).await?;
        }
    }
}
