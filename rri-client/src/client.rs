//! Stateful RRI client.

use crate::connection::{host_of, with_default_port, ClientConfig, Transport};
use crate::error::ClientError;
use crate::tls::{create_tls_config, server_name};
use rri_protocol::{
    censor_raw_message, parse_response, read_message, write_message, Action, DenicHandle, Query,
    QueryFieldName, Response,
};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Direction of a raw message relative to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
}

/// Receives every raw message written or read, retries included.
pub type RawTrafficHook = Arc<dyn Fn(&str, Direction) + Send + Sync>;

/// Receives the failure that triggered an automatic reconnect.
pub type InnerErrorHook = Arc<dyn Fn(&ClientError) + Send + Sync>;

/// Rewrites a query directly before it is sent. Returning `None` aborts the
/// query without contacting the server.
pub type QueryProcessor = Arc<dyn Fn(Query) -> Option<Query> + Send + Sync>;

#[derive(Clone)]
struct Credentials {
    user: String,
    password: String,
}

/// A stateful connection to one RRI server.
///
/// The client holds at most one connection and one authenticated session.
/// Calls must be serialized by the caller; every operation takes `&mut self`.
pub struct Client {
    address: String,
    config: ClientConfig,
    tls: Arc<rustls::ClientConfig>,
    server_name: ServerName<'static>,
    connection: Option<Box<dyn Transport>>,
    current_user: Option<String>,
    last_credentials: Option<Credentials>,
    raw_traffic_hook: Option<RawTrafficHook>,
    inner_error_hook: Option<InnerErrorHook>,
    processor: Option<QueryProcessor>,
    xml_mode: bool,
}

impl Client {
    /// Creates a client and dials the server.
    ///
    /// The default port is appended when `address` has none.
    pub async fn new(address: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let address = with_default_port(address);
        let tls = create_tls_config(&config)?;
        let server_name = server_name(&config, host_of(&address))?;

        let mut client = Self {
            address,
            config,
            tls,
            server_name,
            connection: None,
            current_user: None,
            last_credentials: None,
            raw_traffic_hook: None,
            inner_error_hook: None,
            processor: None,
            xml_mode: false,
        };
        client.connect().await?;
        Ok(client)
    }

    /// Dials the server unless a connection already exists.
    ///
    /// A fresh connection carries no session.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if self.connection.is_some() {
            return Ok(());
        }

        let conn = self
            .config
            .dialer
            .dial(&self.address, self.server_name.clone(), self.tls.clone())
            .await?;
        tracing::info!("Connected to RRI server {}", self.address);
        self.connection = Some(conn);
        self.current_user = None;
        Ok(())
    }

    /// Returns the server address including the port.
    pub fn remote_address(&self) -> &str {
        &self.address
    }

    /// Returns whether a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns whether the current connection carries an authenticated session.
    pub fn is_logged_in(&self) -> bool {
        self.current_user.is_some()
    }

    /// Returns the authenticated user.
    pub fn current_user(&self) -> Option<&str> {
        self.current_user.as_deref()
    }

    /// Returns the registrar account id encoded in the user name, or 0 when
    /// nobody is logged in.
    pub fn current_reg_acc_id(&self) -> Result<u64, ClientError> {
        let handle: DenicHandle = self.current_user.as_deref().unwrap_or("").parse()?;
        Ok(handle.reg_acc_id())
    }

    pub fn set_raw_traffic_hook<F>(&mut self, hook: F)
    where
        F: Fn(&str, Direction) + Send + Sync + 'static,
    {
        self.raw_traffic_hook = Some(Arc::new(hook));
    }

    pub fn set_inner_error_hook<F>(&mut self, hook: F)
    where
        F: Fn(&ClientError) + Send + Sync + 'static,
    {
        self.inner_error_hook = Some(Arc::new(hook));
    }

    pub fn set_query_processor<F>(&mut self, processor: F)
    where
        F: Fn(Query) -> Option<Query> + Send + Sync + 'static,
    {
        self.processor = Some(Arc::new(processor));
    }

    /// Switches between key/value and XML encoding.
    pub fn set_xml(&mut self, enabled: bool) {
        self.xml_mode = enabled;
    }

    pub fn is_xml(&self) -> bool {
        self.xml_mode
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Logs in and caches the credentials for session restoration.
    pub async fn login(&mut self, user: &str, password: &str) -> Result<(), ClientError> {
        match self.send_query(Query::login(user, password)).await? {
            Some(response) if response.is_successful() => Ok(()),
            Some(response) => Err(ClientError::LoginFailed(failure_reason(&response))),
            None => Err(ClientError::LoginFailed("query aborted".to_string())),
        }
    }

    /// Logs out and drops the connection.
    ///
    /// The session state is cleared whatever the outcome. A server closing
    /// the connection in reply to LOGOUT counts as success.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.send_query(Query::logout()).await?;
        Ok(())
    }

    /// Closes the connection and forgets the session.
    pub async fn close(&mut self) -> Result<(), ClientError> {
        self.current_user = None;
        self.last_credentials = None;
        if let Some(mut conn) = self.connection.take() {
            tracing::debug!("Closing connection to {}", self.address);
            conn.shutdown().await?;
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Sends a query and returns the parsed response.
    ///
    /// Only technical failures are errors; a failure result from the server
    /// is returned as a response. `Ok(None)` means the query processor
    /// aborted the query, or the server closed the connection after LOGOUT.
    pub async fn send_query(&mut self, query: Query) -> Result<Option<Response>, ClientError> {
        if self.xml_mode {
            return Err(ClientError::Unsupported("XML mode"));
        }

        let query = match &self.processor {
            Some(processor) => match processor(query) {
                Some(query) => query,
                None => return Ok(None),
            },
            None => query,
        };

        let action = query.action();
        if !self.is_logged_in() && action != Action::Login {
            return Err(ClientError::NotAuthenticated { action });
        }
        if self.is_logged_in() && action == Action::Login {
            return Err(ClientError::AlreadyLoggedIn);
        }

        tracing::debug!("Sending {}", query);
        let message = query.encode_kv();

        if action == Action::Logout {
            return self.send_logout(&message).await;
        }

        let raw = self.send_raw(&message).await?;
        let response = parse_response(&raw).map_err(ClientError::MalformedResponse)?;

        if action == Action::Login && response.is_successful() {
            let user = query.first_field(QueryFieldName::User).to_string();
            let password = query.first_field(QueryFieldName::Password).to_string();
            tracing::info!("Logged in as {}", user);
            self.current_user = Some(user.clone());
            self.last_credentials = Some(Credentials { user, password });
        }

        Ok(Some(response))
    }

    /// Sends a raw message and returns the raw response.
    ///
    /// The session state is not updated. A failed exchange is retried once on
    /// a fresh connection, after restoring the last session, unless
    /// `no_auto_retry` is set.
    pub async fn send_raw(&mut self, message: &str) -> Result<String, ClientError> {
        self.connect().await?;

        let err = match self.exchange(message).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };
        self.disconnect();

        if self.config.no_auto_retry || !err.is_retryable() {
            return Err(err);
        }

        tracing::warn!("Lost connection to {}, reconnecting: {}", self.address, err);
        if let Some(hook) = &self.inner_error_hook {
            hook(&err);
        }

        self.connect().await?;
        self.restore_session().await?;

        match self.exchange(message).await {
            Ok(response) => Ok(response),
            Err(err) => {
                self.disconnect();
                Err(err)
            }
        }
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    async fn send_logout(&mut self, message: &str) -> Result<Option<Response>, ClientError> {
        let result = match self.connect().await {
            Ok(()) => self.exchange(message).await,
            Err(err) => Err(err),
        };

        // the server ends the session and the connection on LOGOUT
        self.connection = None;
        self.current_user = None;
        self.last_credentials = None;
        tracing::info!("Logged out from {}", self.address);

        match result {
            Ok(raw) => parse_response(&raw)
                .map(Some)
                .map_err(ClientError::MalformedResponse),
            Err(err) if err.is_connection_closed() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn restore_session(&mut self) -> Result<(), ClientError> {
        let Some(credentials) = self.last_credentials.clone() else {
            return Ok(());
        };

        let login = Query::login(&credentials.user, &credentials.password).encode_kv();
        let raw = match self.exchange(&login).await {
            Ok(raw) => raw,
            Err(err) => {
                self.disconnect();
                return Err(err);
            }
        };
        let response = parse_response(&raw).map_err(ClientError::MalformedResponse)?;
        if !response.is_successful() {
            self.last_credentials = None;
            return Err(ClientError::LoginFailed(format!(
                "failed to restore session: {}",
                failure_reason(&response)
            )));
        }

        tracing::info!("Restored session for {}", credentials.user);
        self.current_user = Some(credentials.user);
        Ok(())
    }

    async fn exchange(&mut self, message: &str) -> Result<String, ClientError> {
        self.notify_raw(message, Direction::Outgoing);
        tracing::debug!("-> {}", censor_raw_message(message));

        let conn = self.connection.as_mut().ok_or(ClientError::NotConnected)?;
        write_message(conn, message).await?;
        let response = read_message(conn).await.map_err(|err| {
            if err.is_end_of_stream() {
                ClientError::ConnectionClosed
            } else {
                ClientError::from(err)
            }
        })?;

        self.notify_raw(&response, Direction::Incoming);
        tracing::debug!("<- {}", response);
        Ok(response)
    }

    fn notify_raw(&self, message: &str, direction: Direction) {
        if let Some(hook) = &self.raw_traffic_hook {
            hook(message, direction);
        }
    }

    fn disconnect(&mut self) {
        self.connection = None;
        self.current_user = None;
    }
}

fn failure_reason(response: &Response) -> String {
    let errors = response.error_messages();
    if errors.is_empty() {
        return format!("result {}", response.result());
    }
    errors
        .iter()
        .map(|msg| msg.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
