//! Mock RRI server with user authentication, for tests.
//!
//! DO NOT USE IN PRODUCTION! The server presents a throwaway self-signed
//! certificate.

use crate::auth::UserStore;
use crate::error::ServerError;
use crate::handler::QueryHandler;
use crate::server::{Server, ServerStats};
use crate::session::Session;
use crate::tls::mock_tls_acceptor;
use rri_protocol::{
    Action, BusinessMessage, Query, QueryFieldName, Response, ResponseFieldList,
    ResponseFieldName, ResultCode,
};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Session key holding the authenticated user.
pub const SESSION_USER: &str = "user";

/// Business message id returned for rejected logins and unauthenticated queries.
pub const LOGIN_REQUIRED_ID: i64 = 83000000010;

/// Answers every query except LOGIN and LOGOUT on behalf of an
/// authenticated user.
pub trait MockQueryHandler: Send + Sync {
    fn handle(
        &self,
        user: &str,
        session: &mut Session,
        query: &Query,
    ) -> Result<Response, ServerError>;
}

impl<F> MockQueryHandler for F
where
    F: Fn(&str, &mut Session, &Query) -> Result<Response, ServerError> + Send + Sync,
{
    fn handle(
        &self,
        user: &str,
        session: &mut Session,
        query: &Query,
    ) -> Result<Response, ServerError> {
        self(user, session, query)
    }
}

type MockHandlerSlot = Arc<RwLock<Option<Arc<dyn MockQueryHandler>>>>;

/// Authentication front of the mock server.
struct MockDispatcher {
    users: Arc<UserStore>,
    handler: MockHandlerSlot,
}

impl MockDispatcher {
    fn login(&self, session: &mut Session, query: &Query) -> Response {
        let user = query.first_field(QueryFieldName::User);
        let password = query.first_field(QueryFieldName::Password);
        if self.users.validate(user, password) {
            tracing::debug!("[{}] Login accepted for {}", session.remote_addr, user);
            session.set(SESSION_USER, user);
            Response::success()
        } else {
            tracing::debug!("[{}] Login rejected for {:?}", session.remote_addr, user);
            login_required()
        }
    }
}

impl QueryHandler for MockDispatcher {
    fn handle(&self, session: &mut Session, query: &Query) -> Result<Response, ServerError> {
        let mut response = match query.action() {
            Action::Login => self.login(session, query),
            Action::Logout => return Err(ServerError::CloseConnection),
            _ => {
                let Some(user) = session.get_string(SESSION_USER).map(str::to_string) else {
                    return Ok(with_stid(login_required()));
                };
                let handler = self
                    .handler
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();
                match handler {
                    Some(handler) => handler.handle(&user, session, query)?,
                    None => Response::success(),
                }
            }
        };

        if response.stid().is_empty() {
            response = with_stid(response);
        }
        Ok(response)
    }
}

fn login_required() -> Response {
    Response::new_with_error(
        ResultCode::Failure,
        ResponseFieldList::new(),
        &[BusinessMessage::new(LOGIN_REQUIRED_ID, "Please login first")],
    )
}

fn with_stid(mut response: Response) -> Response {
    response.add_field(ResponseFieldName::Stid, Uuid::new_v4().to_string());
    response
}

/// A TLS RRI server that authenticates LOGIN against an in-memory user table
/// and forwards everything else to a [`MockQueryHandler`].
pub struct MockServer {
    server: Server,
    address: String,
    users: Arc<UserStore>,
    handler: MockHandlerSlot,
}

impl MockServer {
    /// Binds a mock server on the loopback interface. Port 0 picks a free port.
    pub async fn bind(port: u16) -> Result<Self, ServerError> {
        Self::bind_with_users(port, Arc::new(UserStore::new())).await
    }

    /// Binds a mock server that authenticates against an existing user table.
    pub async fn bind_with_users(port: u16, users: Arc<UserStore>) -> Result<Self, ServerError> {
        let acceptor = mock_tls_acceptor()?;
        Self::bind_addr(&format!("127.0.0.1:{}", port), users, acceptor).await
    }

    /// Binds on an explicit address with the given TLS acceptor.
    pub async fn bind_addr(
        addr: &str,
        users: Arc<UserStore>,
        acceptor: tokio_rustls::TlsAcceptor,
    ) -> Result<Self, ServerError> {
        let server = Server::bind(addr, Some(acceptor)).await?;
        let address = format!("localhost:{}", server.local_addr().port());
        let handler: MockHandlerSlot = Arc::new(RwLock::new(None));

        server.set_handler(MockDispatcher {
            users: users.clone(),
            handler: handler.clone(),
        });

        Ok(Self {
            server,
            address,
            users,
            handler,
        })
    }

    /// Runs the underlying server until [`close`](Self::close) is called.
    pub async fn run(&self) -> Result<(), ServerError> {
        self.server.run().await
    }

    /// Stops accepting connections.
    pub fn close(&self) {
        self.server.close();
    }

    /// Adds a user or replaces the password of an existing one.
    pub fn add_user(&self, user: &str, password: &str) {
        self.users.add_user(user, password);
    }

    /// Removes a user from the authentication table.
    pub fn remove_user(&self, user: &str) {
        self.users.remove_user(user);
    }

    /// Sets the handler for queries of authenticated users.
    pub fn set_handler<H>(&self, handler: H)
    where
        H: MockQueryHandler + 'static,
    {
        *self
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    /// Returns the address an RRI client should connect to.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn stats(&self) -> &ServerStats {
        self.server.stats()
    }
}

/// Runs `f` against a mock server on a free port, then closes the server.
///
/// DO NOT USE IN PRODUCTION!
pub async fn with_mock_server<F, Fut, T>(f: F) -> Result<T, ServerError>
where
    F: FnOnce(Arc<MockServer>) -> Fut,
    Fut: Future<Output = T>,
{
    let server = Arc::new(MockServer::bind(0).await?);
    let runner = {
        let server = server.clone();
        tokio::spawn(async move { server.run().await })
    };

    let result = f(server.clone()).await;
    server.close();

    runner
        .await
        .map_err(|e| ServerError::Handler(format!("mock server task failed: {}", e)))??;
    Ok(result)
}
