//! Query handler abstraction.

use crate::error::ServerError;
use crate::session::Session;
use rri_protocol::{Query, Response};

/// Answers queries received by a [`Server`](crate::Server).
///
/// One handler serves every connection concurrently, so implementations
/// guard any shared state themselves. Returning an error closes the
/// offending connection; [`ServerError::CloseConnection`] closes it without
/// reporting a failure.
pub trait QueryHandler: Send + Sync {
    fn handle(&self, session: &mut Session, query: &Query) -> Result<Response, ServerError>;
}

impl<F> QueryHandler for F
where
    F: Fn(&mut Session, &Query) -> Result<Response, ServerError> + Send + Sync,
{
    fn handle(&self, session: &mut Session, query: &Query) -> Result<Response, ServerError> {
        self(session, query)
    }
}
