//! Per-connection session state.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// A value stored in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for SessionValue {
    fn from(value: &str) -> Self {
        SessionValue::Str(value.to_string())
    }
}

impl From<String> for SessionValue {
    fn from(value: String) -> Self {
        SessionValue::Str(value)
    }
}

impl From<i64> for SessionValue {
    fn from(value: i64) -> Self {
        SessionValue::Int(value)
    }
}

impl From<bool> for SessionValue {
    fn from(value: bool) -> Self {
        SessionValue::Bool(value)
    }
}

/// State of one client connection. Each connection owns its session; no
/// session is shared between connections.
#[derive(Debug)]
pub struct Session {
    /// Unique session ID.
    pub id: String,

    /// Remote address.
    pub remote_addr: SocketAddr,

    values: HashMap<String, SessionValue>,
    request_count: u64,
    created_at: Instant,
}

impl Session {
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            remote_addr,
            values: HashMap::new(),
            request_count: 0,
            created_at: Instant::now(),
        }
    }

    /// Stores a value, replacing any previous value under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<SessionValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SessionValue> {
        self.values.get(key)
    }

    /// Returns the string stored under `key`, if it is a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(SessionValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer stored under `key`, if it is an integer.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.values.get(key) {
            Some(SessionValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    /// Returns the flag stored under `key`, if it is a flag.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(SessionValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<SessionValue> {
        self.values.remove(key)
    }

    pub(crate) fn record_request(&mut self) {
        self.request_count += 1;
    }

    /// Returns the number of queries received on this connection.
    pub fn request_count(&self) -> u64 {
        self.request_count
    }

    /// Returns the session age.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
