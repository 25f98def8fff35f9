//! Mock user table.
//!
//! Passwords are kept as SHA-256 hashes so configuration files never carry
//! plaintext credentials.

use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Users accepted by a mock server, keyed by user name.
#[derive(Debug, Default)]
pub struct UserStore {
    /// user -> SHA-256 hex hash of the password.
    users: DashMap<String, String>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user or replaces the password of an existing one.
    pub fn add_user(&self, user: &str, password: &str) {
        self.add_user_hash(user, &Self::hash_password(password));
    }

    /// Adds a user with a pre-computed password hash.
    pub fn add_user_hash(&self, user: &str, password_hash: &str) {
        self.users
            .insert(user.to_string(), password_hash.to_lowercase());
    }

    /// Removes a user. Returns whether the user existed.
    pub fn remove_user(&self, user: &str) -> bool {
        self.users.remove(user).is_some()
    }

    /// Checks a user/password pair.
    pub fn validate(&self, user: &str, password: &str) -> bool {
        match self.users.get(user) {
            Some(hash) => *hash == Self::hash_password(password),
            None => false,
        }
    }

    pub fn contains(&self, user: &str) -> bool {
        self.users.contains_key(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Hashes a password for storage.
    pub fn hash_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }
}
