//! User store contract and backends.
//!
//! The HTTP pipelines only see [`UserStore`], a small async lookup/insert
//! collaborator. Backends are picked at startup from the DSN scheme:
//!
//! - `memory://` keeps records in process (local runs and tests).
//! - `postgres://` / `postgresql://` uses the `users` table from `sql/schema.sql`.
//!
//! Uniqueness of `username` is enforced by the backend itself, so a concurrent
//! registration that slips past the pipeline's pre-insert lookup surfaces as
//! [`StoreError::Conflict`] instead of a second record.

pub mod memory;
pub mod postgres;
pub mod timeout;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use timeout::TimeoutStore;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc, time::Duration};
use uuid::Uuid;

/// Store handle shared by every request handler.
pub type SharedStore = Arc<dyn UserStore>;

/// Opaque identifier assigned by the store when a record is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted user record. Never mutated after creation.
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password: SecretString,
}

/// Insert payload; the id is always chosen by the store.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub username: String,
    pub password: SecretString,
}

/// Exact-match lookup filter.
#[derive(Clone, Debug)]
pub struct UserFilter {
    username: String,
    password: Option<SecretString>,
}

impl UserFilter {
    /// Match any record with this username.
    #[must_use]
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
        }
    }

    /// Additionally require the stored password to be equal.
    #[must_use]
    pub fn with_password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    #[must_use]
    pub fn username_value(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn password_value(&self) -> Option<&SecretString> {
        self.password.as_ref()
    }

    /// True when `user` satisfies every constraint of the filter.
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        user.username == self.username
            && self
                .password
                .as_ref()
                .map_or(true, |p| p.expose_secret() == user.password.expose_secret())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("username already exists: {username}")]
    Conflict { username: String },
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Async collaborator consumed by the authentication and registration pipelines.
#[async_trait]
pub trait UserStore: Send + Sync + fmt::Debug {
    /// Return the first record matching `filter`, if any.
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError>;

    /// Create a record and return it with its assigned id.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] when the username is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;

    /// Delete every record matching `filter`, returning how many were removed.
    async fn remove(&self, filter: &UserFilter) -> Result<u64, StoreError>;

    /// Cheap liveness probe used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Backend name, for logs and health output.
    fn backend(&self) -> &'static str;
}
