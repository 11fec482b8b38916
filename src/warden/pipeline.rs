//! Authentication and registration against the user store.
//!
//! Both pipelines take already-validated [`Credentials`]; every store failure
//! is caught here and turned into a typed error so handlers never see a raw
//! [`StoreError`] escape.

use crate::store::{NewUser, StoreError, User, UserFilter, UserStore};
use crate::warden::validate::Credentials;
use tracing::{debug, error, instrument, warn};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no user matches the submitted credentials")]
    CredentialMismatch,
    #[error("credential lookup failed: {0}")]
    Store(#[source] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error("uniqueness check failed: {0}")]
    Lookup(#[source] StoreError),
    #[error("user insert failed: {0}")]
    Insert(#[source] StoreError),
}

/// Match username and password exactly against the store.
///
/// # Errors
/// [`AuthError::CredentialMismatch`] when no record matches,
/// [`AuthError::Store`] when the lookup itself fails.
#[instrument(skip(store, credentials), fields(username = %credentials.username, store = store.backend()))]
pub async fn authenticate(store: &dyn UserStore, credentials: &Credentials) -> Result<User, AuthError> {
    let filter =
        UserFilter::username(&credentials.username).with_password(credentials.password.clone());

    match store.find_one(&filter).await {
        Ok(Some(user)) => {
            debug!("authenticated user {}", user.id);
            Ok(user)
        }
        Ok(None) => {
            debug!("credential mismatch");
            Err(AuthError::CredentialMismatch)
        }
        Err(e) => {
            // Reported to the client as a mismatch
            error!("Error looking up credentials: {:?}", e);
            Err(AuthError::Store(e))
        }
    }
}

/// Create a user after checking the username is free.
///
/// The lookup and the insert are two independent store calls; a registration
/// racing past the lookup is stopped by the store's unique constraint and
/// reported as [`RegisterError::DuplicateUsername`].
///
/// # Errors
/// See [`RegisterError`] for the mapping of each failing step.
#[instrument(skip(store, credentials), fields(username = %credentials.username, store = store.backend()))]
pub async fn register(store: &dyn UserStore, credentials: Credentials) -> Result<User, RegisterError> {
    match store.find_one(&UserFilter::username(&credentials.username)).await {
        Ok(Some(_)) => {
            debug!("username already exists");
            return Err(RegisterError::DuplicateUsername);
        }
        Ok(None) => (),
        Err(e) => {
            error!("Error checking if user exists: {:?}", e);
            return Err(RegisterError::Lookup(e));
        }
    }

    let new_user = NewUser {
        username: credentials.username,
        password: credentials.password,
    };

    match store.insert(new_user).await {
        Ok(user) => {
            debug!("created user {}", user.id);
            Ok(user)
        }
        Err(StoreError::Conflict { username }) => {
            warn!("username {} taken between check and insert", username);
            Err(RegisterError::DuplicateUsername)
        }
        Err(e) => {
            error!("Error inserting user: {:?}", e);
            Err(RegisterError::Insert(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryUserStore, UserId};
    use anyhow::Result;
    use async_trait::async_trait;
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    /// Store whose calls fail according to its configuration.
    #[derive(Debug, Default)]
    struct FaultyStore {
        fail_find: bool,
        conflict_on_insert: bool,
        inserts: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for FaultyStore {
        async fn find_one(&self, _filter: &UserFilter) -> Result<Option<User>, StoreError> {
            if self.fail_find {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(None)
        }

        async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            if self.conflict_on_insert {
                return Err(StoreError::Conflict {
                    username: user.username,
                });
            }
            Err(StoreError::Unavailable("disk full".to_string()))
        }

        async fn remove(&self, _filter: &UserFilter) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }

        fn backend(&self) -> &'static str {
            "faulty"
        }
    }

    #[tokio::test]
    async fn authenticate_matches_exact_credentials() -> Result<()> {
        let store = MemoryUserStore::new();
        let created = register(&store, credentials("test", "jhkwdhfkh")).await?;

        let user = authenticate(&store, &credentials("test", "jhkwdhfkh")).await?;
        assert_eq!(user.id, created.id);
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_rejects_wrong_password_and_unknown_user() -> Result<()> {
        let store = MemoryUserStore::new();
        register(&store, credentials("test", "jhkwdhfkh")).await?;

        let wrong = authenticate(&store, &credentials("test", "jhkwdhfkhs")).await;
        assert!(matches!(wrong, Err(AuthError::CredentialMismatch)));

        let unknown = authenticate(&store, &credentials("nobody@test.com", "jhkwdhfkh")).await;
        assert!(matches!(unknown, Err(AuthError::CredentialMismatch)));
        Ok(())
    }

    #[tokio::test]
    async fn authenticate_repeats_the_same_failure() {
        let store = MemoryUserStore::new();
        for _ in 0..3 {
            let result = authenticate(&store, &credentials("test", "wrong")).await;
            assert!(matches!(result, Err(AuthError::CredentialMismatch)));
        }
    }

    #[tokio::test]
    async fn authenticate_store_error_is_distinct_internally() {
        let store = FaultyStore {
            fail_find: true,
            ..FaultyStore::default()
        };
        let result = authenticate(&store, &credentials("test", "jhkwdhfkh")).await;
        assert!(matches!(
            result,
            Err(AuthError::Store(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn register_twice_is_a_duplicate() -> Result<()> {
        let store = MemoryUserStore::new();
        let first = register(&store, credentials("bob", "test123")).await?;
        assert_ne!(first.id, UserId::from(uuid::Uuid::nil()));

        let second = register(&store, credentials("bob", "test123")).await;
        assert!(matches!(second, Err(RegisterError::DuplicateUsername)));
        assert_eq!(store.len().await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn register_lookup_failure_skips_insert() {
        let store = FaultyStore {
            fail_find: true,
            ..FaultyStore::default()
        };
        let result = register(&store, credentials("bob", "test123")).await;
        assert!(matches!(result, Err(RegisterError::Lookup(_))));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn register_insert_failure_is_reported() {
        let store = FaultyStore::default();
        let result = register(&store, credentials("bob", "test123")).await;
        assert!(matches!(
            result,
            Err(RegisterError::Insert(StoreError::Unavailable(_)))
        ));
        assert_eq!(store.inserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn register_lost_race_is_a_duplicate() {
        let store = FaultyStore {
            conflict_on_insert: true,
            ..FaultyStore::default()
        };
        let result = register(&store, credentials("bob", "test123")).await;
        assert!(matches!(result, Err(RegisterError::DuplicateUsername)));
    }
}
