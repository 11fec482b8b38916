use super::{NewUser, StoreError, User, UserFilter, UserStore};
use async_trait::async_trait;
use std::{future::Future, time::Duration};
use tracing::warn;

/// Bounds every call of the wrapped store with a deadline.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    limit: Duration,
}

impl<S: UserStore> TimeoutStore<S> {
    #[must_use]
    pub const fn new(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    store = self.inner.backend(),
                    operation, "store call exceeded {:?}", self.limit
                );
                Err(StoreError::Timeout(self.limit))
            }
        }
    }
}

#[async_trait]
impl<S: UserStore> UserStore for TimeoutStore<S> {
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        self.bounded("find_one", self.inner.find_one(filter)).await
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        self.bounded("insert", self.inner.insert(user)).await
    }

    async fn remove(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        self.bounded("remove", self.inner.remove(filter)).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded("ping", self.inner.ping()).await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}
