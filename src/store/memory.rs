use super::{NewUser, StoreError, User, UserFilter, UserId, UserStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// In-process store keyed by username.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    #[instrument(skip(self))]
    async fn find_one(&self, filter: &UserFilter) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;

        Ok(users
            .get(filter.username_value())
            .filter(|user| filter.matches(user))
            .cloned())
    }

    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(StoreError::Conflict {
                username: user.username,
            });
        }

        let record = User {
            id: UserId::new(),
            username: user.username,
            password: user.password,
        };
        users.insert(record.username.clone(), record.clone());

        debug!("inserted user {}", record.id);

        Ok(record)
    }

    #[instrument(skip(self))]
    async fn remove(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut users = self.users.write().await;

        let matched = users
            .get(filter.username_value())
            .is_some_and(|user| filter.matches(user));
        if matched {
            users.remove(filter.username_value());
            return Ok(1);
        }

        Ok(0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
