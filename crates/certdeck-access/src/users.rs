//! Live user lookup.
//!
//! Sessions keep only a user id; every resolve reads the current account
//! from a [`UserDirectory`] so deactivation takes effect immediately.

use async_trait::async_trait;
use certdeck_core::User;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::{AccessError, Result};

/// Source of truth for user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The current state of a user, or `None` if the account is gone.
    async fn get(&self, id: Uuid) -> Option<User>;
}

/// Process-local [`UserDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account.
    pub async fn upsert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Activate or deactivate an account.
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(AccessError::UserNotFound(id))?;
        user.active = active;
        info!(user = %id, active, "user activation changed");
        Ok(())
    }

    /// Delete an account. Returns false if it was unknown.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.users.write().await.remove(&id).is_some()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_active() {
        let directory = InMemoryUserDirectory::new();
        let user = User::new("ada", "admin");
        directory.upsert(user.clone()).await;

        directory.set_active(user.id, false).await.unwrap();
        assert!(!directory.get(user.id).await.unwrap().active);

        assert!(matches!(
            directory.set_active(Uuid::new_v4(), true).await,
            Err(AccessError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let directory = InMemoryUserDirectory::new();
        let user = User::new("ada", "admin");
        directory.upsert(user.clone()).await;

        assert!(directory.remove(user.id).await);
        assert!(!directory.remove(user.id).await);
        assert!(directory.get(user.id).await.is_none());
    }
}
