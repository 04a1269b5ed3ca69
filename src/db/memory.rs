use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::models::User;
use crate::db::store::UserStore;
use crate::error::DatabaseError;

/// Process-local store keyed by user id. Selected with `memory://`.
///
/// Inserting an email that is already present fails with `Duplicate`, the
/// way a unique index would.
#[derive(Debug, Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    pub async fn remove(&self, id: &str) -> Option<User> {
        self.users.write().await.remove(id)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.id) || users.values().any(|u| u.email == user.email) {
            return Err(DatabaseError::Duplicate);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }
}
