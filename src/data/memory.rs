//! In-memory credential store
//!
//! Volatile: cleared on restart. Useful for local runs and tests.

use axum::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::models::User;
use super::store::CredentialStore;
use crate::error::AppError;

/// Username -> User map behind a read/write lock
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        use std::collections::hash_map::Entry;

        // Check and insert under one write guard
        let mut users = self.users.write().await;
        match users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AppError::DuplicateUser),
            Entry::Vacant(slot) => {
                let user = User::new(username, password_hash);
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.users.read().await.len() as i64)
    }
}
