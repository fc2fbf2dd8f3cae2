//! Credential records and their store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Error, Result};

/// Username and password hash. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
}

/// Storage for credential records.
///
/// Implementations must make `insert` an atomic check-then-insert so two
/// concurrent registrations of the same username can't both succeed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact, case-sensitive lookup
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>>;

    /// Insert a new record, or fail with [`Error::Conflict`] if the username is taken
    async fn insert(&self, record: CredentialRecord) -> Result<()>;
}

/// Volatile, process-local credential store
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, record: CredentialRecord) -> Result<()> {
        let mut users = self.users.write().await;
        if users.contains_key(&record.username) {
            return Err(Error::Conflict("User already exists".to_string()));
        }
        users.insert(record.username.clone(), record);
        Ok(())
    }
}
