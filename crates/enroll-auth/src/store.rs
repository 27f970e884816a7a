use super::*;
use enroll_core::ID;
use enroll_core::Unique;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Account persistence. Implementations must reject a second account
/// for the same [`Email`] inside `insert` with [`StoreError::Duplicate`];
/// that check, not `find`, is what keeps identifiers unique.
#[async_trait::async_trait]
pub trait Accounts: Send + Sync {
    async fn find(&self, email: &Email) -> Result<Option<Account>, StoreError>;
    async fn insert(&self, account: &Account, hashword: &str) -> Result<ID<Account>, StoreError>;
}

/// In-process account store keyed by normalized email.
#[derive(Debug, Default)]
pub struct Memory {
    rows: RwLock<HashMap<Email, (Account, String)>>,
}

impl Memory {
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
    /// Stored secret hash for an identifier.
    pub async fn hashword(&self, email: &Email) -> Option<String> {
        self.rows.read().await.get(email).map(|(_, h)| h.clone())
    }
}

#[async_trait::async_trait]
impl Accounts for Memory {
    async fn find(&self, email: &Email) -> Result<Option<Account>, StoreError> {
        Ok(self.rows.read().await.get(email).map(|(a, _)| a.clone()))
    }
    async fn insert(&self, account: &Account, hashword: &str) -> Result<ID<Account>, StoreError> {
        use std::collections::hash_map::Entry;
        match self.rows.write().await.entry(account.email().clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => Ok(slot
                .insert((account.clone(), hashword.to_string()))
                .0
                .id()),
        }
    }
}
