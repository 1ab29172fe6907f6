use anyhow::Result;
use async_trait::async_trait;

use crate::models::StoredAccount;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Initialize the store (load the backing file, create it if absent)
    async fn init(&self) -> Result<()>;

    /// List all stored accounts
    async fn list(&self) -> Result<Vec<StoredAccount>>;

    /// Get one account by id
    async fn get(&self, account_id: &str) -> Result<Option<StoredAccount>>;

    /// Insert or replace an account credential
    async fn upsert(&self, account: StoredAccount) -> Result<StoredAccount>;

    /// Remove an account; Ok(false) when it was not present
    async fn remove(&self, account_id: &str) -> Result<bool>;

    /// Resolve an account id to its access token.
    /// A missing token is a caller-visible 401-class condition, not an error.
    async fn resolve_token(&self, account_id: &str) -> Result<Option<String>> {
        Ok(self.get(account_id).await?.map(|a| a.access_token))
    }
}
