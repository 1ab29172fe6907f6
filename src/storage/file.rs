//! Flat-file account store
//!
//! Credentials live in one JSON file keyed by account id. Durability is
//! best-effort: the whole map is rewritten on every mutation, which is fine
//! for the handful of ad accounts a dashboard manages.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::StoredAccount;
use crate::storage::AccountStore;

pub struct FileAccountStore {
    path: PathBuf,
    accounts: RwLock<HashMap<String, StoredAccount>>,
}

impl FileAccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            accounts: RwLock::new(HashMap::new()),
        }
    }

    async fn persist(&self, accounts: &HashMap<String, StoredAccount>) -> Result<()> {
        let json = serde_json::to_string_pretty(accounts)
            .context("failed to serialize account store")?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("failed to write account store to {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for FileAccountStore {
    async fn init(&self) -> Result<()> {
        if !self.path.exists() {
            info!("Account store {} does not exist yet, starting empty", self.path.display());
            return Ok(());
        }

        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read account store {}", self.path.display()))?;
        let loaded: HashMap<String, StoredAccount> = serde_json::from_str(&raw)
            .with_context(|| format!("account store {} is not valid JSON", self.path.display()))?;

        let mut accounts = self.accounts.write().await;
        info!("Loaded {} account(s) from {}", loaded.len(), self.path.display());
        *accounts = loaded;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredAccount>> {
        let accounts = self.accounts.read().await;
        let mut all: Vec<StoredAccount> = accounts.values().cloned().collect();
        all.sort_by(|a, b| a.account_id.cmp(&b.account_id));
        Ok(all)
    }

    async fn get(&self, account_id: &str) -> Result<Option<StoredAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(account_id).cloned())
    }

    async fn upsert(&self, account: StoredAccount) -> Result<StoredAccount> {
        let mut accounts = self.accounts.write().await;
        accounts.insert(account.account_id.clone(), account.clone());
        self.persist(&accounts).await?;
        Ok(account)
    }

    async fn remove(&self, account_id: &str) -> Result<bool> {
        let mut accounts = self.accounts.write().await;
        let removed = accounts.remove(account_id).is_some();
        if removed {
            self.persist(&accounts).await?;
        }
        Ok(removed)
    }
}
