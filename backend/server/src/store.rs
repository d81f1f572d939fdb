//! # Store
//!
//! Everything the handlers need from persistence, behind [`UserStore`].
//!
//! - [`crate::database::RedisStore`] in production
//! - [`MemoryStore`] for tests and local runs without Redis
//!
//! The ranking code only ever calls [`UserStore::find_all_accounts`] and
//! [`UserStore::find_account_by_id`], the rest exists for signup/login/stats.
use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use standings::UserAccount;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt account record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Referral code already assigned")]
    DuplicateReferralCode,
}

/// Fields a stats update may overwrite, absent ones stay untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsUpdate {
    pub total_raised: Option<u64>,
    pub referrals: Option<u64>,
}

impl StatsUpdate {
    pub fn is_empty(&self) -> bool {
        self.total_raised.is_none() && self.referrals.is_none()
    }

    /// Overwrites the supplied fields and stamps `updated_at`, an empty update changes nothing.
    pub fn apply(&self, account: &mut UserAccount, now: DateTime<Utc>) {
        if self.is_empty() {
            return;
        }

        account.updated_at = now;

        if let Some(total_raised) = self.total_raised {
            account.total_raised = total_raised;
        }

        if let Some(referrals) = self.referrals {
            account.referrals = referrals;
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn count_accounts(&self) -> Result<usize, StoreError>;

    /// Point-in-time snapshot of every account.
    async fn find_all_accounts(&self) -> Result<Vec<UserAccount>, StoreError>;

    async fn find_account_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, StoreError>;

    /// `email` must already be normalized.
    async fn find_account_by_email(&self, email: &str)
    -> Result<Option<UserAccount>, StoreError>;

    async fn referral_codes(&self) -> Result<HashSet<String>, StoreError>;

    /// Fails with [`StoreError::DuplicateEmail`] or [`StoreError::DuplicateReferralCode`]
    /// without writing anything.
    async fn insert_account(&self, account: &UserAccount) -> Result<(), StoreError>;

    /// `None` when no account has this id. Bumps `updated_at` unless the update is empty.
    async fn update_stats(
        &self,
        id: &Uuid,
        update: StatsUpdate,
    ) -> Result<Option<UserAccount>, StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    accounts: RwLock<HashMap<Uuid, UserAccount>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn count_accounts(&self) -> Result<usize, StoreError> {
        Ok(self.accounts.read().await.len())
    }

    async fn find_all_accounts(&self) -> Result<Vec<UserAccount>, StoreError> {
        Ok(self.accounts.read().await.values().cloned().collect())
    }

    async fn find_account_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.accounts.read().await.get(id).cloned())
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn referral_codes(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .map(|account| account.referral_code.clone())
            .collect())
    }

    async fn insert_account(&self, account: &UserAccount) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }

        if accounts
            .values()
            .any(|a| a.referral_code == account.referral_code)
        {
            return Err(StoreError::DuplicateReferralCode);
        }

        accounts.insert(account.id, account.clone());

        Ok(())
    }

    async fn update_stats(
        &self,
        id: &Uuid,
        update: StatsUpdate,
    ) -> Result<Option<UserAccount>, StoreError> {
        let mut accounts = self.accounts.write().await;

        Ok(accounts.get_mut(id).map(|account| {
            update.apply(account, Utc::now());
            account.clone()
        }))
    }
}
