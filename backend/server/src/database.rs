//! # Redis
//!
//! RAM database holding every intern account.
//!
//! ## Requirements
//!
//! - Full snapshot of all accounts on every dashboard/leaderboard request
//! - O(1) lookup by id and by email
//! - Email and referral code unique across accounts
//! - Tens of accounts, a few hundred at most
//!
//! ## Implementation
//!
//! - `user:{id}` hash per account, camelCase fields
//! - `users` set of every account id, drives the snapshot
//! - `emails` hash, lowercased email to id
//! - `referral_codes` hash, referral code to id
//! - Signup is one Lua script: both uniqueness checks run before anything is written,
//!   so a rejected signup leaves no claim behind
//! - Every key can sit under a namespace, `{namespace}:users` and so on
//! - [`ConnectionManager`] is cloned per call and reconnects on its own, so nothing global
//!   is shared between requests besides the manager itself
//!
//! ## Snapshot
//!
//! A record that cannot be decoded is logged and left out of the snapshot. One bad
//! hash should cost that account its rank, not break the leaderboard for everyone.
use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{
    AsyncCommands, Client, Script,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use standings::UserAccount;
use tracing::warn;
use uuid::Uuid;

use crate::store::{StatsUpdate, StoreError, UserStore};

pub const USERS_KEY: &str = "users";
pub const EMAILS_KEY: &str = "emails";
pub const REFERRAL_CODES_KEY: &str = "referral_codes";

const NAME: &str = "name";
const EMAIL: &str = "email";
const TOTAL_RAISED: &str = "totalRaised";
const REFERRALS: &str = "referrals";
const REFERRAL_CODE: &str = "referralCode";
const JOIN_DATE: &str = "joinDate";
const UPDATED_AT: &str = "updatedAt";
const PASSWORD_HASH: &str = "passwordHash";

const INSERTED: i64 = 0;
const EMAIL_TAKEN: i64 = 1;
const REFERRAL_CODE_TAKEN: i64 = 2;

// KEYS: emails, referral_codes, user hash, users set
// ARGV: email, referral code, id, then field/value pairs for the user hash
static INSERT_ACCOUNT: LazyLock<Script> = LazyLock::new(|| {
    Script::new(
        r"
        if redis.call('HEXISTS', KEYS[1], ARGV[1]) == 1 then return 1 end
        if redis.call('HEXISTS', KEYS[2], ARGV[2]) == 1 then return 2 end
        redis.call('HSET', KEYS[3], unpack(ARGV, 4))
        redis.call('SADD', KEYS[4], ARGV[3])
        redis.call('HSET', KEYS[1], ARGV[1], ARGV[3])
        redis.call('HSET', KEYS[2], ARGV[2], ARGV[3])
        return 0
        ",
    )
});

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    Ok(connection_manager)
}

pub fn user_key(id: &Uuid) -> String {
    format!("user:{id}")
}

pub struct RedisStore {
    connection: ConnectionManager,
    namespace: String,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self::with_namespace(connection, "")
    }

    pub fn with_namespace(connection: ConnectionManager, namespace: &str) -> Self {
        Self {
            connection,
            namespace: namespace.to_string(),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_redis(redis_url).await?))
    }

    fn key(&self, name: &str) -> String {
        namespaced(&self.namespace, name)
    }

    fn account_key(&self, id: &Uuid) -> String {
        self.key(&user_key(id))
    }
}

fn namespaced(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}:{name}")
    }
}

#[async_trait]
impl UserStore for RedisStore {
    fn backend_tag(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        Ok(())
    }

    async fn count_accounts(&self) -> Result<usize, StoreError> {
        let mut conn = self.connection.clone();

        Ok(conn.scard(self.key(USERS_KEY)).await?)
    }

    async fn find_all_accounts(&self) -> Result<Vec<UserAccount>, StoreError> {
        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.smembers(self.key(USERS_KEY)).await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for id in &ids {
            pipe.hgetall(self.key(&format!("user:{id}")));
        }
        let hashes: Vec<HashMap<String, String>> = pipe.query_async(&mut conn).await?;

        Ok(snapshot_from_records(ids.into_iter().zip(hashes)))
    }

    async fn find_account_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.connection.clone();
        let fields: HashMap<String, String> = conn.hgetall(self.account_key(id)).await?;

        if fields.is_empty() {
            return Ok(None);
        }

        account_from_fields(&id.to_string(), fields).map(Some)
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.connection.clone();
        let id: Option<String> = conn.hget(self.key(EMAILS_KEY), email).await?;

        let Some(id) = id else {
            return Ok(None);
        };

        let id = Uuid::parse_str(&id).map_err(|e| StoreError::Corrupt {
            id: id.clone(),
            reason: format!("bad id in {EMAILS_KEY}: {e}"),
        })?;

        self.find_account_by_id(&id).await
    }

    async fn referral_codes(&self) -> Result<HashSet<String>, StoreError> {
        let mut conn = self.connection.clone();
        let codes: Vec<String> = conn.hkeys(self.key(REFERRAL_CODES_KEY)).await?;

        Ok(codes.into_iter().collect())
    }

    async fn insert_account(&self, account: &UserAccount) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();

        let mut invocation = INSERT_ACCOUNT.prepare_invoke();
        invocation
            .key(self.key(EMAILS_KEY))
            .key(self.key(REFERRAL_CODES_KEY))
            .key(self.account_key(&account.id))
            .key(self.key(USERS_KEY))
            .arg(&account.email)
            .arg(&account.referral_code)
            .arg(account.id.to_string());
        for (field, value) in fields_from_account(account) {
            invocation.arg(field).arg(value);
        }

        let outcome: i64 = invocation.invoke_async(&mut conn).await?;

        match outcome {
            INSERTED => Ok(()),
            EMAIL_TAKEN => Err(StoreError::DuplicateEmail),
            REFERRAL_CODE_TAKEN => Err(StoreError::DuplicateReferralCode),
            other => Err(StoreError::Corrupt {
                id: account.id.to_string(),
                reason: format!("unexpected insert outcome {other}"),
            }),
        }
    }

    async fn update_stats(
        &self,
        id: &Uuid,
        update: StatsUpdate,
    ) -> Result<Option<UserAccount>, StoreError> {
        let mut conn = self.connection.clone();
        let key = self.account_key(id);

        let exists: bool = conn.exists(&key).await?;
        if !exists {
            return Ok(None);
        }

        if !update.is_empty() {
            let mut fields = vec![(UPDATED_AT, Utc::now().to_rfc3339())];
            if let Some(total_raised) = update.total_raised {
                fields.push((TOTAL_RAISED, total_raised.to_string()));
            }
            if let Some(referrals) = update.referrals {
                fields.push((REFERRALS, referrals.to_string()));
            }

            let _: () = conn.hset_multiple(&key, fields.as_slice()).await?;
        }

        self.find_account_by_id(id).await
    }
}

fn fields_from_account(account: &UserAccount) -> Vec<(&'static str, String)> {
    vec![
        (NAME, account.name.clone()),
        (EMAIL, account.email.clone()),
        (TOTAL_RAISED, account.total_raised.to_string()),
        (REFERRALS, account.referrals.to_string()),
        (REFERRAL_CODE, account.referral_code.clone()),
        (JOIN_DATE, account.join_date.to_rfc3339()),
        (UPDATED_AT, account.updated_at.to_rfc3339()),
        (PASSWORD_HASH, account.password_hash.clone()),
    ]
}

/// Decodes every record it can, dangling ids and corrupt hashes are logged and skipped.
pub fn snapshot_from_records(
    records: impl IntoIterator<Item = (String, HashMap<String, String>)>,
) -> Vec<UserAccount> {
    records
        .into_iter()
        .filter_map(|(id, fields)| {
            if fields.is_empty() {
                warn!("Account {id} listed in {USERS_KEY} but has no record, skipping");
                return None;
            }

            account_from_fields(&id, fields)
                .map_err(|e| warn!("Leaving account out of snapshot: {e}"))
                .ok()
        })
        .collect()
}

pub fn account_from_fields(
    id: &str,
    mut fields: HashMap<String, String>,
) -> Result<UserAccount, StoreError> {
    let corrupt = |reason: String| StoreError::Corrupt {
        id: id.to_string(),
        reason,
    };

    let mut required = |field: &str| {
        fields
            .remove(field)
            .ok_or_else(|| corrupt(format!("missing {field}")))
    };

    let name = required(NAME)?;
    let email = required(EMAIL)?;
    let referral_code = required(REFERRAL_CODE)?;
    let join_date = required(JOIN_DATE)?;
    let password_hash = required(PASSWORD_HASH)?;

    let join_date = parse_timestamp(&join_date)
        .ok_or_else(|| corrupt(format!("bad {JOIN_DATE}: {join_date}")))?;

    // older records may lack the counters, those read as zero
    let total_raised = counter(&fields, TOTAL_RAISED);
    let referrals = counter(&fields, REFERRALS);
    let updated_at = fields
        .get(UPDATED_AT)
        .and_then(|raw| parse_timestamp(raw))
        .unwrap_or(join_date);

    Ok(UserAccount {
        id: Uuid::parse_str(id).map_err(|e| corrupt(format!("bad id: {e}")))?,
        name,
        email,
        total_raised,
        referrals,
        referral_code,
        join_date,
        updated_at,
        password_hash,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc))
}

fn counter(fields: &HashMap<String, String>, field: &str) -> u64 {
    fields
        .get(field)
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .map(|value| value.max(0) as u64)
        .unwrap_or(0)
}
