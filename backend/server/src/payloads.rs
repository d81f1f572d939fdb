//! Request and response bodies, camelCase on the wire.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use standings::{PublicAccount, RewardProgress, RewardStatus, UserAccount};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Negative numbers are accepted here and clamped to zero before they reach the store.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest {
    pub total_raised: Option<i64>,
    pub referrals: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub user: PublicAccount,
    pub message: &'static str,
}

impl AccountResponse {
    pub fn new(account: &UserAccount, message: &'static str) -> Self {
        Self {
            success: true,
            user: account.public(),
            message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub referral_code: String,
    pub join_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_raised: u64,
    pub referrals: u64,
    pub rank: usize,
    pub unlocked_rewards: usize,
    pub next_reward_threshold: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: DashboardUser,
    pub stats: DashboardStats,
    pub rewards: Vec<RewardStatus>,
}

impl DashboardResponse {
    pub fn new(account: &UserAccount, rank: usize, progress: RewardProgress) -> Self {
        Self {
            user: DashboardUser {
                id: account.id,
                name: account.name.clone(),
                email: account.email.clone(),
                referral_code: account.referral_code.clone(),
                join_date: account.join_date,
            },
            stats: DashboardStats {
                total_raised: account.total_raised,
                referrals: account.referrals,
                rank,
                unlocked_rewards: progress.unlocked_count,
                next_reward_threshold: progress.next_threshold,
            },
            rewards: progress.rewards,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    #[serde(flatten)]
    pub account: PublicAccount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub database: &'static str,
    pub user_count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HealthFailure {
    pub status: &'static str,
    pub message: &'static str,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}
