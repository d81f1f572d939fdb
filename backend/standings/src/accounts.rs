use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One intern account as held by the store.
///
/// Never serialized directly, use [`UserAccount::public`] for anything leaving the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub total_raised: u64,
    pub referrals: u64,
    pub referral_code: String,
    pub join_date: DateTime<Utc>,
    /// Last time the stats changed, equal to `join_date` until then.
    pub updated_at: DateTime<Utc>,
    pub password_hash: String,
}

/// Credential-free view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub total_raised: u64,
    pub referrals: u64,
    pub referral_code: String,
    pub join_date: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            total_raised: self.total_raised,
            referrals: self.referrals,
            referral_code: self.referral_code.clone(),
            join_date: self.join_date,
            updated_at: self.updated_at,
        }
    }
}

/// Emails are compared case-insensitively, so they are always stored lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Stats updates arrive as signed numbers but totals never go below zero.
pub fn clamp_amount(value: i64) -> u64 {
    value.max(0) as u64
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn public_view_drops_credentials() {
        let account = UserAccount {
            id: Uuid::nil(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            total_raised: 1000,
            referrals: 2,
            referral_code: "ada001234".to_string(),
            join_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(),
            password_hash: "$argon2id$secret".to_string(),
        };

        let json = serde_json::to_value(account.public()).unwrap();

        assert_eq!(json["totalRaised"], 1000);
        assert_eq!(json["referralCode"], "ada001234");
        assert_eq!(json["updatedAt"], "2025-02-01T00:00:00Z");
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn test_clamp_amount() {
        assert_eq!(clamp_amount(-50), 0);
        assert_eq!(clamp_amount(0), 0);
        assert_eq!(clamp_amount(12_000), 12_000);
    }
}
