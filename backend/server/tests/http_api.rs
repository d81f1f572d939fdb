use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use dashboard::{
    build_router,
    config::Config,
    state::AppState,
    store::{MemoryStore, StatsUpdate, StoreError, UserStore},
};
use serde_json::{Value, json};
use standings::{RewardLadder, UserAccount};
use tokio::net::TcpListener;
use uuid::Uuid;

async fn spawn_app(config: Config) -> (String, Arc<AppState>) {
    spawn_app_with_store(config, Arc::new(MemoryStore::new())).await
}

async fn spawn_app_with_store(
    config: Config,
    store: Arc<dyn UserStore>,
) -> (String, Arc<AppState>) {
    let state = AppState::with_store(config, store, RewardLadder::default());
    let app = build_router(state.clone()).expect("router");

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    (format!("http://{addr}"), state)
}

fn intern(n: u128, total_raised: u64) -> UserAccount {
    let joined = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap() + Duration::days(n as i64);

    UserAccount {
        id: Uuid::from_u128(n),
        name: format!("Intern {n}"),
        email: format!("intern{n}@example.com"),
        total_raised,
        referrals: n as u64,
        referral_code: format!("inter{:04}", 1000 + n),
        join_date: joined,
        updated_at: joined,
        password_hash: "$argon2id$not-a-real-hash".to_string(),
    }
}

async fn seed(state: &AppState, n: u128, total_raised: u64) -> UserAccount {
    let account = intern(n, total_raised);
    state.store.insert_account(&account).await.expect("seed account");

    account
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.expect("get");
    let status = response.status().as_u16();

    (status, response.json().await.expect("json body"))
}

async fn send_json(method: reqwest::Method, url: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .request(method, url)
        .json(&body)
        .send()
        .await
        .expect("send");
    let status = response.status().as_u16();

    (status, response.json().await.expect("json body"))
}

fn assert_no_credentials(user: &Value) {
    assert!(user.get("password").is_none(), "password leaked: {user}");
    assert!(user.get("passwordHash").is_none(), "hash leaked: {user}");
}

#[tokio::test]
async fn health_reports_account_count() {
    let (base, state) = spawn_app(Config::default()).await;
    seed(&state, 1, 100).await;

    let (status, body) = get_json(&format!("{base}/health")).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "Connected");
    assert_eq!(body["userCount"], 1);
}

#[tokio::test]
async fn signup_then_login() {
    let (base, _state) = spawn_app(Config::default()).await;

    let (status, body) = send_json(
        reqwest::Method::POST,
        &format!("{base}/auth/signup"),
        json!({"name": "Grace Hopper", "email": "Grace@Example.com", "password": "cobol59"}),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "grace@example.com");
    assert_eq!(body["user"]["totalRaised"], 1000);
    assert_eq!(body["user"]["referrals"], 0);
    let code = body["user"]["referralCode"].as_str().expect("referral code");
    assert!(code.starts_with("grace"));
    assert_eq!(code.len(), 9);
    assert_no_credentials(&body["user"]);

    let (status, body) = send_json(
        reqwest::Method::POST,
        &format!("{base}/auth/login"),
        json!({"email": "GRACE@example.com", "password": "cobol59"}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["name"], "Grace Hopper");
    assert_no_credentials(&body["user"]);

    let (status, body) = send_json(
        reqwest::Method::POST,
        &format!("{base}/auth/login"),
        json!({"email": "grace@example.com", "password": "fortran"}),
    )
    .await;

    assert_eq!(status, 401);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn signup_rejections() {
    let (base, _state) = spawn_app(Config::default()).await;
    let url = format!("{base}/auth/signup");

    let (status, _) = send_json(
        reqwest::Method::POST,
        &url,
        json!({"name": "Ada", "email": "ada@example.com", "password": "engine"}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, body) = send_json(
        reqwest::Method::POST,
        &url,
        json!({"name": "Ada Again", "email": "ADA@example.com", "password": "engine2"}),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["success"], false);

    let (status, _) = send_json(
        reqwest::Method::POST,
        &url,
        json!({"name": "Bob", "email": "bob@example.com", "password": "123"}),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = send_json(reqwest::Method::POST, &url, json!({"name": "Bob"})).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn login_unknown_email() {
    let (base, _state) = spawn_app(Config::default()).await;

    let (status, _) = send_json(
        reqwest::Method::POST,
        &format!("{base}/auth/login"),
        json!({"email": "nobody@example.com", "password": "whatever"}),
    )
    .await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn dashboard_ranks_and_rewards() {
    let (base, state) = spawn_app(Config::default()).await;
    seed(&state, 1, 28_500).await;
    let second = seed(&state, 2, 15_750).await;
    seed(&state, 3, 9_800).await;

    let (status, body) = get_json(&format!("{base}/dashboard?userId={}", second.id)).await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["referralCode"], second.referral_code);
    assert_eq!(body["stats"]["totalRaised"], 15_750);
    assert_eq!(body["stats"]["referrals"], 2);
    assert_eq!(body["stats"]["rank"], 2);
    assert_eq!(body["stats"]["unlockedRewards"], 3);
    assert_eq!(body["stats"]["nextRewardThreshold"], 20_000);

    let rewards = body["rewards"].as_array().expect("rewards");
    let unlocked: Vec<bool> = rewards
        .iter()
        .map(|r| r["unlocked"].as_bool().expect("unlocked flag"))
        .collect();
    assert_eq!(unlocked, vec![true, true, true, false, false]);
    assert_eq!(rewards[2]["name"], "Gold Champion");
}

#[tokio::test]
async fn dashboard_everything_unlocked() {
    let (base, state) = spawn_app(Config::default()).await;
    let top = seed(&state, 1, 60_000).await;

    let (status, body) = get_json(&format!("{base}/dashboard?userId={}", top.id)).await;

    assert_eq!(status, 200);
    assert_eq!(body["stats"]["rank"], 1);
    assert_eq!(body["stats"]["unlockedRewards"], 5);
    assert!(body["stats"]["nextRewardThreshold"].is_null());
}

#[tokio::test]
async fn dashboard_bad_requests() {
    let (base, _state) = spawn_app(Config::default()).await;

    let (status, body) = get_json(&format!("{base}/dashboard")).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "User ID is required");

    let (status, body) = get_json(&format!("{base}/dashboard?userId=12345")).await;
    assert_eq!(status, 400);
    assert_eq!(body["message"], "Invalid user ID format");

    let (status, body) = get_json(&format!("{base}/dashboard?userId={}", Uuid::from_u128(99))).await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn leaderboard_is_bounded() {
    let config = Config {
        leaderboard_limit: 2,
        ..Config::default()
    };
    let (base, state) = spawn_app(config).await;
    seed(&state, 3, 9_800).await;
    seed(&state, 1, 28_500).await;
    seed(&state, 2, 15_750).await;

    let (status, body) = get_json(&format!("{base}/leaderboard")).await;

    assert_eq!(status, 200);
    let entries = body.as_array().expect("leaderboard array");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], 1);
    assert_eq!(entries[0]["totalRaised"], 28_500);
    assert_eq!(entries[1]["rank"], 2);
    assert_eq!(entries[1]["totalRaised"], 15_750);
    entries.iter().for_each(assert_no_credentials);
}

#[tokio::test]
async fn leaderboard_empty() {
    let (base, _state) = spawn_app(Config::default()).await;

    let (status, body) = get_json(&format!("{base}/leaderboard")).await;

    assert_eq!(status, 200);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn stats_update_clamps_and_reranks() {
    let (base, state) = spawn_app(Config::default()).await;
    seed(&state, 1, 28_500).await;
    let last = seed(&state, 2, 9_800).await;

    let (status, body) = send_json(
        reqwest::Method::PUT,
        &format!("{base}/user/{}/stats", last.id),
        json!({"totalRaised": 30_000}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["totalRaised"], 30_000);
    assert_eq!(body["user"]["referrals"], 2);
    assert_ne!(body["user"]["updatedAt"], body["user"]["joinDate"]);
    assert_no_credentials(&body["user"]);

    let (_, body) = get_json(&format!("{base}/dashboard?userId={}", last.id)).await;
    assert_eq!(body["stats"]["rank"], 1);

    let (status, body) = send_json(
        reqwest::Method::PUT,
        &format!("{base}/user/{}/stats", last.id),
        json!({"totalRaised": -10, "referrals": -3}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["user"]["totalRaised"], 0);
    assert_eq!(body["user"]["referrals"], 0);
}

#[tokio::test]
async fn stats_update_unknown_user() {
    let (base, _state) = spawn_app(Config::default()).await;

    let (status, _) = send_json(
        reqwest::Method::PUT,
        &format!("{base}/user/{}/stats", Uuid::from_u128(5)),
        json!({"referrals": 4}),
    )
    .await;
    assert_eq!(status, 404);

    let (status, _) = send_json(
        reqwest::Method::PUT,
        &format!("{base}/user/not-a-uuid/stats"),
        json!({"referrals": 4}),
    )
    .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn dashboard_query_errors_are_json() {
    let (base, state) = spawn_app(Config::default()).await;
    let ada = seed(&state, 1, 100).await;

    let (status, body) = get_json(&format!(
        "{base}/dashboard?userId={}&userId={}",
        ada.id, ada.id
    ))
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .expect("message")
            .starts_with("Malformed query")
    );
}

/// Answers id lookups with an older copy of the account than the snapshot holds.
struct LaggingStore {
    inner: MemoryStore,
}

#[async_trait]
impl UserStore for LaggingStore {
    fn backend_tag(&self) -> &'static str {
        "lagging"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }

    async fn count_accounts(&self) -> Result<usize, StoreError> {
        self.inner.count_accounts().await
    }

    async fn find_all_accounts(&self) -> Result<Vec<UserAccount>, StoreError> {
        self.inner.find_all_accounts().await
    }

    async fn find_account_by_id(&self, id: &Uuid) -> Result<Option<UserAccount>, StoreError> {
        Ok(self.inner.find_account_by_id(id).await?.map(|mut account| {
            account.total_raised = 0;
            account
        }))
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        self.inner.find_account_by_email(email).await
    }

    async fn referral_codes(&self) -> Result<HashSet<String>, StoreError> {
        self.inner.referral_codes().await
    }

    async fn insert_account(&self, account: &UserAccount) -> Result<(), StoreError> {
        self.inner.insert_account(account).await
    }

    async fn update_stats(
        &self,
        id: &Uuid,
        update: StatsUpdate,
    ) -> Result<Option<UserAccount>, StoreError> {
        self.inner.update_stats(id, update).await
    }
}

#[tokio::test]
async fn dashboard_stats_match_ranked_snapshot() {
    let store = LaggingStore {
        inner: MemoryStore::new(),
    };
    store.insert_account(&intern(1, 28_500)).await.unwrap();
    store.insert_account(&intern(2, 15_750)).await.unwrap();

    let (base, _state) = spawn_app_with_store(Config::default(), Arc::new(store)).await;

    let (status, body) = get_json(&format!("{base}/dashboard?userId={}", Uuid::from_u128(2))).await;

    assert_eq!(status, 200);
    assert_eq!(body["stats"]["rank"], 2);
    assert_eq!(body["stats"]["totalRaised"], 15_750);
    assert_eq!(body["stats"]["unlockedRewards"], 3);
}
