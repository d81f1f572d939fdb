use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use standings::{
    Ranking, UserAccount, accounts::clamp_amount, evaluate, referral::generate_referral_code,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    payloads::{
        AccountResponse, DashboardQuery, DashboardResponse, HealthFailure, HealthResponse,
        LeaderboardEntry, LoginRequest, SignupRequest, StatsRequest,
    },
    state::AppState,
    store::{StatsUpdate, StoreError},
    utils::{
        hash_password, parse_body, parse_user_id, validate_login, validate_signup,
        verify_password,
    },
};

const REFERRAL_CODE_ATTEMPTS: usize = 3;

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Response {
    let count = match state.store.ping().await {
        Ok(()) => state.store.count_accounts().await,
        Err(e) => Err(e),
    };

    match count {
        Ok(user_count) => Json(HealthResponse {
            status: "OK",
            message: "Intern Dashboard API is running",
            database: "Connected",
            user_count,
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            error!("Health check failed: {e}");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthFailure {
                    status: "ERROR",
                    message: "Database connection failed",
                    error: e.to_string(),
                    timestamp: Utc::now(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let signup = validate_signup(parse_body::<SignupRequest>(&body)?)?;

    if state
        .store
        .find_account_by_email(&signup.email)
        .await?
        .is_some()
    {
        return Err(StoreError::DuplicateEmail.into());
    }

    let password_hash = hash_password(signup.password).await?;

    for attempt in 1..=REFERRAL_CODE_ATTEMPTS {
        let taken = state.store.referral_codes().await?;
        let now = Utc::now();

        let account = UserAccount {
            id: Uuid::new_v4(),
            name: signup.name.clone(),
            email: signup.email.clone(),
            total_raised: state.config.starter_total,
            referrals: 0,
            referral_code: generate_referral_code(&signup.name, |code| taken.contains(code)),
            join_date: now,
            updated_at: now,
            password_hash: password_hash.clone(),
        };

        match state.store.insert_account(&account).await {
            Ok(()) => {
                info!("Created account {} ({})", account.id, account.referral_code);

                return Ok((
                    StatusCode::CREATED,
                    Json(AccountResponse::new(
                        &account,
                        "Account created successfully! Welcome to the team!",
                    )),
                ));
            }
            Err(StoreError::DuplicateReferralCode) => {
                warn!("Referral code collision on attempt {attempt}, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::InternalError(
        "could not assign a unique referral code".into(),
    ))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let login = validate_login(parse_body::<LoginRequest>(&body)?)?;

    let Some(account) = state.store.find_account_by_email(&login.email).await? else {
        return Err(AppError::Unauthorized);
    };

    if !verify_password(login.password, account.password_hash.clone()).await? {
        #[cfg(feature = "verbose")]
        info!("Password mismatch for {}", account.id);

        return Err(AppError::Unauthorized);
    }

    Ok(Json(AccountResponse::new(
        &account,
        "Login successful! Welcome back!",
    )))
}

pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| {
        AppError::MalformedPayload(format!("Malformed query: {}", e.body_text()))
    })?;

    let Some(raw_id) = query.user_id.filter(|id| !id.trim().is_empty()) else {
        return Err(AppError::MalformedPayload(
            "User ID is required".to_string(),
        ));
    };
    let id = parse_user_id(&raw_id)?;

    // stats and rank both come from the one snapshot that was ranked
    let snapshot = state.store.find_all_accounts().await?;
    let ranking = Ranking::new(&snapshot);
    let (rank, account) = ranking.standing(&id).ok_or(AppError::NotFound("User"))?;

    let progress = evaluate(account.total_raised, &state.ladder);

    Ok(Json(DashboardResponse::new(account, rank, progress)))
}

pub async fn leaderboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state.store.find_all_accounts().await?;
    let ranking = Ranking::new(&snapshot);

    let entries: Vec<LeaderboardEntry> = ranking
        .top(state.config.leaderboard_limit)
        .iter()
        .enumerate()
        .map(|(index, account)| LeaderboardEntry {
            rank: index + 1,
            account: account.public(),
        })
        .collect();

    Ok(Json(entries))
}

pub async fn stats_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_user_id(&user_id)?;
    let request: StatsRequest = parse_body(&body)?;

    let update = StatsUpdate {
        total_raised: request.total_raised.map(clamp_amount),
        referrals: request.referrals.map(clamp_amount),
    };

    let account = state
        .store
        .update_stats(&id, update)
        .await?
        .ok_or(AppError::NotFound("User"))?;

    info!(
        "Updated stats for {}: raised {}, referrals {}",
        account.id, account.total_raised, account.referrals
    );

    Ok(Json(AccountResponse::new(
        &account,
        "Stats updated successfully",
    )))
}
