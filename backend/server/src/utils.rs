use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::body::Bytes;
use serde::de::DeserializeOwned;
use tokio::task::spawn_blocking;
use uuid::Uuid;

use crate::{
    error::AppError::{self, InvalidId, MalformedPayload},
    payloads::{LoginRequest, SignupRequest},
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub struct Signup {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub struct Login {
    pub email: String,
    pub password: String,
}

pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| MalformedPayload(format!("Malformed payload: {e}")))
}

pub fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| InvalidId)
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

pub fn validate_signup(request: SignupRequest) -> Result<Signup, AppError> {
    let (Some(name), Some(email), Some(password)) = (
        present(request.name),
        present(request.email),
        present(request.password),
    ) else {
        return Err(MalformedPayload(
            "Name, email, and password are required".to_string(),
        ));
    };

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(MalformedPayload(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }

    Ok(Signup {
        name: name.trim().to_string(),
        email: standings::accounts::normalize_email(&email),
        password,
    })
}

pub fn validate_login(request: LoginRequest) -> Result<Login, AppError> {
    let (Some(email), Some(password)) = (present(request.email), present(request.password)) else {
        return Err(MalformedPayload(
            "Email and password are required".to_string(),
        ));
    };

    Ok(Login {
        email: standings::accounts::normalize_email(&email),
        password,
    })
}

/// Argon2id PHC string, hashed off the async runtime.
pub async fn hash_password(password: String) -> Result<String, AppError> {
    spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(e.to_string().into()))
    })
    .await
    .map_err(|e| AppError::InternalError(Box::new(e)))?
}

/// A stored hash that fails to parse never verifies.
pub async fn verify_password(password: String, stored_hash: String) -> Result<bool, AppError> {
    spawn_blocking(move || {
        PasswordHash::new(&stored_hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    })
    .await
    .map_err(|e| AppError::InternalError(Box::new(e)))
}
