use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Redis,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown store '{other}', expected redis or memory")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub store: StoreKind,
    pub redis_url: String,
    pub leaderboard_limit: usize,
    pub starter_total: u64,
    pub reward_ladder_path: Option<PathBuf>,
    pub cors_origin: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, String> {
        Ok(Self {
            port: try_load("RUST_PORT", "1111")?,
            store: try_load("STORE", "redis")?,
            redis_url: try_load("REDIS_URL", "redis://127.0.0.1:6379")?,
            leaderboard_limit: try_load("LEADERBOARD_LIMIT", "20")?,
            starter_total: try_load("STARTER_TOTAL", "1000")?,
            reward_ladder_path: optional("REWARD_LADDER_PATH").map(PathBuf::from),
            cors_origin: optional("CORS_ORIGIN"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 1111,
            store: StoreKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            leaderboard_limit: 20,
            starter_total: 1000,
            reward_ladder_path: None,
            cors_origin: None,
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
            format!("Environment misconfigured: {key}: {e}")
        })
}
