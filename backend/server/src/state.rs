use std::sync::Arc;

use anyhow::{Context, Result};
use standings::RewardLadder;
use tracing::info;

use super::{
    config::{Config, StoreKind},
    database::RedisStore,
    store::{MemoryStore, UserStore},
};

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn UserStore>,
    pub ladder: RewardLadder,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let ladder = match &config.reward_ladder_path {
            Some(path) => {
                info!("Loading reward ladder from {}", path.display());
                RewardLadder::from_path(path)
                    .with_context(|| format!("reward ladder at {}", path.display()))?
            }
            None => RewardLadder::default(),
        };
        info!("Reward ladder has {} entries", ladder.len());

        let store: Arc<dyn UserStore> = match config.store {
            StoreKind::Redis => Arc::new(
                RedisStore::connect(&config.redis_url)
                    .await
                    .with_context(|| format!("connecting to {}", config.redis_url))?,
            ),
            StoreKind::Memory => Arc::new(MemoryStore::new()),
        };
        info!("Using {} store", store.backend_tag());

        Ok(Self::with_store(config, store, ladder))
    }

    pub fn with_store(config: Config, store: Arc<dyn UserStore>, ladder: RewardLadder) -> Arc<Self> {
        Arc::new(Self {
            config,
            store,
            ladder,
        })
    }
}
