use std::{fs::read_to_string, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDefinition {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub threshold: u64,
    pub icon: String,
}

#[derive(Error, Debug)]
pub enum LadderError {
    #[error("Failed to read reward ladder: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed reward ladder: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Reward milestones shared by every account, ascending by threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RewardLadder {
    rewards: Vec<RewardDefinition>,
}

impl RewardLadder {
    pub fn new(mut rewards: Vec<RewardDefinition>) -> Self {
        // stable, so equal thresholds keep the order they were configured in
        rewards.sort_by_key(|reward| reward.threshold);

        Self { rewards }
    }

    /// Loads a JSON array of [`RewardDefinition`] from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LadderError> {
        let raw = read_to_string(path)?;

        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, LadderError> {
        let rewards: Vec<RewardDefinition> = serde_json::from_str(raw)?;

        Ok(Self::new(rewards))
    }

    pub fn rewards(&self) -> &[RewardDefinition] {
        &self.rewards
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

impl Default for RewardLadder {
    fn default() -> Self {
        let reward = |id, name: &str, description: &str, threshold, icon: &str| RewardDefinition {
            id,
            name: name.to_string(),
            description: description.to_string(),
            threshold,
            icon: icon.to_string(),
        };

        Self::new(vec![
            reward(1, "Bronze Fundraiser", "Raised $5,000", 5_000, "Medal"),
            reward(2, "Silver Achiever", "Raised $10,000", 10_000, "Award"),
            reward(3, "Gold Champion", "Raised $15,000", 15_000, "Trophy"),
            reward(4, "Platinum Elite", "Raise $20,000", 20_000, "Crown"),
            reward(5, "Diamond Legend", "Raise $50,000", 50_000, "Star"),
        ])
    }
}
