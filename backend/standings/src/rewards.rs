use serde::Serialize;

use crate::ladder::{RewardDefinition, RewardLadder};

/// A ladder entry annotated for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewardStatus {
    #[serde(flatten)]
    pub reward: RewardDefinition,
    pub unlocked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardProgress {
    /// Whole ladder in ascending threshold order, locked entries included.
    pub rewards: Vec<RewardStatus>,
    pub unlocked_count: usize,
    /// Smallest threshold still above the total, `None` once everything is unlocked.
    pub next_threshold: Option<u64>,
}

impl RewardProgress {
    pub fn unlocked(&self) -> impl Iterator<Item = &RewardDefinition> {
        self.rewards
            .iter()
            .filter(|status| status.unlocked)
            .map(|status| &status.reward)
    }

    pub fn next_reward(&self) -> Option<&RewardDefinition> {
        self.rewards
            .iter()
            .find(|status| !status.unlocked)
            .map(|status| &status.reward)
    }
}

pub fn evaluate(total_raised: u64, ladder: &RewardLadder) -> RewardProgress {
    let rewards: Vec<RewardStatus> = ladder
        .rewards()
        .iter()
        .map(|reward| RewardStatus {
            reward: reward.clone(),
            unlocked: total_raised >= reward.threshold,
        })
        .collect();

    let unlocked_count = rewards.iter().filter(|status| status.unlocked).count();
    let next_threshold = ladder
        .rewards()
        .iter()
        .map(|reward| reward.threshold)
        .find(|&threshold| threshold > total_raised);

    RewardProgress {
        rewards,
        unlocked_count,
        next_threshold,
    }
}
