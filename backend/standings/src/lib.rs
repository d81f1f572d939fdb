//! # Standings
//!
//! Ranking and reward logic behind the intern dashboard.
//!
//!
//!
//! ## Overall Data Flow
//!
//! - The server pulls a snapshot of every account out of the store
//! - [`rank::Ranking`] orders that snapshot by total raised, highest first
//! - [`rewards::evaluate`] classifies one account's total against the [`ladder::RewardLadder`]
//! - Both results are handed back to the HTTP layer and serialized as JSON
//!
//! Nothing here touches the network or the store. Every call recomputes from the
//! snapshot it was given, so handlers can call into this crate from any number of
//! tasks at once.
//!
//!
//!
//! ## Ranking
//!
//! - Sorted by `total_raised` descending
//! - Equal totals fall back to `join_date` ascending, then `id` ascending
//! - Rank is 1-based, an account missing from the snapshot has no rank at all
//!
//!
//!
//! ## Rewards
//!
//! Default ladder.
//!
//! | Reward | Threshold | Icon |
//! |---|---|---|
//! | Bronze Fundraiser | 5,000 | Medal |
//! | Silver Achiever | 10,000 | Award |
//! | Gold Champion | 15,000 | Trophy |
//! | Platinum Elite | 20,000 | Crown |
//! | Diamond Legend | 50,000 | Star |
//!
//! - Reaching a threshold exactly unlocks it
//! - The whole ladder is always returned so locked entries can still be rendered
//!
//!
//!
//! ## Notes
//!
//! ### Sizing
//! - Tens of accounts, maybe a few hundred at the end of a cohort
//! - Full sort per request is cheap enough that caching is not worth the invalidation

pub mod accounts;
pub mod ladder;
pub mod rank;
pub mod referral;
pub mod rewards;

pub use accounts::{PublicAccount, UserAccount};
pub use ladder::{LadderError, RewardDefinition, RewardLadder};
pub use rank::Ranking;
pub use rewards::{RewardProgress, RewardStatus, evaluate};
