use std::cmp::Ordering;

use uuid::Uuid;

use crate::accounts::UserAccount;

/// Accounts ordered by total raised, highest first.
///
/// Equal totals are broken by earlier `join_date`, then by `id`, so the order never
/// depends on how the store happened to return the snapshot.
#[derive(Debug, Clone)]
pub struct Ranking<'a> {
    ordered: Vec<&'a UserAccount>,
}

impl<'a> Ranking<'a> {
    pub fn new(snapshot: &'a [UserAccount]) -> Self {
        let mut ordered: Vec<&UserAccount> = snapshot.iter().collect();
        ordered.sort_unstable_by(|a, b| standing_order(a, b));

        Self { ordered }
    }

    /// 1-based rank, `None` when the account is not in the snapshot.
    pub fn rank_of(&self, id: &Uuid) -> Option<usize> {
        self.standing(id).map(|(rank, _)| rank)
    }

    /// Rank together with the account as it was ranked.
    pub fn standing(&self, id: &Uuid) -> Option<(usize, &'a UserAccount)> {
        self.ordered
            .iter()
            .position(|account| account.id == *id)
            .map(|index| (index + 1, self.ordered[index]))
    }

    pub fn top(&self, limit: usize) -> &[&'a UserAccount] {
        &self.ordered[..limit.min(self.ordered.len())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a UserAccount> + '_ {
        self.ordered.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

fn standing_order(a: &UserAccount, b: &UserAccount) -> Ordering {
    b.total_raised
        .cmp(&a.total_raised)
        .then_with(|| a.join_date.cmp(&b.join_date))
        .then_with(|| a.id.cmp(&b.id))
}
