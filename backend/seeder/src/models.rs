use serde::Deserialize;
use uuid::Uuid;

pub const DEMO_PASSWORD: &str = "password123";

pub struct DemoIntern {
    pub name: String,
    pub email: String,
    pub total_raised: u64,
    pub referrals: u64,
}

const ROSTER: [(&str, &str, u64, u64); 10] = [
    ("Alex Johnson", "alex@company.com", 15_750, 23),
    ("Sarah Chen", "sarah@company.com", 28_500, 45),
    ("Michael Rodriguez", "michael@company.com", 24_200, 38),
    ("Emily Johnson", "emily@company.com", 21_800, 32),
    ("David Kim", "david@company.com", 19_500, 29),
    ("Jessica Wang", "jessica@company.com", 14_200, 21),
    ("Ryan Thompson", "ryan@company.com", 12_800, 18),
    ("Lisa Anderson", "lisa@company.com", 11_500, 16),
    ("James Wilson", "james@company.com", 10_200, 14),
    ("Maria Garcia", "maria@company.com", 9_800, 12),
];

/// Fixed demo roster followed by `extra` generated interns.
pub fn demo_interns(extra: u32) -> Vec<DemoIntern> {
    let roster = ROSTER
        .iter()
        .map(|&(name, email, total_raised, referrals)| DemoIntern {
            name: name.to_string(),
            email: email.to_string(),
            total_raised,
            referrals,
        });

    // generated totals walk down from just under the roster so they rank below it
    let generated = (1..=extra as u64).map(|n| DemoIntern {
        name: format!("Demo Intern {n}"),
        email: format!("intern{n}@company.com"),
        total_raised: 9_500u64.saturating_sub(n * 250),
        referrals: n % 10,
    });

    roster.chain(generated).collect()
}

#[derive(Deserialize)]
pub struct AccountEnvelope {
    pub user: AccountId,
}

#[derive(Deserialize)]
pub struct AccountId {
    pub id: Uuid,
}
