use serenity::model::id::UserId;
use std::collections::HashMap;

/// A role granted once a member reaches `threshold` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTier {
    pub name: &'static str,
    pub threshold: u64,
}

pub const ROLE_TIERS: [RoleTier; 3] = [
    RoleTier {
        name: "Activo 🟢",
        threshold: 10,
    },
    RoleTier {
        name: "Colaborador 🔥",
        threshold: 30,
    },
    RoleTier {
        name: "VIP 💎",
        threshold: 100,
    },
];

/// In-memory message counts per member. Resets on restart.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    counts: HashMap<UserId, u64>,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one message and returns the tiers reached exactly by it.
    pub fn record(&mut self, user: UserId) -> Vec<RoleTier> {
        let count = self.counts.entry(user).or_insert(0);
        *count += 1;
        let count = *count;
        ROLE_TIERS
            .iter()
            .filter(|tier| tier.threshold == count)
            .copied()
            .collect()
    }
}
