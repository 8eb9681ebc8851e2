//! Tiered d20 interactions (forage, search, chop).
//!
//! A roll against a difficulty class gives a margin; the margin picks a tier
//! and the tier's row in the loot table decides what the player walks away
//! with. Rolls that miss the DC narrowly still get a chance at a consolation
//! item.

use std::fmt;

use rand::Rng;

/// Difficulty classes of the tiered actions.
pub const FORAGE_DC: i32 = 12;
pub const SEARCH_DC: i32 = 10;
pub const CHOP_DC: i32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum InteractionTier {
    CriticalFailure,
    Failure,
    NearMiss,
    Success,
    GreatSuccess,
    CriticalSuccess,
}

/// Loot odds for one tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LootOdds {
    pub item_chance: f64,
    pub min_quantity: u32,
    pub max_quantity: u32,
}

const LOOT_TABLE: [(InteractionTier, LootOdds); 6] = [
    (InteractionTier::CriticalFailure, LootOdds { item_chance: 0.0, min_quantity: 0, max_quantity: 0 }),
    (InteractionTier::Failure, LootOdds { item_chance: 0.0, min_quantity: 0, max_quantity: 0 }),
    (InteractionTier::NearMiss, LootOdds { item_chance: 0.35, min_quantity: 1, max_quantity: 1 }),
    (InteractionTier::Success, LootOdds { item_chance: 0.75, min_quantity: 1, max_quantity: 2 }),
    (InteractionTier::GreatSuccess, LootOdds { item_chance: 0.9, min_quantity: 1, max_quantity: 3 }),
    (InteractionTier::CriticalSuccess, LootOdds { item_chance: 1.0, min_quantity: 2, max_quantity: 4 }),
];

impl InteractionTier {
    pub const ALL: [InteractionTier; 6] = [
        InteractionTier::CriticalFailure,
        InteractionTier::Failure,
        InteractionTier::NearMiss,
        InteractionTier::Success,
        InteractionTier::GreatSuccess,
        InteractionTier::CriticalSuccess,
    ];

    pub fn from_margin(margin: i32) -> Self {
        match margin {
            m if m <= -10 => InteractionTier::CriticalFailure,
            -9..=-5 => InteractionTier::Failure,
            -4..=-1 => InteractionTier::NearMiss,
            0..=4 => InteractionTier::Success,
            5..=9 => InteractionTier::GreatSuccess,
            _ => InteractionTier::CriticalSuccess,
        }
    }

    pub fn odds(&self) -> LootOdds {
        LOOT_TABLE
            .iter()
            .find(|(tier, _)| tier == self)
            .map(|(_, odds)| *odds)
            .unwrap_or(LOOT_TABLE[0].1)
    }

    pub fn is_success(&self) -> bool {
        *self >= InteractionTier::Success
    }

    pub fn name(&self) -> &'static str {
        match self {
            InteractionTier::CriticalFailure => "critical failure",
            InteractionTier::Failure => "failure",
            InteractionTier::NearMiss => "near miss",
            InteractionTier::Success => "success",
            InteractionTier::GreatSuccess => "great success",
            InteractionTier::CriticalSuccess => "critical success",
        }
    }
}

impl fmt::Display for InteractionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractionRoll {
    pub roll: i32,
    pub dc: i32,
    pub margin: i32,
    pub tier: InteractionTier,
}

impl InteractionRoll {
    /// Natural 1 and 20 are always the extreme tiers.
    pub fn from_roll(roll: i32, dc: i32) -> Self {
        let margin = roll - dc;
        let tier = match roll {
            1 => InteractionTier::CriticalFailure,
            20 => InteractionTier::CriticalSuccess,
            _ => InteractionTier::from_margin(margin),
        };
        Self { roll, dc, margin, tier }
    }

    pub fn roll(dc: i32, rng: &mut impl Rng) -> Self {
        Self::from_roll(rng.gen_range(1..=20), dc)
    }

    /// How many items this roll earns; zero when the loot chance fails.
    pub fn loot_quantity(&self, rng: &mut impl Rng) -> u32 {
        let odds = self.tier.odds();
        if odds.max_quantity == 0 || !rng.gen_bool(odds.item_chance) {
            return 0;
        }
        rng.gen_range(odds.min_quantity..=odds.max_quantity)
    }

    pub fn describe(&self) -> String {
        format!("(rolled {} vs DC {}: {})", self.roll, self.dc, self.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_table_is_monotonic() {
        let mut previous: Option<LootOdds> = None;
        for tier in InteractionTier::ALL {
            let odds = tier.odds();
            if let Some(prev) = previous {
                assert!(odds.item_chance >= prev.item_chance, "{tier}");
                assert!(odds.max_quantity >= prev.max_quantity, "{tier}");
                assert!(odds.min_quantity >= prev.min_quantity, "{tier}");
            }
            previous = Some(odds);
        }
    }

    #[test]
    fn test_near_miss_gets_consolation_chance() {
        let roll = InteractionRoll::from_roll(10, 12);
        assert_eq!(roll.tier, InteractionTier::NearMiss);
        assert!(!roll.tier.is_success());
        assert!(roll.tier.odds().item_chance > 0.0);
    }

    #[test]
    fn test_natural_rolls() {
        assert_eq!(InteractionRoll::from_roll(20, 30).tier, InteractionTier::CriticalSuccess);
        assert_eq!(InteractionRoll::from_roll(1, 0).tier, InteractionTier::CriticalFailure);
    }

    #[test]
    fn test_loot_quantity_within_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        for roll in 1..=20 {
            let r = InteractionRoll::from_roll(roll, SEARCH_DC);
            let odds = r.tier.odds();
            for _ in 0..20 {
                let q = r.loot_quantity(&mut rng);
                assert!(q == 0 || (odds.min_quantity..=odds.max_quantity).contains(&q));
            }
        }
    }

    proptest! {
        #[test]
        fn prop_tier_monotonic_in_margin(a in -30i32..30, b in -30i32..30) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(InteractionTier::from_margin(lo) <= InteractionTier::from_margin(hi));
        }
    }
}
