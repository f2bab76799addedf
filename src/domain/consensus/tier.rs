//! Confidence tiers for consensus picks.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Tier {
    SPlus,
    S,
    A,
    B,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::SPlus, Tier::S, Tier::A, Tier::B];

    /// Higher is stronger.
    pub fn rank(self) -> u8 {
        match self {
            Tier::SPlus => 4,
            Tier::S => 3,
            Tier::A => 2,
            Tier::B => 1,
        }
    }

    /// Key suffix used in `[consensus]` config entries, e.g. `tier_s_plus_min_engines`.
    pub fn key(self) -> &'static str {
        match self {
            Tier::SPlus => "s_plus",
            Tier::S => "s",
            Tier::A => "a",
            Tier::B => "b",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::SPlus => "S+",
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
        };
        f.write_str(label)
    }
}

/// Minimum engine count and confidence for a tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierRule {
    pub tier: Tier,
    pub min_engines: usize,
    pub min_confidence: f64,
    /// Target distance in ATR multiples.
    pub tp_atr: f64,
    /// Stop distance in ATR multiples.
    pub sl_atr: f64,
}

/// S+ (5, 85), S (4, 70), A (3, 55), B (2, 40). Higher tiers get wider
/// targets and tighter stops.
pub fn default_rules() -> Vec<TierRule> {
    vec![
        TierRule {
            tier: Tier::SPlus,
            min_engines: 5,
            min_confidence: 85.0,
            tp_atr: 3.5,
            sl_atr: 1.0,
        },
        TierRule {
            tier: Tier::S,
            min_engines: 4,
            min_confidence: 70.0,
            tp_atr: 3.0,
            sl_atr: 1.2,
        },
        TierRule {
            tier: Tier::A,
            min_engines: 3,
            min_confidence: 55.0,
            tp_atr: 2.5,
            sl_atr: 1.5,
        },
        TierRule {
            tier: Tier::B,
            min_engines: 2,
            min_confidence: 40.0,
            tp_atr: 2.0,
            sl_atr: 1.5,
        },
    ]
}

/// Strongest tier whose thresholds are both met.
pub fn assign(rules: &[TierRule], engines: usize, confidence: f64) -> Option<&TierRule> {
    rules
        .iter()
        .filter(|r| engines >= r.min_engines && confidence >= r.min_confidence)
        .max_by_key(|r| r.tier.rank())
}
