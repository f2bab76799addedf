//! Graded consensus pick and its lifecycle.

use chrono::NaiveDateTime;

use crate::domain::consensus::tier::Tier;
use crate::domain::signal::Direction;

/// One engine's share of a pick: the confidence it reported and the weight
/// it carried in the score.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EngineContribution {
    pub engine: String,
    pub weight: f64,
    pub confidence: f64,
}

impl EngineContribution {
    pub fn new(engine: &str, weight: f64, confidence: f64) -> Self {
        EngineContribution {
            engine: engine.to_string(),
            weight,
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ConsensusPick {
    pub asset: String,
    pub direction: Direction,
    pub entry_price: f64,
    pub tp_price: f64,
    pub sl_price: f64,
    pub consensus_score: f64,
    pub engines: Vec<EngineContribution>,
    pub tier: Tier,
    pub thesis: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PickOutcome {
    Win,
    Loss,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PickStatus {
    Active,
    Resolved(PickOutcome),
}

impl ConsensusPick {
    pub fn engine_count(&self) -> usize {
        self.engines.len()
    }

    /// Status of the pick given the latest price. Target and stop are
    /// checked before expiry; a pick that touched neither by `expires_at`
    /// is expired.
    pub fn status_at(&self, price: f64, now: NaiveDateTime) -> PickStatus {
        let (hit_tp, hit_sl) = match self.direction {
            Direction::Long => (price >= self.tp_price, price <= self.sl_price),
            Direction::Short => (price <= self.tp_price, price >= self.sl_price),
        };
        if hit_tp {
            PickStatus::Resolved(PickOutcome::Win)
        } else if hit_sl {
            PickStatus::Resolved(PickOutcome::Loss)
        } else if now >= self.expires_at {
            PickStatus::Resolved(PickOutcome::Expired)
        } else {
            PickStatus::Active
        }
    }
}
