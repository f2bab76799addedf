//! Consensus grading across independent signal engines.
//!
//! Signals are grouped by (asset, direction). A group needs at least two
//! distinct engines to qualify; its score is the weighted mean of the
//! engines' confidences plus a bonus per extra engine, capped. The score and
//! engine count select a tier, and the tier sets the ATR multiples used to
//! place target and stop around a slippage-adjusted entry.
//!
//! Grading never fails: unavailable engines, unknown assets and weak groups
//! only reduce the output.

pub mod pick;
pub mod slippage;
pub mod tier;

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info, warn};

use crate::domain::error::SignalgradeError;
use crate::domain::signal::Direction;
use crate::ports::config_port::ConfigPort;
use crate::ports::engine_port::EngineSource;

pub use pick::{ConsensusPick, EngineContribution, PickOutcome, PickStatus};
pub use slippage::{LiquidityClass, SlippageTable};
pub use tier::{Tier, TierRule};

const SECTION: &str = "consensus";
const WEIGHTS_SECTION: &str = "consensus.weights";
const LIQUIDITY_SECTION: &str = "consensus.liquidity";

/// A group is never graded on fewer engines than this.
pub const MIN_AGREEING_ENGINES: usize = 2;

/// Ten years.
pub const MAX_PICK_TTL_HOURS: i64 = 24 * 365 * 10;

/// Slippage at or above this moves a short entry to zero.
const MAX_SLIPPAGE_BPS: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EngineSignal {
    pub engine: String,
    pub asset: String,
    pub direction: Direction,
    /// 0..=100
    pub confidence: f64,
    pub metadata: BTreeMap<String, String>,
}

impl EngineSignal {
    pub fn new(engine: &str, asset: &str, direction: Direction, confidence: f64) -> Self {
        EngineSignal {
            engine: engine.to_string(),
            asset: asset.to_string(),
            direction,
            confidence,
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineStatus {
    Available(Vec<EngineSignal>),
    Unavailable { reason: String },
}

/// Output of one engine for one grading round.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineBatch {
    pub engine: String,
    pub status: EngineStatus,
}

impl EngineBatch {
    pub fn available(engine: &str, signals: Vec<EngineSignal>) -> Self {
        EngineBatch {
            engine: engine.to_string(),
            status: EngineStatus::Available(signals),
        }
    }

    pub fn unavailable(engine: &str, reason: impl Into<String>) -> Self {
        EngineBatch {
            engine: engine.to_string(),
            status: EngineStatus::Unavailable {
                reason: reason.into(),
            },
        }
    }
}

/// Market context used to price a pick.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetContext {
    pub asset: String,
    pub price: f64,
    pub atr: f64,
    pub liquidity: LiquidityClass,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusConfig {
    pub engine_weights: HashMap<String, f64>,
    pub default_weight: f64,
    pub bonus_per_engine: f64,
    pub confidence_cap: f64,
    pub min_engines: usize,
    pub tier_rules: Vec<TierRule>,
    pub slippage: SlippageTable,
    pub liquidity: HashMap<String, LiquidityClass>,
    pub pick_ttl_hours: i64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        ConsensusConfig {
            engine_weights: HashMap::new(),
            default_weight: 1.0,
            bonus_per_engine: 10.0,
            confidence_cap: 95.0,
            min_engines: MIN_AGREEING_ENGINES,
            tier_rules: tier::default_rules(),
            slippage: SlippageTable::default(),
            liquidity: HashMap::new(),
            pick_ttl_hours: 24,
        }
    }
}

impl ConsensusConfig {
    /// Reads `[consensus]`, `[consensus.weights]` and `[consensus.liquidity]`.
    /// Unparseable liquidity classes fall back to `mid` with a warning.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let d = Self::default();

        let engine_weights = config
            .keys(WEIGHTS_SECTION)
            .into_iter()
            .map(|engine| {
                let weight = config.get_double(WEIGHTS_SECTION, &engine, d.default_weight);
                (engine, weight)
            })
            .collect();

        let liquidity = config
            .keys(LIQUIDITY_SECTION)
            .into_iter()
            .filter_map(|asset| {
                let raw = config.get_string(LIQUIDITY_SECTION, &asset)?;
                let class = raw.parse().unwrap_or_else(|err| {
                    warn!(asset = %asset, error = %err, "defaulting liquidity class to mid");
                    LiquidityClass::Mid
                });
                Some((asset.to_ascii_uppercase(), class))
            })
            .collect();

        let tier_rules = d
            .tier_rules
            .iter()
            .map(|rule| {
                let key = rule.tier.key();
                TierRule {
                    tier: rule.tier,
                    min_engines: config
                        .get_int(SECTION, &format!("tier_{key}_min_engines"), rule.min_engines as i64)
                        .max(0) as usize,
                    min_confidence: config.get_double(
                        SECTION,
                        &format!("tier_{key}_min_confidence"),
                        rule.min_confidence,
                    ),
                    tp_atr: config.get_double(SECTION, &format!("tier_{key}_tp_atr"), rule.tp_atr),
                    sl_atr: config.get_double(SECTION, &format!("tier_{key}_sl_atr"), rule.sl_atr),
                }
            })
            .collect();

        ConsensusConfig {
            engine_weights,
            default_weight: config.get_double(SECTION, "default_weight", d.default_weight),
            bonus_per_engine: config.get_double(SECTION, "bonus_per_engine", d.bonus_per_engine),
            confidence_cap: config.get_double(SECTION, "confidence_cap", d.confidence_cap),
            min_engines: config
                .get_int(SECTION, "min_engines", d.min_engines as i64)
                .max(0) as usize,
            tier_rules,
            slippage: SlippageTable {
                major_bps: config.get_double(SECTION, "slippage_major_bps", d.slippage.major_bps),
                mid_bps: config.get_double(SECTION, "slippage_mid_bps", d.slippage.mid_bps),
                thin_bps: config.get_double(SECTION, "slippage_thin_bps", d.slippage.thin_bps),
            },
            liquidity,
            pick_ttl_hours: config.get_int(SECTION, "pick_ttl_hours", d.pick_ttl_hours),
        }
    }

    pub fn validate(&self) -> Result<(), SignalgradeError> {
        if self.min_engines < MIN_AGREEING_ENGINES {
            return Err(SignalgradeError::invalid(
                SECTION,
                "min_engines",
                "must be at least 2",
            ));
        }
        if !(self.confidence_cap > 0.0 && self.confidence_cap <= 100.0) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "confidence_cap",
                "must be in (0, 100]",
            ));
        }
        if !(self.bonus_per_engine >= 0.0) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "bonus_per_engine",
                "must be non-negative",
            ));
        }
        if !(self.default_weight > 0.0) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "default_weight",
                "must be greater than 0",
            ));
        }
        if let Some((engine, _)) = self.engine_weights.iter().find(|(_, w)| !(**w >= 0.0)) {
            return Err(SignalgradeError::invalid(
                WEIGHTS_SECTION,
                engine,
                "must be non-negative",
            ));
        }
        let slippage = [
            ("slippage_major_bps", self.slippage.major_bps),
            ("slippage_mid_bps", self.slippage.mid_bps),
            ("slippage_thin_bps", self.slippage.thin_bps),
        ];
        if let Some((key, _)) = slippage
            .iter()
            .find(|(_, bps)| !(*bps >= 0.0 && *bps < MAX_SLIPPAGE_BPS))
        {
            return Err(SignalgradeError::invalid(
                SECTION,
                key,
                "must be in [0, 10000)",
            ));
        }
        for rule in &self.tier_rules {
            let key = rule.tier.key();
            if !(rule.tp_atr > 0.0) {
                return Err(SignalgradeError::invalid(
                    SECTION,
                    &format!("tier_{key}_tp_atr"),
                    "must be greater than 0",
                ));
            }
            if !(rule.sl_atr > 0.0) {
                return Err(SignalgradeError::invalid(
                    SECTION,
                    &format!("tier_{key}_sl_atr"),
                    "must be greater than 0",
                ));
            }
        }
        let mut ranked: Vec<&TierRule> = self.tier_rules.iter().collect();
        ranked.sort_by_key(|r| std::cmp::Reverse(r.tier.rank()));
        for pair in ranked.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if higher.tp_atr < lower.tp_atr {
                return Err(SignalgradeError::invalid(
                    SECTION,
                    &format!("tier_{}_tp_atr", higher.tier.key()),
                    format!("must not be below tier {}", lower.tier),
                ));
            }
            if higher.sl_atr > lower.sl_atr {
                return Err(SignalgradeError::invalid(
                    SECTION,
                    &format!("tier_{}_sl_atr", higher.tier.key()),
                    format!("must not exceed tier {}", lower.tier),
                ));
            }
        }
        if !(1..=MAX_PICK_TTL_HOURS).contains(&self.pick_ttl_hours) {
            return Err(SignalgradeError::invalid(
                SECTION,
                "pick_ttl_hours",
                "must be between 1 and 87600",
            ));
        }
        Ok(())
    }

    pub fn weight(&self, engine: &str) -> f64 {
        self.engine_weights
            .get(engine)
            .or_else(|| self.engine_weights.get(&engine.to_lowercase()))
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn liquidity_of(&self, asset: &str) -> LiquidityClass {
        self.liquidity
            .get(&asset.to_ascii_uppercase())
            .copied()
            .unwrap_or_default()
    }
}

/// A qualifying (asset, direction) group before pricing.
#[derive(Debug, Clone)]
struct Candidate<'a> {
    asset: &'a str,
    direction: Direction,
    engines: Vec<EngineContribution>,
    score: f64,
    rule: &'a TierRule,
}

impl Candidate<'_> {
    fn stronger_than(&self, other: &Candidate<'_>) -> bool {
        (self.engines.len(), self.score) > (other.engines.len(), other.score)
    }
}

pub struct ConsensusEngine {
    config: ConsensusConfig,
}

impl ConsensusEngine {
    pub fn new(config: ConsensusConfig) -> Self {
        ConsensusEngine { config }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    /// Grades one round of engine batches into picks, strongest first.
    pub fn grade(
        &self,
        batches: &[EngineBatch],
        contexts: &HashMap<String, AssetContext>,
        now: NaiveDateTime,
    ) -> Vec<ConsensusPick> {
        let groups = self.group(batches);
        let candidates = self.qualify(&groups);
        let resolved = resolve_conflicts(candidates);

        let mut picks: Vec<ConsensusPick> = resolved
            .into_iter()
            .filter_map(|candidate| self.price(candidate, contexts, now))
            .collect();

        picks.sort_by(|a, b| {
            b.tier
                .rank()
                .cmp(&a.tier.rank())
                .then(b.consensus_score.total_cmp(&a.consensus_score))
                .then(a.asset.cmp(&b.asset))
        });

        info!(
            batches = batches.len(),
            picks = picks.len(),
            "consensus grading complete"
        );
        picks
    }

    /// (asset, direction) -> engine -> highest confidence reported.
    fn group(&self, batches: &[EngineBatch]) -> BTreeMap<(String, Direction), BTreeMap<String, f64>> {
        let mut groups: BTreeMap<(String, Direction), BTreeMap<String, f64>> = BTreeMap::new();
        for batch in batches {
            let signals = match &batch.status {
                EngineStatus::Available(signals) => signals,
                EngineStatus::Unavailable { reason } => {
                    warn!(engine = %batch.engine, reason = %reason, "engine unavailable, skipping");
                    continue;
                }
            };
            for signal in signals {
                if !signal.confidence.is_finite() {
                    debug!(engine = %batch.engine, asset = %signal.asset, "non-finite confidence dropped");
                    continue;
                }
                let confidence = signal.confidence.clamp(0.0, 100.0);
                let engines = groups
                    .entry((signal.asset.to_ascii_uppercase(), signal.direction))
                    .or_default();
                let best = engines.entry(batch.engine.clone()).or_insert(confidence);
                if confidence > *best {
                    *best = confidence;
                }
            }
        }
        groups
    }

    fn qualify<'a>(
        &'a self,
        groups: &'a BTreeMap<(String, Direction), BTreeMap<String, f64>>,
    ) -> Vec<Candidate<'a>> {
        let min_engines = self.config.min_engines.max(MIN_AGREEING_ENGINES);
        let mut candidates = Vec::new();

        for ((asset, direction), engines) in groups {
            let count = engines.len();
            if count < min_engines {
                debug!(asset = %asset, direction = %direction, engines = count, "too few engines agree");
                continue;
            }
            let score = self.score(engines);
            let Some(rule) = tier::assign(&self.config.tier_rules, count, score) else {
                debug!(asset = %asset, direction = %direction, engines = count, score, "below every tier");
                continue;
            };
            debug!(asset = %asset, direction = %direction, engines = count, score, tier = %rule.tier, "tier assigned");
            candidates.push(Candidate {
                asset,
                direction: *direction,
                engines: engines
                    .iter()
                    .map(|(e, c)| EngineContribution::new(e, self.config.weight(e), *c))
                    .collect(),
                score,
                rule,
            });
        }
        candidates
    }

    /// Weighted mean confidence plus the agreement bonus, capped.
    fn score(&self, engines: &BTreeMap<String, f64>) -> f64 {
        let total_weight: f64 = engines.keys().map(|e| self.config.weight(e)).sum();
        let mean = if total_weight > 0.0 {
            engines
                .iter()
                .map(|(e, c)| self.config.weight(e) * c)
                .sum::<f64>()
                / total_weight
        } else {
            engines.values().sum::<f64>() / engines.len() as f64
        };
        let bonus = self.config.bonus_per_engine * (engines.len().saturating_sub(1)) as f64;
        (mean + bonus).min(self.config.confidence_cap)
    }

    fn price(
        &self,
        candidate: Candidate<'_>,
        contexts: &HashMap<String, AssetContext>,
        now: NaiveDateTime,
    ) -> Option<ConsensusPick> {
        let Some(context) = contexts.get(candidate.asset).or_else(|| {
            contexts
                .values()
                .find(|c| c.asset.eq_ignore_ascii_case(candidate.asset))
        }) else {
            warn!(asset = %candidate.asset, "no market context, pick dropped");
            return None;
        };
        if !(context.price.is_finite() && context.price > 0.0) {
            warn!(asset = %candidate.asset, price = context.price, "invalid price, pick dropped");
            return None;
        }
        if !(context.atr.is_finite() && context.atr > 0.0) {
            warn!(asset = %candidate.asset, atr = context.atr, "invalid ATR, pick dropped");
            return None;
        }

        let direction = candidate.direction;
        let bps = self.config.slippage.bps(context.liquidity);
        let entry_price = slippage::entry_price(context.price, direction, bps);
        let sign = direction.sign();
        let tp_price = entry_price + sign * context.atr * candidate.rule.tp_atr;
        let sl_price = entry_price - sign * context.atr * candidate.rule.sl_atr;
        let levels = [entry_price, tp_price, sl_price];
        if !levels.iter().all(|p| p.is_finite() && *p > 0.0) {
            warn!(
                asset = %candidate.asset,
                entry_price,
                tp_price,
                sl_price,
                "non-positive price level, pick dropped"
            );
            return None;
        }
        let Some(expires_at) = TimeDelta::try_hours(self.config.pick_ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
        else {
            warn!(asset = %candidate.asset, ttl_hours = self.config.pick_ttl_hours, "expiry out of range, pick dropped");
            return None;
        };

        let names: Vec<&str> = candidate.engines.iter().map(|c| c.engine.as_str()).collect();
        let thesis = format!(
            "{} engines agree {} {} ({}), score {:.1}",
            names.len(),
            direction,
            candidate.asset,
            names.join(", "),
            candidate.score
        );

        Some(ConsensusPick {
            asset: candidate.asset.to_string(),
            direction,
            entry_price,
            tp_price,
            sl_price,
            consensus_score: candidate.score,
            engines: candidate.engines,
            tier: candidate.rule.tier,
            thesis,
            created_at: now,
            expires_at,
        })
    }
}

/// Keeps one direction per asset: the side with more engines, then the
/// higher score. An exact tie drops both sides.
fn resolve_conflicts(candidates: Vec<Candidate<'_>>) -> Vec<Candidate<'_>> {
    let mut by_asset: BTreeMap<&str, Vec<Candidate<'_>>> = BTreeMap::new();
    for candidate in candidates {
        by_asset.entry(candidate.asset).or_default().push(candidate);
    }

    let mut kept = Vec::new();
    for (asset, sides) in by_asset {
        // At most one candidate per direction, so at most two sides.
        let mut sides = sides.into_iter();
        match (sides.next(), sides.next()) {
            (Some(only), None) => kept.push(only),
            (Some(a), Some(b)) if a.stronger_than(&b) => {
                debug!(asset = %asset, kept = %a.direction, "conflicting directions resolved");
                kept.push(a);
            }
            (Some(a), Some(b)) if b.stronger_than(&a) => {
                debug!(asset = %asset, kept = %b.direction, "conflicting directions resolved");
                kept.push(b);
            }
            (Some(_), Some(_)) => {
                debug!(asset = %asset, "conflicting directions tied, both dropped");
            }
            (None, _) => {}
        }
    }
    kept
}

/// Fetches every source; failures become unavailable batches.
pub fn collect_batches(sources: &[&dyn EngineSource]) -> Vec<EngineBatch> {
    sources
        .iter()
        .map(|source| match source.fetch() {
            Ok(signals) => EngineBatch::available(source.name(), signals),
            Err(err) => {
                warn!(engine = source.name(), error = %err, "engine fetch failed");
                EngineBatch::unavailable(source.name(), err.to_string())
            }
        })
        .collect()
}
