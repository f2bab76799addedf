//! Strategy bundle as a consensus engine.
//!
//! Evaluates a registry of strategies at the latest bar of each asset and
//! reports the majority direction. Confidence is the share of the whole
//! bundle that agrees, so a bundle of six with four LONG votes reports
//! LONG at 66.7. Ties and all-flat assets produce no signal.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::domain::consensus::{AssetContext, EngineSignal, LiquidityClass};
use crate::domain::error::SignalgradeError;
use crate::domain::indicator::{IndicatorConfig, IndicatorKind, IndicatorSet};
use crate::domain::scan::{scan_latest, LiveSignal};
use crate::domain::signal::Direction;
use crate::domain::strategy::StrategyRegistry;
use crate::domain::universe::LoadedAsset;
use crate::ports::engine_port::EngineSource;

pub struct StrategyBundleEngine {
    name: String,
    registry: StrategyRegistry,
    indicator_config: IndicatorConfig,
    assets: Vec<LoadedAsset>,
}

impl StrategyBundleEngine {
    pub fn new(
        name: &str,
        registry: StrategyRegistry,
        indicator_config: IndicatorConfig,
        assets: Vec<LoadedAsset>,
    ) -> Self {
        Self {
            name: name.to_string(),
            registry,
            indicator_config,
            assets,
        }
    }

    fn vote(&self, asset: &str, signals: &[LiveSignal]) -> Option<EngineSignal> {
        let bundle = self.registry.len();
        if bundle == 0 {
            return None;
        }
        let longs: Vec<&LiveSignal> = signals
            .iter()
            .filter(|s| s.signal.direction() == Some(Direction::Long))
            .collect();
        let shorts: Vec<&LiveSignal> = signals
            .iter()
            .filter(|s| s.signal.direction() == Some(Direction::Short))
            .collect();

        let (direction, agreeing) = match longs.len().cmp(&shorts.len()) {
            std::cmp::Ordering::Greater => (Direction::Long, longs),
            std::cmp::Ordering::Less => (Direction::Short, shorts),
            std::cmp::Ordering::Equal => return None,
        };

        let confidence = 100.0 * agreeing.len() as f64 / bundle as f64;
        let mut signal = EngineSignal::new(&self.name, asset, direction, confidence);
        let names: Vec<&str> = agreeing.iter().map(|s| s.strategy.as_str()).collect();
        signal.metadata.insert("strategies".into(), names.join(","));
        Some(signal)
    }
}

impl EngineSource for StrategyBundleEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<EngineSignal>, SignalgradeError> {
        let signals: Vec<EngineSignal> = self
            .assets
            .par_iter()
            .filter_map(|loaded| {
                match IndicatorSet::compute(&loaded.candles, &self.indicator_config) {
                    Ok(set) => self.vote(&loaded.asset, &scan_latest(&self.registry, &set)),
                    Err(e) => {
                        warn!(asset = %loaded.asset, error = %e, "skipping asset in bundle");
                        None
                    }
                }
            })
            .collect();
        debug!(engine = %self.name, signals = signals.len(), "bundle evaluated");
        Ok(signals)
    }
}

/// Grading context from the last bar: latest close and ATR. `None` when
/// the series is empty.
pub fn latest_context(
    asset: &str,
    indicators: &IndicatorSet,
    liquidity: LiquidityClass,
) -> Option<AssetContext> {
    let last = indicators.len().checked_sub(1)?;
    Some(AssetContext {
        asset: asset.to_ascii_uppercase(),
        price: indicators.value(IndicatorKind::Close, last),
        atr: indicators.value(IndicatorKind::Atr, last),
        liquidity,
    })
}
