//! Configuration validation.
//!
//! Validates every section before a run. Each check reads through the
//! section's `from_config` so defaults and overrides are validated the same
//! way they will be used.

use crate::domain::backtest::WalkForwardConfig;
use crate::domain::consensus::ConsensusConfig;
use crate::domain::error::SignalgradeError;
use crate::domain::execution::SimulatorConfig;
use crate::domain::indicator::IndicatorConfig;
use crate::domain::strategy::{
    CciWilliamsParams, MacdMomentumParams, OversoldReversalParams, StochasticCrossParams,
    StrategyId, TrendPullbackParams, VolumeBreakoutParams,
};
use crate::ports::config_port::ConfigPort;

pub fn validate_all(config: &dyn ConfigPort) -> Result<(), SignalgradeError> {
    validate_indicator_config(config)?;
    validate_simulator_config(config)?;
    validate_walk_forward_config(config)?;
    validate_strategy_config(config)?;
    validate_consensus_config(config)?;
    Ok(())
}

pub fn validate_indicator_config(config: &dyn ConfigPort) -> Result<(), SignalgradeError> {
    let c = IndicatorConfig::from_config(config);
    let periods = [
        ("ema_fast", c.ema_fast),
        ("ema_slow", c.ema_slow),
        ("ema_trend", c.ema_trend),
        ("sma_period", c.sma_period),
        ("wma_period", c.wma_period),
        ("hma_period", c.hma_period),
        ("vwma_period", c.vwma_period),
        ("rsi_period", c.rsi_period),
        ("atr_period", c.atr_period),
        ("adx_period", c.adx_period),
        ("bb_period", c.bb_period),
        ("macd_fast", c.macd_fast),
        ("macd_slow", c.macd_slow),
        ("macd_signal", c.macd_signal),
        ("stoch_k", c.stoch_k),
        ("stoch_smooth_k", c.stoch_smooth_k),
        ("stoch_smooth_d", c.stoch_smooth_d),
        ("cci_period", c.cci_period),
        ("williams_period", c.williams_period),
        ("uo_short", c.uo_short),
        ("uo_mid", c.uo_mid),
        ("uo_long", c.uo_long),
    ];
    if let Some((key, _)) = periods.iter().find(|(_, p)| *p == 0) {
        return Err(SignalgradeError::invalid("indicators", key, "period must be at least 1"));
    }
    if !(c.bb_multiplier.is_finite() && c.bb_multiplier > 0.0) {
        return Err(SignalgradeError::invalid(
            "indicators",
            "bb_multiplier",
            "must be greater than 0",
        ));
    }
    if c.macd_fast >= c.macd_slow {
        return Err(SignalgradeError::invalid(
            "indicators",
            "macd_fast",
            "must be shorter than macd_slow",
        ));
    }
    if c.ema_fast >= c.ema_slow {
        return Err(SignalgradeError::invalid(
            "indicators",
            "ema_fast",
            "must be shorter than ema_slow",
        ));
    }
    if !(c.uo_short < c.uo_mid && c.uo_mid < c.uo_long) {
        return Err(SignalgradeError::invalid(
            "indicators",
            "uo_short",
            "ultimate oscillator periods must be strictly increasing",
        ));
    }
    Ok(())
}

pub fn validate_simulator_config(config: &dyn ConfigPort) -> Result<(), SignalgradeError> {
    SimulatorConfig::from_config(config).validate()
}

pub fn validate_walk_forward_config(config: &dyn ConfigPort) -> Result<(), SignalgradeError> {
    WalkForwardConfig::from_config(config).validate()
}

pub fn validate_consensus_config(config: &dyn ConfigPort) -> Result<(), SignalgradeError> {
    ConsensusConfig::from_config(config).validate()
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), SignalgradeError> {
    let oversold = OversoldReversalParams::from_config(config);
    check_range(
        StrategyId::OversoldReversal,
        "rsi_threshold",
        oversold.rsi_threshold,
        0.0,
        50.0,
    )?;

    let pullback = TrendPullbackParams::from_config(config);
    check_range(StrategyId::TrendPullback, "pullback_rsi", pullback.pullback_rsi, 0.0, 50.0)?;
    check_range(StrategyId::TrendPullback, "adx_min", pullback.adx_min, 0.0, 100.0)?;

    let macd = MacdMomentumParams::from_config(config);
    check_range(StrategyId::MacdMomentum, "di_margin", macd.di_margin, 0.0, 100.0)?;

    let stoch = StochasticCrossParams::from_config(config);
    check_range(StrategyId::StochasticCross, "oversold", stoch.oversold, 0.0, 50.0)?;
    check_range(StrategyId::StochasticCross, "overbought", stoch.overbought, 50.0, 100.0)?;

    let cci = CciWilliamsParams::from_config(config);
    check_range(StrategyId::CciWilliams, "cci_threshold", cci.cci_threshold, 0.0, 500.0)?;
    check_range(
        StrategyId::CciWilliams,
        "williams_oversold",
        cci.williams_oversold,
        -100.0,
        -50.0,
    )?;
    check_range(
        StrategyId::CciWilliams,
        "williams_overbought",
        cci.williams_overbought,
        -50.0,
        0.0,
    )?;

    let breakout = VolumeBreakoutParams::from_config(config);
    check_range(StrategyId::VolumeBreakout, "uo_threshold", breakout.uo_threshold, 0.0, 100.0)?;
    Ok(())
}

/// `value` must lie in the closed range `[min, max]`.
fn check_range(
    id: StrategyId,
    key: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), SignalgradeError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SignalgradeError::invalid(
            &id.section(),
            key,
            format!("must be between {min} and {max}"),
        ))
    }
}
