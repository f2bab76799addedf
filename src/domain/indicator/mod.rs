//! Technical indicator implementations.
//!
//! Each submodule exposes a pure `calculate_*` function returning series of
//! the same length as its input. Warm-up indices and series too short for the
//! period are filled with a documented neutral value, never NaN.
//!
//! - `IndicatorKind`: identity of every series the strategies can read
//! - `IndicatorSet`: the aligned, typed container built from candles

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod cci;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod set;
pub mod sma;
pub mod stddev;
pub mod stochastic;
pub mod ultimate;
pub mod vwma;
pub mod williams_r;
pub mod wma;

pub use set::{IndicatorConfig, IndicatorSet, IndicatorSnapshot};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum IndicatorKind {
    Close,
    EmaFast,
    EmaSlow,
    EmaTrend,
    Sma,
    Wma,
    Hma,
    Vwma,
    Rsi,
    Atr,
    Adx,
    PlusDi,
    MinusDi,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    StochK,
    StochD,
    Cci,
    WilliamsR,
    Ultimate,
    Obv,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 25] = [
        IndicatorKind::Close,
        IndicatorKind::EmaFast,
        IndicatorKind::EmaSlow,
        IndicatorKind::EmaTrend,
        IndicatorKind::Sma,
        IndicatorKind::Wma,
        IndicatorKind::Hma,
        IndicatorKind::Vwma,
        IndicatorKind::Rsi,
        IndicatorKind::Atr,
        IndicatorKind::Adx,
        IndicatorKind::PlusDi,
        IndicatorKind::MinusDi,
        IndicatorKind::BollingerUpper,
        IndicatorKind::BollingerMiddle,
        IndicatorKind::BollingerLower,
        IndicatorKind::MacdLine,
        IndicatorKind::MacdSignal,
        IndicatorKind::MacdHistogram,
        IndicatorKind::StochK,
        IndicatorKind::StochD,
        IndicatorKind::Cci,
        IndicatorKind::WilliamsR,
        IndicatorKind::Ultimate,
        IndicatorKind::Obv,
    ];

    /// Position of this kind in `ALL`, used as the storage slot in `IndicatorSet`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Value a series of this kind holds where it is not yet defined.
    pub fn neutral(self) -> f64 {
        match self {
            IndicatorKind::Rsi => rsi::RSI_NEUTRAL,
            IndicatorKind::Adx => adx::ADX_NEUTRAL,
            IndicatorKind::StochK | IndicatorKind::StochD => stochastic::STOCH_NEUTRAL,
            IndicatorKind::WilliamsR => williams_r::WILLIAMS_NEUTRAL,
            IndicatorKind::Ultimate => ultimate::UO_NEUTRAL,
            _ => 0.0,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IndicatorKind::Close => "CLOSE",
            IndicatorKind::EmaFast => "EMA_FAST",
            IndicatorKind::EmaSlow => "EMA_SLOW",
            IndicatorKind::EmaTrend => "EMA_TREND",
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Wma => "WMA",
            IndicatorKind::Hma => "HMA",
            IndicatorKind::Vwma => "VWMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Atr => "ATR",
            IndicatorKind::Adx => "ADX",
            IndicatorKind::PlusDi => "PLUS_DI",
            IndicatorKind::MinusDi => "MINUS_DI",
            IndicatorKind::BollingerUpper => "BB_UPPER",
            IndicatorKind::BollingerMiddle => "BB_MIDDLE",
            IndicatorKind::BollingerLower => "BB_LOWER",
            IndicatorKind::MacdLine => "MACD",
            IndicatorKind::MacdSignal => "MACD_SIGNAL",
            IndicatorKind::MacdHistogram => "MACD_HIST",
            IndicatorKind::StochK => "STOCH_K",
            IndicatorKind::StochD => "STOCH_D",
            IndicatorKind::Cci => "CCI",
            IndicatorKind::WilliamsR => "WILLIAMS_R",
            IndicatorKind::Ultimate => "ULTIMATE",
            IndicatorKind::Obv => "OBV",
        };
        f.write_str(label)
    }
}
