//! Aligned indicator container.
//!
//! `IndicatorSet` holds one series per `IndicatorKind`, all the same length as
//! the candles they were computed from. Alignment is checked once at
//! construction so strategies can index every series with the same bar index.

use chrono::NaiveDateTime;

use crate::domain::error::SignalgradeError;
use crate::domain::indicator::{
    adx, atr, bollinger, cci, ema, macd, obv, rsi, sma, stochastic, ultimate, vwma, williams_r,
    wma, IndicatorKind,
};
use crate::domain::ohlcv::{closes, Candle};
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "indicators";

/// Periods and multipliers for every computed series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub ema_trend: usize,
    pub sma_period: usize,
    pub wma_period: usize,
    pub hma_period: usize,
    pub vwma_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub bb_period: usize,
    pub bb_multiplier: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_k: usize,
    pub stoch_smooth_k: usize,
    pub stoch_smooth_d: usize,
    pub cci_period: usize,
    pub williams_period: usize,
    pub uo_short: usize,
    pub uo_mid: usize,
    pub uo_long: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        let (uo_short, uo_mid, uo_long) = ultimate::DEFAULT_PERIODS;
        Self {
            ema_fast: 12,
            ema_slow: 26,
            ema_trend: 200,
            sma_period: 50,
            wma_period: 20,
            hma_period: 21,
            vwma_period: 20,
            rsi_period: 14,
            atr_period: 14,
            adx_period: 14,
            bb_period: bollinger::DEFAULT_PERIOD,
            bb_multiplier: bollinger::DEFAULT_MULTIPLIER,
            macd_fast: macd::DEFAULT_FAST,
            macd_slow: macd::DEFAULT_SLOW,
            macd_signal: macd::DEFAULT_SIGNAL,
            stoch_k: 14,
            stoch_smooth_k: 3,
            stoch_smooth_d: 3,
            cci_period: 20,
            williams_period: 14,
            uo_short,
            uo_mid,
            uo_long,
        }
    }
}

impl IndicatorConfig {
    /// Reads `[indicators]`; absent keys keep their defaults. Range checks
    /// live in `config_validation::validate_indicator_config`.
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let d = Self::default();
        let period = |key: &str, default: usize| -> usize {
            config.get_int(SECTION, key, default as i64).max(0) as usize
        };
        Self {
            ema_fast: period("ema_fast", d.ema_fast),
            ema_slow: period("ema_slow", d.ema_slow),
            ema_trend: period("ema_trend", d.ema_trend),
            sma_period: period("sma_period", d.sma_period),
            wma_period: period("wma_period", d.wma_period),
            hma_period: period("hma_period", d.hma_period),
            vwma_period: period("vwma_period", d.vwma_period),
            rsi_period: period("rsi_period", d.rsi_period),
            atr_period: period("atr_period", d.atr_period),
            adx_period: period("adx_period", d.adx_period),
            bb_period: period("bb_period", d.bb_period),
            bb_multiplier: config.get_double(SECTION, "bb_multiplier", d.bb_multiplier),
            macd_fast: period("macd_fast", d.macd_fast),
            macd_slow: period("macd_slow", d.macd_slow),
            macd_signal: period("macd_signal", d.macd_signal),
            stoch_k: period("stoch_k", d.stoch_k),
            stoch_smooth_k: period("stoch_smooth_k", d.stoch_smooth_k),
            stoch_smooth_d: period("stoch_smooth_d", d.stoch_smooth_d),
            cci_period: period("cci_period", d.cci_period),
            williams_period: period("williams_period", d.williams_period),
            uo_short: period("uo_short", d.uo_short),
            uo_mid: period("uo_mid", d.uo_mid),
            uo_long: period("uo_long", d.uo_long),
        }
    }

    /// Index of the first bar at which `kind` is fully formed.
    pub fn warmup(&self, kind: IndicatorKind) -> usize {
        let lag = |p: usize| p.saturating_sub(1);
        match kind {
            IndicatorKind::Close | IndicatorKind::Obv => 0,
            IndicatorKind::EmaFast => lag(self.ema_fast),
            IndicatorKind::EmaSlow => lag(self.ema_slow),
            IndicatorKind::EmaTrend => lag(self.ema_trend),
            IndicatorKind::Sma => lag(self.sma_period),
            IndicatorKind::Wma => lag(self.wma_period),
            IndicatorKind::Hma => wma::hma_warmup(self.hma_period),
            IndicatorKind::Vwma => lag(self.vwma_period),
            IndicatorKind::Rsi => self.rsi_period,
            IndicatorKind::Atr => lag(self.atr_period),
            IndicatorKind::Adx => (2 * self.adx_period).saturating_sub(1),
            IndicatorKind::PlusDi | IndicatorKind::MinusDi => self.adx_period,
            IndicatorKind::BollingerUpper
            | IndicatorKind::BollingerMiddle
            | IndicatorKind::BollingerLower => lag(self.bb_period),
            IndicatorKind::MacdLine => lag(self.macd_slow),
            IndicatorKind::MacdSignal | IndicatorKind::MacdHistogram => {
                macd::macd_warmup(self.macd_slow, self.macd_signal)
            }
            IndicatorKind::StochK => lag(self.stoch_k) + lag(self.stoch_smooth_k),
            IndicatorKind::StochD => {
                stochastic::stochastic_warmup(self.stoch_k, self.stoch_smooth_k, self.stoch_smooth_d)
            }
            IndicatorKind::Cci => lag(self.cci_period),
            IndicatorKind::WilliamsR => lag(self.williams_period),
            IndicatorKind::Ultimate => self.uo_short.max(self.uo_mid).max(self.uo_long),
        }
    }
}

/// Every indicator series for one asset, aligned bar-for-bar.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    timestamps: Vec<NaiveDateTime>,
    series: Vec<Vec<f64>>,
    warmups: Vec<usize>,
}

impl IndicatorSet {
    /// Computes every `IndicatorKind` from `candles`.
    pub fn compute(candles: &[Candle], config: &IndicatorConfig) -> Result<Self, SignalgradeError> {
        let close = closes(candles);
        let adx = adx::calculate_adx(candles, config.adx_period);
        let bands = bollinger::calculate_bollinger(&close, config.bb_period, config.bb_multiplier);
        let macd = macd::calculate_macd(
            &close,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        );
        let stoch = stochastic::calculate_stochastic(
            candles,
            config.stoch_k,
            config.stoch_smooth_k,
            config.stoch_smooth_d,
        );

        let mut computed = vec![
            (IndicatorKind::EmaFast, ema::calculate_ema(&close, config.ema_fast)),
            (IndicatorKind::EmaSlow, ema::calculate_ema(&close, config.ema_slow)),
            (IndicatorKind::EmaTrend, ema::calculate_ema(&close, config.ema_trend)),
            (IndicatorKind::Sma, sma::calculate_sma(&close, config.sma_period)),
            (IndicatorKind::Wma, wma::calculate_wma(&close, config.wma_period)),
            (IndicatorKind::Hma, wma::calculate_hma(&close, config.hma_period)),
            (IndicatorKind::Vwma, vwma::calculate_vwma(candles, config.vwma_period)),
            (IndicatorKind::Rsi, rsi::calculate_rsi(&close, config.rsi_period)),
            (IndicatorKind::Atr, atr::calculate_atr(candles, config.atr_period)),
            (IndicatorKind::Adx, adx.adx),
            (IndicatorKind::PlusDi, adx.plus_di),
            (IndicatorKind::MinusDi, adx.minus_di),
            (IndicatorKind::BollingerUpper, bands.upper),
            (IndicatorKind::BollingerMiddle, bands.middle),
            (IndicatorKind::BollingerLower, bands.lower),
            (IndicatorKind::MacdLine, macd.line),
            (IndicatorKind::MacdSignal, macd.signal),
            (IndicatorKind::MacdHistogram, macd.histogram),
            (IndicatorKind::StochK, stoch.k),
            (IndicatorKind::StochD, stoch.d),
            (IndicatorKind::Cci, cci::calculate_cci(candles, config.cci_period)),
            (
                IndicatorKind::WilliamsR,
                williams_r::calculate_williams_r(candles, config.williams_period),
            ),
            (
                IndicatorKind::Ultimate,
                ultimate::calculate_ultimate(candles, config.uo_short, config.uo_mid, config.uo_long),
            ),
            (IndicatorKind::Obv, obv::calculate_obv(candles)),
        ];
        computed.insert(0, (IndicatorKind::Close, close));

        let timestamps = candles.iter().map(|c| c.timestamp).collect();
        let mut set = Self::from_series(timestamps, computed)?;
        for kind in IndicatorKind::ALL {
            set.warmups[kind.index()] = config.warmup(kind);
        }
        Ok(set)
    }

    /// Builds a set from precomputed series. Supplied kinds are ready from
    /// index 0; kinds not supplied hold their neutral value and never become
    /// ready. Every series must match the timestamp count.
    pub fn from_series(
        timestamps: Vec<NaiveDateTime>,
        series: Vec<(IndicatorKind, Vec<f64>)>,
    ) -> Result<Self, SignalgradeError> {
        let len = timestamps.len();
        let mut slots: Vec<Vec<f64>> = IndicatorKind::ALL
            .iter()
            .map(|kind| vec![kind.neutral(); len])
            .collect();
        let mut warmups = vec![usize::MAX; IndicatorKind::ALL.len()];

        for (kind, values) in series {
            if values.len() != len {
                return Err(SignalgradeError::MisalignedSeries {
                    kind,
                    expected: len,
                    actual: values.len(),
                });
            }
            slots[kind.index()] = values;
            warmups[kind.index()] = 0;
        }

        Ok(Self {
            timestamps,
            series: slots,
            warmups,
        })
    }

    /// Overrides the warm-up length of one kind.
    pub fn with_warmup(mut self, kind: IndicatorKind, warmup: usize) -> Self {
        self.warmups[kind.index()] = warmup;
        self
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn series(&self, kind: IndicatorKind) -> &[f64] {
        &self.series[kind.index()]
    }

    /// Value of `kind` at `index`; the kind's neutral value past the end.
    pub fn value(&self, kind: IndicatorKind, index: usize) -> f64 {
        self.series[kind.index()]
            .get(index)
            .copied()
            .unwrap_or_else(|| kind.neutral())
    }

    pub fn warmup(&self, kind: IndicatorKind) -> usize {
        self.warmups[kind.index()]
    }

    /// True when `index` is in range and every kind in `kinds` is past its warm-up.
    pub fn ready(&self, kinds: &[IndicatorKind], index: usize) -> bool {
        index < self.len() && kinds.iter().all(|k| self.warmup(*k) <= index)
    }

    pub fn snapshot(&self, index: usize) -> Option<IndicatorSnapshot> {
        let timestamp = *self.timestamps.get(index)?;
        let values = IndicatorKind::ALL
            .iter()
            .map(|kind| (*kind, self.series[kind.index()][index]))
            .collect();
        Some(IndicatorSnapshot {
            index,
            timestamp,
            values,
        })
    }
}

/// Every indicator value at one bar, in `IndicatorKind::ALL` order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IndicatorSnapshot {
    pub index: usize,
    pub timestamp: NaiveDateTime,
    pub values: Vec<(IndicatorKind, f64)>,
}

impl IndicatorSnapshot {
    pub fn get(&self, kind: IndicatorKind) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, v)| *v)
    }
}
