#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use signalgrade::domain::consensus::{AssetContext, EngineSignal, LiquidityClass};
use signalgrade::domain::error::SignalgradeError;
pub use signalgrade::domain::ohlcv::Candle;
use signalgrade::domain::signal::Direction;
use signalgrade::ports::data_port::DataPort;
use signalgrade::ports::engine_port::EngineSource;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, asset: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(asset.to_string(), candles);
        self
    }

    pub fn with_error(mut self, asset: &str, reason: &str) -> Self {
        self.errors.insert(asset.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_candles(&self, asset: &str) -> Result<Vec<Candle>, SignalgradeError> {
        if let Some(reason) = self.errors.get(asset) {
            return Err(SignalgradeError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(asset).cloned().unwrap_or_default())
    }

    fn list_assets(&self) -> Result<Vec<String>, SignalgradeError> {
        let mut assets: Vec<String> = self.data.keys().cloned().collect();
        assets.sort();
        Ok(assets)
    }
}

/// Engine returning a fixed batch, or failing with `reason`.
pub struct MockEngine {
    pub name: String,
    pub signals: Vec<EngineSignal>,
    pub failure: Option<String>,
}

impl MockEngine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            signals: Vec::new(),
            failure: None,
        }
    }

    pub fn signal(mut self, asset: &str, direction: Direction, confidence: f64) -> Self {
        self.signals
            .push(EngineSignal::new(&self.name, asset, direction, confidence));
        self
    }

    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }
}

impl EngineSource for MockEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Vec<EngineSignal>, SignalgradeError> {
        match &self.failure {
            Some(reason) => Err(SignalgradeError::EngineUnavailable {
                engine: self.name.clone(),
                reason: reason.clone(),
            }),
            None => Ok(self.signals.clone()),
        }
    }
}

pub fn timestamp(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::hours(i as i64)
}

pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Candle with a one-point range centered on `close`.
pub fn make_candle(i: usize, close: f64) -> Candle {
    Candle {
        timestamp: timestamp(i),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000.0,
    }
}

pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_candle(i, c))
        .collect()
}

/// `count` candles on a gentle sine wave around `base`.
pub fn generate_candles(count: usize, base: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let close = base + (i as f64 / 7.0).sin() * base * 0.05 + i as f64 * 0.01;
            Candle {
                timestamp: timestamp(i),
                open: close - 0.2,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0 + (i % 10) as f64 * 50.0,
            }
        })
        .collect()
}

/// 40 flat bars at 100, a slide to 50, then a recovery back to 100.
pub fn v_dip_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 40];
    closes.extend([90.0, 80.0, 70.0, 60.0, 50.0]);
    closes.extend((1..=10).map(|k| 50.0 + 5.0 * k as f64));
    closes
}

pub fn context(asset: &str, price: f64, atr: f64) -> AssetContext {
    AssetContext {
        asset: asset.to_string(),
        price,
        atr,
        liquidity: LiquidityClass::Mid,
    }
}

pub fn contexts(entries: &[(&str, f64, f64)]) -> HashMap<String, AssetContext> {
    entries
        .iter()
        .map(|(asset, price, atr)| (asset.to_string(), context(asset, *price, *atr)))
        .collect()
}
