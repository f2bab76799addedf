//! Asset universe for multi-asset runs.
//!
//! Parses asset lists from the command line or configuration and keeps only
//! assets with enough candles for the longest indicator warm-up.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::domain::error::SignalgradeError;
use crate::domain::ohlcv::{Candle, MIN_CANDLES};
use crate::ports::data_port::DataPort;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in asset list")]
    EmptyToken,

    #[error("duplicate asset: {0}")]
    DuplicateAsset(String),
}

pub fn parse_assets(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut assets = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let asset = trimmed.to_uppercase();
        if !seen.insert(asset.clone()) {
            return Err(UniverseError::DuplicateAsset(asset));
        }
        assets.push(asset);
    }

    Ok(assets)
}

/// An asset that passed validation, with the candles that were loaded for it.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub asset: String,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientCandles { candles: usize },
}

#[derive(Debug, Clone)]
pub struct SkippedAsset {
    pub asset: String,
    pub reason: SkipReason,
}

pub struct UniverseValidationResult {
    pub loaded: Vec<LoadedAsset>,
    pub skipped: Vec<SkippedAsset>,
}

/// Loads every asset and skips those with no data or fewer than `minimum`
/// candles. Fails only when nothing survives.
pub fn validate_universe(
    data_port: &dyn DataPort,
    assets: Vec<String>,
    minimum: usize,
) -> Result<UniverseValidationResult, SignalgradeError> {
    let mut loaded = Vec::new();
    let mut skipped = Vec::new();

    for asset in assets {
        let candles = match data_port.fetch_candles(&asset) {
            Ok(candles) if !candles.is_empty() => candles,
            Ok(_) => {
                warn!(asset = %asset, "skipping asset: no data");
                skipped.push(SkippedAsset {
                    asset,
                    reason: SkipReason::NoData,
                });
                continue;
            }
            Err(e) => {
                warn!(asset = %asset, error = %e, "skipping asset");
                skipped.push(SkippedAsset {
                    asset,
                    reason: SkipReason::NoData,
                });
                continue;
            }
        };

        if candles.len() < minimum {
            warn!(
                asset = %asset,
                candles = candles.len(),
                minimum,
                "skipping asset: insufficient candles"
            );
            skipped.push(SkippedAsset {
                asset,
                reason: SkipReason::InsufficientCandles {
                    candles: candles.len(),
                },
            });
            continue;
        }

        info!(asset = %asset, candles = candles.len(), "asset loaded");
        loaded.push(LoadedAsset { asset, candles });
    }

    if loaded.is_empty() {
        return Err(SignalgradeError::InsufficientData {
            asset: "all".to_string(),
            bars: 0,
            minimum,
        });
    }

    if !skipped.is_empty() {
        info!(
            kept = loaded.len(),
            total = loaded.len() + skipped.len(),
            "universe reduced"
        );
    }

    Ok(UniverseValidationResult { loaded, skipped })
}

/// `validate_universe` with the default minimum of `MIN_CANDLES`.
pub fn load_universe(
    data_port: &dyn DataPort,
    assets: Vec<String>,
) -> Result<UniverseValidationResult, SignalgradeError> {
    validate_universe(data_port, assets, MIN_CANDLES)
}
