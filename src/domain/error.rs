//! Domain error types.
//!
//! Numerical code never produces these: indicators, strategies, the simulator
//! and the consensus engine degrade to documented fallbacks instead. Errors
//! only surface at construction and adapter boundaries.

use crate::domain::indicator::IndicatorKind;
use crate::domain::universe::UniverseError;

/// Top-level error type for signalgrade.
#[derive(Debug, thiserror::Error)]
pub enum SignalgradeError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {asset}")]
    NoData { asset: String },

    #[error("insufficient data for {asset}: have {bars} candles, need {minimum}")]
    InsufficientData {
        asset: String,
        bars: usize,
        minimum: usize,
    },

    #[error("indicator series {kind} has length {actual}, expected {expected}")]
    MisalignedSeries {
        kind: IndicatorKind,
        expected: usize,
        actual: usize,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("engine {engine} unavailable: {reason}")]
    EngineUnavailable { engine: String, reason: String },

    #[error("invalid asset list: {0}")]
    Universe(#[from] UniverseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SignalgradeError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SignalgradeError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SignalgradeError> for std::process::ExitCode {
    fn from(err: &SignalgradeError) -> Self {
        let code: u8 = match err {
            SignalgradeError::Io(_) => 1,
            SignalgradeError::ConfigParse { .. }
            | SignalgradeError::ConfigMissing { .. }
            | SignalgradeError::ConfigInvalid { .. }
            | SignalgradeError::UnknownStrategy { .. }
            | SignalgradeError::Universe(_) => 2,
            SignalgradeError::Data { .. } => 3,
            SignalgradeError::NoData { .. } | SignalgradeError::InsufficientData { .. } => 5,
            SignalgradeError::MisalignedSeries { .. } => 6,
            SignalgradeError::EngineUnavailable { .. } => 7,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_helper_names_section_and_key() {
        let err = SignalgradeError::invalid("simulator", "max_hold", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config value [simulator] max_hold: must be at least 1"
        );
    }

    #[test]
    fn misaligned_series_message() {
        let err = SignalgradeError::MisalignedSeries {
            kind: IndicatorKind::Rsi,
            expected: 10,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "indicator series RSI has length 9, expected 10"
        );
    }

    #[test]
    fn insufficient_data_message() {
        let err = SignalgradeError::InsufficientData {
            asset: "BTC".into(),
            bars: 50,
            minimum: 210,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for BTC: have 50 candles, need 210"
        );
    }
}
