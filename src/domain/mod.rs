//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod strategy;
pub mod backtest;
pub mod metrics;
pub mod consensus;
pub mod universe;
pub mod scan;
pub mod config_validation;
pub mod error;
