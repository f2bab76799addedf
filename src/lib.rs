//! signalgrade: indicator-driven strategy backtesting and consensus grading.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`]. [`cli`] wires them together.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
