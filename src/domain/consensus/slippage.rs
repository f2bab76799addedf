//! Liquidity classes and entry slippage.
//!
//! Slippage is quoted in basis points and always moves the entry against the
//! trader: longs fill higher, shorts fill lower.

use std::fmt;
use std::str::FromStr;

use crate::domain::signal::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LiquidityClass {
    Major,
    #[default]
    Mid,
    Thin,
}

impl fmt::Display for LiquidityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LiquidityClass::Major => "major",
            LiquidityClass::Mid => "mid",
            LiquidityClass::Thin => "thin",
        };
        f.write_str(label)
    }
}

impl FromStr for LiquidityClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "major" => Ok(LiquidityClass::Major),
            "mid" => Ok(LiquidityClass::Mid),
            "thin" => Ok(LiquidityClass::Thin),
            other => Err(format!("unknown liquidity class: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SlippageTable {
    pub major_bps: f64,
    pub mid_bps: f64,
    pub thin_bps: f64,
}

impl Default for SlippageTable {
    fn default() -> Self {
        SlippageTable {
            major_bps: 5.0,
            mid_bps: 15.0,
            thin_bps: 40.0,
        }
    }
}

impl SlippageTable {
    pub fn bps(&self, class: LiquidityClass) -> f64 {
        match class {
            LiquidityClass::Major => self.major_bps,
            LiquidityClass::Mid => self.mid_bps,
            LiquidityClass::Thin => self.thin_bps,
        }
    }
}

/// Long entry (buy): price * (1 + bps / 10_000)
pub fn apply_slippage_long_entry(market_price: f64, bps: f64) -> f64 {
    market_price * (1.0 + bps / 10_000.0)
}

/// Short entry (sell): price * (1 - bps / 10_000)
pub fn apply_slippage_short_entry(market_price: f64, bps: f64) -> f64 {
    market_price * (1.0 - bps / 10_000.0)
}

pub fn entry_price(market_price: f64, direction: Direction, bps: f64) -> f64 {
    match direction {
        Direction::Long => apply_slippage_long_entry(market_price, bps),
        Direction::Short => apply_slippage_short_entry(market_price, bps),
    }
}
