//! Trade direction and per-bar strategy signal.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Output of a strategy at one bar. `strength` is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Signal {
    Long { strength: f64 },
    Short { strength: f64 },
    Flat,
}

impl Signal {
    pub fn long(strength: f64) -> Self {
        Signal::Long {
            strength: clamp_strength(strength),
        }
    }

    pub fn short(strength: f64) -> Self {
        Signal::Short {
            strength: clamp_strength(strength),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Signal::Long { .. } => Some(Direction::Long),
            Signal::Short { .. } => Some(Direction::Short),
            Signal::Flat => None,
        }
    }

    pub fn strength(&self) -> f64 {
        match self {
            Signal::Long { strength } | Signal::Short { strength } => *strength,
            Signal::Flat => 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Signal::Flat)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction() {
            Some(direction) => write!(f, "{} ({:.2})", direction, self.strength()),
            None => write!(f, "FLAT"),
        }
    }
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_finite() {
        strength.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_sign_and_opposite() {
        assert_eq!(Direction::Long.sign(), 1.0);
        assert_eq!(Direction::Short.sign(), -1.0);
        assert_eq!(Direction::Long.opposite(), Direction::Short);
    }

    #[test]
    fn direction_parse() {
        assert_eq!("LONG".parse::<Direction>(), Ok(Direction::Long));
        assert_eq!(" sell ".parse::<Direction>(), Ok(Direction::Short));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn signal_strength_is_clamped() {
        assert_eq!(Signal::long(1.7).strength(), 1.0);
        assert_eq!(Signal::short(-0.2).strength(), 0.0);
        assert_eq!(Signal::long(f64::NAN).strength(), 0.0);
    }

    #[test]
    fn flat_signal() {
        assert!(Signal::Flat.is_flat());
        assert_eq!(Signal::Flat.direction(), None);
        assert_eq!(Signal::Flat.to_string(), "FLAT");
        assert_eq!(Signal::long(0.5).to_string(), "LONG (0.50)");
    }
}
