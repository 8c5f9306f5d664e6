use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul};

/// Daily trading decision emitted by rules and agents.
///
/// Decisions project onto integers (Buy = +1, Sell = -1, Hold = 0) so that
/// weighted votes can be built with plain arithmetic:
///
/// ```
/// use tradegene::types::Decision;
/// let vote = Decision::Buy * 0.7 + Decision::Sell * 0.2;
/// assert_eq!(Decision::from_vote(vote), Decision::Buy);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Buy,
    Sell,
    Hold,
}

impl Decision {
    pub fn value(self) -> i32 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
            Self::Hold => 0,
        }
    }

    /// Map the sign of a vote to a decision. Exact zero is Hold.
    pub fn from_vote(vote: f64) -> Self {
        if vote > 0.0 {
            Self::Buy
        } else if vote < 0.0 {
            Self::Sell
        } else {
            Self::Hold
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        };
        f.write_str(name)
    }
}

impl From<Decision> for f64 {
    fn from(decision: Decision) -> f64 {
        decision.value() as f64
    }
}

impl Mul<f64> for Decision {
    type Output = f64;

    fn mul(self, weight: f64) -> f64 {
        self.value() as f64 * weight
    }
}

impl Mul<Decision> for f64 {
    type Output = f64;

    fn mul(self, decision: Decision) -> f64 {
        self * decision.value() as f64
    }
}

impl Add<f64> for Decision {
    type Output = f64;

    fn add(self, other: f64) -> f64 {
        self.value() as f64 + other
    }
}

impl Add<Decision> for f64 {
    type Output = f64;

    fn add(self, decision: Decision) -> f64 {
        self + decision.value() as f64
    }
}

impl Add for Decision {
    type Output = i32;

    fn add(self, other: Decision) -> i32 {
        self.value() + other.value()
    }
}

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Bar with every price field set to `close`; handy for close-only series.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }

    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Completed round trip of the single-unit position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub entry_bar: usize,
    pub exit_bar: usize,
    pub entry_price: f64,
    pub exit_price: f64,
    pub profit: f64,
    pub exit_reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    Signal,
    EndOfData,
}

/// Fitness summary of one evaluated generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best: f64,
    pub avg: f64,
}
