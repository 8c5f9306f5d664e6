use super::traits::ConfigSection;
use crate::engines::evaluation::{BenchmarkPolicy, MarketOptions};
use crate::error::{Result, TradegeneError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Half-open date window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub data_dir: PathBuf,
    /// Symbols to trade; empty means every CSV in `data_dir`
    pub symbols: Vec<String>,
    /// Evaluation threads, 0 for one per core
    pub workers: usize,
    pub benchmark_policy: BenchmarkPolicy,
    pub train: DateRange,
    pub test: DateRange,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            symbols: Vec::new(),
            workers: 0,
            benchmark_policy: BenchmarkPolicy::Exclude,
            train: DateRange::new(DateRange::ymd(2016, 3, 1), DateRange::ymd(2017, 12, 29)),
            test: DateRange::new(DateRange::ymd(2018, 1, 2), DateRange::ymd(2018, 12, 28)),
        }
    }
}

impl MarketSettings {
    pub fn options(&self) -> MarketOptions {
        MarketOptions {
            workers: self.workers,
            benchmark_policy: self.benchmark_policy,
        }
    }
}

impl ConfigSection for MarketSettings {
    fn section_name() -> &'static str {
        "market"
    }

    fn validate(&self) -> Result<()> {
        for (name, range) in [("train", &self.train), ("test", &self.test)] {
            if range.start >= range.end {
                return Err(TradegeneError::Configuration(format!(
                    "market.{} starts on {} but ends on {}",
                    name, range.start, range.end
                )));
            }
        }
        if self.symbols.iter().any(|s| s.trim().is_empty()) {
            return Err(TradegeneError::Configuration(
                "market.symbols contains an empty symbol".to_string(),
            ));
        }
        Ok(())
    }
}
