use crate::{
    data::PriceSeries,
    engines::evaluation::{agent::TradingAgent, portfolio::Portfolio},
    error::{Result, TradegeneError},
    types::Trade,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::{ops::Range, sync::Arc};

/// Outcome of one agent over one instrument
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub symbol: String,
    pub revenue: f64,
    pub trades: Vec<Trade>,
}

/// Replays one instrument between two dates.
///
/// Trading days are the bars from the first one dated on or after
/// `start_date` up to, but excluding, the first one dated on or after
/// `end_date`. That last bar is where any open position is liquidated.
/// Dates without a bar are skipped implicitly.
#[derive(Debug, Clone)]
pub struct Backtester {
    series: Arc<PriceSeries>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    first_day: usize,
    end_day: usize,
}

impl Backtester {
    pub fn new(series: Arc<PriceSeries>, start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        if start_date >= end_date {
            return Err(TradegeneError::Configuration(format!(
                "Backtest start {} must be before end {}",
                start_date, end_date
            )));
        }

        if series.index_on_or_before(start_date).is_none() {
            return Err(TradegeneError::DataUnavailable(format!(
                "{} has no data on or before {}",
                series.symbol(),
                start_date
            )));
        }
        let end_day = series.index_on_or_after(end_date).ok_or_else(|| {
            TradegeneError::DataUnavailable(format!(
                "{} has no data on or after {}",
                series.symbol(),
                end_date
            ))
        })?;
        // A bar on or after end_date exists, so one on or after start_date does too
        let first_day = series.index_on_or_after(start_date).unwrap_or(end_day);

        if let Some(bad) = series.bars()[first_day..=end_day].iter().find(|bar| !bar.close.is_finite()) {
            return Err(TradegeneError::BacktestError(format!(
                "{} has a non-finite close on {}",
                series.symbol(),
                bad.date
            )));
        }

        Ok(Self {
            series,
            start_date,
            end_date,
            first_day,
            end_day,
        })
    }

    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Bar indices the agent is asked about
    pub fn trading_days(&self) -> Range<usize> {
        self.first_day..self.end_day
    }

    /// Net revenue of `agent` over the window
    pub fn run<A: TradingAgent + ?Sized>(&self, agent: &A) -> f64 {
        self.replay(agent).revenue
    }

    /// Revenue plus every round trip, for reporting
    pub fn run_detailed<A: TradingAgent + ?Sized>(&self, agent: &A) -> BacktestResult {
        let portfolio = self.replay(agent);
        BacktestResult {
            symbol: self.symbol().to_string(),
            revenue: portfolio.revenue,
            trades: portfolio.trades,
        }
    }

    fn replay<A: TradingAgent + ?Sized>(&self, agent: &A) -> Portfolio {
        let bars = self.series.bars();
        let mut portfolio = Portfolio::new();

        for day in self.trading_days() {
            let decision = agent.decide_on(&self.series, day);
            portfolio.process_bar(day, decision, bars[day].close);
        }
        portfolio.liquidate(self.end_day, bars[self.end_day].close);

        log::trace!(
            "{} on {}: revenue {:.4} over {} trades",
            agent.label(),
            self.symbol(),
            portfolio.revenue,
            portfolio.trades.len()
        );
        portfolio
    }
}
