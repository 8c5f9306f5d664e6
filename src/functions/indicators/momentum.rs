use super::{closes, require_band, require_period, rsi_ending, tail, threshold_cross};
use crate::error::Result;
use crate::functions::traits::{Rule, RuleParams};
use crate::types::{Bar, Decision};

pub struct RelativeStrengthIndex {
    pub period: usize,
    pub oversold: usize,
    pub overbought: usize,
}

impl RelativeStrengthIndex {
    pub fn new(period: usize, oversold: usize, overbought: usize) -> Result<Self> {
        require_period("RSI", "period", period)?;
        require_band("RSI", oversold, overbought)?;
        Ok(Self { period, oversold, overbought })
    }
}

impl Rule for RelativeStrengthIndex {
    fn alias(&self) -> &'static str { "RSI" }
    fn ui_name(&self) -> &'static str { "Relative Strength Index" }
    fn params(&self) -> RuleParams { vec![self.period, self.oversold, self.overbought] }
    fn lookback(&self) -> usize { self.period + 2 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let values = closes(tail(window, self.lookback()));
        let len = values.len();
        match (
            rsi_ending(&values, len.saturating_sub(1), self.period),
            rsi_ending(&values, len, self.period),
        ) {
            (Some(prev), Some(curr)) => {
                threshold_cross(prev, curr, self.oversold as f64, self.overbought as f64)
            }
            _ => Decision::Hold,
        }
    }
}

/// Stochastic %K leaving its oversold/overbought band
pub struct StochasticOscillator {
    pub period: usize,
    pub lower: usize,
    pub upper: usize,
}

impl StochasticOscillator {
    pub fn new(period: usize, lower: usize, upper: usize) -> Result<Self> {
        require_period("STOCH", "period", period)?;
        require_band("STOCH", lower, upper)?;
        Ok(Self { period, lower, upper })
    }

    fn percent_k(&self, bars: &[Bar], end: usize) -> Option<f64> {
        if end < self.period || end > bars.len() {
            return None;
        }
        let span = &bars[end - self.period..end];
        let highest = span.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let lowest = span.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let close = bars[end - 1].close;
        if highest == lowest {
            return Some(50.0);
        }
        Some((close - lowest) / (highest - lowest) * 100.0)
    }
}

impl Rule for StochasticOscillator {
    fn alias(&self) -> &'static str { "STOCH" }
    fn ui_name(&self) -> &'static str { "Stochastic Oscillator" }
    fn params(&self) -> RuleParams { vec![self.period, self.lower, self.upper] }
    fn lookback(&self) -> usize { self.period + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let bars = tail(window, self.lookback());
        let len = bars.len();
        match (self.percent_k(bars, len.saturating_sub(1)), self.percent_k(bars, len)) {
            (Some(prev), Some(curr)) => threshold_cross(prev, curr, self.lower as f64, self.upper as f64),
            _ => Decision::Hold,
        }
    }
}

/// Commodity Channel Index against the conventional +/-100 band
pub struct CommodityChannelIndex {
    pub period: usize,
}

impl CommodityChannelIndex {
    pub const BAND: f64 = 100.0;

    pub fn new(period: usize) -> Result<Self> {
        require_period("CCI", "period", period)?;
        Ok(Self { period })
    }

    fn cci(&self, typical: &[f64], end: usize) -> Option<f64> {
        if end < self.period || end > typical.len() {
            return None;
        }
        let span = &typical[end - self.period..end];
        let mean = span.iter().sum::<f64>() / self.period as f64;
        let mean_deviation = span.iter().map(|tp| (tp - mean).abs()).sum::<f64>() / self.period as f64;
        if mean_deviation == 0.0 {
            return Some(0.0);
        }
        Some((typical[end - 1] - mean) / (0.015 * mean_deviation))
    }
}

impl Rule for CommodityChannelIndex {
    fn alias(&self) -> &'static str { "CCI" }
    fn ui_name(&self) -> &'static str { "Commodity Channel Index" }
    fn params(&self) -> RuleParams { vec![self.period] }
    fn lookback(&self) -> usize { self.period + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let typical: Vec<f64> = tail(window, self.lookback()).iter().map(Bar::typical_price).collect();
        let len = typical.len();
        match (self.cci(&typical, len.saturating_sub(1)), self.cci(&typical, len)) {
            (Some(prev), Some(curr)) => threshold_cross(prev, curr, -Self::BAND, Self::BAND),
            _ => Decision::Hold,
        }
    }
}

/// Stochastic oscillator applied to RSI values, band 0.2/0.8
pub struct StochasticRsi {
    pub period: usize,
}

impl StochasticRsi {
    pub const LOWER: f64 = 0.2;
    pub const UPPER: f64 = 0.8;

    pub fn new(period: usize) -> Result<Self> {
        require_period("STOCH_RSI", "period", period)?;
        Ok(Self { period })
    }

    fn stoch(rsi: &[f64]) -> f64 {
        let highest = rsi.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = rsi.iter().copied().fold(f64::INFINITY, f64::min);
        let last = rsi[rsi.len() - 1];
        if highest == lowest {
            0.5
        } else {
            (last - lowest) / (highest - lowest)
        }
    }
}

impl Rule for StochasticRsi {
    fn alias(&self) -> &'static str { "STOCH_RSI" }
    fn ui_name(&self) -> &'static str { "Stochastic RSI" }
    fn params(&self) -> RuleParams { vec![self.period] }
    fn lookback(&self) -> usize { 2 * self.period + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let values = closes(tail(window, self.lookback()));
        let len = values.len();
        if len < self.lookback() {
            return Decision::Hold;
        }
        // RSI for the last period + 1 days
        let rsi: Option<Vec<f64>> = (len - self.period..=len)
            .map(|end| rsi_ending(&values, end, self.period))
            .collect();
        let Some(rsi) = rsi else {
            return Decision::Hold;
        };
        let prev = Self::stoch(&rsi[..self.period]);
        let curr = Self::stoch(&rsi[1..]);
        threshold_cross(prev, curr, Self::LOWER, Self::UPPER)
    }
}
