use super::{ratio_oscillator, require_band, require_period, tail, threshold_cross};
use crate::error::Result;
use crate::functions::traits::{Rule, RuleParams};
use crate::types::{Bar, Decision};

/// Money Flow Index: volume-weighted RSI on the typical price
pub struct MoneyFlowIndex {
    pub period: usize,
    pub lower: usize,
    pub upper: usize,
}

impl MoneyFlowIndex {
    pub fn new(period: usize, lower: usize, upper: usize) -> Result<Self> {
        require_period("MFI", "period", period)?;
        require_band("MFI", lower, upper)?;
        Ok(Self { period, lower, upper })
    }

    fn mfi(&self, bars: &[Bar], end: usize) -> Option<f64> {
        if end < self.period + 1 || end > bars.len() {
            return None;
        }
        let (mut positive, mut negative) = (0.0, 0.0);
        for i in end - self.period..end {
            let typical = bars[i].typical_price();
            let previous = bars[i - 1].typical_price();
            let flow = typical * bars[i].volume;
            if typical > previous {
                positive += flow;
            } else if typical < previous {
                negative += flow;
            }
        }
        Some(ratio_oscillator(positive, negative))
    }
}

impl Rule for MoneyFlowIndex {
    fn alias(&self) -> &'static str { "MFI" }
    fn ui_name(&self) -> &'static str { "Money Flow Index" }
    fn params(&self) -> RuleParams { vec![self.period, self.lower, self.upper] }
    fn lookback(&self) -> usize { self.period + 2 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let bars = tail(window, self.lookback());
        let len = bars.len();
        match (self.mfi(bars, len.saturating_sub(1)), self.mfi(bars, len)) {
            (Some(prev), Some(curr)) => threshold_cross(prev, curr, self.lower as f64, self.upper as f64),
            _ => Decision::Hold,
        }
    }
}
