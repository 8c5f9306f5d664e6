use super::{closes, crossover, ema_series, require_ascending, require_period, sma_ending, tail};
use crate::error::Result;
use crate::functions::traits::{Rule, RuleParams};
use crate::types::{Bar, Decision};

/// Close crossing its own `n`-day moving average.
///
/// Today's average covers the `n` closes ending today, so today's close is
/// part of the line it is compared with. Yesterday's average ends yesterday.
pub struct SingleMaCrossover {
    pub n: usize,
}

impl SingleMaCrossover {
    pub fn new(n: usize) -> Result<Self> {
        require_period("SMA_X", "n", n)?;
        Ok(Self { n })
    }
}

impl Rule for SingleMaCrossover {
    fn alias(&self) -> &'static str { "SMA_X" }
    fn ui_name(&self) -> &'static str { "Single Moving Average Crossover" }
    fn params(&self) -> RuleParams { vec![self.n] }
    fn lookback(&self) -> usize { self.n + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let values = closes(tail(window, self.lookback()));
        let len = values.len();
        match (sma_ending(&values, len, self.n), sma_ending(&values, len.saturating_sub(1), self.n)) {
            (Some(ma_today), Some(ma_yesterday)) => {
                crossover(values[len - 2], ma_yesterday, values[len - 1], ma_today)
            }
            _ => Decision::Hold,
        }
    }
}

/// Short moving average crossing the long one
pub struct DoubleMaCrossover {
    pub short_n: usize,
    pub long_n: usize,
}

impl DoubleMaCrossover {
    pub fn new(short_n: usize, long_n: usize) -> Result<Self> {
        require_period("DMA_X", "short_n", short_n)?;
        require_ascending("DMA_X", &[short_n, long_n])?;
        Ok(Self { short_n, long_n })
    }
}

impl Rule for DoubleMaCrossover {
    fn alias(&self) -> &'static str { "DMA_X" }
    fn ui_name(&self) -> &'static str { "Double Moving Average Crossover" }
    fn params(&self) -> RuleParams { vec![self.short_n, self.long_n] }
    fn lookback(&self) -> usize { self.long_n + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let values = closes(tail(window, self.lookback()));
        let len = values.len();
        let yesterday = len.saturating_sub(1);
        match (
            sma_ending(&values, yesterday, self.short_n),
            sma_ending(&values, yesterday, self.long_n),
            sma_ending(&values, len, self.short_n),
            sma_ending(&values, len, self.long_n),
        ) {
            (Some(prev_short), Some(prev_long), Some(short), Some(long)) => {
                crossover(prev_short, prev_long, short, long)
            }
            _ => Decision::Hold,
        }
    }
}

/// Close crossing the fast average, confirmed by the fast/slow ordering
/// (the classic 9/18 setup).
pub struct Ma918 {
    pub fast: usize,
    pub slow: usize,
}

impl Ma918 {
    pub fn new(fast: usize, slow: usize) -> Result<Self> {
        require_period("MA918", "fast", fast)?;
        require_ascending("MA918", &[fast, slow])?;
        Ok(Self { fast, slow })
    }
}

impl Rule for Ma918 {
    fn alias(&self) -> &'static str { "MA918" }
    fn ui_name(&self) -> &'static str { "Confirmed Moving Average Crossover" }
    fn params(&self) -> RuleParams { vec![self.fast, self.slow] }
    fn lookback(&self) -> usize { self.slow + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let values = closes(tail(window, self.lookback()));
        let len = values.len();
        let (Some(fast_today), Some(fast_yesterday), Some(slow_today)) = (
            sma_ending(&values, len, self.fast),
            sma_ending(&values, len.saturating_sub(1), self.fast),
            sma_ending(&values, len, self.slow),
        ) else {
            return Decision::Hold;
        };

        match crossover(values[len - 2], fast_yesterday, values[len - 1], fast_today) {
            Decision::Buy if fast_today > slow_today => Decision::Buy,
            Decision::Sell if fast_today < slow_today => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}

/// Three averages falling into (or out of) stacked order, e.g. 4 > 9 > 18
pub struct Ma4918 {
    pub fast: usize,
    pub mid: usize,
    pub slow: usize,
}

impl Ma4918 {
    pub fn new(fast: usize, mid: usize, slow: usize) -> Result<Self> {
        require_period("MA4918", "fast", fast)?;
        require_ascending("MA4918", &[fast, mid, slow])?;
        Ok(Self { fast, mid, slow })
    }

    fn stack(&self, values: &[f64], end: usize) -> Option<i32> {
        let fast = sma_ending(values, end, self.fast)?;
        let mid = sma_ending(values, end, self.mid)?;
        let slow = sma_ending(values, end, self.slow)?;
        Some(if fast > mid && mid > slow {
            1
        } else if fast < mid && mid < slow {
            -1
        } else {
            0
        })
    }
}

impl Rule for Ma4918 {
    fn alias(&self) -> &'static str { "MA4918" }
    fn ui_name(&self) -> &'static str { "Triple Moving Average Alignment" }
    fn params(&self) -> RuleParams { vec![self.fast, self.mid, self.slow] }
    fn lookback(&self) -> usize { self.slow + 1 }

    fn decide(&self, window: &[Bar]) -> Decision {
        let values = closes(tail(window, self.lookback()));
        let len = values.len();
        match (self.stack(&values, len.saturating_sub(1)), self.stack(&values, len)) {
            (Some(prev), Some(1)) if prev != 1 => Decision::Buy,
            (Some(prev), Some(-1)) if prev != -1 => Decision::Sell,
            _ => Decision::Hold,
        }
    }
}

/// MACD line crossing its signal line
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Result<Self> {
        require_period("MACD", "fast", fast)?;
        require_period("MACD", "signal", signal)?;
        require_ascending("MACD", &[fast, slow])?;
        Ok(Self { fast, slow, signal })
    }
}

impl Rule for Macd {
    fn alias(&self) -> &'static str { "MACD" }
    fn ui_name(&self) -> &'static str { "Moving Average Convergence Divergence" }
    fn params(&self) -> RuleParams { vec![self.fast, self.slow, self.signal] }

    // EMAs are seeded from the first visible bar, so give them room to settle
    fn lookback(&self) -> usize { 3 * self.slow + self.signal }

    fn decide(&self, window: &[Bar]) -> Decision {
        if window.len() < self.slow + self.signal {
            return Decision::Hold;
        }
        let values = closes(tail(window, self.lookback()));
        let fast = ema_series(&values, self.fast);
        let slow = ema_series(&values, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_series(&macd, self.signal);

        let len = macd.len();
        crossover(macd[len - 2], signal[len - 2], macd[len - 1], signal[len - 1])
    }
}
