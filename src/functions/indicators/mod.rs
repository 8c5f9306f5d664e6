pub mod momentum;
pub mod trend;
pub mod volume;

use crate::error::{Result, TradegeneError};
use crate::types::{Bar, Decision};

/// Trailing `n` bars of the window (or all of them if shorter)
pub fn tail(window: &[Bar], n: usize) -> &[Bar] {
    &window[window.len().saturating_sub(n)..]
}

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|bar| bar.close).collect()
}

/// Mean of the `n` values ending just before `end`
pub fn sma_ending(values: &[f64], end: usize, n: usize) -> Option<f64> {
    if n == 0 || end < n || end > values.len() {
        return None;
    }
    Some(values[end - n..end].iter().sum::<f64>() / n as f64)
}

/// Exponential moving average seeded with the first value
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            Some(p) => alpha * value + (1.0 - alpha) * p,
            None => value,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Simple-average (Cutler) RSI over the `period` changes ending before `end`
pub fn rsi_ending(values: &[f64], end: usize, period: usize) -> Option<f64> {
    if period == 0 || end < period + 1 || end > values.len() {
        return None;
    }
    let (mut gains, mut losses) = (0.0, 0.0);
    for i in end - period..end {
        let change = values[i] - values[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }
    Some(ratio_oscillator(gains, losses))
}

/// 100 - 100 / (1 + up / down), with the flat case pinned to 50
pub fn ratio_oscillator(up: f64, down: f64) -> f64 {
    if down == 0.0 {
        if up == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - 100.0 / (1.0 + up / down)
    }
}

/// Fast line crossing the slow line between yesterday and today.
/// Strict on both days, so touching the line is not a cross.
pub fn crossover(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> Decision {
    if fast > slow && prev_fast < prev_slow {
        Decision::Buy
    } else if fast < slow && prev_fast > prev_slow {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

/// Oscillator leaving the oversold band upward buys; leaving the
/// overbought band downward sells.
pub fn threshold_cross(prev: f64, curr: f64, lower: f64, upper: f64) -> Decision {
    if prev < lower && curr >= lower {
        Decision::Buy
    } else if prev > upper && curr <= upper {
        Decision::Sell
    } else {
        Decision::Hold
    }
}

pub(crate) fn require_period(alias: &str, name: &str, value: usize) -> Result<()> {
    if value < 2 {
        return Err(TradegeneError::Configuration(format!(
            "{}: {} must be greater than 1, got {}",
            alias, name, value
        )));
    }
    Ok(())
}

pub(crate) fn require_ascending(alias: &str, values: &[usize]) -> Result<()> {
    if values.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(TradegeneError::Configuration(format!(
            "{}: parameters must be strictly increasing, got {:?}",
            alias, values
        )));
    }
    Ok(())
}

pub(crate) fn require_band(alias: &str, lower: usize, upper: usize) -> Result<()> {
    if lower >= upper || upper > 100 {
        return Err(TradegeneError::Configuration(format!(
            "{}: band must satisfy lower < upper <= 100, got {}..{}",
            alias, lower, upper
        )));
    }
    Ok(())
}
