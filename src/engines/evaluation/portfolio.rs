use crate::types::{Decision, ExitReason, Trade};

/// Single-unit long/flat position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long { entry_bar: usize, entry_price: f64 },
}

/// Revenue bookkeeping for one backtest run.
///
/// Buying while flat pays the close; selling while long receives it. Any
/// other combination leaves both the state and the revenue untouched.
pub struct Portfolio {
    pub state: PositionState,
    pub revenue: f64,
    pub trades: Vec<Trade>,
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new()
    }
}

impl Portfolio {
    pub fn new() -> Self {
        Self {
            state: PositionState::Flat,
            revenue: 0.0,
            trades: Vec::new(),
        }
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, PositionState::Long { .. })
    }

    pub fn process_bar(&mut self, bar: usize, decision: Decision, price: f64) {
        match (self.state, decision) {
            (PositionState::Flat, Decision::Buy) => self.open_position(bar, price),
            (PositionState::Long { .. }, Decision::Sell) => {
                self.close_position(bar, price, ExitReason::Signal)
            }
            _ => {}
        }
    }

    pub fn open_position(&mut self, bar: usize, price: f64) {
        if self.is_holding() {
            return;
        }
        self.revenue -= price;
        self.state = PositionState::Long {
            entry_bar: bar,
            entry_price: price,
        };
    }

    pub fn close_position(&mut self, bar: usize, price: f64, reason: ExitReason) {
        if let PositionState::Long { entry_bar, entry_price } = self.state {
            self.revenue += price;
            self.state = PositionState::Flat;
            self.trades.push(Trade {
                entry_bar,
                exit_bar: bar,
                entry_price,
                exit_price: price,
                profit: price - entry_price,
                exit_reason: reason,
            });
        }
    }

    /// Force-close an open position at the end of the run
    pub fn liquidate(&mut self, bar: usize, price: f64) {
        self.close_position(bar, price, ExitReason::EndOfData);
    }

    pub fn get_trades(&self) -> &[Trade] {
        &self.trades
    }
}
