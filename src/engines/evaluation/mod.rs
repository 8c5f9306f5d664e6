pub mod agent;
pub mod backtester;
pub mod benchmark;
pub mod market;
pub mod portfolio;

pub use agent::{Agent, TradingAgent};
pub use backtester::{BacktestResult, Backtester};
pub use benchmark::LookaheadOracle;
pub use market::{BenchmarkPolicy, Market, MarketOptions};
pub use portfolio::Portfolio;
