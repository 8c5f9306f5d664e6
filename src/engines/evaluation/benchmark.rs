use crate::data::PriceSeries;
use crate::engines::evaluation::agent::TradingAgent;
use crate::types::Decision;

/// Perfect-foresight reference agent.
///
/// Buys when tomorrow's close is higher than today's and sells when it is
/// lower. Its revenue on an instrument is the benchmark every evolved agent
/// is normalized against. Stateless, so one instance can be shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct LookaheadOracle;

impl TradingAgent for LookaheadOracle {
    fn decide_on(&self, series: &PriceSeries, today: usize) -> Decision {
        match (series.close(today), series.close(today + 1)) {
            (Some(now), Some(next)) if next > now => Decision::Buy,
            (Some(now), Some(next)) if next < now => Decision::Sell,
            _ => Decision::Hold,
        }
    }

    fn label(&self) -> String {
        "lookahead oracle".to_string()
    }
}
