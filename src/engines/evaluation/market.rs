use crate::{
    data::PriceDataProvider,
    engines::evaluation::{
        agent::TradingAgent, backtester::Backtester, benchmark::LookaheadOracle,
    },
    error::{Result, TradegeneError},
};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do with instruments whose benchmark revenue is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkPolicy {
    /// Leave them out of every fitness mean
    #[default]
    Exclude,
    /// Refuse to build the market
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarketOptions {
    /// Worker threads for evaluation; 0 lets rayon decide
    pub workers: usize,
    pub benchmark_policy: BenchmarkPolicy,
}

/// A basket of instruments over one date window.
///
/// Fitness of an agent is the mean over instruments of its revenue divided
/// by the lookahead oracle's revenue on the same instrument. The oracle's
/// revenues are computed once, at construction.
pub struct Market {
    backtesters: Vec<Backtester>,
    benchmark: Vec<f64>,
    scored: Vec<usize>,
    skipped: Vec<String>,
    pool: rayon::ThreadPool,
}

impl Market {
    /// Load every symbol from `provider`. Symbols that are missing, fail to
    /// load, or have bad closes inside the window are skipped with a
    /// warning; other errors abort.
    pub fn new<P: PriceDataProvider + ?Sized>(
        provider: &P,
        symbols: &[String],
        start_date: NaiveDate,
        end_date: NaiveDate,
        options: MarketOptions,
    ) -> Result<Self> {
        let mut backtesters = Vec::with_capacity(symbols.len());
        let mut skipped = Vec::new();

        for symbol in symbols {
            let built = provider
                .read(symbol)
                .and_then(|series| Backtester::new(series, start_date, end_date));
            match built {
                Ok(backtester) => backtesters.push(backtester),
                Err(
                    TradegeneError::DataUnavailable(reason)
                    | TradegeneError::DataLoading(reason)
                    | TradegeneError::BacktestError(reason),
                ) => {
                    log::warn!("Skipping {}: {}", symbol, reason);
                    skipped.push(symbol.clone());
                }
                Err(e) => return Err(e),
            }
        }

        let mut market = Self::from_backtesters(backtesters, options)?;
        market.skipped = skipped;
        Ok(market)
    }

    pub fn from_backtesters(backtesters: Vec<Backtester>, options: MarketOptions) -> Result<Self> {
        if backtesters.is_empty() {
            return Err(TradegeneError::Configuration(
                "Market has no instruments with data for the requested window".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .map_err(|e| TradegeneError::Configuration(format!("Failed to build worker pool: {}", e)))?;

        let benchmark: Vec<f64> =
            pool.install(|| backtesters.par_iter().map(|bt| bt.run(&LookaheadOracle)).collect());

        let mut scored = Vec::with_capacity(backtesters.len());
        for (i, (backtester, &revenue)) in backtesters.iter().zip(&benchmark).enumerate() {
            if revenue != 0.0 {
                scored.push(i);
                continue;
            }
            match options.benchmark_policy {
                BenchmarkPolicy::Fail => {
                    return Err(TradegeneError::DegenerateBenchmark(format!(
                        "Benchmark revenue for {} is zero between {} and {}",
                        backtester.symbol(),
                        backtester.start_date(),
                        backtester.end_date()
                    )));
                }
                BenchmarkPolicy::Exclude => {
                    log::warn!(
                        "Benchmark revenue for {} is zero; excluding it from fitness",
                        backtester.symbol()
                    );
                }
            }
        }
        if scored.is_empty() {
            return Err(TradegeneError::DegenerateBenchmark(
                "Every instrument has zero benchmark revenue".to_string(),
            ));
        }

        log::info!(
            "Market ready: {} instruments ({} scored), {} worker threads",
            backtesters.len(),
            scored.len(),
            pool.current_num_threads()
        );

        Ok(Self {
            backtesters,
            benchmark,
            scored,
            skipped: Vec::new(),
            pool,
        })
    }

    /// Oracle revenue per instrument, in instrument order
    pub fn benchmark(&self) -> &[f64] {
        &self.benchmark
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.backtesters.iter().map(|bt| bt.symbol()).collect()
    }

    /// Symbols dropped at construction for lack of data
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn backtesters(&self) -> &[Backtester] {
        &self.backtesters
    }

    /// Raw revenue matrix: one row per agent, one column per instrument
    pub fn trade_by<A: TradingAgent>(&self, agents: &[A]) -> Vec<Vec<f64>> {
        self.pool.install(|| {
            agents
                .par_iter()
                .map(|agent| self.backtesters.par_iter().map(|bt| bt.run(agent)).collect())
                .collect()
        })
    }

    /// Normalized fitness per agent, in agent order
    pub fn evaluate<A: TradingAgent>(&self, agents: &[A]) -> Vec<f64> {
        self.trade_by(agents)
            .iter()
            .map(|revenues| self.fitness(revenues))
            .collect()
    }

    fn fitness(&self, revenues: &[f64]) -> f64 {
        let total: f64 = self
            .scored
            .iter()
            .map(|&i| revenues[i] / self.benchmark[i])
            .sum();
        total / self.scored.len() as f64
    }
}

impl std::fmt::Debug for Market {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Market")
            .field("symbols", &self.symbols())
            .field("benchmark", &self.benchmark)
            .field("skipped", &self.skipped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{InMemoryProvider, PriceSeries};
    use crate::types::Decision;
    use approx::assert_relative_eq;

    struct AlwaysBuy;

    impl TradingAgent for AlwaysBuy {
        fn decide_on(&self, _series: &PriceSeries, _today: usize) -> Decision {
            Decision::Buy
        }
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2018, 1, n).unwrap()
    }

    fn provider() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_series(PriceSeries::from_closes("UP", day(1), &[10.0, 12.0, 9.0, 9.0, 15.0]).unwrap())
            .with_series(PriceSeries::from_closes("FLAT", day(1), &[7.0; 5]).unwrap())
            .with_series(PriceSeries::from_closes("DOWN", day(1), &[20.0, 18.0, 19.0, 16.0, 10.0]).unwrap())
    }

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_benchmark_revenues() {
        let market = Market::new(&provider(), &symbols(&["UP", "DOWN"]), day(1), day(5), MarketOptions::default()).unwrap();
        // UP: buy 10 sell 12, buy 9 sell 15 (liquidated); DOWN: buy 18 sell 19
        assert_eq!(market.benchmark(), &[8.0, 1.0]);
        assert_eq!(market.evaluate(&[LookaheadOracle]), vec![1.0]);
    }

    #[test]
    fn test_fitness_is_mean_of_ratios() {
        let market = Market::new(&provider(), &symbols(&["UP", "DOWN"]), day(1), day(5), MarketOptions::default()).unwrap();
        // AlwaysBuy holds from day 1 to liquidation: UP 5, DOWN -10
        let fitness = market.evaluate(&[AlwaysBuy]);
        assert_relative_eq!(fitness[0], (5.0 / 8.0 + -10.0 / 1.0) / 2.0);
    }

    #[test]
    fn test_zero_benchmark_policies() {
        let excluded = Market::new(&provider(), &symbols(&["UP", "FLAT"]), day(1), day(5), MarketOptions::default()).unwrap();
        assert_eq!(excluded.benchmark(), &[8.0, 0.0]);
        assert_relative_eq!(excluded.evaluate(&[AlwaysBuy])[0], 5.0 / 8.0);

        let options = MarketOptions { workers: 1, benchmark_policy: BenchmarkPolicy::Fail };
        assert!(matches!(
            Market::new(&provider(), &symbols(&["UP", "FLAT"]), day(1), day(5), options),
            Err(TradegeneError::DegenerateBenchmark(_))
        ));

        assert!(matches!(
            Market::new(&provider(), &symbols(&["FLAT"]), day(1), day(5), MarketOptions::default()),
            Err(TradegeneError::DegenerateBenchmark(_))
        ));
    }

    #[test]
    fn test_unavailable_symbols_are_skipped() {
        let market = Market::new(&provider(), &symbols(&["UP", "MISSING"]), day(1), day(5), MarketOptions::default()).unwrap();
        assert_eq!(market.symbols(), vec!["UP"]);
        assert_eq!(market.skipped(), &["MISSING".to_string()]);

        assert!(Market::new(&provider(), &symbols(&["MISSING"]), day(1), day(5), MarketOptions::default()).is_err());
    }

    #[test]
    fn test_bad_closes_only_drop_their_instrument() {
        let provider = provider()
            .with_series(PriceSeries::from_closes("BAD", day(1), &[10.0, f64::NAN, 9.0, 9.0, 15.0]).unwrap());
        let market = Market::new(&provider, &symbols(&["UP", "BAD"]), day(1), day(5), MarketOptions::default()).unwrap();

        assert_eq!(market.symbols(), vec!["UP"]);
        assert_eq!(market.skipped(), &["BAD".to_string()]);
        assert_eq!(market.evaluate(&[LookaheadOracle]), vec![1.0]);
    }
}
