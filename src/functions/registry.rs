use crate::error::{Result, TradegeneError};
use crate::functions::indicators::{
    momentum::{CommodityChannelIndex, RelativeStrengthIndex, StochasticOscillator, StochasticRsi},
    trend::{DoubleMaCrossover, Ma4918, Ma918, Macd, SingleMaCrossover},
    volume::MoneyFlowIndex,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::traits::{Rule, RuleParams};

/// Closed set of rule families an agent can weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    SingleMaCrossover,
    DoubleMaCrossover,
    RelativeStrengthIndex,
    StochasticOscillator,
    Ma918,
    Ma4918,
    Macd,
    MoneyFlowIndex,
    CommodityChannelIndex,
    StochasticRsi,
}

impl RuleKind {
    pub fn alias(&self) -> &'static str {
        match self {
            Self::SingleMaCrossover => "SMA_X",
            Self::DoubleMaCrossover => "DMA_X",
            Self::RelativeStrengthIndex => "RSI",
            Self::StochasticOscillator => "STOCH",
            Self::Ma918 => "MA918",
            Self::Ma4918 => "MA4918",
            Self::Macd => "MACD",
            Self::MoneyFlowIndex => "MFI",
            Self::CommodityChannelIndex => "CCI",
            Self::StochasticRsi => "STOCH_RSI",
        }
    }

    /// Number of construction parameters
    pub fn arity(&self) -> usize {
        self.default_params().len()
    }

    pub fn default_params(&self) -> RuleParams {
        match self {
            Self::SingleMaCrossover => vec![28],
            Self::DoubleMaCrossover => vec![25, 50],
            Self::RelativeStrengthIndex => vec![14, 30, 70],
            Self::StochasticOscillator => vec![14, 20, 80],
            Self::Ma918 => vec![9, 18],
            Self::Ma4918 => vec![4, 9, 18],
            Self::Macd => vec![12, 26, 9],
            Self::MoneyFlowIndex => vec![14, 20, 80],
            Self::CommodityChannelIndex => vec![20],
            Self::StochasticRsi => vec![14],
        }
    }

    /// Draw a random parameter tuple that satisfies the rule's constraints
    pub fn generate_params<R: Rng + ?Sized>(&self, rng: &mut R) -> RuleParams {
        match self {
            Self::SingleMaCrossover => vec![rng.gen_range(2..=60)],
            Self::DoubleMaCrossover => {
                let short = rng.gen_range(2..=40);
                vec![short, rng.gen_range(short + 1..=short + 80)]
            }
            Self::RelativeStrengthIndex => {
                vec![rng.gen_range(2..=30), rng.gen_range(10..=40), rng.gen_range(60..=90)]
            }
            Self::StochasticOscillator => {
                vec![rng.gen_range(5..=30), rng.gen_range(10..=30), rng.gen_range(70..=90)]
            }
            Self::Ma918 => {
                let fast = rng.gen_range(3..=15);
                vec![fast, rng.gen_range(fast + 1..=fast + 30)]
            }
            Self::Ma4918 => {
                let fast = rng.gen_range(2..=8);
                let mid = rng.gen_range(fast + 1..=fast + 10);
                vec![fast, mid, rng.gen_range(mid + 1..=mid + 20)]
            }
            Self::Macd => {
                let fast = rng.gen_range(5..=15);
                vec![fast, rng.gen_range(fast + 1..=fast + 25), rng.gen_range(3..=12)]
            }
            Self::MoneyFlowIndex => {
                vec![rng.gen_range(5..=30), rng.gen_range(10..=30), rng.gen_range(70..=90)]
            }
            Self::CommodityChannelIndex => vec![rng.gen_range(5..=40)],
            Self::StochasticRsi => vec![rng.gen_range(5..=30)],
        }
    }

    /// Instantiate the rule, validating the parameter tuple
    pub fn build(&self, params: &[usize]) -> Result<Arc<dyn Rule>> {
        if params.len() != self.arity() {
            return Err(TradegeneError::Configuration(format!(
                "{} takes {} parameters, got {:?}",
                self.alias(),
                self.arity(),
                params
            )));
        }

        let rule: Arc<dyn Rule> = match self {
            Self::SingleMaCrossover => Arc::new(SingleMaCrossover::new(params[0])?),
            Self::DoubleMaCrossover => Arc::new(DoubleMaCrossover::new(params[0], params[1])?),
            Self::RelativeStrengthIndex => {
                Arc::new(RelativeStrengthIndex::new(params[0], params[1], params[2])?)
            }
            Self::StochasticOscillator => {
                Arc::new(StochasticOscillator::new(params[0], params[1], params[2])?)
            }
            Self::Ma918 => Arc::new(Ma918::new(params[0], params[1])?),
            Self::Ma4918 => Arc::new(Ma4918::new(params[0], params[1], params[2])?),
            Self::Macd => Arc::new(Macd::new(params[0], params[1], params[2])?),
            Self::MoneyFlowIndex => Arc::new(MoneyFlowIndex::new(params[0], params[1], params[2])?),
            Self::CommodityChannelIndex => Arc::new(CommodityChannelIndex::new(params[0])?),
            Self::StochasticRsi => Arc::new(StochasticRsi::new(params[0])?),
        };
        Ok(rule)
    }
}

/// Ordered rule set shared by every agent of a population.
///
/// Position `i` in the registry is gene locus `i`; the order never changes
/// after construction.
#[derive(Clone)]
pub struct RuleRegistry {
    kinds: Vec<RuleKind>,
    defaults: Vec<Arc<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new(kinds: Vec<RuleKind>) -> Result<Self> {
        if kinds.is_empty() {
            return Err(TradegeneError::Configuration(
                "Rule registry needs at least one rule".to_string(),
            ));
        }
        let defaults = kinds
            .iter()
            .map(|kind| kind.build(&kind.default_params()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { kinds, defaults })
    }

    /// Every rule family, in declaration order
    pub fn standard() -> Self {
        let kinds = vec![
            RuleKind::SingleMaCrossover,
            RuleKind::DoubleMaCrossover,
            RuleKind::RelativeStrengthIndex,
            RuleKind::StochasticOscillator,
            RuleKind::Ma918,
            RuleKind::Ma4918,
            RuleKind::Macd,
            RuleKind::MoneyFlowIndex,
            RuleKind::CommodityChannelIndex,
            RuleKind::StochasticRsi,
        ];
        let defaults = kinds
            .iter()
            .map(|kind| {
                kind.build(&kind.default_params())
                    .unwrap_or_else(|e| unreachable!("default parameters are valid: {}", e))
            })
            .collect();
        Self { kinds, defaults }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> &[RuleKind] {
        &self.kinds
    }

    pub fn kind(&self, index: usize) -> Option<RuleKind> {
        self.kinds.get(index).copied()
    }

    /// Shared default-parameter instances, used by agents without a parameter gene
    pub fn default_rules(&self) -> &[Arc<dyn Rule>] {
        &self.defaults
    }

    /// Instantiate every rule with its own parameter tuple
    pub fn instantiate(&self, params: &[RuleParams]) -> Result<Vec<Arc<dyn Rule>>> {
        if params.len() != self.kinds.len() {
            return Err(TradegeneError::Configuration(format!(
                "Parameter gene length {} does not match {} rules",
                params.len(),
                self.kinds.len()
            )));
        }
        self.kinds
            .iter()
            .zip(params)
            .map(|(kind, p)| kind.build(p))
            .collect()
    }

    pub fn generate_params<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<RuleParams> {
        self.kinds.iter().map(|kind| kind.generate_params(rng)).collect()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.kinds.iter()).finish()
    }
}
