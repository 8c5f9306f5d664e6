use crate::data::PriceSeries;
use crate::engines::generation::genome::{Gene, Genotype, GenotypeKind};
use crate::error::{Result, TradegeneError};
use crate::functions::{Rule, RuleParams, RuleRegistry};
use crate::types::{Bar, Decision};
use rand::Rng;
use std::sync::Arc;

/// Anything the backtester can ask for a daily decision.
///
/// `today` indexes into `series`. Implementations that must not look ahead
/// only read `series.window(today)`.
pub trait TradingAgent: Send + Sync {
    fn decide_on(&self, series: &PriceSeries, today: usize) -> Decision;

    /// Short label for logs
    fn label(&self) -> String {
        "agent".to_string()
    }
}

/// Rule-weighting agent: a genotype plus the rule set it weights.
///
/// Agents are immutable; genetic operators build new agents through
/// [`Agent::derive`].
#[derive(Clone)]
pub struct Agent {
    genotype: Genotype,
    rules: Arc<[Arc<dyn Rule>]>,
}

impl Agent {
    /// Build an agent from a genotype, instantiating rules from the registry.
    /// Bit and real genotypes share the registry's default-parameter rules.
    pub fn new(genotype: Genotype, registry: &RuleRegistry) -> Result<Self> {
        genotype.validate(registry)?;
        let rules: Vec<Arc<dyn Rule>> = match &genotype.params {
            Some(params) => registry.instantiate(params)?,
            None => registry.default_rules().to_vec(),
        };
        Ok(Self {
            genotype,
            rules: rules.into(),
        })
    }

    /// Agent over an arbitrary ordered rule set (bit or real genotypes only)
    pub fn with_rules(kind: GenotypeKind, gene: Gene, rules: Vec<Arc<dyn Rule>>) -> Result<Self> {
        if kind.has_params() {
            return Err(TradegeneError::Configuration(
                "Complex agents must be built from a rule registry".to_string(),
            ));
        }
        if gene.len() != rules.len() {
            return Err(TradegeneError::Configuration(format!(
                "Gene length {} does not match {} rules",
                gene.len(),
                rules.len()
            )));
        }
        if let Some(bad) = gene.iter().find(|&&v| !kind.accepts(v)) {
            return Err(TradegeneError::Configuration(format!(
                "Locus value {} is not valid for a {:?} genotype",
                bad, kind
            )));
        }
        Ok(Self {
            genotype: Genotype { kind, gene, params: None },
            rules: rules.into(),
        })
    }

    pub fn bit(gene: Gene, registry: &RuleRegistry) -> Result<Self> {
        Self::new(Genotype { kind: GenotypeKind::Bit, gene, params: None }, registry)
    }

    pub fn real(gene: Gene, registry: &RuleRegistry) -> Result<Self> {
        Self::new(Genotype { kind: GenotypeKind::Real, gene, params: None }, registry)
    }

    pub fn complex(gene: Gene, params: Vec<RuleParams>, registry: &RuleRegistry) -> Result<Self> {
        Self::new(
            Genotype { kind: GenotypeKind::Complex, gene, params: Some(params) },
            registry,
        )
    }

    pub fn random<R: Rng + ?Sized>(kind: GenotypeKind, registry: &RuleRegistry, rng: &mut R) -> Result<Self> {
        Self::new(Genotype::random(kind, registry, rng), registry)
    }

    /// New agent with another genotype of the same kind and rule set.
    /// Parameter genes are re-instantiated; otherwise the rules are shared.
    pub fn derive(&self, genotype: Genotype, registry: &RuleRegistry) -> Result<Self> {
        if genotype.kind != self.genotype.kind || genotype.len() != self.genotype.len() {
            return Err(TradegeneError::Configuration(format!(
                "Cannot derive a {:?} agent of length {} from a {:?} agent of length {}",
                genotype.kind,
                genotype.len(),
                self.genotype.kind,
                self.genotype.len()
            )));
        }
        if genotype.params.is_some() {
            return Self::new(genotype, registry);
        }
        Ok(Self {
            genotype,
            rules: Arc::clone(&self.rules),
        })
    }

    pub fn genotype(&self) -> &Genotype {
        &self.genotype
    }

    pub fn gene(&self) -> &[f64] {
        &self.genotype.gene
    }

    pub fn param_gene(&self) -> Option<&[RuleParams]> {
        self.genotype.params.as_deref()
    }

    pub fn kind(&self) -> GenotypeKind {
        self.genotype.kind
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    /// Each rule's own decision, in gene order
    pub fn votes(&self, window: &[Bar]) -> Vec<Decision> {
        self.rules.iter().map(|rule| rule.decide(window)).collect()
    }

    /// Sign of the gene-weighted vote of all rules
    pub fn decide(&self, window: &[Bar]) -> Decision {
        let vote: f64 = self
            .rules
            .iter()
            .zip(&self.genotype.gene)
            .map(|(rule, &weight)| rule.decide(window) * weight)
            .sum();
        Decision::from_vote(vote)
    }
}

impl TradingAgent for Agent {
    fn decide_on(&self, series: &PriceSeries, today: usize) -> Decision {
        self.decide(series.window(today))
    }

    fn label(&self) -> String {
        format!("{:?} agent {:?}", self.genotype.kind, self.genotype.gene)
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("genotype", &self.genotype)
            .field("rules", &self.rules.iter().map(|r| r.alias()).collect::<Vec<_>>())
            .finish()
    }
}
