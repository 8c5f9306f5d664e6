//! Genotype representation for rule-weighting agents
//!
//! A genotype is a weight vector with one locus per rule in the
//! [`RuleRegistry`](crate::functions::RuleRegistry), in registry order.
//! The locus domain depends on the [`GenotypeKind`]:
//! - **Bit**: each weight is 0.0 or 1.0, switching a rule on or off
//! - **Real**: each weight is drawn from [0, 1)
//! - **Complex**: real weights plus a parameter gene holding one
//!   hyperparameter tuple per rule
//!
//! Crossover and mutation work locus by locus; for complex genotypes a
//! weight and its parameter tuple always travel together.

use crate::error::{Result, TradegeneError};
use crate::functions::{RuleParams, RuleRegistry};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub type Gene = Vec<f64>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenotypeKind {
    Bit,
    Real,
    Complex,
}

impl GenotypeKind {
    /// Fresh value for one locus, used both at initialization and mutation
    pub fn random_locus<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Bit => rng.gen_range(0..2u8) as f64,
            Self::Real | Self::Complex => rng.gen::<f64>(),
        }
    }

    pub fn has_params(&self) -> bool {
        matches!(self, Self::Complex)
    }

    pub fn accepts(&self, value: f64) -> bool {
        match self {
            Self::Bit => value == 0.0 || value == 1.0,
            Self::Real | Self::Complex => value.is_finite(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    pub kind: GenotypeKind,
    pub gene: Gene,
    pub params: Option<Vec<RuleParams>>,
}

impl Genotype {
    /// Random genotype sized to the registry
    pub fn random<R: Rng + ?Sized>(kind: GenotypeKind, registry: &RuleRegistry, rng: &mut R) -> Self {
        let gene = (0..registry.len()).map(|_| kind.random_locus(rng)).collect();
        let params = kind.has_params().then(|| registry.generate_params(rng));
        Self { kind, gene, params }
    }

    pub fn len(&self) -> usize {
        self.gene.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gene.is_empty()
    }

    /// Check lengths and locus domains against the registry.
    /// Parameter tuples are checked when the rules are built.
    pub fn validate(&self, registry: &RuleRegistry) -> Result<()> {
        if self.gene.len() != registry.len() {
            return Err(TradegeneError::Configuration(format!(
                "Gene length {} does not match {} rules",
                self.gene.len(),
                registry.len()
            )));
        }

        if let Some(bad) = self.gene.iter().find(|&&v| !self.kind.accepts(v)) {
            return Err(TradegeneError::Configuration(format!(
                "Locus value {} is not valid for a {:?} genotype",
                bad, self.kind
            )));
        }

        match (&self.params, self.kind.has_params()) {
            (Some(params), true) if params.len() != registry.len() => {
                Err(TradegeneError::Configuration(format!(
                    "Parameter gene length {} does not match {} rules",
                    params.len(),
                    registry.len()
                )))
            }
            (Some(_), true) | (None, false) => Ok(()),
            (None, true) => Err(TradegeneError::Configuration(
                "Complex genotype requires a parameter gene".to_string(),
            )),
            (Some(_), false) => Err(TradegeneError::Configuration(format!(
                "{:?} genotype does not take a parameter gene",
                self.kind
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_genotypes_match_registry() {
        let registry = RuleRegistry::standard();
        let mut rng = StdRng::seed_from_u64(1);

        for kind in [GenotypeKind::Bit, GenotypeKind::Real, GenotypeKind::Complex] {
            let genotype = Genotype::random(kind, &registry, &mut rng);
            assert_eq!(genotype.len(), registry.len());
            assert_eq!(genotype.params.is_some(), kind == GenotypeKind::Complex);
            assert!(genotype.validate(&registry).is_ok());
        }
    }

    #[test]
    fn test_bit_loci_are_binary() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..200 {
            let v = GenotypeKind::Bit.random_locus(&mut rng);
            assert!(v == 0.0 || v == 1.0);
            let r = GenotypeKind::Real.random_locus(&mut rng);
            assert!((0.0..1.0).contains(&r));
        }
    }

    #[test]
    fn test_validate_rejects_mismatches() {
        let registry = RuleRegistry::standard();
        let short = Genotype { kind: GenotypeKind::Real, gene: vec![0.5; 3], params: None };
        assert!(short.validate(&registry).is_err());

        let not_binary = Genotype { kind: GenotypeKind::Bit, gene: vec![0.5; 10], params: None };
        assert!(not_binary.validate(&registry).is_err());

        let missing_params = Genotype { kind: GenotypeKind::Complex, gene: vec![0.5; 10], params: None };
        assert!(missing_params.validate(&registry).is_err());
    }
}
