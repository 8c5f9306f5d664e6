use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tradegene::{
    config::EvolutionSettings,
    engines::evaluation::Agent,
    engines::generation::{operators, EvolutionEngine, Genotype, GenotypeKind},
    functions::RuleRegistry,
    TradegeneError,
};

fn engine(settings: EvolutionSettings) -> EvolutionEngine {
    EvolutionEngine::new(settings, Arc::new(RuleRegistry::standard())).unwrap()
}

fn population(engine: &EvolutionEngine, size: usize, kind: GenotypeKind, seed: u64) -> Vec<Agent> {
    let mut rng = StdRng::seed_from_u64(seed);
    engine.initialize_population(size, kind, &mut rng).unwrap()
}

/// Agents built outside any engine, for settings the engine would refuse
fn random_agents(size: usize, kind: GenotypeKind, seed: u64) -> Vec<Agent> {
    let registry = RuleRegistry::standard();
    let mut rng = StdRng::seed_from_u64(seed);
    (0..size).map(|_| Agent::random(kind, &registry, &mut rng).unwrap()).collect()
}

#[test]
fn test_elitism_scenario() {
    let engine = engine(EvolutionSettings::new(0.5, 0.5, 0.2, 0.3, 0.5));
    let agents = population(&engine, 20, GenotypeKind::Real, 1);
    // Distinct fitness, best agent last
    let fitness: Vec<f64> = (0..20).map(|i| i as f64 / 10.0).collect();

    let mut rng = StdRng::seed_from_u64(2);
    let next = engine.evolve(&agents, &fitness, &mut rng).unwrap();

    assert_eq!(next.len(), 20);
    let expected_elites: Vec<&Genotype> = (14..20).rev().map(|i| agents[i].genotype()).collect();
    let actual_elites: Vec<&Genotype> = next[..6].iter().map(|a| a.genotype()).collect();
    assert_eq!(actual_elites, expected_elites);
}

#[test]
fn test_population_size_for_every_kind() {
    for kind in [GenotypeKind::Bit, GenotypeKind::Real, GenotypeKind::Complex] {
        let engine = engine(EvolutionSettings::new(0.6, 0.7, 0.3, 0.1, 0.4));
        let mut agents = population(&engine, 17, kind, 3);
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..10 {
            let fitness: Vec<f64> = agents.iter().map(|_| rng.gen_range(-1.0..1.0)).collect();
            agents = engine.evolve(&agents, &fitness, &mut rng).unwrap();
            assert_eq!(agents.len(), 17);
            for agent in &agents {
                assert_eq!(agent.kind(), kind);
                assert!(agent.genotype().validate(engine.registry()).is_ok());
                assert_eq!(agent.param_gene().map(|p| p.len()), kind.has_params().then_some(10));
            }
        }
    }
}

#[test]
fn test_offspring_loci_come_from_survivors() {
    // Mutation rate small enough that nothing in the pool is mutated
    let engine = engine(EvolutionSettings::new(0.5, 0.5, 0.01, 0.1, 0.5));
    let agents = population(&engine, 20, GenotypeKind::Complex, 5);
    let fitness: Vec<f64> = (0..20).map(|i| -(i as f64)).collect();
    let survivors = &agents[..10];

    let mut rng = StdRng::seed_from_u64(6);
    let next = engine.evolve(&agents, &fitness, &mut rng).unwrap();

    for agent in &next {
        let params = agent.param_gene().unwrap();
        for locus in 0..agent.gene().len() {
            let inherited = survivors.iter().any(|s| {
                s.gene()[locus] == agent.gene()[locus] && s.param_gene().unwrap()[locus] == params[locus]
            });
            assert!(inherited, "locus {} was not inherited from a survivor", locus);
        }
    }
}

#[test]
fn test_mutation_keeps_expected_fraction() {
    let registry = RuleRegistry::standard();
    let mut rng = StdRng::seed_from_u64(7);
    let keep_rate = 0.7;

    let mut kept = 0usize;
    let mut total = 0usize;
    for _ in 0..2000 {
        let original = Genotype::random(GenotypeKind::Real, &registry, &mut rng);
        let mutated = operators::mutate_genotype(&original, keep_rate, &registry, &mut rng).unwrap();
        kept += original.gene.iter().zip(&mutated.gene).filter(|(a, b)| a == b).count();
        total += original.len();
    }

    let fraction = kept as f64 / total as f64;
    assert!((fraction - keep_rate).abs() < 0.02, "kept fraction {}", fraction);
}

#[test]
fn test_bit_mutation_keeps_expected_fraction() {
    let registry = RuleRegistry::standard();
    let mut rng = StdRng::seed_from_u64(16);
    let keep_rate = 0.7;

    let mut kept = 0usize;
    let mut total = 0usize;
    for _ in 0..2000 {
        let original = Genotype::random(GenotypeKind::Bit, &registry, &mut rng);
        let mutated = operators::mutate_genotype(&original, keep_rate, &registry, &mut rng).unwrap();
        assert!(mutated.validate(&registry).is_ok());
        kept += original.gene.iter().zip(&mutated.gene).filter(|(a, b)| a == b).count();
        total += original.len();
    }

    // A redrawn bit matches the old one half the time
    let expected = keep_rate + (1.0 - keep_rate) * 0.5;
    let fraction = kept as f64 / total as f64;
    assert!((fraction - expected).abs() < 0.02, "kept fraction {}", fraction);
}

#[test]
fn test_complex_mutation_redraws_params_with_their_weight() {
    let registry = RuleRegistry::standard();
    let mut rng = StdRng::seed_from_u64(17);
    let keep_rate = 0.7;

    let mut replaced = 0usize;
    let mut total = 0usize;
    for _ in 0..2000 {
        let original = Genotype::random(GenotypeKind::Complex, &registry, &mut rng);
        let mutated = operators::mutate_genotype(&original, keep_rate, &registry, &mut rng).unwrap();
        assert!(mutated.validate(&registry).is_ok());

        let before = original.params.as_ref().unwrap();
        let after = mutated.params.as_ref().unwrap();
        for locus in 0..original.len() {
            // Real-valued redraws never repeat the old weight in practice
            let weight_replaced = original.gene[locus] != mutated.gene[locus];
            if weight_replaced {
                replaced += 1;
            } else {
                assert_eq!(before[locus], after[locus], "locus {} changed params but kept its weight", locus);
            }
        }
        total += original.len();
    }

    let fraction = replaced as f64 / total as f64;
    assert!((fraction - (1.0 - keep_rate)).abs() < 0.02, "replaced fraction {}", fraction);
}

#[test]
fn test_complex_mutation_regenerates_replaced_params() {
    let registry = RuleRegistry::standard();
    let mut rng = StdRng::seed_from_u64(18);
    let defaults: Vec<Vec<usize>> = registry.kinds().iter().map(|k| k.default_params()).collect();

    // Start every locus at the default tuple; a full redraw should move most of them
    let original = Genotype {
        kind: GenotypeKind::Complex,
        gene: vec![0.5; registry.len()],
        params: Some(defaults.clone()),
    };
    let mut moved = 0usize;
    for _ in 0..50 {
        let mutated = operators::mutate_genotype(&original, 0.0, &registry, &mut rng).unwrap();
        let params = mutated.params.as_ref().unwrap();
        moved += params.iter().zip(&defaults).filter(|(a, b)| a != b).count();
    }
    assert!(moved > 50 * registry.len() / 2, "only {} tuples regenerated", moved);
}

#[test]
fn test_equal_fitness_keeps_input_order() {
    let engine = engine(EvolutionSettings::new(0.5, 0.5, 0.2, 0.3, 0.5));
    let agents = population(&engine, 10, GenotypeKind::Bit, 8);
    let mut rng = StdRng::seed_from_u64(9);

    let next = engine.evolve(&agents, &[0.0; 10], &mut rng).unwrap();
    for i in 0..3 {
        assert_eq!(next[i].genotype(), agents[i].genotype());
    }
}

#[test]
fn test_too_few_parents() {
    // 2 survivors, none of them parents, 2 children needed
    let engine = engine(EvolutionSettings::new(0.5, 0.4, 0.2, 0.0, 0.5));
    let agents = random_agents(4, GenotypeKind::Real, 10);
    let mut rng = StdRng::seed_from_u64(11);
    assert!(matches!(
        engine.evolve(&agents, &[1.0, 2.0, 3.0, 4.0], &mut rng),
        Err(TradegeneError::Configuration(_))
    ));

    // No children needed, so no parents needed either
    let engine = self::engine(EvolutionSettings::new(0.75, 0.2, 0.2, 0.25, 0.5));
    let next = engine.evolve(&agents, &[1.0, 2.0, 3.0, 4.0], &mut rng).unwrap();
    assert_eq!(next.len(), 4);
}

#[test]
fn test_elites_and_carry_over_cannot_exceed_population() {
    let engine = engine(EvolutionSettings::new(0.9, 0.1, 0.2, 0.9, 0.5));
    let agents = random_agents(10, GenotypeKind::Real, 12);
    let fitness: Vec<f64> = (0..10).map(|i| i as f64).collect();
    let mut rng = StdRng::seed_from_u64(13);
    assert!(engine.evolve(&agents, &fitness, &mut rng).is_err());
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let engine = engine(EvolutionSettings::new(0.5, 0.5, 0.2, 0.3, 0.5));
    let agents = population(&engine, 12, GenotypeKind::Complex, 14);
    let fitness: Vec<f64> = (0..12).map(|i| (i * 7 % 12) as f64).collect();

    let a = engine.evolve(&agents, &fitness, &mut StdRng::seed_from_u64(15)).unwrap();
    let b = engine.evolve(&agents, &fitness, &mut StdRng::seed_from_u64(15)).unwrap();
    let genotypes = |v: &[Agent]| v.iter().map(|a| a.genotype().clone()).collect::<Vec<_>>();
    assert_eq!(genotypes(&a[..]), genotypes(&b[..]));
}
