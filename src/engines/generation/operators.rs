use crate::engines::generation::genome::Genotype;
use crate::error::{Result, TradegeneError};
use crate::functions::RuleRegistry;
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Population indices ordered by descending fitness. Stable, so equal
/// fitness keeps population order.
pub fn rank_by_fitness(fitness: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..fitness.len()).collect();
    order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
    order
}

/// `floor(total * rate)`
pub fn portion(total: usize, rate: f64) -> usize {
    (total as f64 * rate) as usize
}

/// Shuffle `items` and split off the first `floor(len * rate)` of them
pub fn shuffle_split<T, R: Rng + ?Sized>(mut items: Vec<T>, rate: f64, rng: &mut R) -> (Vec<T>, Vec<T>) {
    items.shuffle(rng);
    let rest = items.split_off(portion(items.len(), rate).min(items.len()));
    (items, rest)
}

/// Two distinct members of `pool`, uniformly at random
pub fn pick_two<'a, T, R: Rng + ?Sized>(pool: &'a [T], rng: &mut R) -> Result<(&'a T, &'a T)> {
    if pool.len() < 2 {
        return Err(TradegeneError::Configuration(format!(
            "Crossover needs at least 2 parents, got {}",
            pool.len()
        )));
    }
    let picked = index::sample(rng, pool.len(), 2);
    Ok((&pool[picked.index(0)], &pool[picked.index(1)]))
}

/// Uniform crossover: each locus comes from one parent chosen at random.
/// A weight and its parameter tuple are always taken together.
pub fn uniform_crossover<R: Rng + ?Sized>(p1: &Genotype, p2: &Genotype, rng: &mut R) -> Result<Genotype> {
    if p1.kind != p2.kind || p1.len() != p2.len() {
        return Err(TradegeneError::Configuration(format!(
            "Cannot cross a {:?} genotype of length {} with a {:?} genotype of length {}",
            p1.kind,
            p1.len(),
            p2.kind,
            p2.len()
        )));
    }

    let from_first: Vec<bool> = (0..p1.len()).map(|_| rng.gen_bool(0.5)).collect();
    let pick = |i: usize| if from_first[i] { p1 } else { p2 };

    let gene = (0..p1.len()).map(|i| pick(i).gene[i]).collect();
    let params = match (&p1.params, &p2.params) {
        (Some(_), Some(_)) => Some(
            (0..p1.len())
                .map(|i| pick(i).params.as_ref().map(|p| p[i].clone()).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    };

    Ok(Genotype { kind: p1.kind, gene, params })
}

/// Per-locus mutation: keep each locus with probability `keep_rate`,
/// otherwise draw a fresh value (and, for complex genotypes, a fresh
/// parameter tuple for that rule).
pub fn mutate_genotype<R: Rng + ?Sized>(
    genotype: &Genotype,
    keep_rate: f64,
    registry: &RuleRegistry,
    rng: &mut R,
) -> Result<Genotype> {
    let mut mutated = genotype.clone();

    for i in 0..mutated.len() {
        if rng.gen::<f64>() < keep_rate {
            continue;
        }
        mutated.gene[i] = mutated.kind.random_locus(rng);
        if let Some(params) = mutated.params.as_mut() {
            let kind = registry.kind(i).ok_or_else(|| {
                TradegeneError::Configuration(format!("No rule at locus {} in the registry", i))
            })?;
            params[i] = kind.generate_params(rng);
        }
    }

    Ok(mutated)
}
