use rand::Rng;

pub trait Individual {
    fn fitness(&self) -> f32;
    fn chromosome(&self) -> &[f32];
}

pub trait SelectionMethod {
    /// `None` only for an empty population.
    fn select<'a, I>(&self, population: &'a [I], rng: &mut impl Rng) -> Option<&'a I>
    where
        I: Individual;
}

/// Fitness-proportionate selection. A population with no fitness at all is
/// sampled uniformly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouletteWheel;

impl SelectionMethod for RouletteWheel {
    fn select<'a, I>(&self, population: &'a [I], rng: &mut impl Rng) -> Option<&'a I>
    where
        I: Individual,
    {
        if population.is_empty() {
            return None;
        }

        let total: f32 = population.iter().map(|i| i.fitness().max(0.0)).sum();
        if total <= 0.0 {
            return population.get(rng.gen_range(0..population.len()));
        }

        let mut pick = rng.gen::<f32>() * total;
        for individual in population {
            let fitness = individual.fitness();
            if fitness <= 0.0 {
                continue;
            }
            pick -= fitness;
            if pick <= 0.0 {
                return Some(individual);
            }
        }
        population.last()
    }
}

pub fn uniform_crossover(a: &[f32], b: &[f32], rng: &mut impl Rng) -> Vec<f32> {
    a.iter()
        .zip(b)
        .map(|(&a, &b)| if rng.gen_bool(0.5) { a } else { b })
        .collect()
}

/// Each gene mutates with probability `chance`, shifted by up to `coeff`
/// in either direction.
pub fn mutate(genes: &mut [f32], chance: f32, coeff: f32, rng: &mut impl Rng) {
    let chance = f64::from(chance).clamp(0.0, 1.0);
    for gene in genes.iter_mut() {
        if rng.gen_bool(chance) {
            let sign = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
            *gene += sign * coeff * rng.gen::<f32>();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    struct Bird {
        fitness: f32,
        genes: Vec<f32>,
    }

    impl Individual for Bird {
        fn fitness(&self) -> f32 {
            self.fitness
        }

        fn chromosome(&self) -> &[f32] {
            &self.genes
        }
    }

    fn bird(fitness: f32) -> Bird {
        Bird {
            fitness,
            genes: vec![fitness],
        }
    }

    #[test]
    fn roulette_favours_fitter_individuals() {
        let mut rng = Pcg64::seed_from_u64(42);
        let population = vec![bird(1.0), bird(4.0)];
        let picks = (0..1000)
            .filter(|_| RouletteWheel.select(&population, &mut rng).unwrap().fitness == 4.0)
            .count();
        assert!(picks > 700, "fitter bird picked only {} times", picks);
    }

    #[test]
    fn roulette_never_picks_zero_fitness_when_others_score() {
        let mut rng = Pcg64::seed_from_u64(3);
        let population = vec![bird(0.0), bird(2.0), bird(0.0)];
        for _ in 0..100 {
            assert_eq!(RouletteWheel.select(&population, &mut rng).unwrap().fitness, 2.0);
        }
    }

    #[test]
    fn roulette_handles_all_zero_fitness() {
        let mut rng = Pcg64::seed_from_u64(9);
        let population = vec![bird(0.0), bird(0.0)];
        let picked = RouletteWheel.select(&population, &mut rng).unwrap();
        assert_eq!(picked.chromosome(), &[0.0]);
    }

    #[test]
    fn roulette_on_empty_population_picks_nothing() {
        let mut rng = Pcg64::seed_from_u64(9);
        let population: Vec<Bird> = Vec::new();
        assert!(RouletteWheel.select(&population, &mut rng).is_none());
    }

    #[test]
    fn crossover_takes_genes_from_either_parent() {
        let mut rng = Pcg64::seed_from_u64(1);
        let child = uniform_crossover(&[0.0; 64], &[1.0; 64], &mut rng);
        assert_eq!(child.len(), 64);
        assert!(child.iter().any(|&g| g == 0.0));
        assert!(child.iter().any(|&g| g == 1.0));
    }

    #[test]
    fn mutation_respects_chance_and_coeff() {
        let mut rng = Pcg64::seed_from_u64(5);
        let mut genes = vec![0.0; 32];
        mutate(&mut genes, 0.0, 0.5, &mut rng);
        assert!(genes.iter().all(|&g| g == 0.0));

        mutate(&mut genes, 1.0, 0.5, &mut rng);
        assert!(genes.iter().all(|&g| g.abs() <= 0.5));
        assert!(genes.iter().any(|&g| g != 0.0));
    }
}
