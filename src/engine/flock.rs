//! Reference engine: birds with an eye and a tiny brain chase food on a
//! torus, and a genetic algorithm breeds the next generation from the best
//! eaters.

use std::f32::consts::TAU;

use rand::prelude::*;
use rand_pcg::Pcg64;

use super::brain::Brain;
use super::eye::Eye;
use super::ga::{self, Individual, RouletteWheel, SelectionMethod};
use super::{Animal, Config, Engine, EngineError, Food, Simulation, Statistics, World};

/// Hands out independently seeded flocks.
pub struct FlockEngine {
    rng: Pcg64,
}

impl FlockEngine {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Pcg64::from_entropy(),
        }
    }
}

impl Engine for FlockEngine {
    type Sim = Flock;

    fn default_config(&self) -> Config {
        Config::default()
    }

    fn create(&mut self, config: Config) -> Result<Flock, EngineError> {
        config.validate()?;
        let rng = Pcg64::seed_from_u64(self.rng.gen());
        Ok(Flock::random(config, rng))
    }
}

#[derive(Debug, Clone)]
struct Bird {
    x: f32,
    y: f32,
    rotation: f32,
    speed: f32,
    vision: Vec<f32>,
    brain: Brain,
    satiation: usize,
}

impl Bird {
    fn random(config: &Config, brain: Brain, rng: &mut Pcg64) -> Self {
        Self {
            x: rng.gen(),
            y: rng.gen(),
            rotation: rng.gen::<f32>() * TAU,
            speed: (config.sim_speed_min + config.sim_speed_max) / 2.0,
            vision: vec![0.0; config.eye_cells],
            brain,
            satiation: 0,
        }
    }
}

struct Scored {
    fitness: f32,
    genes: Vec<f32>,
}

impl Individual for Scored {
    fn fitness(&self) -> f32 {
        self.fitness
    }

    fn chromosome(&self) -> &[f32] {
        &self.genes
    }
}

pub struct Flock {
    config: Config,
    rng: Pcg64,
    eye: Eye,
    topology: [usize; 3],
    birds: Vec<Bird>,
    foods: Vec<Food>,
    age: usize,
    generation: usize,
}

impl Flock {
    fn random(config: Config, mut rng: Pcg64) -> Self {
        let eye = Eye::new(&config);
        let topology = [eye.cells(), config.brain_neurons, 2];
        let birds = (0..config.world_animals)
            .map(|_| {
                let brain = Brain::random(&topology, &mut rng);
                Bird::random(&config, brain, &mut rng)
            })
            .collect();
        let foods = (0..config.world_foods)
            .map(|_| random_food(&mut rng))
            .collect();
        log::debug!(
            "Created flock: {} birds, {} foods",
            config.world_animals,
            config.world_foods
        );

        Self {
            config,
            rng,
            eye,
            topology,
            birds,
            foods,
            age: 0,
            generation: 0,
        }
    }

    fn process_collisions(&mut self) {
        let reach = self.config.food_size;
        for bird in self.birds.iter_mut() {
            for food in self.foods.iter_mut() {
                let dx = bird.x - food.x;
                let dy = bird.y - food.y;
                if (dx * dx + dy * dy).sqrt() <= reach {
                    bird.satiation += 1;
                    *food = random_food(&mut self.rng);
                }
            }
        }
    }

    fn process_brains(&mut self) {
        let config = &self.config;
        for bird in self.birds.iter_mut() {
            bird.vision = self
                .eye
                .process_vision(bird.x, bird.y, bird.rotation, &self.foods);
            let response = bird.brain.propagate(bird.vision.clone());

            let r0 = response[0].clamp(0.0, 1.0) - 0.5;
            let r1 = response[1].clamp(0.0, 1.0) - 0.5;
            let speed = (r0 + r1).clamp(-config.sim_speed_accel, config.sim_speed_accel);
            let rotation =
                (r0 - r1).clamp(-config.sim_rotation_accel, config.sim_rotation_accel);

            bird.speed = (bird.speed + speed).clamp(config.sim_speed_min, config.sim_speed_max);
            bird.rotation = (bird.rotation + rotation).rem_euclid(TAU);
        }
    }

    fn process_movements(&mut self) {
        for bird in self.birds.iter_mut() {
            bird.x = (bird.x - bird.rotation.sin() * bird.speed).rem_euclid(1.0);
            bird.y = (bird.y + bird.rotation.cos() * bird.speed).rem_euclid(1.0);
        }
    }

    fn fitness(&self, bird: &Bird) -> f32 {
        if self.config.ga_reverse != 0 {
            1.0 / (1.0 + bird.satiation as f32)
        } else {
            bird.satiation as f32
        }
    }

    fn evolve(&mut self) -> Statistics {
        self.age = 0;
        self.generation += 1;

        let scored: Vec<Scored> = self
            .birds
            .iter()
            .map(|bird| Scored {
                fitness: self.fitness(bird),
                genes: bird.brain.genes(),
            })
            .collect();
        let fitness: Vec<f32> = scored.iter().map(|s| s.fitness).collect();
        let stats = Statistics::from_fitness(
            &fitness,
            self.generation,
            self.config.sim_generation_length,
        );

        let mut offspring = Vec::with_capacity(scored.len());
        for _ in 0..scored.len() {
            let (Some(a), Some(b)) = (
                RouletteWheel.select(&scored, &mut self.rng),
                RouletteWheel.select(&scored, &mut self.rng),
            ) else {
                break;
            };
            let mut genes =
                ga::uniform_crossover(a.chromosome(), b.chromosome(), &mut self.rng);
            ga::mutate(
                &mut genes,
                self.config.ga_mut_chance,
                self.config.ga_mut_coeff,
                &mut self.rng,
            );
            offspring.push(Brain::from_genes(&self.topology, &genes));
        }

        self.birds = offspring
            .into_iter()
            .map(|brain| Bird::random(&self.config, brain, &mut self.rng))
            .collect();
        for food in self.foods.iter_mut() {
            *food = random_food(&mut self.rng);
        }

        log::debug!("Generation {} finished: {:?}", self.generation, stats.fitness());
        stats
    }
}

fn random_food(rng: &mut Pcg64) -> Food {
    Food {
        x: rng.gen(),
        y: rng.gen(),
    }
}

impl Simulation for Flock {
    fn config(&self) -> &Config {
        &self.config
    }

    fn world(&self) -> World {
        World {
            animals: self
                .birds
                .iter()
                .map(|bird| Animal {
                    x: bird.x,
                    y: bird.y,
                    rotation: bird.rotation,
                    vision: bird.vision.clone(),
                })
                .collect(),
            foods: self.foods.clone(),
        }
    }

    fn step(&mut self) -> Statistics {
        self.process_collisions();
        self.process_brains();
        self.process_movements();
        self.age += 1;

        if self.age >= self.config.sim_generation_length {
            return self.evolve();
        }

        Statistics {
            age: self.age,
            generation_length: self.config.sim_generation_length,
            generation: self.generation + 1,
            ..Statistics::default()
        }
    }

    fn train(&mut self) -> Statistics {
        loop {
            let stats = self.step();
            if stats.age == 0 {
                return stats;
            }
        }
    }
}
