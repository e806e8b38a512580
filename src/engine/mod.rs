//! The contract between the console and a simulation engine.
//!
//! The console only ever talks to an engine through [`Engine`] and
//! [`Simulation`]; everything past these traits is opaque to it.

use std::fmt;

use thiserror::Error;

mod brain;
mod config;
mod eye;
pub mod flock;
mod ga;

pub use config::{Config, FieldValue};
pub use flock::FlockEngine;

/// Errors raised when the engine refuses a configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown or mistyped config field: {0}")]
    Field(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Builds simulations.
pub trait Engine {
    type Sim: Simulation;

    fn default_config(&self) -> Config;

    fn create(&mut self, config: Config) -> Result<Self::Sim, EngineError>;
}

/// A live simulation handle.
pub trait Simulation {
    fn config(&self) -> &Config;

    /// Fresh snapshot of everything drawable.
    fn world(&self) -> World;

    /// Advance one tick. Fitness fields are only present on the tick that
    /// closed a generation with a non-empty population.
    fn step(&mut self) -> Statistics;

    /// Advance until the current generation ends and return its summary.
    fn train(&mut self) -> Statistics;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct World {
    pub animals: Vec<Animal>,
    pub foods: Vec<Food>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    /// Sensed energy per eye cell, conceptually in `0.0..=1.0`.
    pub vision: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Food {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    pub age: usize,
    pub generation_length: usize,
    pub generation: usize,
    pub min: Option<f32>,
    pub avg: Option<f32>,
    pub max: Option<f32>,
}

impl Statistics {
    /// All three fitness aggregates, if this record closed a generation.
    pub fn fitness(&self) -> Option<(f32, f32, f32)> {
        Some((self.min?, self.avg?, self.max?))
    }

    pub(crate) fn from_fitness(
        fitness: &[f32],
        generation: usize,
        generation_length: usize,
    ) -> Self {
        let mut stats = Self {
            age: 0,
            generation_length,
            generation,
            ..Self::default()
        };
        if fitness.is_empty() {
            return stats;
        }
        let min = fitness.iter().copied().fold(f32::INFINITY, f32::min);
        let max = fitness.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let avg = fitness.iter().sum::<f32>() / fitness.len() as f32;
        stats.min = Some(min);
        stats.avg = Some(avg);
        stats.max = Some(max);
        stats
    }
}

struct Aggregate(Option<f32>);

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.2}", value),
            None => write!(f, "-"),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "generation {}:", self.generation)?;
        write!(
            f,
            "  min[{}] max[{}] avg[{}]",
            Aggregate(self.min),
            Aggregate(self.max),
            Aggregate(self.avg)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_fitness() {
        let stats = Statistics::from_fitness(&[1.0, 3.0, 2.0], 4, 100);
        assert_eq!(stats.fitness(), Some((1.0, 2.0, 3.0)));
        assert_eq!(stats.generation, 4);
        assert_eq!(stats.generation_length, 100);
    }

    #[test]
    fn empty_population_has_no_fitness() {
        let stats = Statistics::from_fitness(&[], 1, 10);
        assert_eq!(stats.fitness(), None);
        assert_eq!(stats.to_string(), "generation 1:\n  min[-] max[-] avg[-]");
    }

    #[test]
    fn displays_summary() {
        let stats = Statistics::from_fitness(&[0.0, 4.0, 1.0, 0.0], 3, 100);
        assert_eq!(
            stats.to_string(),
            "generation 3:\n  min[0.00] max[4.00] avg[1.25]"
        );
    }
}
