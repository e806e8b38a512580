//! The console's single piece of mutable state.
//!
//! Everything runs on one thread: the frame loop, submitted commands and
//! control changes each get `&mut Session` in turn and run to completion, so
//! no locking is involved.

use crate::engine::{Config, Engine, EngineError, Simulation, Statistics, World};
use crate::error::CommandError;
use crate::patch::{self, Override};

pub const DEFAULT_MAX_SPEEDUP: u32 = 100;

pub struct Session<E: Engine> {
    engine: E,
    simulation: E::Sim,
    active: bool,
    speedup: u32,
    max_speedup: u32,
}

impl<E: Engine> Session<E> {
    /// Start running a simulation built from the engine's defaults.
    pub fn new(mut engine: E) -> Result<Self, EngineError> {
        let simulation = engine.create(engine.default_config())?;
        Ok(Self {
            engine,
            simulation,
            active: true,
            speedup: 1,
            max_speedup: DEFAULT_MAX_SPEEDUP,
        })
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flip between running and paused; returns the new running state.
    pub fn toggle_pause(&mut self) -> bool {
        self.active = !self.active;
        self.active
    }

    pub fn speedup(&self) -> u32 {
        self.speedup
    }

    pub fn max_speedup(&self) -> u32 {
        self.max_speedup
    }

    /// Clamped into `1..=max_speedup`.
    pub fn set_speedup(&mut self, speedup: u32) -> u32 {
        self.speedup = speedup.clamp(1, self.max_speedup);
        self.speedup
    }

    pub fn set_max_speedup(&mut self, max: u32) {
        self.max_speedup = max.max(1);
        self.speedup = self.speedup.min(self.max_speedup);
    }

    pub fn default_config(&self) -> Config {
        self.engine.default_config()
    }

    pub fn config(&self) -> &Config {
        self.simulation.config()
    }

    pub fn world(&self) -> World {
        self.simulation.world()
    }

    pub fn step(&mut self) -> Statistics {
        self.simulation.step()
    }

    /// Replace the running simulation with one built from the engine
    /// defaults plus `overrides`.
    ///
    /// Nothing changes unless every override applies and the engine accepts
    /// the result.
    pub fn reset(&mut self, overrides: &[Override]) -> Result<&Config, CommandError> {
        let config = patch::apply(&self.engine.default_config(), overrides)?;
        let simulation = self.engine.create(config)?;
        self.simulation = simulation;
        log::info!("Simulation reset: {:?}", self.simulation.config());
        Ok(self.simulation.config())
    }

    /// Fast-forward `generations` whole generations, paused or not.
    pub fn train(&mut self, generations: usize) -> Vec<Statistics> {
        (0..generations)
            .map(|_| {
                let stats = self.simulation.train();
                log::debug!("Trained generation {}", stats.generation);
                stats
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FlockEngine;
    use crate::patch::AliasField;

    fn session() -> Session<FlockEngine> {
        let mut session = Session::new(FlockEngine::seeded(1)).unwrap();
        session
            .reset(&[Override::Raw {
                field: "sim_generation_length".to_string(),
                value: crate::engine::FieldValue::Int(10),
            }])
            .unwrap();
        session
    }

    #[test]
    fn starts_running_at_real_time() {
        let session = Session::new(FlockEngine::seeded(1)).unwrap();
        assert!(session.is_active());
        assert_eq!(session.speedup(), 1);
        assert_eq!(session.config(), &Config::default());
    }

    #[test]
    fn toggle_pause_twice_restores_state() {
        let mut session = session();
        assert!(!session.toggle_pause());
        assert!(session.toggle_pause());
    }

    #[test]
    fn speedup_is_clamped() {
        let mut session = session();
        assert_eq!(session.set_speedup(0), 1);
        assert_eq!(session.set_speedup(5_000), DEFAULT_MAX_SPEEDUP);
        session.set_max_speedup(10);
        assert_eq!(session.speedup(), 10);
        assert_eq!(session.set_speedup(7), 7);
    }

    #[test]
    fn reset_starts_from_defaults_not_current() {
        let mut session = session();
        session
            .reset(&[Override::Alias(AliasField::Animals, 3)])
            .unwrap();
        let config = session
            .reset(&[Override::Alias(AliasField::Foods, 4)])
            .unwrap();
        assert_eq!(config.world_animals, Config::default().world_animals);
        assert_eq!(config.world_foods, 4);
    }

    #[test]
    fn failed_reset_keeps_previous_simulation() {
        let mut session = session();
        session.step();
        let before = session.world();

        let err = session
            .reset(&[
                Override::Alias(AliasField::Animals, 2),
                Override::Raw {
                    field: "nonsense".to_string(),
                    value: crate::engine::FieldValue::Int(1),
                },
            ])
            .unwrap_err();
        assert!(matches!(err, CommandError::Engine(_)));
        assert_eq!(session.world(), before);
        assert_eq!(session.config().sim_generation_length, 10);
    }

    #[test]
    fn engine_rejection_keeps_previous_simulation() {
        let mut session = session();
        let err = session
            .reset(&[Override::Alias(AliasField::Photoreceptors, 0)])
            .unwrap_err();
        assert!(matches!(err, CommandError::Engine(EngineError::InvalidConfig(_))));
        assert_eq!(session.config().eye_cells, Config::default().eye_cells);
    }

    #[test]
    fn negative_acceleration_is_refused_and_session_keeps_running() {
        let mut session = session();
        for field in ["sim_speed_accel", "sim_rotation_accel"] {
            let err = session
                .reset(&[Override::Raw {
                    field: field.to_string(),
                    value: crate::engine::FieldValue::Float(-1.0),
                }])
                .unwrap_err();
            assert!(matches!(err, CommandError::Engine(EngineError::InvalidConfig(_))));
        }
        assert_eq!(session.config().sim_speed_accel, Config::default().sim_speed_accel);
        assert_eq!(session.step().age, 1);
        assert_eq!(session.train(1).len(), 1);
    }

    #[test]
    fn train_ignores_pause() {
        let mut session = session();
        session.toggle_pause();
        let summaries = session.train(2);
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].generation < summaries[1].generation);
        assert!(!session.is_active());
    }
}
