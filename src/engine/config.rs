use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use serde::{Deserialize, Serialize};

use super::EngineError;

/// Every knob the flock engine understands.
///
/// Field names are part of the operator surface: `reset i:<field>=...` and
/// `reset f:<field>=...` address them directly.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub brain_neurons: usize,

    pub eye_fov_range: f32,
    pub eye_fov_angle: f32,
    pub eye_cells: usize,

    pub food_size: f32,

    /// Non-zero rewards birds for *avoiding* food.
    pub ga_reverse: usize,
    pub ga_mut_chance: f32,
    pub ga_mut_coeff: f32,

    pub sim_speed_min: f32,
    pub sim_speed_max: f32,
    pub sim_speed_accel: f32,
    pub sim_rotation_accel: f32,
    pub sim_generation_length: usize,

    pub world_animals: usize,
    pub world_foods: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brain_neurons: 9,
            eye_fov_range: 0.25,
            eye_fov_angle: PI + FRAC_PI_4,
            eye_cells: 9,
            food_size: 0.01,
            ga_reverse: 0,
            ga_mut_chance: 0.01,
            ga_mut_coeff: 0.3,
            sim_speed_min: 0.001,
            sim_speed_max: 0.005,
            sim_speed_accel: 0.2,
            sim_rotation_accel: FRAC_PI_2,
            sim_generation_length: 2500,
            world_animals: 40,
            world_foods: 60,
        }
    }
}

/// A raw value for a field addressed by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
}

impl From<FieldValue> for toml::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Int(v) => toml::Value::Integer(v),
            FieldValue::Float(v) => toml::Value::Float(v),
        }
    }
}

impl Config {
    /// Set a field by name, going through the serde schema so unknown names
    /// and kind mismatches are refused.
    pub fn with_field(&self, name: &str, value: FieldValue) -> Result<Self, EngineError> {
        let mut raw =
            toml::Value::try_from(self).map_err(|err| EngineError::Field(err.to_string()))?;
        let table = raw
            .as_table_mut()
            .ok_or(EngineError::InvalidConfig("config did not serialize to a table"))?;
        if !table.contains_key(name) {
            return Err(EngineError::Field(name.to_string()));
        }
        table.insert(name.to_string(), value.into());
        raw.try_into()
            .map_err(|err: toml::de::Error| EngineError::Field(format!("{}: {}", name, err.message())))
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.eye_cells == 0 {
            return Err(EngineError::InvalidConfig("eye_cells must be at least 1"));
        }
        if self.brain_neurons == 0 {
            return Err(EngineError::InvalidConfig("brain_neurons must be at least 1"));
        }
        if self.sim_generation_length == 0 {
            return Err(EngineError::InvalidConfig(
                "sim_generation_length must be at least 1",
            ));
        }
        if !(self.eye_fov_range > 0.0 && self.eye_fov_angle > 0.0 && self.food_size > 0.0) {
            return Err(EngineError::InvalidConfig(
                "eye_fov_range, eye_fov_angle and food_size must be positive",
            ));
        }
        if !(self.sim_speed_accel >= 0.0 && self.sim_rotation_accel >= 0.0) {
            return Err(EngineError::InvalidConfig(
                "sim_speed_accel and sim_rotation_accel must not be negative",
            ));
        }
        if !(self.sim_speed_min <= self.sim_speed_max) {
            return Err(EngineError::InvalidConfig(
                "sim_speed_min must not exceed sim_speed_max",
            ));
        }
        Ok(())
    }
}
