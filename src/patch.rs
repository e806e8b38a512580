//! Turns `reset` arguments into a patched engine config.
//!
//! Two kinds of arguments exist: short, friendly aliases for the handful of
//! knobs people touch most (`a=100`, `photoreceptors=3`), and a typed escape
//! hatch that reaches any field by name (`i:ga_reverse=1`,
//! `f:food_size=0.02`). The escape hatch is unchecked on our side; the engine
//! refuses names and kinds it doesn't know.

use std::str::FromStr;

use crate::engine::{Config, FieldValue};
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasField {
    Animals,
    Foods,
    Neurons,
    Photoreceptors,
}

impl AliasField {
    pub const ALL: [AliasField; 4] = [
        AliasField::Animals,
        AliasField::Foods,
        AliasField::Neurons,
        AliasField::Photoreceptors,
    ];

    pub fn resolve(name: &str) -> Option<Self> {
        match name {
            "a" | "animals" => Some(Self::Animals),
            "f" | "foods" => Some(Self::Foods),
            "n" | "neurons" => Some(Self::Neurons),
            "p" | "photoreceptors" => Some(Self::Photoreceptors),
            _ => None,
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Self::Animals => "a",
            Self::Foods => "f",
            Self::Neurons => "n",
            Self::Photoreceptors => "p",
        }
    }

    pub fn long(self) -> &'static str {
        match self {
            Self::Animals => "animals",
            Self::Foods => "foods",
            Self::Neurons => "neurons",
            Self::Photoreceptors => "photoreceptors",
        }
    }

    /// Name of the engine field this alias stands for.
    pub fn field(self) -> &'static str {
        match self {
            Self::Animals => "world_animals",
            Self::Foods => "world_foods",
            Self::Neurons => "brain_neurons",
            Self::Photoreceptors => "eye_cells",
        }
    }

    pub fn get(self, config: &Config) -> usize {
        match self {
            Self::Animals => config.world_animals,
            Self::Foods => config.world_foods,
            Self::Neurons => config.brain_neurons,
            Self::Photoreceptors => config.eye_cells,
        }
    }

    fn set(self, config: &mut Config, value: usize) {
        match self {
            Self::Animals => config.world_animals = value,
            Self::Foods => config.world_foods = value,
            Self::Neurons => config.brain_neurons = value,
            Self::Photoreceptors => config.eye_cells = value,
        }
    }
}

/// One parsed `name=value` argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    Alias(AliasField, usize),
    Raw { field: String, value: FieldValue },
}

impl FromStr for Override {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (name, value) = token
            .split_once('=')
            .ok_or_else(|| CommandError::parse(token, "name=value"))?;

        if let Some(field) = name.strip_prefix("i:") {
            let value = value
                .parse::<i64>()
                .map_err(|_| CommandError::parse(value, "an integer"))?;
            return Ok(Self::Raw {
                field: field.to_string(),
                value: FieldValue::Int(value),
            });
        }

        if let Some(field) = name.strip_prefix("f:") {
            let value = value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| CommandError::parse(value, "a finite number"))?;
            return Ok(Self::Raw {
                field: field.to_string(),
                value: FieldValue::Float(value),
            });
        }

        let alias = AliasField::resolve(name)
            .ok_or_else(|| CommandError::UnknownParameter(name.to_string()))?;
        let value = value
            .parse::<usize>()
            .map_err(|_| CommandError::parse(value, "a non-negative integer"))?;
        Ok(Self::Alias(alias, value))
    }
}

pub fn parse_overrides<'a, I>(tokens: I) -> Result<Vec<Override>, CommandError>
where
    I: IntoIterator<Item = &'a str>,
{
    tokens.into_iter().map(Override::from_str).collect()
}

/// Layer `overrides` on top of `base`, in order. `base` itself is untouched.
pub fn apply(base: &Config, overrides: &[Override]) -> Result<Config, CommandError> {
    let mut config = *base;
    for item in overrides {
        match item {
            Override::Alias(alias, value) => alias.set(&mut config, *value),
            Override::Raw { field, value } => config = config.with_field(field, *value)?,
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;

    fn patch(tokens: &[&str]) -> Result<Config, CommandError> {
        apply(&Config::default(), &parse_overrides(tokens.iter().copied())?)
    }

    #[test]
    fn aliases_set_their_canonical_field_only() {
        for alias in AliasField::ALL {
            for name in [alias.short(), alias.long()] {
                let token = format!("{}=7", name);
                let config = patch(&[token.as_str()]).unwrap();
                assert_eq!(alias.get(&config), 7, "{}", token);

                let mut expected = Config::default();
                alias.set(&mut expected, 7);
                assert_eq!(config, expected, "{}", token);
            }
        }
    }

    #[test]
    fn no_arguments_yield_defaults() {
        assert_eq!(patch(&[]).unwrap(), Config::default());
    }

    #[test]
    fn later_overrides_win() {
        let config = patch(&["a=10", "animals=20"]).unwrap();
        assert_eq!(config.world_animals, 20);
    }

    #[test]
    fn aliases_are_case_sensitive() {
        assert!(matches!(
            patch(&["Animals=3"]),
            Err(CommandError::UnknownParameter(name)) if name == "Animals"
        ));
    }

    #[test]
    fn unknown_bare_name_is_rejected() {
        assert!(matches!(
            patch(&["zzz=1"]),
            Err(CommandError::UnknownParameter(name)) if name == "zzz"
        ));
    }

    #[test]
    fn token_without_value_is_a_parse_error() {
        assert!(matches!(patch(&["animals"]), Err(CommandError::Parse { .. })));
    }

    #[test]
    fn non_numeric_alias_value_is_a_parse_error() {
        assert!(matches!(patch(&["a=lots"]), Err(CommandError::Parse { .. })));
        assert!(matches!(patch(&["a=-1"]), Err(CommandError::Parse { .. })));
        assert!(matches!(patch(&["a="]), Err(CommandError::Parse { .. })));
    }

    #[test]
    fn raw_fields_bypass_aliases() {
        let config = patch(&["i:ga_reverse=1", "f:food_size=0.05"]).unwrap();
        assert_eq!(config.ga_reverse, 1);
        assert!((config.food_size - 0.05).abs() < 1e-6);
    }

    #[test]
    fn f_prefix_is_raw_not_foods() {
        // `f=` is the foods alias, `f:` the float escape.
        let config = patch(&["f=5", "f:eye_fov_angle=0.45"]).unwrap();
        assert_eq!(config.world_foods, 5);
        assert!((config.eye_fov_angle - 0.45).abs() < 1e-6);
    }

    #[test]
    fn raw_values_parse_strictly() {
        assert!(matches!(patch(&["i:brain_neurons=1.5"]), Err(CommandError::Parse { .. })));
        assert!(matches!(patch(&["f:food_size=big"]), Err(CommandError::Parse { .. })));
        assert!(matches!(patch(&["f:food_size=NaN"]), Err(CommandError::Parse { .. })));
    }

    #[test]
    fn engine_rejects_unknown_raw_field() {
        assert!(matches!(
            patch(&["i:wingspan=3"]),
            Err(CommandError::Engine(EngineError::Field(_)))
        ));
    }

    #[test]
    fn parse_fails_before_anything_applies() {
        let err = parse_overrides(["a=5", "bogus=1", "f=9"]).unwrap_err();
        assert!(matches!(err, CommandError::UnknownParameter(_)));
    }

    #[test]
    fn base_is_not_mutated() {
        let base = Config::default();
        let patched = apply(&base, &[Override::Alias(AliasField::Foods, 1)]).unwrap();
        assert_eq!(patched.world_foods, 1);
        assert_eq!(base, Config::default());
    }
}
