//! Operator commands: `pause`, `reset`, `train`.
//!
//! A line is parsed into a [`Command`] in full before anything runs, so a
//! bad argument anywhere aborts the whole command without side effects.

use std::num::NonZeroUsize;
use std::str::FromStr;

use crate::engine::{Config, Engine, Statistics};
use crate::error::CommandError;
use crate::patch::{self, Override};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Pause,
    Reset(Vec<Override>),
    Train(NonZeroUsize),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.contains(|c| c == '[' || c == ']') {
            return Err(CommandError::SyntaxGuard);
        }

        let mut tokens = input.split_whitespace();
        let name = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        match name {
            "p" | "pause" => {
                if !args.is_empty() {
                    return Err(CommandError::Usage("this command accepts no parameters"));
                }
                Ok(Self::Pause)
            }
            "r" | "reset" => Ok(Self::Reset(patch::parse_overrides(args)?)),
            "t" | "train" => match args.as_slice() {
                [] => Ok(Self::Train(NonZeroUsize::MIN)),
                [count] => count
                    .parse()
                    .map(Self::Train)
                    .map_err(|_| CommandError::parse(count, "a positive integer")),
                _ => Err(CommandError::Usage(
                    "this command accepts at most one parameter",
                )),
            },
            _ => Err(CommandError::UnknownCommand(name.to_string())),
        }
    }
}

/// What a successful command did, for the terminal to report.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Paused,
    Resumed,
    Reset(Config),
    Trained(Vec<Statistics>),
}

impl Outcome {
    /// Lines to print; trained generations are separated by a blank line.
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Paused => vec!["simulation paused".to_string()],
            Self::Resumed => vec!["simulation resumed".to_string()],
            Self::Reset(config) => vec![format!(
                "simulation restarted: {} animals, {} foods, {} neurons, {} photoreceptors",
                config.world_animals, config.world_foods, config.brain_neurons, config.eye_cells
            )],
            Self::Trained(summaries) => {
                let mut lines = Vec::new();
                for (i, stats) in summaries.iter().enumerate() {
                    if i > 0 {
                        lines.push(String::new());
                    }
                    lines.extend(stats.to_string().lines().map(str::to_string));
                }
                lines
            }
        }
    }
}

impl Command {
    pub fn execute<E: Engine>(self, session: &mut Session<E>) -> Result<Outcome, CommandError> {
        match self {
            Self::Pause => Ok(if session.toggle_pause() {
                Outcome::Resumed
            } else {
                Outcome::Paused
            }),
            Self::Reset(overrides) => session.reset(&overrides).map(|c| Outcome::Reset(*c)),
            Self::Train(generations) => Ok(Outcome::Trained(session.train(generations.get()))),
        }
    }
}

/// Parse and run one line of operator input.
pub fn execute<E: Engine>(session: &mut Session<E>, input: &str) -> Result<Outcome, CommandError> {
    let command: Command = input.parse()?;
    log::debug!("Executing {:?}", command);
    command.execute(session)
}
