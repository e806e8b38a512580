use thiserror::Error;

use crate::engine::EngineError;

/// Everything that can abort a single console command.
///
/// None of these are fatal: the command is dropped, the message is shown to
/// the operator and the simulation carries on.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(&'static str),
    #[error("cannot parse `{value}` as {expected}")]
    Parse {
        value: String,
        expected: &'static str,
    },
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("unknown command")]
    UnknownCommand(String),
    #[error(
        "square brackets are just for documentation purposes - you don't have to write them, e.g.: reset animals=100"
    )]
    SyntaxGuard,
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl CommandError {
    pub(crate) fn parse(value: &str, expected: &'static str) -> Self {
        Self::Parse {
            value: value.to_string(),
            expected,
        }
    }
}
