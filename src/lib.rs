//! An interactive control console for an evolution simulation.
//!
//! The console owns one [`Session`] and drives it three ways: the per-frame
//! [`RenderLoop`], operator commands typed into the [`Terminal`], and the
//! speed and pause controls of the front-end. The simulation itself sits
//! behind the [`Engine`] trait.

pub mod chart;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod patch;
pub mod render;
pub mod session;
pub mod terminal;

pub use chart::StatsChart;
pub use command::{Command, Outcome};
pub use config::{ConfigWatcher, ConsoleConfig};
pub use engine::{Engine, FlockEngine, Simulation, Statistics};
pub use error::CommandError;
pub use render::RenderLoop;
pub use session::Session;
pub use terminal::Terminal;
