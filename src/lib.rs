pub mod arena;
pub mod board;
pub mod budget;
pub mod config;
pub mod constants;
pub mod error;
pub mod lanes;
pub mod layout;
pub mod location;
pub mod registry;
pub mod step;
pub mod steps;
pub mod strategy;
pub mod telemetry;
pub mod threat;
pub mod unit;

pub use board::{GameBoard, StructureSnapshot};
pub use config::{PolicyKind, StrategyConfig};
pub use error::{ConfigError, FrameError};
pub use strategy::{Strategy, StrategyBuilder};
pub use telemetry::FrameEvents;
