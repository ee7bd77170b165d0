pub mod config;
pub mod constants;
pub mod ensemble;
pub mod error;
pub mod lifecycle;
pub mod output;
pub mod particle;
pub mod physics;
pub mod planet;
pub mod sim;
pub mod stats;

pub use config::{SimulationConfig, SnapshotConfig, StatsConfig, ThermalizationPolicy};
pub use error::{Result, SimError};
pub use planet::Planet;
pub use sim::{SimProps, SimReport, Simulation};
