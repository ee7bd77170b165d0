use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while building or configuring a simulation.
///
/// Output failures during a run are reported and counted instead of being
/// returned, so a slow or missing output directory never stops the sweep.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected configuration value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// `Simulation::run` was called on a simulation that already ran.
    #[error("simulation \"{0}\" has already run")]
    AlreadyRun(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
