//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup, the tick loop,
//! and shutdown persistence so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: colony_core::ConfigError,
    },

    /// Scenario loading failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: colony_world::WorldError,
    },

    /// Colony memory could not be loaded or saved.
    #[error("memory error: {source}")]
    Memory {
        /// The underlying memory error.
        #[from]
        source: colony_core::MemoryError,
    },

    /// The escalation queue could not be loaded or saved.
    #[error("escalation queue error: {source}")]
    Events {
        /// The underlying events error.
        #[from]
        source: colony_events::EventsError,
    },
}
