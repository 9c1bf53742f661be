//! Error types for the `colony-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`] through the
//! standard [`Result`] type alias.

use colony_types::Position;

/// Errors that can occur while building or loading a reference world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The position lies outside the map.
    #[error("position {0} is outside the map")]
    OutOfBounds(Position),

    /// Scenario JSON could not be parsed.
    #[error("failed to parse world scenario: {source}")]
    Scenario {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Scenario file could not be read.
    #[error("failed to read world scenario: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
