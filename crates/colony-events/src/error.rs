//! Error types for persisting the escalation queue.

/// Errors raised while reading or writing the pending-events file.
#[derive(Debug, thiserror::Error)]
pub enum EventsError {
    /// The pending-events file could not be read or written.
    #[error("pending events I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The pending-events file is not a valid JSON event array.
    #[error("pending events JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
