//! Event escalation for the colony controller.
//!
//! Raw state deltas become a prioritized, deduplicated, rate-limited queue
//! for an external supervisor in two independent debouncing layers. Inside
//! the tick, edge-triggered detectors fire only on transitions into a
//! notable state. Outside it, a wall-clock cooldown filter suppresses
//! repeat deliveries of the same type before the bounded queue.
//!
//! # Modules
//!
//! - [`config`] -- Thresholds, sampling intervals, cooldown overrides ([`EventConfig`])
//! - [`cooldown`] -- Per-type wall-clock cooldown filter ([`CooldownFilter`])
//! - [`detect`] -- Edge-triggered detectors over persisted [`Observations`]
//! - [`error`] -- Errors for pending-events persistence ([`EventsError`])
//! - [`pipeline`] -- Record stamping and cooldown-then-queue ingestion
//! - [`priority`] -- Severity lookup, role-specific for worker events
//! - [`queue`] -- The bounded, priority-sorted [`EscalationQueue`]
//! - [`wire`] -- The `[EVENT:TYPE:VALUE]` console format and its parser

pub mod config;
pub mod cooldown;
pub mod detect;
pub mod error;
pub mod pipeline;
pub mod priority;
pub mod queue;
pub mod wire;

// Re-export primary types at crate root for convenience.
pub use config::EventConfig;
pub use cooldown::{CooldownFilter, builtin_cooldown_secs};
pub use detect::{DecayBucket, Detection, Observations, RosterEntry, detect};
pub use error::EventsError;
pub use pipeline::{EscalationPipeline, Ingested};
pub use priority::{priority, priority_for_payload};
pub use queue::{EscalationQueue, MAX_QUEUED};
pub use wire::{ConsoleEvent, format_console_line, parse_console_line};
