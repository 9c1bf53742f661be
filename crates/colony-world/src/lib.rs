//! The world the colony controller decides against.
//!
//! The decision engine never touches host state directly. It reads a
//! [`WorldSnapshot`] once per tick, asks a [`WorldQuery`] for travel costs
//! and terrain, and changes the world only by submitting actions to an
//! [`ActionSink`]. This crate defines those seams, the host's per-level
//! structure tables, and an in-memory reference host.
//!
//! # Modules
//!
//! - [`caps`] -- Structure limits per controller level, build costs,
//!   downgrade timers, and fresh-structure templates.
//! - [`error`] -- Error types for scenario loading and terrain edits.
//! - [`grid`] -- [`GridWorld`], a 50x50 reference host with Dijkstra
//!   travel costs and the host's interaction ranges.
//! - [`host`] -- The combined [`Host`] seam and the [`SplitHost`] adapter.
//! - [`query`] -- The [`WorldQuery`] trait and nearest-candidate helpers.
//! - [`sink`] -- The [`ActionSink`] trait and the recording [`ActionLog`].
//!
//! [`WorldSnapshot`]: colony_types::WorldSnapshot

pub mod caps;
pub mod error;
pub mod grid;
pub mod host;
pub mod query;
pub mod sink;

// Re-export primary types at crate root.
pub use caps::{MAX_LEVEL, build_cost, downgrade_ticks, max_structures, new_structure, progress_total};
pub use error::WorldError;
pub use grid::{AdvanceReport, GridWorld, MAP_SIZE, Scenario, WORKER_LIFETIME};
pub use host::{Host, SplitHost};
pub use query::{WorldQuery, nearest_by_path, nearest_by_range};
pub use sink::{ActionLog, ActionSink};
