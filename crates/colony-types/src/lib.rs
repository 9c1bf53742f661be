//! Shared type definitions for the colony operations controller.
//!
//! This crate is the single source of truth for every type that crosses a
//! crate boundary: the per-tick world view the host hands in, the actions
//! handed back, and the event records surfaced to the supervisor. Types are
//! exported to `TypeScript` via `ts-rs` for operator tooling.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Roles, structure kinds, body parts, terrain, event types
//! - [`structs`] -- World entities and the [`WorldSnapshot`]
//! - [`actions`] -- Action requests and the tri-state [`ActionOutcome`]
//! - [`events`] -- The [`EventRecord`] carried by the escalation queue

pub mod actions;
pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use actions::{Action, ActionOutcome};
pub use enums::{
    BodyPart, EventType, Role, SPAWN_TICKS_PER_PART, StructureKind, TaskMode, Terrain, body_cost,
    spawn_duration,
};
pub use events::EventRecord;
pub use ids::{AgentId, HostileId, SiteId, SourceId, StructureId};
pub use structs::{
    ConstructionSite, Controller, EnergyStore, Hostile, Position, Source, SpawnJob, Spawner,
    Structure, Worker, WorldSnapshot,
};
