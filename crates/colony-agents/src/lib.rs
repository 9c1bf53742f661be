//! Worker decision logic for the colony controller.
//!
//! This crate holds everything that decides what a single worker does in a
//! tick. It reads the world only through the snapshot and the
//! [`WorldQuery`](colony_world::WorldQuery) seam and acts only through the
//! [`ActionSink`](colony_world::ActionSink) seam.
//!
//! # Modules
//!
//! - [`body`] -- Loadout sizing as a step function of the energy budget
//! - [`config`] -- Target-selection tunables ([`RoleConfig`])
//! - [`memory`] -- Per-worker persisted memory ([`WorkerMemoryStore`])
//! - [`role`] -- The gather/deliver state machine ([`run_worker`])
//! - [`target`] -- Cached targets with validity predicates and the ordered
//!   selector chains for each role

pub mod body;
pub mod config;
pub mod memory;
pub mod role;
pub mod target;

// Re-export primary types at crate root for convenience.
pub use body::{CHEAPEST, CHEAPEST_COST, MAX_LOADOUT_COST, loadout};
pub use config::RoleConfig;
pub use memory::{WorkerMemory, WorkerMemoryStore};
pub use role::{RoleContext, WorkerTurn, run_worker, update_mode};
pub use target::{
    BUILDER_CHAIN, CachedTarget, HARVESTER_CHAIN, Selection, SelectionContext, Selector, TargetPredicate,
    TargetRef, UPGRADER_CHAIN, delivery_chain, select_first, select_source,
};
