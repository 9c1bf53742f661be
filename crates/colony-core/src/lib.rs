//! Colony orchestration: configuration, memory, and the per-tick cycle.
//!
//! This crate ties the worker logic from `colony-agents` and the event
//! pipeline from `colony-events` into one deterministic pass per tick.
//! Callers hand [`run_tick`] a snapshot, something implementing
//! [`Host`](colony_world::Host), and the colony's [`ColonyMemory`]; everything
//! else is decided here.
//!
//! # Modules
//!
//! - [`build`] -- Construction planning around a layout anchor
//! - [`config`] -- YAML configuration ([`ColonyConfig`]) and its sections
//! - [`defense`] -- Tower attack, repair, and reinforcement
//! - [`memory`] -- [`ColonyMemory`], the explicit cross-tick store
//! - [`spawn`] -- Production scheduling with tiered energy gating
//! - [`tick`] -- The tick cycle ([`run_tick`]) and the status line

pub mod build;
pub mod config;
pub mod defense;
pub mod memory;
pub mod spawn;
pub mod tick;

// Re-export primary types at crate root for convenience.
pub use build::{BuildReport, plan};
pub use config::{
    BudgetConfig, BuildConfig, ColonyConfig, ConfigError, DefenseConfig, EngineConfig,
    HeadcountTier, SpawnConfig, StatusConfig,
};
pub use defense::{TowerAction, choose, run_towers};
pub use memory::{ColonyMemory, MemoryError};
pub use spawn::{RolePick, SpawnDecision, SpawnTier, decide, next_role};
pub use tick::{StatusLine, TickSummary, run_tick};
