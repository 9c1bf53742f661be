//! Configuration loading and typed config structures for the colony controller.
//!
//! The configuration lives in a single YAML file (`colony-config.yaml` by
//! default). Every section and field has a default, so an empty file, or no
//! file at all, yields the stock controller.

use std::collections::BTreeSet;
use std::path::Path;

use colony_agents::{MAX_LOADOUT_COST, RoleConfig};
use colony_events::EventConfig;
use colony_types::{Position, Role};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level colony configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ColonyConfig {
    /// Production scheduling.
    #[serde(default)]
    pub spawn: SpawnConfig,

    /// Construction planning.
    #[serde(default)]
    pub build: BuildConfig,

    /// Tower behavior.
    #[serde(default)]
    pub defense: DefenseConfig,

    /// Worker target selection.
    #[serde(default)]
    pub roles: RoleConfig,

    /// Event detection and escalation.
    #[serde(default)]
    pub events: EventConfig,

    /// Periodic status line.
    #[serde(default)]
    pub status: StatusConfig,

    /// Per-tick compute budget.
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Engine loop and persistence.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ColonyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `COLONY_MAX_TICKS` overrides `engine.max_ticks`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.engine.apply_env_overrides();
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Spawn
// ---------------------------------------------------------------------------

/// Target headcounts for one band of authority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HeadcountTier {
    /// Lowest authority level this band applies to.
    pub min_level: u8,
    /// Harvesters to keep alive.
    pub harvesters: u32,
    /// Builders while construction sites are pending.
    pub builders_backlog: u32,
    /// Builders with no construction pending.
    pub builders_idle: u32,
    /// Upgraders while construction sites are pending.
    pub upgraders_backlog: u32,
    /// Upgraders with no construction pending.
    pub upgraders_idle: u32,
}

impl HeadcountTier {
    /// Target headcount for `role`.
    pub const fn target(&self, role: Role, backlog: bool) -> u32 {
        match (role, backlog) {
            (Role::Harvester, _) => self.harvesters,
            (Role::Builder, true) => self.builders_backlog,
            (Role::Builder, false) => self.builders_idle,
            (Role::Upgrader, true) => self.upgraders_backlog,
            (Role::Upgrader, false) => self.upgraders_idle,
        }
    }

    /// Sum of all role targets.
    pub const fn total(&self, backlog: bool) -> u32 {
        self.target(Role::Harvester, backlog)
            .saturating_add(self.target(Role::Builder, backlog))
            .saturating_add(self.target(Role::Upgrader, backlog))
    }
}

/// Production scheduling configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpawnConfig {
    /// Headcount bands, ascending by `min_level`. The last band whose
    /// `min_level` does not exceed the current level applies.
    #[serde(default = "default_headcounts")]
    pub headcounts: Vec<HeadcountTier>,

    /// Below this many harvesters the emergency tier applies (default: 2).
    #[serde(default = "default_emergency_harvesters")]
    pub emergency_harvesters: u32,

    /// Energy the recovery tier waits for, capped by capacity (default: 300).
    #[serde(default = "default_recovery_energy")]
    pub recovery_energy: u32,

    /// Most energy a steady-state loadout may cost (default: 550).
    #[serde(default = "default_max_loadout_cost")]
    pub max_loadout_cost: u32,

    /// A role at target is replaced early when a member has fewer ticks to
    /// live than this many production times of its loadout (default: 2).
    #[serde(default = "default_replacement_factor")]
    pub replacement_factor: u32,

    /// Ticks between repeated "no production facility" notices (default: 100).
    #[serde(default = "default_notice_interval")]
    pub notice_interval: u64,
}

impl SpawnConfig {
    /// The headcount band for `level`, falling back to the first band.
    pub fn headcount(&self, level: u8) -> HeadcountTier {
        self.headcounts
            .iter()
            .rev()
            .find(|tier| tier.min_level <= level)
            .or_else(|| self.headcounts.first())
            .copied()
            .unwrap_or(EMPTY_TIER)
    }
}

const EMPTY_TIER: HeadcountTier = HeadcountTier {
    min_level: 0,
    harvesters: 0,
    builders_backlog: 0,
    builders_idle: 0,
    upgraders_backlog: 0,
    upgraders_idle: 0,
};

fn default_headcounts() -> Vec<HeadcountTier> {
    vec![
        HeadcountTier {
            min_level: 0,
            harvesters: 4,
            builders_backlog: 3,
            builders_idle: 1,
            upgraders_backlog: 3,
            upgraders_idle: 3,
        },
        HeadcountTier {
            min_level: 3,
            harvesters: 4,
            builders_backlog: 2,
            builders_idle: 1,
            upgraders_backlog: 2,
            upgraders_idle: 3,
        },
        HeadcountTier {
            min_level: 4,
            harvesters: 3,
            builders_backlog: 2,
            builders_idle: 1,
            upgraders_backlog: 2,
            upgraders_idle: 4,
        },
    ]
}

const fn default_emergency_harvesters() -> u32 {
    2
}

const fn default_recovery_energy() -> u32 {
    300
}

const fn default_max_loadout_cost() -> u32 {
    MAX_LOADOUT_COST
}

const fn default_replacement_factor() -> u32 {
    2
}

const fn default_notice_interval() -> u64 {
    100
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            headcounts: default_headcounts(),
            emergency_harvesters: default_emergency_harvesters(),
            recovery_energy: default_recovery_energy(),
            max_loadout_cost: default_max_loadout_cost(),
            replacement_factor: default_replacement_factor(),
            notice_interval: default_notice_interval(),
        }
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Construction planning configuration.
///
/// Offsets are `[dx, dy]` pairs relative to the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    /// Ticks between planning passes (default: 50).
    #[serde(default = "default_build_interval")]
    pub interval: u64,

    /// Authority level from which critical structures get ramparts
    /// (default: 3).
    #[serde(default = "default_overlay_min_level")]
    pub overlay_min_level: u8,

    /// Fixed layout anchor. Defaults to the production facility's cell.
    #[serde(default)]
    pub anchor: Option<Position>,

    /// Extension candidates, tried in order.
    #[serde(default = "default_extension_offsets")]
    pub extension_offsets: Vec<[i32; 2]>,

    /// Tower candidates, tried in order.
    #[serde(default = "default_tower_offsets")]
    pub tower_offsets: Vec<[i32; 2]>,

    /// Storage candidates, tried in order.
    #[serde(default = "default_storage_offsets")]
    pub storage_offsets: Vec<[i32; 2]>,
}

const fn default_build_interval() -> u64 {
    50
}

const fn default_overlay_min_level() -> u8 {
    3
}

fn default_tower_offsets() -> Vec<[i32; 2]> {
    vec![[0, -2], [2, -2], [-2, -2]]
}

fn default_storage_offsets() -> Vec<[i32; 2]> {
    vec![[0, 3], [-1, 4], [1, 4]]
}

/// Extension layout: a tight cluster around the anchor, then a checkerboard
/// out to range 6 so every extension keeps a free neighbor. Yields more
/// candidates than the largest extension cap.
fn default_extension_offsets() -> Vec<[i32; 2]> {
    const CLUSTER: [[i32; 2]; 10] = [
        [-1, -1],
        [1, -1],
        [-1, 1],
        [1, 1],
        [2, 0],
        [-2, -1],
        [2, -1],
        [-2, 1],
        [2, 1],
        [3, 0],
    ];

    let reserved: BTreeSet<[i32; 2]> = default_tower_offsets()
        .into_iter()
        .chain(default_storage_offsets())
        .chain(CLUSTER)
        .chain([[0, 0]])
        .collect();

    let origin = Position::new(0, 0);
    let mut lattice: Vec<[i32; 2]> = (-6..=6_i32)
        .flat_map(|dy| (-6..=6_i32).map(move |dx| [dx, dy]))
        .filter(|[dx, dy]| dx.abs_diff(*dy).is_multiple_of(2))
        .filter(|offset| !reserved.contains(offset))
        .collect();
    lattice.sort_by_key(|[dx, dy]| origin.range_to(Position::new(*dx, *dy)));

    CLUSTER.into_iter().chain(lattice).collect()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            interval: default_build_interval(),
            overlay_min_level: default_overlay_min_level(),
            anchor: None,
            extension_offsets: default_extension_offsets(),
            tower_offsets: default_tower_offsets(),
            storage_offsets: default_storage_offsets(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defense
// ---------------------------------------------------------------------------

/// Tower configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefenseConfig {
    /// Non-barrier structures strictly below this fraction of their maximum
    /// hits are repaired (default: 0.5).
    #[serde(default = "default_repair_fraction")]
    pub repair_fraction: f64,

    /// A tower repairs only while holding more than this (default: 500).
    #[serde(default = "default_repair_reserve")]
    pub repair_reserve: u32,

    /// Ramparts below this many hits are reinforced (default: 50000).
    #[serde(default = "default_reinforce_ceiling")]
    pub reinforce_ceiling: u32,

    /// A tower reinforces only while holding more than this (default: 700).
    #[serde(default = "default_reinforce_reserve")]
    pub reinforce_reserve: u32,
}

const fn default_repair_fraction() -> f64 {
    0.5
}

const fn default_repair_reserve() -> u32 {
    500
}

const fn default_reinforce_ceiling() -> u32 {
    50_000
}

const fn default_reinforce_reserve() -> u32 {
    700
}

impl Default for DefenseConfig {
    fn default() -> Self {
        Self {
            repair_fraction: default_repair_fraction(),
            repair_reserve: default_repair_reserve(),
            reinforce_ceiling: default_reinforce_ceiling(),
            reinforce_reserve: default_reinforce_reserve(),
        }
    }
}

// ---------------------------------------------------------------------------
// Status and budget
// ---------------------------------------------------------------------------

/// Status line configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusConfig {
    /// Ticks between status lines (default: 100).
    #[serde(default = "default_status_interval")]
    pub interval: u64,

    /// Compute limit shown next to the usage figure (default: 20).
    #[serde(default = "default_cpu_limit")]
    pub cpu_limit: f64,
}

const fn default_status_interval() -> u64 {
    100
}

const fn default_cpu_limit() -> f64 {
    20.0
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval: default_status_interval(),
            cpu_limit: default_cpu_limit(),
        }
    }
}

/// Soft per-tick compute budget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetConfig {
    /// Once the host reports this much compute used, the remaining workers
    /// are skipped for the tick (default: 18).
    #[serde(default = "default_worker_cpu_limit")]
    pub worker_cpu_limit: f64,
}

const fn default_worker_cpu_limit() -> f64 {
    18.0
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            worker_cpu_limit: default_worker_cpu_limit(),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Engine loop and persistence configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds per tick (default: 100).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. Runs until interrupted when unset.
    #[serde(default)]
    pub max_ticks: Option<u64>,

    /// Scenario JSON to load instead of the built-in starter colony.
    #[serde(default)]
    pub scenario: Option<String>,

    /// Where colony memory is persisted between runs.
    #[serde(default = "default_memory_path")]
    pub memory_path: String,

    /// Where the pending escalation queue is written.
    #[serde(default = "default_events_path")]
    pub events_path: String,

    /// Ticks between memory saves (default: 100). Memory is also saved on
    /// shutdown.
    #[serde(default = "default_persist_interval")]
    pub persist_interval: u64,

    /// Chance per tick that a hostile wanders into the reference world
    /// (default: 0.002).
    #[serde(default = "default_hostile_chance")]
    pub hostile_chance: f64,

    /// Random seed for hostile arrivals.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl EngineConfig {
    /// Override values from environment variables.
    ///
    /// `COLONY_MAX_TICKS` sets [`EngineConfig::max_ticks`]; unparsable
    /// values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("COLONY_MAX_TICKS")
            && let Ok(ticks) = val.parse()
        {
            self.max_ticks = Some(ticks);
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    100
}

fn default_memory_path() -> String {
    "colony-memory.json".to_owned()
}

fn default_events_path() -> String {
    "events/pending.json".to_owned()
}

const fn default_persist_interval() -> u64 {
    100
}

const fn default_hostile_chance() -> f64 {
    0.002
}

const fn default_seed() -> u64 {
    42
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
            scenario: None,
            memory_path: default_memory_path(),
            events_path: default_events_path(),
            persist_interval: default_persist_interval(),
            hostile_chance: default_hostile_chance(),
            seed: default_seed(),
        }
    }
}
