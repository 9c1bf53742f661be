//! The colony's persisted memory, passed explicitly into every component.
//!
//! [`ColonyMemory`] is the single mutable store that survives across ticks.
//! Components mutate it in place and in a fixed order, so every field has to
//! be safe to resume from if the host cuts a tick short: cached targets are
//! re-validated before use, observations are compared edge-to-edge, and the
//! spawn guard is keyed by tick number.

use std::collections::BTreeMap;
use std::path::Path;

use colony_agents::WorkerMemoryStore;
use colony_events::Observations;
use colony_types::{AgentId, Role, WorldSnapshot};
use serde::{Deserialize, Serialize};

/// Errors from persisting or restoring colony memory.
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    /// Reading or writing the memory file failed.
    #[error("memory file I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The memory document is not valid JSON for this layout.
    #[error("memory JSON invalid: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Everything the controller remembers between ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColonyMemory {
    /// Per-worker memory, created lazily on first use.
    #[serde(default)]
    pub workers: WorkerMemoryStore,

    /// Last observed values for every event detector.
    #[serde(default)]
    pub observations: Observations,

    /// Tick at which each rate-limited notice was last logged.
    #[serde(default)]
    pub notices: BTreeMap<String, u64>,

    /// Tick of the last accepted production job.
    #[serde(default)]
    pub last_spawn_tick: Option<u64>,
}

impl ColonyMemory {
    /// Fresh, empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop per-worker memory for workers missing from `snapshot`.
    ///
    /// Returns the removed IDs with their last known roles.
    pub fn prune(&mut self, snapshot: &WorldSnapshot) -> Vec<(AgentId, Role)> {
        self.workers.prune(snapshot)
    }

    /// Whether the notice `key` may be logged at `tick`.
    ///
    /// Returns `true` at most once per `window` ticks and records the tick
    /// when it does.
    pub fn notice(&mut self, key: &str, tick: u64, window: u64) -> bool {
        let due = self
            .notices
            .get(key)
            .is_none_or(|last| tick.saturating_sub(*last) >= window);
        if due {
            self.notices.insert(key.to_owned(), tick);
        }
        due
    }

    /// Whether a production job was already accepted at `tick`.
    pub fn spawned_at(&self, tick: u64) -> bool {
        self.last_spawn_tick == Some(tick)
    }

    /// Serialize to a JSON document.
    pub fn to_json(&self) -> Result<String, MemoryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, MemoryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load memory from `path`. A missing file yields empty memory.
    pub fn load(path: &Path) -> Result<Self, MemoryError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Write memory to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), MemoryError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use colony_types::{EnergyStore, Position, Worker};

    use super::*;

    fn worker(role: Role) -> Worker {
        Worker {
            id: AgentId::new(),
            name: format!("{role}1"),
            role,
            pos: Position::new(5, 5),
            store: EnergyStore::new(0, 50),
            hits: 300,
            hits_max: 300,
            ticks_to_live: Some(1000),
            body: Vec::new(),
        }
    }

    #[test]
    fn notices_are_rate_limited() {
        let mut memory = ColonyMemory::new();
        assert!(memory.notice("no_facility", 10, 100));
        assert!(!memory.notice("no_facility", 50, 100));
        assert!(memory.notice("other", 50, 100));
        assert!(memory.notice("no_facility", 110, 100));
    }

    #[test]
    fn json_roundtrip_keeps_worker_memory() {
        let mut memory = ColonyMemory::new();
        let w = worker(Role::Builder);
        memory.workers.entry(&w);
        memory.last_spawn_tick = Some(42);
        memory.notice("no_facility", 7, 100);

        let json = memory.to_json().unwrap();
        let restored = ColonyMemory::from_json(&json).unwrap();
        assert_eq!(restored, memory);
        assert!(restored.spawned_at(42));
    }

    #[test]
    fn empty_document_restores_defaults() {
        let restored = ColonyMemory::from_json("{}").unwrap();
        assert_eq!(restored, ColonyMemory::new());
    }

    #[test]
    fn prune_reports_last_role() {
        let mut memory = ColonyMemory::new();
        let w = worker(Role::Harvester);
        memory.workers.entry(&w);
        let removed = memory.prune(&WorldSnapshot::default());
        assert_eq!(removed, vec![(w.id, Role::Harvester)]);
        assert!(memory.workers.is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = std::env::temp_dir().join(format!("colony-memory-{}", AgentId::new()));
        let path = dir.join("memory.json");
        assert_eq!(ColonyMemory::load(&path).unwrap(), ColonyMemory::new());

        let mut memory = ColonyMemory::new();
        memory.last_spawn_tick = Some(3);
        memory.save(&path).unwrap();
        assert_eq!(ColonyMemory::load(&path).unwrap(), memory);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
