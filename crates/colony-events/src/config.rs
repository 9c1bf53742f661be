//! Detector thresholds, sampling intervals, and cooldown windows.
//!
//! Deserialized from the `events` section of the colony configuration.
//! Every field has a default matching the stock behavior.

use std::collections::BTreeMap;

use colony_types::EventType;
use serde::Deserialize;

/// Configuration for the escalation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventConfig {
    /// Downgrade counter below which the warning bucket starts (default: 20000).
    #[serde(default = "default_decay_warning")]
    pub decay_warning: u32,

    /// Downgrade counter below which the urgent bucket starts (default: 5000).
    #[serde(default = "default_decay_urgent")]
    pub decay_urgent: u32,

    /// Downgrade counter below which the critical bucket starts (default: 1000).
    #[serde(default = "default_decay_critical")]
    pub decay_critical: u32,

    /// Ticks between structure-count samples (default: 10).
    #[serde(default = "default_structure_sample_interval")]
    pub structure_sample_interval: u64,

    /// Ticks between harvested-energy milestone samples (default: 100).
    #[serde(default = "default_milestone_interval")]
    pub milestone_interval: u64,

    /// Cumulative harvested-energy thresholds, ascending.
    #[serde(default = "default_milestones")]
    pub milestones: Vec<u64>,

    /// With no workers alive, energy below this counts as starvation
    /// (default: 200, the cheapest loadout).
    #[serde(default = "default_low_energy_threshold")]
    pub low_energy_threshold: u32,

    /// Maximum number of queued events (default: 10).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Cooldown in seconds for event types without an entry in the
    /// built-in table or in `cooldowns` (default: 60).
    #[serde(default = "default_cooldown_secs")]
    pub default_cooldown_secs: u64,

    /// Per-type cooldown overrides in seconds.
    #[serde(default)]
    pub cooldowns: BTreeMap<EventType, u64>,
}

const fn default_decay_warning() -> u32 {
    20_000
}

const fn default_decay_urgent() -> u32 {
    5_000
}

const fn default_decay_critical() -> u32 {
    1_000
}

const fn default_structure_sample_interval() -> u64 {
    10
}

const fn default_milestone_interval() -> u64 {
    100
}

fn default_milestones() -> Vec<u64> {
    vec![1_000, 10_000, 100_000, 1_000_000]
}

const fn default_low_energy_threshold() -> u32 {
    200
}

const fn default_queue_capacity() -> usize {
    10
}

const fn default_cooldown_secs() -> u64 {
    60
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            decay_warning: default_decay_warning(),
            decay_urgent: default_decay_urgent(),
            decay_critical: default_decay_critical(),
            structure_sample_interval: default_structure_sample_interval(),
            milestone_interval: default_milestone_interval(),
            milestones: default_milestones(),
            low_energy_threshold: default_low_energy_threshold(),
            queue_capacity: default_queue_capacity(),
            default_cooldown_secs: default_cooldown_secs(),
            cooldowns: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn overrides_are_keyed_by_wire_tag() {
        let yaml = "decay_critical: 500\ncooldowns:\n  HOSTILE: 5\n  CREEP_DIED: 0\n";
        let config: EventConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.decay_critical, 500);
        assert_eq!(config.decay_warning, 20_000);
        assert_eq!(config.cooldowns.get(&EventType::Hostile), Some(&5));
        assert_eq!(config.cooldowns.get(&EventType::CreepDied), Some(&0));
        assert_eq!(config.milestones.len(), 4);
    }
}
