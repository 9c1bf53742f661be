//! Tunables for the role state machine.
//!
//! [`RoleConfig`] is deserialized from the `roles` section of the colony
//! configuration file. Every field has a default so a missing section keeps
//! the stock behavior.

use serde::Deserialize;

/// Configuration for worker target selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleConfig {
    /// Barriers below this many hit points are reinforced by builders
    /// (default: 10000). A cached reinforcement target is dropped as soon
    /// as it reaches the floor.
    #[serde(default = "default_reinforce_floor")]
    pub reinforce_floor: u32,
}

const fn default_reinforce_floor() -> u32 {
    10_000
}

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            reinforce_floor: default_reinforce_floor(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: RoleConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RoleConfig::default());
        assert_eq!(config.reinforce_floor, 10_000);
    }
}
