//! Wall-clock cooldown filter.
//!
//! This is the consumer-side debouncing layer: once an event type has been
//! delivered, the same type is suppressed until its window has elapsed.
//! It is independent of the edge-triggered detectors, which never see it.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use colony_types::EventType;

use crate::config::EventConfig;

/// Built-in cooldown in seconds for `event`, if the table lists one.
pub const fn builtin_cooldown_secs(event: EventType) -> Option<u64> {
    match event {
        EventType::Hostile | EventType::CreepDied => Some(60),
        EventType::SpawnAttacked | EventType::CreepHurt => Some(30),
        EventType::NoSpawn
        | EventType::DowngradeCritical
        | EventType::ExtensionBuilt
        | EventType::SpawnComplete => Some(300),
        EventType::NoCreeps => Some(120),
        EventType::LowEnergy => Some(180),
        EventType::DowngradeUrgent => Some(600),
        EventType::DowngradeWarning => Some(1800),
        EventType::RclUp | EventType::TowerBuilt | EventType::StorageBuilt => Some(0),
        EventType::EnergyMilestone | EventType::NoViableTarget => None,
    }
}

/// Suppresses repeat deliveries of the same event type within a window.
#[derive(Debug, Clone, Default)]
pub struct CooldownFilter {
    /// Window per event type.
    windows: BTreeMap<EventType, TimeDelta>,
    /// Window for types not in `windows`.
    fallback: TimeDelta,
    /// When each type was last let through.
    last_delivered: BTreeMap<EventType, DateTime<Utc>>,
}

impl CooldownFilter {
    /// Build the filter from the built-in table plus configured overrides.
    pub fn new(config: &EventConfig) -> Self {
        let windows = EventType::ALL
            .into_iter()
            .filter_map(|event| {
                config
                    .cooldowns
                    .get(&event)
                    .copied()
                    .or_else(|| builtin_cooldown_secs(event))
                    .map(|secs| (event, secs_to_delta(secs)))
            })
            .collect();
        Self {
            windows,
            fallback: secs_to_delta(config.default_cooldown_secs),
            last_delivered: BTreeMap::new(),
        }
    }

    /// The cooldown window for `event`.
    pub fn window(&self, event: EventType) -> TimeDelta {
        self.windows.get(&event).copied().unwrap_or(self.fallback)
    }

    /// Whether `event` may be delivered at `now`. A `true` answer records
    /// the delivery and starts a new window.
    pub fn should_deliver(&mut self, event: EventType, now: DateTime<Utc>) -> bool {
        let window = self.window(event);
        if let Some(last) = self.last_delivered.get(&event)
            && now.signed_duration_since(*last) < window
        {
            return false;
        }
        self.last_delivered.insert(event, now);
        true
    }
}

fn secs_to_delta(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000_i64.saturating_add(secs), 0).unwrap()
    }

    #[test]
    fn repeat_within_window_is_suppressed() {
        let mut filter = CooldownFilter::new(&EventConfig::default());
        assert!(filter.should_deliver(EventType::Hostile, at(0)));
        assert!(!filter.should_deliver(EventType::Hostile, at(59)));
        assert!(filter.should_deliver(EventType::Hostile, at(60)));
    }

    #[test]
    fn types_are_independent() {
        let mut filter = CooldownFilter::new(&EventConfig::default());
        assert!(filter.should_deliver(EventType::Hostile, at(0)));
        assert!(filter.should_deliver(EventType::SpawnAttacked, at(1)));
        assert!(!filter.should_deliver(EventType::SpawnAttacked, at(2)));
    }

    #[test]
    fn zero_windows_never_suppress() {
        let mut filter = CooldownFilter::new(&EventConfig::default());
        assert!(filter.should_deliver(EventType::RclUp, at(0)));
        assert!(filter.should_deliver(EventType::RclUp, at(0)));
    }

    #[test]
    fn unlisted_types_use_the_fallback_and_overrides_win() {
        let mut config = EventConfig::default();
        config.cooldowns.insert(EventType::DowngradeWarning, 5);
        let filter = CooldownFilter::new(&config);
        assert_eq!(filter.window(EventType::EnergyMilestone), TimeDelta::seconds(60));
        assert_eq!(filter.window(EventType::DowngradeWarning), TimeDelta::seconds(5));
        assert_eq!(filter.window(EventType::DowngradeUrgent), TimeDelta::seconds(600));
    }
}
