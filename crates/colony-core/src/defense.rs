//! Tower behavior.
//!
//! Each tower independently picks one action per tick in a fixed priority
//! order: attack, then repair, then reinforce. Distance and damage amounts
//! choose among candidates of the same kind but never reorder the kinds.

use colony_types::{
    Action, ActionOutcome, HostileId, Structure, StructureId, StructureKind, WorldSnapshot,
};
use colony_world::{ActionSink, nearest_by_range};
use tracing::debug;

use crate::config::DefenseConfig;

/// What a tower chose to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowerAction {
    /// Fire at the nearest hostile.
    Attack(HostileId),
    /// Restore the nearest damaged non-barrier structure.
    Repair(StructureId),
    /// Raise the globally weakest rampart.
    Reinforce(StructureId),
    /// Nothing to do, or not enough energy to do it.
    Idle,
}

/// Choose one tower's action for this tick.
pub fn choose(tower: &Structure, snapshot: &WorldSnapshot, config: &DefenseConfig) -> TowerAction {
    if let Some(hostile) = nearest_by_range(tower.pos, snapshot.hostiles.values(), |h| h.pos) {
        return TowerAction::Attack(hostile.id);
    }

    let energy = tower.stored_energy();
    if energy > config.repair_reserve {
        let damaged = snapshot
            .structures
            .values()
            .filter(|s| !s.kind.is_barrier() && s.is_below_fraction(config.repair_fraction));
        if let Some(target) = nearest_by_range(tower.pos, damaged, |s| s.pos) {
            return TowerAction::Repair(target.id);
        }
    }

    if energy > config.reinforce_reserve {
        let weakest = snapshot
            .structures_of(StructureKind::Rampart)
            .filter(|s| s.hits < config.reinforce_ceiling)
            .min_by_key(|s| s.hits);
        if let Some(target) = weakest {
            return TowerAction::Reinforce(target.id);
        }
    }

    TowerAction::Idle
}

/// Choose and submit an action for every tower.
pub fn run_towers(
    snapshot: &WorldSnapshot,
    sink: &mut dyn ActionSink,
    config: &DefenseConfig,
) -> Vec<(StructureId, TowerAction)> {
    snapshot
        .structures_of(StructureKind::Tower)
        .map(|tower| {
            let choice = choose(tower, snapshot, config);
            let action = match choice {
                TowerAction::Attack(hostile) => Some(Action::TowerAttack {
                    tower: tower.id,
                    hostile,
                }),
                TowerAction::Repair(target) | TowerAction::Reinforce(target) => {
                    Some(Action::TowerRepair {
                        tower: tower.id,
                        target,
                    })
                }
                TowerAction::Idle => None,
            };
            if let Some(action) = action {
                let outcome = sink.submit(action);
                if outcome != ActionOutcome::Accepted {
                    debug!(tower = %tower.id, ?choice, ?outcome, "tower action refused");
                }
            }
            (tower.id, choice)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use colony_types::{EnergyStore, Hostile, Position};
    use colony_world::{ActionLog, new_structure};

    use super::*;

    fn tower(energy: u32) -> Structure {
        let mut tower = new_structure(StructureKind::Tower, Position::new(20, 20));
        tower.store = Some(EnergyStore::new(energy, 1000));
        tower
    }

    fn with(snapshot: &mut WorldSnapshot, s: Structure) -> StructureId {
        let id = s.id;
        snapshot.structures.insert(id, s);
        id
    }

    fn damaged(kind: StructureKind, pos: Position, hits: u32, hits_max: u32) -> Structure {
        let mut s = new_structure(kind, pos);
        s.hits = hits;
        s.hits_max = hits_max;
        s
    }

    #[test]
    fn hostile_takes_priority_over_repair() {
        let mut snapshot = WorldSnapshot::default();
        let t = tower(1000);
        with(&mut snapshot, damaged(StructureKind::Road, Position::new(21, 20), 100, 5000));
        let hostile = Hostile {
            id: HostileId::new(),
            pos: Position::new(30, 30),
            hits: 1000,
            owner: "Invader".to_owned(),
        };
        let hostile_id = hostile.id;
        snapshot.hostiles.insert(hostile.id, hostile);

        assert_eq!(
            choose(&t, &snapshot, &DefenseConfig::default()),
            TowerAction::Attack(hostile_id)
        );
    }

    #[test]
    fn nearest_hostile_is_attacked() {
        let mut snapshot = WorldSnapshot::default();
        let t = tower(0);
        let far = Hostile {
            id: HostileId::new(),
            pos: Position::new(40, 40),
            hits: 100,
            owner: "Invader".to_owned(),
        };
        let near = Hostile {
            id: HostileId::new(),
            pos: Position::new(22, 22),
            hits: 5000,
            owner: "Invader".to_owned(),
        };
        let near_id = near.id;
        snapshot.hostiles.insert(far.id, far);
        snapshot.hostiles.insert(near.id, near);
        assert_eq!(
            choose(&t, &snapshot, &DefenseConfig::default()),
            TowerAction::Attack(near_id)
        );
    }

    #[test]
    fn damaged_structure_is_repaired_above_reserve() {
        let mut snapshot = WorldSnapshot::default();
        let target = with(
            &mut snapshot,
            damaged(StructureKind::Extension, Position::new(22, 20), 400, 1000),
        );
        assert_eq!(
            choose(&tower(600), &snapshot, &DefenseConfig::default()),
            TowerAction::Repair(target)
        );
        // At or below the reserve the tower holds its fire.
        assert_eq!(
            choose(&tower(500), &snapshot, &DefenseConfig::default()),
            TowerAction::Idle
        );
    }

    #[test]
    fn barriers_are_not_repaired() {
        let mut snapshot = WorldSnapshot::default();
        with(&mut snapshot, damaged(StructureKind::Wall, Position::new(22, 20), 1, 300_000));
        assert_eq!(
            choose(&tower(600), &snapshot, &DefenseConfig::default()),
            TowerAction::Idle
        );
    }

    #[test]
    fn weakest_rampart_is_reinforced() {
        let mut snapshot = WorldSnapshot::default();
        with(
            &mut snapshot,
            damaged(StructureKind::Rampart, Position::new(21, 20), 30_000, 300_000),
        );
        let weakest = with(
            &mut snapshot,
            damaged(StructureKind::Rampart, Position::new(45, 45), 2_000, 300_000),
        );
        with(
            &mut snapshot,
            damaged(StructureKind::Rampart, Position::new(22, 20), 60_000, 300_000),
        );
        assert_eq!(
            choose(&tower(800), &snapshot, &DefenseConfig::default()),
            TowerAction::Reinforce(weakest)
        );
        // Enough for repairs but not for reinforcement.
        assert_eq!(
            choose(&tower(700), &snapshot, &DefenseConfig::default()),
            TowerAction::Idle
        );
    }

    #[test]
    fn every_tower_submits_its_own_action() {
        let mut snapshot = WorldSnapshot::default();
        let first = with(&mut snapshot, tower(900));
        let second = with(&mut snapshot, tower(100));
        let rampart = with(
            &mut snapshot,
            damaged(StructureKind::Rampart, Position::new(21, 21), 10, 300_000),
        );

        let mut log = ActionLog::new();
        let choices = run_towers(&snapshot, &mut log, &DefenseConfig::default());

        assert!(choices.contains(&(first, TowerAction::Reinforce(rampart))));
        assert!(choices.contains(&(second, TowerAction::Idle)));
        assert_eq!(log.entries().len(), 1);
    }
}
