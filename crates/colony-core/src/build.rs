//! Construction planning.
//!
//! Every `build.interval` ticks the planner compares what the authority level
//! allows against what is built or pending, and places sites at fixed offsets
//! from the layout anchor. Extensions fill up to their cap; tower and storage
//! are single-instance; critical structures get a rampart on their cell once
//! the level reaches `overlay_min_level`.

use std::collections::BTreeSet;

use colony_types::{Action, ActionOutcome, Position, StructureKind, Terrain, WorldSnapshot};
use colony_world::{Host, max_structures};
use tracing::{debug, info};

use crate::config::BuildConfig;

/// Sites placed in one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Accepted placements, in submission order.
    pub placed: Vec<(StructureKind, Position)>,
    /// Placements the host refused.
    pub refused: u32,
}

impl BuildReport {
    /// Number of sites of `kind` placed.
    pub fn placed_of(&self, kind: StructureKind) -> usize {
        self.placed.iter().filter(|(k, _)| *k == kind).count()
    }
}

struct Planner<'a, 'h> {
    snapshot: &'a WorldSnapshot,
    host: &'h mut dyn Host,
    claimed: BTreeSet<Position>,
    report: BuildReport,
}

impl Planner<'_, '_> {
    /// Whether a new site could go on `pos`.
    fn is_free(&self, pos: Position) -> bool {
        let snapshot = self.snapshot;
        !self.claimed.contains(&pos)
            && self.host.terrain(pos) != Terrain::Wall
            && snapshot.structures_at(pos).next().is_none()
            && snapshot.sites_at(pos).next().is_none()
            && !snapshot.sources.values().any(|s| s.pos == pos)
            && snapshot.controller.as_ref().is_none_or(|c| c.pos != pos)
    }

    fn place(&mut self, kind: StructureKind, pos: Position) -> bool {
        match self.host.submit(Action::PlaceSite { kind, pos }) {
            ActionOutcome::Accepted => {
                self.claimed.insert(pos);
                self.report.placed.push((kind, pos));
                true
            }
            ActionOutcome::NotInRange => {
                self.report.refused = self.report.refused.saturating_add(1);
                false
            }
            ActionOutcome::Failed { reason } => {
                debug!(%kind, %pos, reason = %reason, "site placement refused");
                self.report.refused = self.report.refused.saturating_add(1);
                false
            }
        }
    }

    /// Walk `offsets` in order and place up to `needed` sites of `kind`.
    fn fill(&mut self, kind: StructureKind, anchor: Position, offsets: &[[i32; 2]], needed: u32) {
        let mut needed = needed;
        for [dx, dy] in offsets {
            if needed == 0 {
                break;
            }
            let pos = anchor.offset(*dx, *dy);
            if self.is_free(pos) && self.place(kind, pos) {
                needed = needed.saturating_sub(1);
            }
        }
    }

    fn extensions(&mut self, anchor: Position, config: &BuildConfig) {
        let kind = StructureKind::Extension;
        let existing = self
            .snapshot
            .count_structures(kind)
            .saturating_add(self.snapshot.count_sites(kind));
        let needed = max_structures(kind, self.snapshot.level()).saturating_sub(existing);
        if needed > 0 {
            self.fill(kind, anchor, &config.extension_offsets, needed);
        }
    }

    fn single(&mut self, kind: StructureKind, anchor: Position, offsets: &[[i32; 2]]) {
        let allowed = max_structures(kind, self.snapshot.level()) > 0;
        let present =
            self.snapshot.count_structures(kind) > 0 || self.snapshot.count_sites(kind) > 0;
        if allowed && !present {
            self.fill(kind, anchor, offsets, 1);
        }
    }

    fn overlays(&mut self) {
        let snapshot = self.snapshot;
        let bare: Vec<Position> = snapshot
            .structures
            .values()
            .filter(|s| s.kind.needs_overlay())
            .map(|s| s.pos)
            .filter(|pos| {
                !snapshot
                    .structures_at(*pos)
                    .any(|s| s.kind == StructureKind::Rampart)
                    && !snapshot
                        .sites_at(*pos)
                        .any(|s| s.kind == StructureKind::Rampart)
            })
            .collect();
        for pos in bare {
            self.place(StructureKind::Rampart, pos);
        }
    }
}

/// Run one planning pass.
///
/// The anchor is the configured one, else the production facility's cell.
/// Without either there is nothing to plan around and the pass is empty.
pub fn plan(snapshot: &WorldSnapshot, host: &mut dyn Host, config: &BuildConfig) -> BuildReport {
    let Some(anchor) = config
        .anchor
        .or_else(|| snapshot.spawner.as_ref().map(|s| s.pos))
    else {
        return BuildReport::default();
    };

    let mut planner = Planner {
        snapshot,
        host,
        claimed: BTreeSet::new(),
        report: BuildReport::default(),
    };
    planner.extensions(anchor, config);
    planner.single(StructureKind::Tower, anchor, &config.tower_offsets);
    planner.single(StructureKind::Storage, anchor, &config.storage_offsets);
    if snapshot.level() >= config.overlay_min_level {
        planner.overlays();
    }

    let report = planner.report;
    if !report.placed.is_empty() {
        info!(
            tick = snapshot.tick,
            placed = report.placed.len(),
            refused = report.refused,
            "construction sites placed"
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use colony_types::{
        ConstructionSite, Controller, EnergyStore, SiteId, Spawner, Structure, StructureId,
    };
    use colony_world::{ActionLog, SplitHost, WorldQuery, new_structure};

    use super::*;

    /// Open terrain with a configurable set of wall cells.
    struct Field {
        walls: Vec<Position>,
    }

    impl WorldQuery for Field {
        fn path_cost(&self, from: Position, to: Position) -> Option<u32> {
            Some(from.range_to(to))
        }

        fn terrain(&self, pos: Position) -> Terrain {
            if self.walls.contains(&pos) {
                Terrain::Wall
            } else {
                Terrain::Plain
            }
        }

        fn cpu_used(&self) -> f64 {
            0.0
        }
    }

    const ANCHOR: Position = Position::new(25, 25);

    fn colony(level: u8) -> WorldSnapshot {
        let spawn = Structure {
            id: StructureId::new(),
            kind: StructureKind::Spawn,
            pos: ANCHOR,
            hits: 5000,
            hits_max: 5000,
            store: Some(EnergyStore::new(300, 300)),
        };
        let mut snapshot = WorldSnapshot {
            tick: 50,
            spawner: Some(Spawner {
                structure_id: spawn.id,
                pos: spawn.pos,
                job: None,
            }),
            controller: Some(Controller {
                pos: Position::new(25, 5),
                level,
                progress: 0,
                progress_total: 45_000,
                ticks_to_downgrade: 10_000,
            }),
            ..WorldSnapshot::default()
        };
        snapshot.structures.insert(spawn.id, spawn);
        snapshot
    }

    fn config(offsets: Vec<[i32; 2]>) -> BuildConfig {
        BuildConfig {
            extension_offsets: offsets,
            ..BuildConfig::default()
        }
    }

    fn add_structure(snapshot: &mut WorldSnapshot, kind: StructureKind, pos: Position) {
        let s = new_structure(kind, pos);
        snapshot.structures.insert(s.id, s);
    }

    fn add_site(snapshot: &mut WorldSnapshot, kind: StructureKind, pos: Position) {
        let site = ConstructionSite {
            id: SiteId::new(),
            kind,
            pos,
            progress: 0,
            progress_total: 3000,
        };
        snapshot.sites.insert(site.id, site);
    }

    fn run(snapshot: &WorldSnapshot, walls: Vec<Position>, config: &BuildConfig) -> BuildReport {
        let terrain = Field { walls };
        let mut log = ActionLog::new();
        let mut host = SplitHost {
            query: &terrain,
            sink: &mut log,
        };
        plan(snapshot, &mut host, config)
    }

    #[test]
    fn places_needed_sites_in_candidate_order_skipping_blocked_cells() {
        // Level 2 allows 5 extensions; 2 built leaves 3 needed.
        let mut snapshot = colony(2);
        add_structure(&mut snapshot, StructureKind::Extension, ANCHOR.offset(5, 5));
        add_structure(&mut snapshot, StructureKind::Extension, ANCHOR.offset(6, 6));
        // Two of the first candidates are occupied: one by a road, one by a site.
        add_structure(&mut snapshot, StructureKind::Road, ANCHOR.offset(1, 0));
        add_site(&mut snapshot, StructureKind::Road, ANCHOR.offset(0, 1));

        let offsets = vec![[1, 0], [0, 1], [-1, 0], [0, -1], [2, 0], [0, 2]];
        let report = run(&snapshot, Vec::new(), &config(offsets));

        let placed: Vec<Position> = report.placed.iter().map(|(_, pos)| *pos).collect();
        assert_eq!(
            placed,
            vec![ANCHOR.offset(-1, 0), ANCHOR.offset(0, -1), ANCHOR.offset(2, 0)]
        );
    }

    #[test]
    fn never_exceeds_cap_counting_pending_sites() {
        let mut snapshot = colony(2);
        for i in 0..4 {
            add_site(&mut snapshot, StructureKind::Extension, ANCHOR.offset(i, 8));
        }
        let report = run(&snapshot, Vec::new(), &BuildConfig::default());
        assert_eq!(report.placed_of(StructureKind::Extension), 1);
    }

    #[test]
    fn wall_terrain_is_skipped_and_short_lists_place_what_they_can() {
        let snapshot = colony(2);
        let offsets = vec![[1, 1], [2, 2], [3, 3]];
        let walls = vec![ANCHOR.offset(2, 2)];
        let report = run(&snapshot, walls, &config(offsets));
        let placed: Vec<Position> = report.placed.iter().map(|(_, pos)| *pos).collect();
        assert_eq!(placed, vec![ANCHOR.offset(1, 1), ANCHOR.offset(3, 3)]);
    }

    #[test]
    fn tower_and_storage_are_single_instance() {
        let mut snapshot = colony(4);
        let report = run(&snapshot, Vec::new(), &BuildConfig::default());
        assert_eq!(report.placed_of(StructureKind::Tower), 1);
        assert_eq!(report.placed_of(StructureKind::Storage), 1);
        assert!(report.placed.contains(&(StructureKind::Tower, ANCHOR.offset(0, -2))));

        add_site(&mut snapshot, StructureKind::Tower, ANCHOR.offset(0, -2));
        add_structure(&mut snapshot, StructureKind::Storage, ANCHOR.offset(0, 3));
        let again = run(&snapshot, Vec::new(), &BuildConfig::default());
        assert_eq!(again.placed_of(StructureKind::Tower), 0);
        assert_eq!(again.placed_of(StructureKind::Storage), 0);
    }

    #[test]
    fn low_levels_get_no_tower_or_overlay() {
        let snapshot = colony(2);
        let report = run(&snapshot, Vec::new(), &BuildConfig::default());
        assert_eq!(report.placed_of(StructureKind::Tower), 0);
        assert_eq!(report.placed_of(StructureKind::Rampart), 0);
    }

    #[test]
    fn critical_structures_get_one_rampart_each() {
        let mut snapshot = colony(3);
        let tower_pos = ANCHOR.offset(0, -2);
        add_structure(&mut snapshot, StructureKind::Tower, tower_pos);
        let report = run(&snapshot, Vec::new(), &BuildConfig::default());
        assert!(report.placed.contains(&(StructureKind::Rampart, ANCHOR)));
        assert!(report.placed.contains(&(StructureKind::Rampart, tower_pos)));

        // Built or pending ramparts are not queued again.
        add_structure(&mut snapshot, StructureKind::Rampart, ANCHOR);
        add_site(&mut snapshot, StructureKind::Rampart, tower_pos);
        let again = run(&snapshot, Vec::new(), &BuildConfig::default());
        assert_eq!(again.placed_of(StructureKind::Rampart), 0);
    }

    #[test]
    fn refused_placements_do_not_count() {
        let snapshot = colony(2);
        let terrain = Field { walls: Vec::new() };
        let mut log = ActionLog::new().answering("place_site", ActionOutcome::failed("occupied"));
        let mut host = SplitHost {
            query: &terrain,
            sink: &mut log,
        };
        let report = plan(&snapshot, &mut host, &BuildConfig::default());
        assert!(report.placed.is_empty());
        assert!(report.refused > 0);
    }
}
