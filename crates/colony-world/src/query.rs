//! The world-query interface the decision engine consumes.
//!
//! Pathfinding and terrain live outside this system. The engine only needs
//! three answers from the host: how expensive it is to walk between two
//! cells, whether a cell is buildable, and how much compute the current
//! invocation has used. Selection helpers built on top of those answers are
//! provided here so every component picks "nearest" the same way.

use colony_types::{Position, Terrain};

/// Read-only queries answered by the host environment.
pub trait WorldQuery {
    /// Travel cost from `from` to `to`, or `None` if unreachable.
    fn path_cost(&self, from: Position, to: Position) -> Option<u32>;

    /// Terrain at `pos`. Cells outside the map report [`Terrain::Wall`].
    fn terrain(&self, pos: Position) -> Terrain;

    /// Compute used so far in the current invocation.
    fn cpu_used(&self) -> f64;
}

/// Pick the candidate with the lowest travel cost from `from`.
///
/// Unreachable candidates are skipped. Ties go to the earliest candidate in
/// iteration order, so the result is stable across ticks.
pub fn nearest_by_path<'a, T, I, F>(
    world: &dyn WorldQuery,
    from: Position,
    candidates: I,
    pos_of: F,
) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Position,
{
    let mut best: Option<(u32, &'a T)> = None;
    for candidate in candidates {
        let Some(cost) = world.path_cost(from, pos_of(candidate)) else {
            continue;
        };
        if best.is_none_or(|(best_cost, _)| cost < best_cost) {
            best = Some((cost, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}

/// Pick the candidate closest to `from` by straight-line range.
///
/// Ties go to the earliest candidate in iteration order.
pub fn nearest_by_range<'a, T, I, F>(from: Position, candidates: I, pos_of: F) -> Option<&'a T>
where
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> Position,
{
    let mut best: Option<(u32, &'a T)> = None;
    for candidate in candidates {
        let range = from.range_to(pos_of(candidate));
        if best.is_none_or(|(best_range, _)| range < best_range) {
            best = Some((range, candidate));
        }
    }
    best.map(|(_, candidate)| candidate)
}
