//! The combined host seam.
//!
//! Most hosts answer queries and accept actions through one object, and an
//! accepted action changes what later queries return. [`Host`] lets the
//! decision engine borrow both halves through a single `&mut`. Callers that
//! keep them apart (a dry run against a fixed map, a test) join them with
//! [`SplitHost`].

use colony_types::{Action, ActionOutcome, Position, Terrain};

use crate::query::WorldQuery;
use crate::sink::ActionSink;

/// Anything that can both answer queries and accept actions.
pub trait Host: WorldQuery + ActionSink {}

impl<T: WorldQuery + ActionSink + ?Sized> Host for T {}

/// A [`Host`] assembled from a separate query oracle and action sink.
pub struct SplitHost<'a> {
    /// Answers travel-cost, terrain, and compute queries.
    pub query: &'a dyn WorldQuery,
    /// Receives every submitted action.
    pub sink: &'a mut dyn ActionSink,
}

impl WorldQuery for SplitHost<'_> {
    fn path_cost(&self, from: Position, to: Position) -> Option<u32> {
        self.query.path_cost(from, to)
    }

    fn terrain(&self, pos: Position) -> Terrain {
        self.query.terrain(pos)
    }

    fn cpu_used(&self) -> f64 {
        self.query.cpu_used()
    }
}

impl ActionSink for SplitHost<'_> {
    fn submit(&mut self, action: Action) -> ActionOutcome {
        self.sink.submit(action)
    }
}
