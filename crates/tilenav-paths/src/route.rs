use std::time::Duration;

use glam::Vec2;
use tilenav_core::Point;

use crate::error::SearchFailure;
use crate::graph::GridGraph;
use crate::search::Strategy;

/// How many upcoming waypoints [`Route::is_stale`] inspects.
pub const STALE_WINDOW: usize = 5;

/// One tile on a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub index: usize,
    pub grid: Point,
    pub position: Vec2,
}

/// Outcome of the search that produced a route.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RouteStatus {
    Found,
    Failed(SearchFailure),
}

/// The result of one search: waypoints plus diagnostics.
///
/// Waypoints are stored goal first, start last, the order in which the
/// parent chain is walked. Consumption happens at the start end, so
/// [`pop_next`](Self::pop_next) hands them out start to goal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    waypoints: Vec<Waypoint>,
    strategy: Strategy,
    duration: Duration,
    expansions: usize,
    total_cost: f32,
    status: RouteStatus,
}

impl Route {
    pub(crate) fn failed(strategy: Strategy, failure: SearchFailure) -> Self {
        Self {
            waypoints: Vec::new(),
            strategy,
            duration: Duration::ZERO,
            expansions: 0,
            total_cost: 0.0,
            status: RouteStatus::Failed(failure),
        }
    }

    pub(crate) fn found(
        strategy: Strategy,
        waypoints: Vec<Waypoint>,
        total_cost: f32,
        expansions: usize,
        duration: Duration,
    ) -> Self {
        Self {
            waypoints,
            strategy,
            duration,
            expansions,
            total_cost,
            status: RouteStatus::Found,
        }
    }

    pub(crate) fn with_search_stats(mut self, expansions: usize, duration: Duration) -> Self {
        self.expansions = expansions;
        self.duration = duration;
        self
    }

    // -----------------------------------------------------------------------
    // Consumption
    // -----------------------------------------------------------------------

    /// Remove and return the next waypoint position, or `None` once the
    /// route is exhausted.
    pub fn pop_next(&mut self) -> Option<Vec2> {
        self.waypoints.pop().map(|w| w.position)
    }

    /// The waypoint [`pop_next`](Self::pop_next) would return.
    pub fn peek_next(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// Whether any of the next [`STALE_WINDOW`] waypoints changed since the
    /// search that last touched it.
    ///
    /// Only a bounded window is checked: a cheap stand-in for validating the
    /// whole route.
    pub fn is_stale(&self, graph: &GridGraph) -> bool {
        self.waypoints
            .iter()
            .rev()
            .take(STALE_WINDOW)
            .any(|w| graph.nodes().get(w.index).is_none_or(|n| n.is_dirty()))
    }

    /// Thin the route for smoother motion.
    ///
    /// 1. Drops waypoints in the middle of a straight grid run.
    /// 2. Drops the first waypoint when `current` is already closer to the
    ///    second waypoint than the first one is.
    /// 3. Drops the goal tile's centre so the agent heads straight for its
    ///    real destination once the route runs out.
    ///
    /// Purely cosmetic; every remaining waypoint is still on the route.
    pub fn simplify(&mut self, current: Vec2) {
        // work in consumption order, start first
        let mut pts: Vec<Waypoint> = self.waypoints.iter().rev().copied().collect();

        if pts.len() > 2 {
            let mut keep = vec![true; pts.len()];
            for i in 1..pts.len() - 1 {
                let incoming = pts[i - 1].grid.step_towards(pts[i].grid);
                let outgoing = pts[i].grid.step_towards(pts[i + 1].grid);
                keep[i] = incoming != outgoing;
            }
            let mut flags = keep.into_iter();
            pts.retain(|_| flags.next().unwrap_or(true));
        }

        if pts.len() >= 2 && current.distance(pts[1].position) < pts[0].position.distance(pts[1].position)
        {
            pts.remove(0);
        }

        pts.pop();
        pts.reverse();
        self.waypoints = pts;
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    /// Remaining waypoints, goal first.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Remaining waypoint positions, goal first.
    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.waypoints.iter().map(|w| w.position)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Whether the route still has waypoints to follow.
    pub fn exists(&self) -> bool {
        !self.waypoints.is_empty()
    }

    /// Physical length along the remaining waypoints.
    pub fn length(&self) -> f32 {
        self.waypoints
            .windows(2)
            .map(|w| w[0].position.distance(w[1].position))
            .sum()
    }

    /// Weighted cost of the whole route as computed by the search.
    pub fn total_cost(&self) -> f32 {
        self.total_cost
    }

    /// Nodes moved to the closed set during the search.
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Search wall-clock time in whole milliseconds.
    pub fn duration_ms(&self) -> u128 {
        self.duration.as_millis()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn status(&self) -> RouteStatus {
        self.status
    }

    /// The failure reason, if the search did not succeed.
    pub fn failure(&self) -> Option<SearchFailure> {
        match self.status {
            RouteStatus::Found => None,
            RouteStatus::Failed(f) => Some(f),
        }
    }

    /// Human-readable outcome: the strategy name on success, the failure
    /// reason otherwise.
    pub fn status_message(&self) -> String {
        match self.status {
            RouteStatus::Found => self.strategy.to_string(),
            RouteStatus::Failed(f) => f.to_string(),
        }
    }
}
