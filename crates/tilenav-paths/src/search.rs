//! A* and Dijkstra over a [`GridGraph`].
//!
//! Both strategies share one loop. The only difference is the key used to
//! pick the next node off the frontier: `f = g + h` for A*, plain `g` for
//! Dijkstra.

use std::fmt;
use std::time::Instant;

use log::debug;

use crate::distance;
use crate::error::SearchFailure;
use crate::graph::GridGraph;
use crate::node::{Node, Visit};
use crate::open::OpenSet;
use crate::route::{Route, Waypoint};

/// Multiplier on a neighbour's terrain cost when it hosts an occupant and
/// the searcher is privileged.
pub const OCCUPIED_PENALTY: f32 = 100.0;

/// Multiplier on a neighbour's terrain cost when it borders an occupied
/// tile and the searcher is privileged.
pub const ADJACENT_PENALTY: f32 = 50.0;

/// Frontier ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Strategy {
    #[default]
    AStar,
    Dijkstra,
}

impl Strategy {
    #[inline]
    fn key(self, g: f32, f: f32) -> f32 {
        match self {
            Self::AStar => f,
            Self::Dijkstra => g,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AStar => "A*",
            Self::Dijkstra => "Dijkstra",
        })
    }
}

/// Cost of stepping from `current` onto `neighbor` across distance `d`.
///
/// Half the step is charged at each tile's terrain rate. A privileged
/// searcher also pays a penalty on the neighbour's half when that tile is
/// occupied or borders an occupant; everyone else ignores occupancy.
pub fn step_cost(current: &Node, neighbor: &Node, d: f32, privileged: bool) -> f32 {
    let penalty = if !privileged {
        1.0
    } else if neighbor.is_occupied() {
        OCCUPIED_PENALTY
    } else if neighbor.adjacent_to_occupant() {
        ADJACENT_PENALTY
    } else {
        1.0
    };
    (d / 2.0) * neighbor.terrain_cost() * penalty + (d / 2.0) * current.terrain_cost()
}

/// Reusable search engine.
///
/// Keeps the frontier allocation between runs. The list of nodes a run
/// wrote scratch data into lives on the graph, so any engine can clean up
/// after any other.
#[derive(Debug, Default)]
pub struct PathSearch {
    open: OpenSet,
    max_expansions: Option<usize>,
}

impl PathSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up with [`SearchFailure::ExpansionLimit`] after closing `limit`
    /// nodes without reaching the goal.
    pub fn with_expansion_limit(limit: usize) -> Self {
        Self {
            max_expansions: Some(limit),
            ..Self::default()
        }
    }

    pub fn expansion_limit(&self) -> Option<usize> {
        self.max_expansions
    }

    /// Find a route from node `start` to node `goal`.
    ///
    /// Never fails outright: unreachable or invalid requests come back as
    /// an empty route whose status says why.
    ///
    /// # Panics
    ///
    /// If either index is not a node of `graph`.
    pub fn run(
        &mut self,
        graph: &mut GridGraph,
        start: usize,
        goal: usize,
        strategy: Strategy,
        privileged: bool,
    ) -> Route {
        if start == goal {
            return Route::failed(strategy, SearchFailure::AlreadyAtDestination);
        }
        if !graph.node(start).is_traversable() {
            return Route::failed(strategy, SearchFailure::InvalidStart);
        }
        if !graph.node(goal).is_traversable() {
            return Route::failed(strategy, SearchFailure::InvalidGoal);
        }

        let started = Instant::now();
        let cell = graph.cell_size();
        let (nodes, edges, touched) = graph.search_view();
        self.open.clear();

        let goal_grid = nodes[goal].grid;
        let heuristic = |n: &Node| distance::octile(n.grid, goal_grid, cell);

        {
            let seq = self.open.next_seq();
            let n = &mut nodes[start];
            n.reset_scratch();
            n.scratch.g = 0.0;
            n.scratch.f = heuristic(&*n);
            n.scratch.seq = seq;
            n.scratch.visit = Visit::Open;
            touched.push(start);
            self.open.push(start, strategy.key(0.0, n.scratch.f), seq);
        }

        let mut expansions = 0;
        let outcome = loop {
            let Some(ci) = self.open.pop() else {
                break Err(SearchFailure::NoPathFound);
            };
            // outdated entry for a node already closed via a cheaper one
            if nodes[ci].scratch.visit != Visit::Open {
                continue;
            }
            nodes[ci].scratch.visit = Visit::Closed;
            expansions += 1;

            if ci == goal {
                break Ok(());
            }
            if let Some(limit) = self.max_expansions {
                if expansions >= limit {
                    break Err(SearchFailure::ExpansionLimit(limit));
                }
            }

            let current = nodes[ci].clone();
            for &ni in &edges[ci] {
                let n = &mut nodes[ni];
                if n.scratch.visit == Visit::Closed {
                    continue;
                }
                let d = distance::octile(current.grid, n.grid, cell);
                let g = current.scratch.g + step_cost(&current, &*n, d, privileged);

                match n.scratch.visit {
                    Visit::Unseen => {
                        n.reset_scratch();
                        n.scratch.seq = self.open.next_seq();
                        n.scratch.visit = Visit::Open;
                        touched.push(ni);
                    }
                    Visit::Open if g < n.scratch.g => {}
                    _ => continue,
                }
                n.scratch.g = g;
                n.scratch.f = g + heuristic(&*n);
                n.scratch.parent = Some(ci);
                self.open.push(ni, strategy.key(g, n.scratch.f), n.scratch.seq);
            }
        };
        let elapsed = started.elapsed();

        if let Err(failure) = outcome {
            debug!("{strategy} search failed after {expansions} expansions: {failure}");
            return Route::failed(strategy, failure).with_search_stats(expansions, elapsed);
        }

        let mut waypoints = Vec::new();
        let mut ci = Some(goal);
        while let Some(i) = ci {
            let n = &nodes[i];
            waypoints.push(Waypoint {
                index: i,
                grid: n.grid,
                position: n.position,
            });
            ci = n.scratch.parent;
        }
        let total_cost = nodes[goal].scratch.g;

        debug!(
            "{strategy} found {} waypoints, cost {total_cost:.2}, {expansions} expansions in {elapsed:?}",
            waypoints.len()
        );
        Route::found(strategy, waypoints, total_cost, expansions, elapsed)
    }

    /// Cheapest route cost from `start` to `goal`, without keeping the route.
    pub fn cost(
        &mut self,
        graph: &mut GridGraph,
        start: usize,
        goal: usize,
        strategy: Strategy,
    ) -> Option<f32> {
        let route = self.run(graph, start, goal, strategy, false);
        route.exists().then(|| route.total_cost())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::Terrain;
    use glam::Vec2;
    use tilenav_core::Point;

    const EPS: f32 = 1e-3;

    /// 4×4 open grid with 100×100 tiles.
    fn square4() -> GridGraph {
        GridGraph::build(&vec![vec![0u8; 4]; 4], 400.0, 400.0).unwrap()
    }

    fn idx(g: &GridGraph, x: i32, y: i32) -> usize {
        g.index_of(Point::new(x, y)).unwrap()
    }

    fn grids(route: &Route) -> Vec<Point> {
        route.waypoints().iter().map(|w| w.grid).collect()
    }

    #[test]
    fn direct_diagonal() {
        let mut g = square4();
        let (s, t) = (idx(&g, 0, 0), idx(&g, 3, 3));
        let route = PathSearch::new().run(&mut g, s, t, Strategy::AStar, false);
        let diag = g.cell_size().length();
        assert_eq!(route.status(), crate::RouteStatus::Found);
        assert!((route.length() - 3.0 * diag).abs() < EPS);
        assert!((route.total_cost() - 3.0 * diag).abs() < EPS);
        assert!(route.expansions() <= 16);
        assert_eq!(
            grids(&route),
            vec![
                Point::new(3, 3),
                Point::new(2, 2),
                Point::new(1, 1),
                Point::new(0, 0)
            ]
        );
        assert_eq!(route.status_message(), "A*");
    }

    #[test]
    fn blocked_diagonal_forces_detour() {
        let mut g = square4();
        let diag = g.cell_size().length();
        g.set_terrain(1, 1, Terrain::Mountain).unwrap();
        g.set_terrain(2, 2, Terrain::Mountain).unwrap();
        let (s, t) = (idx(&g, 0, 0), idx(&g, 3, 3));
        let route = PathSearch::new().run(&mut g, s, t, Strategy::AStar, false);
        assert!(route.exists());
        assert!(route.total_cost() > 3.0 * diag + EPS);
        assert!(
            route
                .waypoints()
                .iter()
                .all(|w| w.grid != Point::new(1, 1) && w.grid != Point::new(2, 2))
        );
    }

    #[test]
    fn same_start_and_goal() {
        let mut g = square4();
        let s = idx(&g, 2, 1);
        let route = PathSearch::new().run(&mut g, s, s, Strategy::Dijkstra, true);
        assert_eq!(
            route.failure(),
            Some(SearchFailure::AlreadyAtDestination)
        );
        assert_eq!(route.status_message(), "already at destination");
        assert_eq!(route.len(), 0);
    }

    #[test]
    fn invalid_endpoints() {
        let mut g = square4();
        g.set_terrain(0, 0, Terrain::Mountain).unwrap();
        g.set_terrain(3, 3, Terrain::Mountain).unwrap();
        let mut search = PathSearch::new();
        let (a, b, c) = (idx(&g, 0, 0), idx(&g, 3, 3), idx(&g, 1, 2));
        let r = search.run(&mut g, a, c, Strategy::AStar, false);
        assert_eq!(r.failure(), Some(SearchFailure::InvalidStart));
        let r = search.run(&mut g, c, b, Strategy::AStar, false);
        assert_eq!(r.failure(), Some(SearchFailure::InvalidGoal));
        assert!(!r.status_message().is_empty());
    }

    #[test]
    fn walled_off_goal_has_no_path() {
        let mut g = GridGraph::from_text("0 3 0\n0 3 0\n0 3 0", 30.0, 30.0).unwrap();
        let (s, t) = (idx(&g, 0, 0), idx(&g, 2, 2));
        for strategy in [Strategy::AStar, Strategy::Dijkstra] {
            let route = PathSearch::new().run(&mut g, s, t, strategy, false);
            assert_eq!(route.failure(), Some(SearchFailure::NoPathFound));
            assert!(route.is_empty());
            assert!(route.expansions() > 0);
        }
    }

    #[test]
    fn blocking_only_corridor_breaks_route() {
        let mut g = GridGraph::from_text("0 0 0 0 0\n3 3 3 3 0\n0 0 0 0 0", 50.0, 30.0).unwrap();
        let mut search = PathSearch::new();
        let (s, t) = (idx(&g, 0, 0), idx(&g, 0, 2));
        let route = search.run(&mut g, s, t, Strategy::AStar, false);
        assert!(route.exists());
        assert!(grids(&route).contains(&Point::new(4, 1)));

        g.set_terrain(4, 1, Terrain::Mountain).unwrap();
        let route = search.run(&mut g, s, t, Strategy::AStar, false);
        assert_eq!(route.failure(), Some(SearchFailure::NoPathFound));
    }

    #[test]
    fn strategies_agree_on_cost() {
        let map = "\
0 0 2 0 0 0
0 3 2 3 3 0
0 3 0 0 3 0
0 2 2 0 3 0
0 0 3 0 0 0
2 0 0 0 2 2";
        let mut g = GridGraph::from_text(map, 600.0, 300.0).unwrap();
        let mut search = PathSearch::new();
        let passable: Vec<usize> = g
            .nodes()
            .iter()
            .filter(|n| n.is_traversable())
            .map(Node::index)
            .collect();
        for diagonals in [true, false] {
            g.set_diagonals_allowed(diagonals);
            for &s in &passable {
                for &t in &passable {
                    if s == t {
                        continue;
                    }
                    let a = search.run(&mut g, s, t, Strategy::AStar, false);
                    let d = search.run(&mut g, s, t, Strategy::Dijkstra, false);
                    assert_eq!(a.exists(), d.exists());
                    assert!(
                        (a.total_cost() - d.total_cost()).abs() < 1e-2,
                        "{s}->{t}: {} vs {}",
                        a.total_cost(),
                        d.total_cost()
                    );
                }
            }
        }
    }

    #[test]
    fn strategies_agree_on_length_with_uniform_cost() {
        let map = "\
0 0 0 0 0 0 0
0 3 3 3 3 3 0
0 0 0 0 0 3 0
3 3 3 3 0 3 0
0 0 0 0 0 0 0";
        let mut g = GridGraph::from_text(map, 700.0, 500.0).unwrap();
        let mut search = PathSearch::new();
        let (s, t) = (idx(&g, 0, 2), idx(&g, 0, 4));
        let a = search.run(&mut g, s, t, Strategy::AStar, false);
        let d = search.run(&mut g, s, t, Strategy::Dijkstra, false);
        assert!(a.exists() && d.exists());
        assert!((a.length() - d.length()).abs() < EPS);
    }

    #[test]
    fn route_follows_parent_chain() {
        let mut g = GridGraph::from_text("0 0 0 0\n0 3 3 0\n0 0 0 0", 40.0, 30.0).unwrap();
        let (s, t) = (idx(&g, 0, 1), idx(&g, 3, 1));
        let mut route = PathSearch::new().run(&mut g, s, t, Strategy::Dijkstra, false);

        // stored goal first, each entry's parent is the next one
        let stored: Vec<usize> = route.waypoints().iter().map(|w| w.index).collect();
        assert_eq!(stored.first(), Some(&t));
        assert_eq!(stored.last(), Some(&s));
        for pair in stored.windows(2) {
            assert_eq!(g.node(pair[0]).parent(), Some(pair[1]));
        }
        assert_eq!(g.node(s).parent(), None);

        // consumed start first, then exhausted
        let expected: Vec<Vec2> = stored.iter().rev().map(|&i| g.node(i).position()).collect();
        let popped: Vec<Vec2> = std::iter::from_fn(|| route.pop_next()).collect();
        assert_eq!(popped, expected);
        assert_eq!(route.pop_next(), None);
    }

    #[test]
    fn cheap_terrain_attracts_routes() {
        // a road loop around a field of water
        let map = "\
1 1 1 1 1
1 2 2 2 1
1 2 2 2 1";
        let mut g = GridGraph::from_text(map, 50.0, 30.0).unwrap();
        let (s, t) = (idx(&g, 0, 2), idx(&g, 4, 2));
        let route = PathSearch::new().run(&mut g, s, t, Strategy::Dijkstra, false);
        assert!(grids(&route).iter().all(|p| g.node_at_grid(*p).unwrap().terrain() == Terrain::Road));
    }

    #[test]
    fn privileged_search_avoids_occupants() {
        // three-row corridor, an occupant parked in the middle row
        let mut g = GridGraph::from_text("0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0\n0 0 0 0 0", 50.0, 50.0).unwrap();
        g.mark_occupant(Vec2::new(25.0, 25.0), true).unwrap();
        let (s, t) = (idx(&g, 0, 2), idx(&g, 4, 2));
        let mut search = PathSearch::new();

        let indifferent = search.run(&mut g, s, t, Strategy::AStar, false);
        assert!(grids(&indifferent).contains(&Point::new(2, 2)));

        let player = search.run(&mut g, s, t, Strategy::AStar, true);
        assert!(player.exists());
        for w in player.waypoints() {
            let n = g.node(w.index);
            assert!(!n.is_occupied());
            if w.index != s && w.index != t {
                assert!(!n.adjacent_to_occupant(), "{} borders the occupant", w.grid);
            }
        }
        assert!(player.total_cost() > indifferent.total_cost());
    }

    #[test]
    fn search_resets_previous_scratch_and_dirty_flags() {
        let mut g = square4();
        let mut search = PathSearch::new();
        let (s, t) = (idx(&g, 0, 0), idx(&g, 3, 0));
        search.run(&mut g, s, t, Strategy::Dijkstra, false);
        let touched: Vec<usize> = g
            .nodes()
            .iter()
            .filter(|n| n.parent().is_some())
            .map(Node::index)
            .collect();
        assert!(!touched.is_empty());

        g.set_terrain(0, 3, Terrain::Water).unwrap();
        let far = idx(&g, 0, 3);
        assert!(g.node(far).is_dirty());

        // a tiny search elsewhere wipes what the last one left behind
        let (a, b) = (idx(&g, 3, 3), idx(&g, 2, 3));
        search.run(&mut g, a, b, Strategy::AStar, false);
        for i in touched {
            let n = g.node(i);
            if i != a && i != b && n.parent().is_some() {
                assert!(
                    g.neighbors(a).contains(&i) || g.neighbors(b).contains(&i),
                    "stale scratch on {}",
                    n.grid()
                );
            }
        }
        assert!(!g.node(far).is_dirty());
    }

    #[test]
    fn separate_engines_share_one_graph() {
        let mut g = GridGraph::build(&[[0u8; 4]], 400.0, 100.0).unwrap();
        let first = PathSearch::new().run(&mut g, 0, 3, Strategy::Dijkstra, false);
        assert_eq!(first.status(), crate::RouteStatus::Found);

        let second = PathSearch::new().run(&mut g, 0, 3, Strategy::Dijkstra, false);
        assert_eq!(second.status(), crate::RouteStatus::Found);
        assert_eq!(second.len(), first.len());

        // a cloned graph carries its leftovers along with the list to wipe them
        let mut copy = g.clone();
        let third = PathSearch::new().run(&mut copy, 3, 0, Strategy::AStar, false);
        assert_eq!(third.status(), crate::RouteStatus::Found);
        assert!((third.total_cost() - second.total_cost()).abs() < EPS);
    }

    #[test]
    fn expansion_limit() {
        let mut g = GridGraph::build(&vec![vec![0u8; 20]; 20], 200.0, 200.0).unwrap();
        let (s, t) = (idx(&g, 0, 0), idx(&g, 19, 19));
        let mut search = PathSearch::with_expansion_limit(5);
        let route = search.run(&mut g, s, t, Strategy::Dijkstra, false);
        assert_eq!(route.failure(), Some(SearchFailure::ExpansionLimit(5)));
        assert_eq!(route.expansions(), 5);

        let mut unlimited = PathSearch::new();
        assert!(unlimited.cost(&mut g, s, t, Strategy::AStar).is_some());
    }

    #[test]
    fn step_cost_penalties() {
        let g = square4();
        let mut occupied = g.node(1).clone();
        occupied.occupants = 1;
        let mut adjacent = g.node(2).clone();
        adjacent.occupied_neighbors = 1;
        let here = g.node(0);
        assert_eq!(step_cost(here, &occupied, 10.0, false), 10.0);
        assert_eq!(step_cost(here, &occupied, 10.0, true), 5.0 * 100.0 + 5.0);
        assert_eq!(step_cost(here, &adjacent, 10.0, true), 5.0 * 50.0 + 5.0);
        assert_eq!(step_cost(here, g.node(3), 10.0, true), 10.0);
    }
}
