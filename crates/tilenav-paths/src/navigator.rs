use glam::Vec2;
use log::info;

use crate::error::NavError;
use crate::graph::GridGraph;
use crate::route::Route;
use crate::search::{PathSearch, Strategy};

/// A graph paired with the search engine that walks it.
///
/// This is the handle agents hold: it answers world-position queries and
/// keeps the search's scratch bookkeeping next to the graph it belongs to.
#[derive(Debug)]
pub struct Navigator {
    graph: GridGraph,
    search: PathSearch,
}

impl Navigator {
    pub fn new(graph: GridGraph) -> Self {
        Self::with_search(graph, PathSearch::new())
    }

    pub fn with_search(graph: GridGraph, search: PathSearch) -> Self {
        Self { graph, search }
    }

    pub fn graph(&self) -> &GridGraph {
        &self.graph
    }

    /// Mutable graph access for terrain edits and occupancy updates.
    pub fn graph_mut(&mut self) -> &mut GridGraph {
        &mut self.graph
    }

    pub fn into_graph(self) -> GridGraph {
        self.graph
    }

    /// Route between two world positions.
    ///
    /// Positions outside the world are an error. Everything else, including
    /// impassable endpoints and unreachable goals, yields a route whose
    /// status explains the outcome.
    pub fn find_path(
        &mut self,
        from: Vec2,
        to: Vec2,
        strategy: Strategy,
        privileged: bool,
    ) -> Result<Route, NavError> {
        let start = self.graph.node_at(from)?;
        let goal = self.graph.node_at(to)?;
        let route = self
            .search
            .run(&mut self.graph, start, goal, strategy, privileged);
        if privileged {
            info!(
                "{}: {} waypoints, {} expansions, {} ms",
                route.status_message(),
                route.len(),
                route.expansions(),
                route.duration_ms()
            );
        }
        Ok(route)
    }
}
