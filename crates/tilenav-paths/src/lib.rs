//! Weighted tile graphs and shortest-route search.
//!
//! - [`GridGraph`] turns a rectangular terrain map into a graph of [`Node`]s
//!   laid over a continuous world, with 4- or 8-connected edges that follow
//!   terrain and occupancy edits.
//! - [`PathSearch`] runs **A\*** or **Dijkstra** ([`Strategy`]) over the
//!   graph and reuses its frontier and scratch state between runs.
//! - [`Route`] is a search result: waypoints to consume one at a time plus
//!   the diagnostics of the run that produced them.
//! - [`Navigator`] bundles a graph with its search engine and answers
//!   queries in world coordinates.
//!
//! # Costs
//!
//! | Terrain | Code | Cost |
//! |---|---|---|
//! | [`Terrain::Grass`] | 0 | 1.0 |
//! | [`Terrain::Road`] | 1 | 0.5 |
//! | [`Terrain::Water`] | 2 | 2.0 |
//! | [`Terrain::Mountain`] | 3 | impassable |
//!
//! A step of physical length `d` costs half of `d` at each tile's rate; see
//! [`search::step_cost`] for the occupancy penalties paid by privileged
//! searchers.

mod distance;
mod error;
pub mod graph;
pub mod mapfile;
mod navigator;
mod node;
mod open;
pub mod route;
pub mod search;
mod terrain;

pub use distance::octile;
pub use error::{Endpoint, MapError, NavError, SearchFailure};
pub use graph::GridGraph;
pub use navigator::Navigator;
pub use node::Node;
pub use route::{Route, RouteStatus, STALE_WINDOW, Waypoint};
pub use search::{ADJACENT_PENALTY, OCCUPIED_PENALTY, PathSearch, Strategy};
pub use terrain::Terrain;
