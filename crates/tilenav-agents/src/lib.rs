//! Agents that move through a [`tilenav_paths`] graph.
//!
//! - [`SteeringAgent`] follows routes with smoothed, speed-limited motion,
//!   replans when the route ahead changes and backs off when no route
//!   exists.
//! - [`Wanderer`] roams around a spawn point and keeps its tile marked as
//!   occupied so privileged searches avoid it.
//! - [`World`] is a whole level: the terrain, one privileged player and a
//!   band of wanderers, driven by fixed-timestep [`World::update`] calls.

pub mod config;
mod steering;
mod wander;
mod world;

pub use config::{EnemySpawn, SimConfig, SteeringConfig, WanderConfig};
pub use steering::{AgentEvent, AgentState, SteeringAgent};
pub use wander::Wanderer;
pub use world::{Actor, World, WorldEvent};

pub use tilenav_paths as paths;
