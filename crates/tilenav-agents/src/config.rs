//! Tunables for agents and the level.
//!
//! Every struct has a `Default` matching the stock level, and with the
//! `serde` feature every field is optional when deserializing.

use glam::Vec2;

/// Motion and replanning parameters of a [`SteeringAgent`](crate::SteeringAgent).
///
/// Speeds are world units per tick; intervals are seconds of simulated time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteeringConfig {
    pub max_speed: f32,
    /// Speed gained per tick until `max_speed`.
    pub acceleration: f32,
    /// Fraction of the velocity error corrected per tick.
    pub damping: f32,
    /// Distance from the destination at which the agent stops.
    pub arrival_radius: f32,
    /// Distance from the current target at which the next waypoint is taken.
    pub lookahead_radius: f32,
    /// How often the route is checked for staleness.
    pub replan_interval: f32,
    /// Wait before re-requesting after a search found no path.
    pub retry_backoff: f32,
    /// Thin routes with [`Route::simplify`](tilenav_paths::Route::simplify).
    pub simplify_routes: bool,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            max_speed: 0.15,
            acceleration: 0.01,
            damping: 0.05,
            arrival_radius: 5.0,
            lookahead_radius: 25.0,
            replan_interval: 1.0,
            retry_backoff: 2.0,
            simplify_routes: false,
        }
    }
}

/// How a [`Wanderer`](crate::Wanderer) picks its next target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WanderConfig {
    /// Idle seconds between two roams.
    pub wander_interval: f32,
    /// Targets closer than this to the wanderer are rejected.
    pub min_wander_distance: f32,
    /// Random candidates tried per roam before giving up until next time.
    pub max_attempts: u32,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            wander_interval: 20.0,
            min_wander_distance: 100.0,
            max_attempts: 32,
        }
    }
}

/// Where a wanderer starts and how far from there it may roam.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemySpawn {
    pub position: Vec2,
    pub range: f32,
}

impl EnemySpawn {
    pub const fn new(x: f32, y: f32, range: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            range,
        }
    }
}

/// The stock level's five roamers.
pub const DEFAULT_SPAWNS: [EnemySpawn; 5] = [
    EnemySpawn::new(150.0, 850.0, 300.0),
    EnemySpawn::new(450.0, 350.0, 350.0),
    EnemySpawn::new(800.0, 250.0, 400.0),
    EnemySpawn::new(100.0, 750.0, 500.0),
    EnemySpawn::new(750.0, 850.0, 200.0),
];

/// Everything a [`World`](crate::World) needs besides the terrain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    pub world_width: f32,
    pub world_height: f32,
    /// Fixed ticks per simulated second.
    pub tick_rate: f32,
    pub diagonals: bool,
    pub player_start: Vec2,
    /// Whether the wanderers move and occupy tiles from the start.
    pub enemies_active: bool,
    /// Seed for wander target selection.
    pub seed: u64,
    pub steering: SteeringConfig,
    pub wander: WanderConfig,
    pub enemies: Vec<EnemySpawn>,
}

impl SimConfig {
    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.world_width, self.world_height)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 1000.0,
            world_height: 1000.0,
            tick_rate: 30.0,
            diagonals: true,
            player_start: Vec2::new(200.0, 100.0),
            enemies_active: true,
            seed: 0,
            steering: SteeringConfig::default(),
            wander: WanderConfig::default(),
            enemies: DEFAULT_SPAWNS.to_vec(),
        }
    }
}
