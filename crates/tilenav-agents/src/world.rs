//! The level: one privileged player, a band of wanderers and the terrain
//! they share.

use glam::Vec2;
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tilenav_paths::{GridGraph, NavError, Navigator, RouteStatus, Strategy, Terrain};

use crate::config::SimConfig;
use crate::steering::{AgentEvent, SteeringAgent};
use crate::wander::Wanderer;

/// Who an event happened to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Player,
    Enemy(usize),
}

/// An agent event tagged with its actor.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldEvent {
    pub actor: Actor,
    pub event: AgentEvent,
}

/// Level state. Input handling maps onto the command methods; a renderer
/// reads [`graph`](Self::graph), [`player`](Self::player) and
/// [`enemies`](Self::enemies).
#[derive(Debug)]
pub struct World {
    nav: Navigator,
    player: SteeringAgent,
    enemies: Vec<Wanderer>,
    enemies_active: bool,
    paused: bool,
    rng: SmallRng,
    elapsed: f32,
}

impl World {
    /// Build the level on `graph`. The graph's diagonal setting is replaced
    /// by the configured one.
    pub fn new(mut graph: GridGraph, config: &SimConfig) -> Result<Self, NavError> {
        graph.set_diagonals_allowed(config.diagonals);
        graph.node_at(config.player_start)?;
        let enemies = config
            .enemies
            .iter()
            .map(|&spawn| Wanderer::new(spawn, config.steering.clone(), config.wander.clone()))
            .collect();
        let mut world = Self {
            nav: Navigator::new(graph),
            player: SteeringAgent::new(config.player_start, true, config.steering.clone()),
            enemies,
            enemies_active: config.enemies_active,
            paused: false,
            rng: SmallRng::seed_from_u64(config.seed),
            elapsed: 0.0,
        };
        if world.enemies_active {
            world.register_enemies()?;
        }
        Ok(world)
    }

    /// Parse a terrain map and build the level on it, sized per `config`.
    pub fn from_map_text(text: &str, config: &SimConfig) -> Result<Self, NavError> {
        let graph = GridGraph::from_text(text, config.world_width, config.world_height)?;
        Self::new(graph, config)
    }

    pub fn graph(&self) -> &GridGraph {
        self.nav.graph()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn player(&self) -> &SteeringAgent {
        &self.player
    }

    pub fn enemies(&self) -> &[Wanderer] {
        &self.enemies
    }

    pub fn enemies_active(&self) -> bool {
        self.enemies_active
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Simulated seconds run so far, pauses excluded.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Change the terrain under a world position.
    pub fn paint(&mut self, pos: Vec2, terrain: Terrain) -> Result<(), NavError> {
        self.nav.graph_mut().set_terrain_at(pos, terrain)?;
        Ok(())
    }

    /// Switch between 4- and 8-connected movement; returns the new setting.
    pub fn toggle_diagonals(&mut self) -> bool {
        let on = self.nav.graph_mut().toggle_diagonals();
        info!("diagonal movement {}", if on { "on" } else { "off" });
        on
    }

    /// Move the player. An active route is recomputed from the new spot.
    pub fn place_player(&mut self, pos: Vec2) -> Result<Option<AgentEvent>, NavError> {
        self.nav.graph().node_at(pos)?;
        Ok(self.player.set_position(&mut self.nav, pos))
    }

    pub fn set_player_destination(&mut self, pos: Vec2) -> Result<Option<AgentEvent>, NavError> {
        self.nav.graph().node_at(pos)?;
        Ok(self.player.set_destination(&mut self.nav, pos))
    }

    /// Route the player to its destination with `strategy`.
    pub fn request_player_path(&mut self, strategy: Strategy) -> Result<RouteStatus, NavError> {
        self.player.request_path(&mut self.nav, strategy)
    }

    pub fn clear_player_path(&mut self) {
        self.player.clear_route();
    }

    /// Switch the wanderers on or off; returns the new setting.
    ///
    /// Either way the player's route is dropped and every occupancy mark is
    /// wiped. Wanderers that are now active register their tiles again.
    pub fn toggle_enemies(&mut self) -> Result<bool, NavError> {
        self.enemies_active = !self.enemies_active;
        self.player.clear_route();
        self.nav.graph_mut().clear_occupancy();
        for enemy in &mut self.enemies {
            enemy.forget_occupancy();
        }
        if self.enemies_active {
            self.register_enemies()?;
        } else {
            for enemy in &mut self.enemies {
                enemy.halt();
            }
        }
        info!(
            "enemies {}",
            if self.enemies_active { "active" } else { "inactive" }
        );
        Ok(self.enemies_active)
    }

    /// Freeze or resume the simulation; returns whether it is now paused.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    fn register_enemies(&mut self) -> Result<(), NavError> {
        let graph = self.nav.graph_mut();
        for enemy in &mut self.enemies {
            enemy.occupy(graph)?;
        }
        Ok(())
    }

    /// Advance the whole level by one tick of `dt` seconds.
    ///
    /// Does nothing while paused. Wanderers only move while active.
    pub fn update(&mut self, dt: f32) -> Result<Vec<WorldEvent>, NavError> {
        if self.paused {
            return Ok(Vec::new());
        }
        self.elapsed += dt;

        let mut events = Vec::new();
        if let Some(event) = self.player.advance(&mut self.nav, dt) {
            events.push(WorldEvent {
                actor: Actor::Player,
                event,
            });
        }
        if self.enemies_active {
            for (i, enemy) in self.enemies.iter_mut().enumerate() {
                if let Some(event) = enemy.update(&mut self.nav, &mut self.rng, dt)? {
                    events.push(WorldEvent {
                        actor: Actor::Enemy(i),
                        event,
                    });
                }
            }
        }
        for e in &events {
            debug!("{:.2}s {:?}: {:?}", self.elapsed, e.actor, e.event);
        }
        Ok(events)
    }
}
