//! Roaming agents that keep their tiles marked as occupied.

use glam::Vec2;
use log::debug;
use rand::{Rng, RngExt};
use tilenav_paths::{GridGraph, NavError, Navigator, RouteStatus, Strategy};

use crate::config::{EnemySpawn, SteeringConfig, WanderConfig};
use crate::steering::{AgentEvent, AgentState, SteeringAgent};

/// A non-privileged agent that wanders around its spawn point.
///
/// While registered, the tile under the wanderer counts as occupied, which
/// steers privileged searches away from it. The registration follows the
/// wanderer on the same cadence as route staleness checks.
#[derive(Debug, Clone)]
pub struct Wanderer {
    agent: SteeringAgent,
    spawn: EnemySpawn,
    config: WanderConfig,
    wander_timer: f32,
    occupancy_clock: f32,
    registered: Option<Vec2>,
}

impl Wanderer {
    /// A wanderer standing on its spawn point. Its first roam is due
    /// immediately.
    pub fn new(spawn: EnemySpawn, steering: SteeringConfig, config: WanderConfig) -> Self {
        let wander_timer = config.wander_interval;
        Self {
            agent: SteeringAgent::new(spawn.position, false, steering),
            spawn,
            config,
            wander_timer,
            occupancy_clock: 0.0,
            registered: None,
        }
    }

    pub fn agent(&self) -> &SteeringAgent {
        &self.agent
    }

    pub fn position(&self) -> Vec2 {
        self.agent.position()
    }

    pub fn spawn(&self) -> EnemySpawn {
        self.spawn
    }

    /// Where the wanderer's occupancy is currently registered.
    pub fn registered_at(&self) -> Option<Vec2> {
        self.registered
    }

    /// Mark the wanderer's tile as occupied. Does nothing if already
    /// registered.
    pub fn occupy(&mut self, graph: &mut GridGraph) -> Result<(), NavError> {
        if self.registered.is_none() {
            let pos = self.agent.position();
            graph.mark_occupant(pos, true)?;
            self.registered = Some(pos);
        }
        Ok(())
    }

    /// Remove the wanderer's occupancy mark, if any.
    pub fn withdraw(&mut self, graph: &mut GridGraph) -> Result<(), NavError> {
        if let Some(pos) = self.registered.take() {
            graph.mark_occupant(pos, false)?;
        }
        Ok(())
    }

    /// Forget the registration without touching the graph, for when the
    /// graph's occupancy was wiped wholesale.
    pub(crate) fn forget_occupancy(&mut self) {
        self.registered = None;
    }

    /// Stop and drop the current route.
    pub fn halt(&mut self) {
        self.agent.clear_route();
    }

    /// Run one tick: move along the route, keep the occupancy mark in step
    /// with the wanderer's tile, and pick a new target when idle long enough.
    pub fn update<R: Rng>(
        &mut self,
        nav: &mut Navigator,
        rng: &mut R,
        dt: f32,
    ) -> Result<Option<AgentEvent>, NavError> {
        let mut event = self.agent.advance(nav, dt);

        self.occupancy_clock += dt;
        if self.occupancy_clock >= self.agent.config().replan_interval {
            self.occupancy_clock = 0.0;
            self.follow_occupancy(nav.graph_mut())?;
        }

        if self.agent.state() == AgentState::Idle && self.agent.retry_in().is_none() {
            if self.wander_timer >= self.config.wander_interval {
                self.wander_timer = 0.0;
                if let Some(e) = self.roam(nav, rng) {
                    event = Some(e);
                }
            } else {
                self.wander_timer += dt;
            }
        }
        Ok(event)
    }

    fn follow_occupancy(&mut self, graph: &mut GridGraph) -> Result<(), NavError> {
        let Some(old) = self.registered else {
            return Ok(());
        };
        let pos = self.agent.position();
        let Ok(now) = graph.node_at(pos) else {
            debug!("wanderer at {pos} is outside the grid, keeping its old tile");
            return Ok(());
        };
        if graph.node_at(old)? != now {
            graph.mark_occupant(old, false)?;
            graph.mark_occupant(pos, true)?;
            self.registered = Some(pos);
        }
        Ok(())
    }

    /// Try random targets around the spawn point until one can be reached.
    fn roam<R: Rng>(&mut self, nav: &mut Navigator, rng: &mut R) -> Option<AgentEvent> {
        for _ in 0..self.config.max_attempts {
            let Some(target) = self.pick_target(nav.graph(), rng) else {
                continue;
            };
            self.agent.set_destination(nav, target);
            match self.agent.request_path(nav, Strategy::AStar) {
                Ok(RouteStatus::Found) => return Some(AgentEvent::RouteAcquired(Strategy::AStar)),
                Ok(RouteStatus::Failed(failure)) => {
                    debug!("wander target {target} rejected: {failure}");
                    self.agent.clear_route();
                }
                Err(err) => debug!("wander target {target} rejected: {err}"),
            }
        }
        debug!(
            "no wander target found near {} after {} attempts",
            self.spawn.position, self.config.max_attempts
        );
        None
    }

    /// One random candidate: within range of the spawn point, inside the
    /// world, far enough from the wanderer and on walkable ground.
    fn pick_target<R: Rng>(&self, graph: &GridGraph, rng: &mut R) -> Option<Vec2> {
        let range = self.spawn.range;
        if range.is_nan() || range <= 0.0 {
            return None;
        }
        let offset = Vec2::new(rng.random_range(-range..range), rng.random_range(-range..range));
        let target = self.spawn.position + offset;
        let world = graph.world_size();
        let inside = target.x > 0.0 && target.y > 0.0 && target.x < world.x && target.y < world.y;
        if !inside
            || offset.length() >= range
            || target.distance(self.agent.position()) <= self.config.min_wander_distance
        {
            return None;
        }
        graph
            .is_traversable_at(target)
            .ok()
            .filter(|&ok| ok)
            .map(|_| target)
    }
}
