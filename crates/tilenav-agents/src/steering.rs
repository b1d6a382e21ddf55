//! Route following with velocity-based steering.

use glam::Vec2;
use log::{info, warn};
use tilenav_paths::{NavError, Navigator, Route, RouteStatus, SearchFailure, Strategy};

use crate::config::SteeringConfig;

/// Whether the agent currently has a route to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    Following,
}

/// Something worth reporting that happened during a tick or a request.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// A search produced a route and the agent started following it.
    RouteAcquired(Strategy),
    /// The route went stale and was replaced by a fresh one.
    Replanned(Strategy),
    /// The agent reached its destination and stopped.
    Arrived,
    /// A search ended without a route.
    SearchFailed(SearchFailure),
    /// A request could not be made at all.
    Rejected(NavError),
}

/// An agent that follows routes from a [`Navigator`].
///
/// The agent never holds on to the graph. Every call that needs it takes
/// the navigator by reference, and positions go in and routes come out.
#[derive(Debug, Clone)]
pub struct SteeringAgent {
    position: Vec2,
    velocity: Vec2,
    speed: f32,
    destination: Option<Vec2>,
    target: Vec2,
    route: Option<Route>,
    strategy: Strategy,
    privileged: bool,
    config: SteeringConfig,
    replan_clock: f32,
    retry_in: Option<f32>,
    last_status: Option<RouteStatus>,
    last_message: String,
}

impl SteeringAgent {
    /// An idle agent at `position`. Privileged agents pay occupancy
    /// penalties when searching and so keep clear of other agents.
    pub fn new(position: Vec2, privileged: bool, config: SteeringConfig) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            speed: 0.0,
            destination: None,
            target: position,
            route: None,
            strategy: Strategy::default(),
            privileged,
            config,
            replan_clock: 0.0,
            retry_in: None,
            last_status: None,
            last_message: String::new(),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    /// The point the agent is currently steering towards.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// The route being followed, if any.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Strategy of the last request.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    pub fn config(&self) -> &SteeringConfig {
        &self.config
    }

    pub fn state(&self) -> AgentState {
        if self.route.is_some() {
            AgentState::Following
        } else {
            AgentState::Idle
        }
    }

    /// Seconds until the next automatic retry, if one is scheduled.
    pub fn retry_in(&self) -> Option<f32> {
        self.retry_in
    }

    /// Outcome of the last search this agent ran.
    pub fn last_status(&self) -> Option<RouteStatus> {
        self.last_status
    }

    /// Status text of the last request, for display.
    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Set where to go. An active route is replaced by one to the new
    /// destination.
    pub fn set_destination(&mut self, nav: &mut Navigator, destination: Vec2) -> Option<AgentEvent> {
        self.destination = Some(destination);
        self.rerequest(nav)
    }

    /// Teleport. An active route is replaced by one from the new position.
    pub fn set_position(&mut self, nav: &mut Navigator, position: Vec2) -> Option<AgentEvent> {
        self.position = position;
        self.rerequest(nav)
    }

    fn rerequest(&mut self, nav: &mut Navigator) -> Option<AgentEvent> {
        if self.route.is_none() {
            return None;
        }
        self.clear_route();
        Some(self.request_event(nav, self.strategy))
    }

    /// Drop the route and stop dead. Any scheduled retry is cancelled.
    pub fn clear_route(&mut self) {
        self.route = None;
        self.velocity = Vec2::ZERO;
        self.speed = 0.0;
        self.target = self.position;
        self.retry_in = None;
    }

    /// Search for a route from the current position to the destination and
    /// start following it.
    ///
    /// Fails with [`NavError::NoDestination`] when no destination is set and
    /// with [`NavError::OutOfBounds`] when either end lies outside the world.
    /// A search that finds nothing is not an error: the agent stays idle,
    /// and if the failure might clear up on its own a retry is scheduled
    /// after [`SteeringConfig::retry_backoff`] seconds.
    pub fn request_path(
        &mut self,
        nav: &mut Navigator,
        strategy: Strategy,
    ) -> Result<RouteStatus, NavError> {
        let destination = self.destination.ok_or(NavError::NoDestination)?;
        self.clear_route();
        self.strategy = strategy;

        let mut route = nav.find_path(self.position, destination, strategy, self.privileged)?;
        let status = route.status();
        self.last_status = Some(status);
        self.last_message = route.status_message();

        match status {
            // an empty route still lets the agent cover the last stretch
            // inside its goal tile
            RouteStatus::Found | RouteStatus::Failed(SearchFailure::AlreadyAtDestination) => {
                if self.config.simplify_routes {
                    route.simplify(self.position);
                }
                self.target = route.pop_next().unwrap_or(destination);
                self.route = Some(route);
            }
            RouteStatus::Failed(failure) if failure.is_retryable() => {
                warn!(
                    "{strategy} request failed ({failure}), retrying in {:.1}s",
                    self.config.retry_backoff
                );
                self.retry_in = Some(self.config.retry_backoff);
            }
            RouteStatus::Failed(failure) => {
                info!("{strategy} request not searched: {failure}");
            }
        }
        Ok(status)
    }

    fn request_event(&mut self, nav: &mut Navigator, strategy: Strategy) -> AgentEvent {
        match self.request_path(nav, strategy) {
            Ok(RouteStatus::Found) => AgentEvent::RouteAcquired(strategy),
            Ok(RouteStatus::Failed(failure)) => AgentEvent::SearchFailed(failure),
            Err(err) => {
                warn!("path request rejected: {err}");
                self.last_message = err.to_string();
                AgentEvent::Rejected(err)
            }
        }
    }

    /// Run one fixed-timestep tick of `dt` seconds.
    pub fn advance(&mut self, nav: &mut Navigator, dt: f32) -> Option<AgentEvent> {
        let mut event = None;

        self.replan_clock += dt;
        if self.replan_clock >= self.config.replan_interval {
            self.replan_clock = 0.0;
            if self.route.as_ref().is_some_and(|r| r.is_stale(nav.graph())) {
                info!("route ahead changed, replanning with {}", self.strategy);
                event = Some(match self.request_event(nav, self.strategy) {
                    AgentEvent::RouteAcquired(s) => AgentEvent::Replanned(s),
                    other => other,
                });
            }
        }

        if self.route.is_none() {
            if let Some(left) = self.retry_in.as_mut() {
                *left -= dt;
                if *left <= 0.0 {
                    self.retry_in = None;
                    event = Some(self.request_event(nav, self.strategy));
                }
            }
        }

        let Some(destination) = self.destination else {
            return event;
        };
        let Some(route) = self.route.as_mut() else {
            return event;
        };

        if self.position.distance(destination) < self.config.arrival_radius {
            info!("arrived at {destination}");
            self.clear_route();
            return Some(AgentEvent::Arrived);
        }
        if self.position.distance(self.target) < self.config.lookahead_radius {
            self.target = route.pop_next().unwrap_or(destination);
        }

        self.steer();
        event
    }

    fn steer(&mut self) {
        let c = &self.config;
        let desired = (self.target - self.position).normalize_or_zero() * c.max_speed;
        let steering = (desired - self.velocity) * c.damping;
        self.speed = (self.speed + c.acceleration).min(c.max_speed);
        self.velocity = (self.velocity + steering).clamp_length_max(self.speed);
        self.position += self.velocity;
    }
}
