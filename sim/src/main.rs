//! tilenav-sim: the level without a window.

mod cli;

use std::error::Error;
use std::fs;

use clap::Parser;
use glam::Vec2;
use log::{info, warn};
use serde::Serialize;
use tilenav_agents::{Actor, AgentEvent, SimConfig, World};
use tilenav_paths::{Endpoint, Route, RouteStatus, SearchFailure, Strategy, mapfile};

use cli::Cli;

const BUILTIN_MAP: &str = include_str!("../maps/base.txt");

#[derive(Serialize)]
struct Report {
    ticks: u32,
    elapsed: f32,
    enemies: Vec<Vec2>,
    player: PlayerReport,
    search: Option<Route>,
}

#[derive(Serialize)]
struct PlayerReport {
    position: Vec2,
    destination: Option<Vec2>,
    arrived_at: Option<f32>,
    replans: u32,
    status: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config: SimConfig = match &cli.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => SimConfig::default(),
    };
    if cli.no_enemies {
        config.enemies_active = false;
    }
    if cli.four_way {
        config.diagonals = false;
    }
    if cli.simplify {
        config.steering.simplify_routes = true;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let map = match &cli.map {
        Some(path) => fs::read_to_string(path)?,
        None => BUILTIN_MAP.to_owned(),
    };
    let mut world = World::from_map_text(&map, &config)?;
    info!(
        "{}x{} tiles over {}x{} units, {} wanderers",
        world.graph().width(),
        world.graph().height(),
        config.world_width,
        config.world_height,
        world.enemies().len()
    );

    for paint in &cli.paint {
        world.paint(paint.pos, paint.terrain)?;
        info!("painted {:?} at {}", paint.terrain, paint.pos);
    }
    if let Some(start) = cli.start {
        world.place_player(start)?;
    }

    let strategy = Strategy::from(cli.strategy);
    let mut search = None;
    if let Some(goal) = cli.goal {
        world.set_player_destination(goal)?;
        world.request_player_path(strategy)?;
        let player = world.player();
        info!("player route: {}", player.last_message());
        if let Some(RouteStatus::Failed(failure)) = player.last_status() {
            if let Some(setting) = rejected_setting(failure) {
                warn!("{setting} is on impassable terrain");
            }
        }
        search = player.route().cloned();
        if let Some(route) = &search {
            info!(
                "{} waypoints, length {:.1}, cost {:.1}, {} expansions in {} ms",
                route.len(),
                route.length(),
                route.total_cost(),
                route.expansions(),
                route.duration_ms()
            );
        }
    }

    let dt = config.dt();
    let mut arrived_at = None;
    let mut replans = 0;
    let mut ticks = 0;
    while ticks < cli.ticks {
        ticks += 1;
        for e in world.update(dt)? {
            match (e.actor, &e.event) {
                (Actor::Player, AgentEvent::Arrived) => {
                    info!("player arrived after {:.1}s", world.elapsed());
                    arrived_at = Some(world.elapsed());
                }
                (Actor::Player, AgentEvent::Replanned(_)) => {
                    replans += 1;
                    info!("player replanned at {:.1}s", world.elapsed());
                }
                (Actor::Player, AgentEvent::SearchFailed(failure)) => {
                    warn!("player search failed: {failure}")
                }
                (Actor::Player, AgentEvent::Rejected(err)) => warn!("player request rejected: {err}"),
                _ => {}
            }
        }
        if arrived_at.is_some() && !cli.full {
            break;
        }
    }

    let player = world.player();
    info!(
        "stopped after {ticks} ticks ({:.1}s); player at {}",
        world.elapsed(),
        player.position()
    );

    if cli.report {
        let report = Report {
            ticks,
            elapsed: world.elapsed(),
            enemies: world.enemies().iter().map(|e| e.position()).collect(),
            player: PlayerReport {
                position: player.position(),
                destination: player.destination(),
                arrived_at,
                replans,
                status: player.last_message().to_owned(),
            },
            search,
        };
        print!("{}", toml::to_string(&report)?);
    }
    if cli.print_map {
        print!("{}", mapfile::render(&world.graph().terrain_rows()));
    }
    Ok(())
}

/// The option that placed a rejected endpoint.
fn rejected_setting(failure: SearchFailure) -> Option<&'static str> {
    failure.endpoint().map(|end| match end {
        Endpoint::Start => "the start position (--start or player_start)",
        Endpoint::Goal => "--goal",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_level_loads_with_stock_settings() {
        let world = World::from_map_text(BUILTIN_MAP, &SimConfig::default()).unwrap();
        assert_eq!(world.graph().width(), 20);
        assert_eq!(world.graph().height(), 20);
        for e in world.enemies() {
            assert!(world.graph().is_traversable_at(e.position()).unwrap());
        }
        let start = SimConfig::default().player_start;
        assert!(world.graph().is_traversable_at(start).unwrap());
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let shipped: SimConfig = toml::from_str(include_str!("../sim.toml")).unwrap();
        assert_eq!(shipped, SimConfig::default());
    }

    #[test]
    fn builtin_level_is_connected() {
        let mut world = World::from_map_text(BUILTIN_MAP, &SimConfig::default()).unwrap();
        world.set_player_destination(Vec2::new(925.0, 975.0)).unwrap();
        let status = world.request_player_path(Strategy::AStar).unwrap();
        assert_eq!(status, RouteStatus::Found);
    }

    #[test]
    fn goal_on_a_mountain_names_the_goal_option() {
        let mut world = World::from_map_text(BUILTIN_MAP, &SimConfig::default()).unwrap();
        world.paint(Vec2::new(925.0, 975.0), tilenav_paths::Terrain::Mountain).unwrap();
        world.set_player_destination(Vec2::new(925.0, 975.0)).unwrap();
        world.request_player_path(Strategy::AStar).unwrap();
        let Some(RouteStatus::Failed(failure)) = world.player().last_status() else {
            panic!("route to a mountain was accepted");
        };
        assert_eq!(rejected_setting(failure), Some("--goal"));
        assert_eq!(rejected_setting(SearchFailure::NoPathFound), None);
    }
}
