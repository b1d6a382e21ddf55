use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use glam::Vec2;
use tilenav_paths::{Strategy, Terrain};

#[derive(Parser)]
#[command(name = "tilenav-sim")]
#[command(author, version, about)]
#[command(long_about = "Run the tilenav level without a window.\n\n\
    Loads a terrain map, applies the requested edits and commands, then\n\
    steps the fixed-timestep simulation and logs what the agents do.\n\n\
    Examples:\n  \
    tilenav-sim --goal 800,900                 Route the player with A*\n  \
    tilenav-sim map.txt --goal 800,900 -s dijkstra\n  \
    tilenav-sim --paint 450,450=3 --report     Edit a tile, print a report")]
pub struct Cli {
    /// Terrain map, one digit per tile (built-in level when omitted)
    pub map: Option<PathBuf>,

    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Ticks to simulate
    #[arg(short, long, default_value = "1800")]
    pub ticks: u32,

    /// Move the player here before starting (x,y)
    #[arg(long, value_parser = parse_vec2)]
    pub start: Option<Vec2>,

    /// Player destination (x,y); a route is requested right away
    #[arg(long, value_parser = parse_vec2)]
    pub goal: Option<Vec2>,

    /// Search strategy for the player's route
    #[arg(short, long, value_enum, default_value_t = StrategyArg::AStar)]
    pub strategy: StrategyArg,

    /// Change a tile before starting (x,y=code); may be repeated
    #[arg(long, value_parser = parse_paint)]
    pub paint: Vec<Paint>,

    /// Keep the wanderers out of the run
    #[arg(long)]
    pub no_enemies: bool,

    /// Restrict movement to the four orthogonal directions
    #[arg(long)]
    pub four_way: bool,

    /// Thin routes before following them
    #[arg(long)]
    pub simplify: bool,

    /// Seed for wanderer target selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep running after the player arrives
    #[arg(long)]
    pub full: bool,

    /// Print a TOML report of the run to stdout
    #[arg(long)]
    pub report: bool,

    /// Print the terrain after the run
    #[arg(long)]
    pub print_map: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    #[value(name = "astar", alias = "a-star")]
    AStar,
    Dijkstra,
}

impl From<StrategyArg> for Strategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::AStar => Strategy::AStar,
            StrategyArg::Dijkstra => Strategy::Dijkstra,
        }
    }
}

/// A terrain edit given on the command line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub pos: Vec2,
    pub terrain: Terrain,
}

fn parse_vec2(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let coord = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("bad coordinate {v:?}: {e}"))
    };
    Ok(Vec2::new(coord(x)?, coord(y)?))
}

fn parse_paint(s: &str) -> Result<Paint, String> {
    let (pos, code) = s
        .split_once('=')
        .ok_or_else(|| format!("expected x,y=code but got {s:?}"))?;
    let code: u8 = code
        .trim()
        .parse()
        .map_err(|e| format!("bad terrain code {code:?}: {e}"))?;
    let terrain = Terrain::try_from(code).map_err(|e| e.to_string())?;
    Ok(Paint {
        pos: parse_vec2(pos)?,
        terrain,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn points_and_paints() {
        assert_eq!(parse_vec2("10, 20.5"), Ok(Vec2::new(10.0, 20.5)));
        assert!(parse_vec2("10").is_err());
        assert!(parse_vec2("a,1").is_err());
        assert_eq!(
            parse_paint("5,5=3"),
            Ok(Paint {
                pos: Vec2::new(5.0, 5.0),
                terrain: Terrain::Mountain
            })
        );
        assert!(parse_paint("5,5=9").is_err());
        assert!(parse_paint("5,5").is_err());
    }

    #[test]
    fn flags() {
        let cli = Cli::try_parse_from([
            "tilenav-sim",
            "map.txt",
            "--goal",
            "800,900",
            "-s",
            "dijkstra",
            "--paint",
            "1,1=2",
            "--paint",
            "2,2=0",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.map, Some(PathBuf::from("map.txt")));
        assert_eq!(cli.goal, Some(Vec2::new(800.0, 900.0)));
        assert!(matches!(cli.strategy, StrategyArg::Dijkstra));
        assert_eq!(cli.paint.len(), 2);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.ticks, 1800);
    }
}
