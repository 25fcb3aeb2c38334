//! CLI for running one maze session

use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::info;
use maze_drop::{
    BodyLabel, Cell, CollisionPair, LayoutConfig, MazeSession, PhysicsWorld, SessionConfig,
};
use rand::{rngs::StdRng, SeedableRng};

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    /// Text drawing and a summary
    Text,
    /// Bodies for the physics world
    Json,
}

/// Generate a maze whose walls drop once the ball reaches the goal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of cell rows
    #[arg(long, default_value_t = 15)]
    rows: usize,

    /// Number of cell columns
    #[arg(long, default_value_t = 15)]
    cols: usize,

    /// World width in pixels
    #[arg(long, default_value_t = 600.0)]
    width: f32,

    /// World height in pixels
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Row of the cell where carving starts
    #[arg(long, requires = "start_col")]
    start_row: Option<usize>,

    /// Column of the cell where carving starts
    #[arg(long, requires = "start_row")]
    start_col: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Collision events to replay, one `label label` pair per line. Use `-`
    /// for stdin.
    #[arg(short, long)]
    events: Option<PathBuf>,
}

/// Physics world stand-in that reports what it is told to do
struct ConsoleWorld;

impl PhysicsWorld for ConsoleWorld {
    fn set_gravity_y(&mut self, gravity_y: f32) {
        println!("world: gravity y = {gravity_y}");
    }

    fn release_static(&mut self, label: BodyLabel) {
        println!("world: release static bodies labelled `{label}`");
    }
}

/// Parse `label label` lines, skipping blanks and `#` comments
fn parse_events(text: &str) -> anyhow::Result<Vec<(usize, CollisionPair<'_>)>> {
    let mut pairs = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let labels: Vec<&str> = line.split_whitespace().collect();
        match labels[..] {
            [a, b] => pairs.push((i + 1, CollisionPair::new(a, b))),
            _ => bail!("Expected two labels on line {}, got `{}`", i + 1, line),
        }
    }
    Ok(pairs)
}

fn read_events(path: &Path) -> anyhow::Result<String> {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))
    }
}

/// Build a session, print it and replay collisions
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let layout = LayoutConfig::fit(args.width, args.height, args.rows, args.cols)?;
    let mut config = SessionConfig::new(args.rows, args.cols, layout);
    if let (Some(row), Some(col)) = (args.start_row, args.start_col) {
        config = config.with_start(Cell::new(row, col));
    }
    let random = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = MazeSession::new(&config, random).context("Cannot create maze")?;

    match args.format {
        Format::Text => {
            let layout = session.layout();
            println!("{}", session.maze());
            println!(
                "{} walls, goal at ({}, {}), ball starts at ({}, {})",
                layout.walls.len(),
                layout.goal.center_x,
                layout.goal.center_y,
                layout.start.x,
                layout.start.y
            );
        }
        Format::Json => {
            let handoff = session.layout().handoff();
            println!("{}", serde_json::to_string_pretty(&handoff)?);
        }
    }

    if let Some(path) = args.events {
        let text = read_events(&path)?;
        let mut world = ConsoleWorld;
        for (line, pair) in parse_events(&text)? {
            if session.on_collision_start(&[pair], &mut world) {
                info!("Unlocked by event on line {line}");
                println!("unlocked at line {line}");
            }
        }
        if !session.is_unlocked() {
            println!("still locked");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_events;

    #[test]
    fn events_skip_blanks_and_comments() {
        let text = "
# ball rolls into a wall first
wall ball

goal   ball
";
        let pairs = parse_events(text).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, 3);
        assert_eq!(pairs[1].1.label_a, "goal");
        assert_eq!(pairs[1].1.label_b, "ball");
    }

    #[test]
    fn events_need_two_labels() {
        assert!(parse_events("ball\n").is_err());
        assert!(parse_events("ball goal wall\n").is_err());
    }
}
