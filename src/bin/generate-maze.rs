//! CLI for maze generation

use clap::Parser;
use maze_drop::MazeGenerator;
use rand::{rngs::StdRng, SeedableRng};

/// Perfect maze generator
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of cell rows
    #[arg(long, default_value_t = 15)]
    rows: usize,

    /// Number of cell columns
    #[arg(long, default_value_t = 15)]
    cols: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

/// Print a maze as text
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut random = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let maze = MazeGenerator::new(args.rows, args.cols)?.generate(&mut random);
    println!("{maze}");
    Ok(())
}
