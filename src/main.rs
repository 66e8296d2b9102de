//! Play in the terminal: `slide-2048 [SIZE] [--seed N] [-v]`.
use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use slide_2048::session::Session;
use std::io;

#[derive(Debug, Parser)]
#[command(
    name = "slide-2048",
    version,
    about = "Play 2048 in the terminal: w/a/s/d to move, exit to quit"
)]
struct Args {
    /// Board size N for an N x N grid (must be greater than 1)
    #[arg(default_value_t = 4)]
    size: usize,

    /// Seed the tile spawner for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Verbose logging to stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut session = Session::new(args.size, rng)
        .with_context(|| format!("cannot start a {0}x{0} game", args.size))?;
    log::info!("started {0}x{0} game (seed: {1:?})", args.size, args.seed);

    let state = session
        .run(io::stdin().lock(), io::stdout().lock())
        .context("game session failed")?;
    log::info!(
        "session ended: {state:?}, highest tile {}, milestone reached: {}",
        session.grid().max_tile(),
        session.grid().reached_milestone()
    );
    Ok(())
}

// Logs go to stderr so they never interleave with the grid on stdout.
// RUST_LOG, when set, refines the level chosen by -v.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
