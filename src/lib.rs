//! slide-2048: the 2048 sliding-tile puzzle on an N x N grid
//!
//! This crate provides:
//! - A `Grid` engine (`engine` module) with the four directional moves, random
//!   tile spawning, game-over detection and a bordered text rendering
//! - A `Session` driver (`session` module) that parses `w`/`a`/`s`/`d`/`exit`
//!   commands and runs the read-move-spawn-render loop over any reader/writer
//!
//! Quick start:
//! ```
//! use slide_2048::engine::{Grid, Move};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic spawning with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut grid = Grid::new(4).unwrap();
//! grid.spawn_random(&mut rng).unwrap();
//! grid.spawn_random(&mut rng).unwrap();
//! if grid.apply(Move::Left) {
//!     grid.spawn_random(&mut rng).unwrap();
//! }
//! assert!(!grid.is_game_over());
//! for line in grid.render() {
//!     println!("{line}");
//! }
//! ```
pub mod engine;
pub mod session;
