//! Turn loop around a [`Grid`]: parse a command, apply it, spawn, render.
//!
//! The engine never sees raw input. Unrecognized lines are answered with a
//! help message and the loop keeps going.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, info};
use rand::Rng;

use crate::engine::{Grid, GridError, Move};

pub const HELP_MESSAGE: &str =
    "Invalid command. Please use \"w\", \"a\", \"s\" and \"d\" for up, left, down, and right. Or \"exit\" to quit.";
pub const BLOCKED_MESSAGE: &str = "Invalid move. No tiles can move that direction. Try again.";
pub const MILESTONE_MESSAGE: &str = "Congrats, you reached 2048! Keep playing for a higher tile.";
pub const GAME_OVER_MESSAGE: &str = "Game over";

/// A fully resolved line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Exit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unrecognized command {0:?}")]
pub struct ParseCommandError(pub String);

impl FromStr for Command {
    type Err = ParseCommandError;

    /// `w`/`a`/`s`/`d` in either case, or `exit`. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input == "exit" {
            return Ok(Command::Exit);
        }
        let mut chars = input.chars();
        let dir = match (chars.next(), chars.next()) {
            (Some(c), None) => match c.to_ascii_lowercase() {
                'w' => Move::Up,
                'a' => Move::Left,
                's' => Move::Down,
                'd' => Move::Right,
                _ => return Err(ParseCommandError(input.to_string())),
            },
            _ => return Err(ParseCommandError(input.to_string())),
        };
        Ok(Command::Move(dir))
    }
}

/// Where a session stands. `GameOver` and `Exited` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    GameOver,
    Exited,
}

/// Result of applying one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The grid changed and a new tile was spawned.
    Moved,
    /// Nothing could move in that direction; no tile was spawned.
    Blocked,
    Exited,
}

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("session already finished ({0:?})")]
    Finished(SessionState),
}

/// One game: an exclusively owned grid plus its tile spawner.
pub struct Session<R: Rng> {
    grid: Grid,
    rng: R,
    state: SessionState,
    milestone_noticed: bool,
}

impl<R: Rng> Session<R> {
    /// Start a fresh `size` x `size` game with two spawned tiles.
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use slide_2048::session::{Session, SessionState};
    /// let session = Session::new(4, StdRng::seed_from_u64(5)).unwrap();
    /// assert_eq!(session.grid().tile_count(), 2);
    /// assert_eq!(session.state(), SessionState::Playing);
    /// ```
    pub fn new(size: usize, mut rng: R) -> Result<Self, SessionError> {
        let mut grid = Grid::new(size)?;
        grid.spawn_random(&mut rng)?;
        grid.spawn_random(&mut rng)?;
        Ok(Self::from_grid(grid, rng))
    }

    /// Resume play on an existing grid.
    pub fn from_grid(grid: Grid, rng: R) -> Self {
        let state = if grid.is_game_over() { SessionState::GameOver } else { SessionState::Playing };
        Session { grid, rng, state, milestone_noticed: false }
    }

    #[inline]
    pub fn grid(&self) -> &Grid { &self.grid }

    #[inline]
    pub fn state(&self) -> SessionState { self.state }

    pub fn play(&mut self, command: Command) -> Result<Turn, SessionError> {
        if self.state != SessionState::Playing {
            return Err(SessionError::Finished(self.state));
        }
        let dir = match command {
            Command::Exit => {
                info!("player left the game");
                self.state = SessionState::Exited;
                return Ok(Turn::Exited);
            }
            Command::Move(dir) => dir,
        };

        if !self.grid.apply(dir) {
            debug!("{dir:?} had no effect");
            return Ok(Turn::Blocked);
        }
        // A move that changed the grid always leaves an empty cell.
        self.grid.spawn_random(&mut self.rng)?;
        if self.grid.is_game_over() {
            info!("game over, highest tile {}", self.grid.max_tile());
            self.state = SessionState::GameOver;
        }
        Ok(Turn::Moved)
    }

    /// True exactly once, the first time this is asked after the milestone.
    pub fn take_milestone_notice(&mut self) -> bool {
        if self.grid.reached_milestone() && !self.milestone_noticed {
            self.milestone_noticed = true;
            return true;
        }
        false
    }

    /// Drive the game until it ends, reading one command per line.
    ///
    /// End of input counts as `exit`. Lines that are not valid UTF-8 are
    /// decoded lossily and get the help message like any other bad command.
    pub fn run<I: BufRead, O: Write>(&mut self, mut input: I, mut output: O) -> Result<SessionState, SessionError> {
        self.write_grid(&mut output)?;
        let mut buf = Vec::new();
        while self.state == SessionState::Playing {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                debug!("input closed");
                self.play(Command::Exit)?;
                break;
            }

            match String::from_utf8_lossy(&buf).parse::<Command>() {
                Err(err) => {
                    debug!("{err}");
                    writeln!(output, "{HELP_MESSAGE}")?;
                }
                Ok(command) => match self.play(command)? {
                    Turn::Exited => break,
                    Turn::Blocked => writeln!(output, "{BLOCKED_MESSAGE}")?,
                    Turn::Moved => {}
                },
            }

            writeln!(output)?;
            if self.take_milestone_notice() {
                writeln!(output, "{MILESTONE_MESSAGE}")?;
            }
            self.write_grid(&mut output)?;
        }

        if self.state == SessionState::GameOver {
            writeln!(output, "{GAME_OVER_MESSAGE}")?;
        }
        output.flush()?;
        Ok(self.state)
    }

    fn write_grid<O: Write>(&self, output: &mut O) -> io::Result<()> {
        for line in self.grid.render() {
            writeln!(output, "{line}")?;
        }
        Ok(())
    }
}
