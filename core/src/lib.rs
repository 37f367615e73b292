#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use board::*;
pub use cascade::*;
pub use cell::*;
pub use deadlock::*;
pub use error::*;
pub use game::*;
pub use gem::*;
pub use generator::*;
pub use input::*;
pub use matcher::*;
pub use moves::*;
pub use persist::*;
pub use render::*;
pub use score::*;
pub use timestep::*;
pub use types::*;

mod board;
mod cascade;
mod cell;
mod deadlock;
mod error;
mod game;
mod gem;
mod generator;
mod input;
mod matcher;
mod moves;
mod persist;
mod render;
mod score;
mod timestep;
mod types;

/// Default board edge length.
pub const DEFAULT_SIZE: Coord2 = (8, 8);

/// Animation durations in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Timings {
    /// Fall of a freshly generated board.
    pub initial_fall: f32,
    /// Extra fall time per column of a freshly generated board.
    pub initial_stagger: f32,
    /// Refill and gravity fall, per row travelled.
    pub refill_fall_per_row: f32,
    pub swap_slide: f32,
    pub fade_out: f32,
    /// Drop off the board on deadlock or when all gems get destroyed.
    pub destroy_fall: f32,
    pub selector_fade: f32,
    /// Selector spin speed in degrees per second.
    pub selector_spin: f32,
    /// Fade of the "no moves" message once the new board is in.
    pub message_fade: f32,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            initial_fall: 1.0,
            initial_stagger: 0.05,
            refill_fall_per_row: 0.2,
            swap_slide: 0.2,
            fade_out: 0.25,
            destroy_fall: 1.5,
            selector_fade: 1.2,
            selector_spin: 60.0,
            message_fade: 1.0,
        }
    }
}

impl Timings {
    /// Every animation completes immediately, handy for headless play.
    pub const fn instant() -> Self {
        Self {
            initial_fall: 0.0,
            initial_stagger: 0.0,
            refill_fall_per_row: 0.0,
            swap_slide: 0.0,
            fade_out: 0.0,
            destroy_fall: 0.0,
            selector_fade: 0.0,
            selector_spin: 0.0,
            message_fade: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub timings: Timings,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, timings: Timings) -> Self {
        Self { size, timings }
    }

    pub fn new((rows, cols): Coord2) -> Self {
        let rows = rows.clamp(1, Coord::MAX);
        let cols = cols.clamp(1, Coord::MAX);
        Self::new_unchecked((rows, cols), Timings::default())
    }

    pub fn with_timings(self, timings: Timings) -> Self {
        Self { timings, ..self }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SIZE)
    }
}
