use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Adjacent pairs in scan order: every horizontal pair row by row, then every
/// vertical pair.
pub fn adjacent_pairs(size: Coord2) -> impl Iterator<Item = (Coord2, Coord2)> {
    let (rows, cols) = size;
    let horizontal = (0..rows).flat_map(move |row| {
        (1..cols).map(move |col| ((row, col - 1), (row, col)))
    });
    let vertical = (1..rows).flat_map(move |row| {
        (0..cols).map(move |col| ((row - 1, col), (row, col)))
    });
    horizontal.chain(vertical)
}

/// First swap that would produce a match, if any.
pub fn find_available_move(board: &mut Board) -> Option<(Coord2, Coord2)> {
    adjacent_pairs(board.size()).find(|&(a, b)| swap_produces_match(board, a, b))
}

pub fn has_available_moves(board: &mut Board) -> bool {
    find_available_move(board).is_some()
}

pub fn available_moves(board: &mut Board) -> Vec<(Coord2, Coord2)> {
    adjacent_pairs(board.size())
        .filter(|&(a, b)| swap_produces_match(board, a, b))
        .collect()
}

/// Caches the last scan until the board changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlockScanner {
    known: Option<bool>,
    scans: u32,
}

impl DeadlockScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.known = None;
    }

    /// How many full scans ran so far.
    pub fn scans(&self) -> u32 {
        self.scans
    }

    /// Whether at least one swap on `board` produces a match.
    pub fn has_moves(&mut self, board: &mut Board) -> bool {
        if let Some(known) = self.known {
            return known;
        }
        let found = has_available_moves(board);
        self.scans += 1;
        self.known = Some(found);
        log::trace!("Deadlock scan {}: moves available: {}", self.scans, found);
        found
    }
}
