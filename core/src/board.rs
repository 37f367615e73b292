use alloc::vec::Vec;
use core::ops::{Deref, Index};

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Canonical grid storage: every cell is addressed by `(row, col)` and by the
/// row-major index `row * cols + col`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
}

impl Board {
    /// Board of empty cells awaiting a call to [`Board::generate`].
    pub fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
        }
    }

    /// Settled board built from row-major gems.
    pub fn from_gems(size: Coord2, gems: &[GemType]) -> Result<Self> {
        if gems.len() != usize::from(mult(size.0, size.1)) {
            return Err(GameError::InvalidBoardShape);
        }
        let cells: Vec<Cell> = gems.iter().copied().map(Cell::with_gem).collect();
        let cells = Array2::from_shape_vec(size.to_nd_index(), cells)
            .map_err(|_| GameError::InvalidBoardShape)?;
        Ok(Self { cells })
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (rows, cols) = self.size();
        mult(rows, cols)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn contains(&self, (row, col): Coord2) -> bool {
        let (rows, cols) = self.size();
        row < rows && col < cols
    }

    /// Internal coordinates are expected to be in bounds. Debug builds assert,
    /// release builds clamp to the nearest edge cell.
    pub(crate) fn check_coords(&self, coords: Coord2) -> Coord2 {
        debug_assert!(
            self.contains(coords),
            "coordinates {:?} outside board {:?}",
            coords,
            self.size()
        );
        if self.contains(coords) {
            return coords;
        }
        let (rows, cols) = self.size();
        let clamped = (
            coords.0.min(rows.saturating_sub(1)),
            coords.1.min(cols.saturating_sub(1)),
        );
        log::warn!("Clamped out of range coordinates {:?} to {:?}", coords, clamped);
        clamped
    }

    pub fn index_of(&self, coords: Coord2) -> usize {
        let (row, col) = self.check_coords(coords);
        usize::from(row) * usize::from(self.cols()) + usize::from(col)
    }

    pub fn coords_of(&self, index: usize) -> Option<Coord2> {
        let cols = usize::from(self.cols());
        if cols == 0 || index >= self.cells.len() {
            return None;
        }
        Some(((index / cols) as Coord, (index % cols) as Coord))
    }

    pub fn get(&self, coords: Coord2) -> &Cell {
        &self.cells[self.check_coords(coords).to_nd_index()]
    }

    pub(crate) fn get_mut(&mut self, coords: Coord2) -> &mut Cell {
        let coords = self.check_coords(coords);
        &mut self.cells[coords.to_nd_index()]
    }

    pub fn gem_at(&self, coords: Coord2) -> Option<GemType> {
        self.get(coords).gem()
    }

    /// Replaces the gem at `coords` and shows it at full opacity. Running
    /// animations keep going.
    pub fn set(&mut self, coords: Coord2, gem: GemType) {
        self.get_mut(coords).set_gem(Some(gem));
    }

    /// Exchanges the content of two cells. Animation state stays where it is.
    pub fn swap(&mut self, a: Coord2, b: Coord2) {
        let a = self.check_coords(a);
        let b = self.check_coords(b);
        if a == b {
            return;
        }
        let mut first = core::mem::take(&mut self.cells[a.to_nd_index()]);
        first.swap_contents(&mut self.cells[b.to_nd_index()]);
        self.cells[a.to_nd_index()] = first;
    }

    /// Swaps `a` and `b` for as long as the returned guard lives.
    ///
    /// The board is restored when the guard drops, including during unwinding.
    pub fn trial_swap(&mut self, a: Coord2, b: Coord2) -> TrialSwap<'_> {
        self.swap(a, b);
        TrialSwap { board: self, a, b }
    }

    /// No cell has a running drop, fade, or swap animation.
    pub fn is_settled(&self) -> bool {
        self.cells.iter().all(Cell::is_settled)
    }

    pub fn all_positions(&self) -> PositionIter {
        PositionIter::new(self.size())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn column(&self, col: Coord) -> impl Iterator<Item = &Cell> {
        self.cells.column(usize::from(col)).into_iter()
    }

    /// Gems in row-major order, `None` for empty cells.
    pub fn gems(&self) -> Vec<Option<GemType>> {
        self.cells.iter().map(Cell::gem).collect()
    }

    /// Every cell holds a gem.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.gem().is_some())
    }

    /// Refills every cell from `source` with a staggered fall from above the board.
    pub fn generate<S: GemSource>(&mut self, source: &mut S, timings: &Timings) {
        let (rows, cols) = self.size();
        for (row, col) in self.all_positions() {
            let gem = source.next_gem();
            let cell = self.get_mut((row, col));
            cell.reset_rotation();
            cell.clear_slide();
            cell.drop_in(
                gem,
                f32::from(rows),
                timings.initial_fall + timings.initial_stagger * f32::from(col),
            );
        }
        log::debug!("Generated {}x{} board", rows, cols);
    }

    /// Advances all cell animations, returning how many recolors were applied.
    pub(crate) fn advance(&mut self, dt: f32) -> usize {
        let mut recolored = 0;
        for cell in self.cells.iter_mut() {
            if let CellStep::Recolored(gem) = cell.advance(dt) {
                log::trace!("Recolored gem to {}", gem);
                recolored += 1;
            }
        }
        recolored
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        self.get(coords)
    }
}

/// Guard returned by [`Board::trial_swap`].
#[derive(Debug)]
pub struct TrialSwap<'a> {
    board: &'a mut Board,
    a: Coord2,
    b: Coord2,
}

impl Deref for TrialSwap<'_> {
    type Target = Board;

    fn deref(&self) -> &Self::Target {
        self.board
    }
}

impl Drop for TrialSwap<'_> {
    fn drop(&mut self) {
        self.board.swap(self.a, self.b);
    }
}
