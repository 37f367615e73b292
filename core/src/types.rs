use serde::{Deserialize, Serialize};

/// Single coordinate axis used for board rows, columns, and positions.
pub type Coord = u8;

/// Count type used for cell counts and run lengths summed over a board.
pub type CellCount = u16;

/// Two-dimensional coordinates `(row, col)`, row 0 is the top of the board.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

/// Manhattan distance of exactly one.
pub const fn is_adjacent(a: Coord2, b: Coord2) -> bool {
    a.0.abs_diff(b.0) as u16 + a.1.abs_diff(b.1) as u16 == 1
}

/// Direction a run is scanned along.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Coordinates `offset` steps from `start` along this axis.
    pub const fn step(self, (row, col): Coord2, offset: Coord) -> Coord2 {
        match self {
            Self::Horizontal => (row, col + offset),
            Self::Vertical => (row + offset, col),
        }
    }
}

/// Row-major iterator over every position of a board.
///
/// Finite. A fresh one can always be obtained from [`crate::Board::all_positions`].
#[derive(Clone, Debug)]
pub struct PositionIter {
    size: Coord2,
    next: CellCount,
}

impl PositionIter {
    pub(crate) const fn new(size: Coord2) -> Self {
        Self { size, next: 0 }
    }
}

impl Iterator for PositionIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let (rows, cols) = self.size;
        if cols == 0 || self.next >= mult(rows, cols) {
            return None;
        }
        let index = self.next;
        self.next += 1;
        let cols = CellCount::from(cols);
        Some(((index / cols) as Coord, (index % cols) as Coord))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = mult(self.size.0, self.size.1);
        let left = usize::from(total.saturating_sub(self.next));
        (left, Some(left))
    }
}

impl ExactSizeIterator for PositionIter {}
