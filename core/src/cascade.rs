use serde::{Deserialize, Serialize};

use crate::*;

/// Removes matched gems and lets each column fall and refill once it is idle.
///
/// A chain is the sequence of removal passes triggered by one board change:
/// it ends when a settled board has no run left.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeResolver {
    chain: u32,
    removed: CellCount,
    refilled: CellCount,
}

impl CascadeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removal passes in the running chain.
    pub fn chain_length(&self) -> u32 {
        self.chain
    }

    pub fn removed(&self) -> CellCount {
        self.removed
    }

    pub fn refilled(&self) -> CellCount {
        self.refilled
    }

    pub fn is_chaining(&self) -> bool {
        self.chain > 0
    }

    /// Starts fading out every matched cell, returning how many gems went.
    ///
    /// Cells listed twice are only removed once.
    pub fn remove_matches(
        &mut self,
        board: &mut Board,
        matches: &[Match],
        timings: &Timings,
    ) -> usize {
        let mut removed = 0;
        for m in matches {
            let cell = board.get_mut(m.coords);
            if cell.gem().is_some() {
                cell.start_removal(timings.fade_out);
                removed += 1;
            }
        }
        if removed > 0 {
            self.chain += 1;
            self.removed = self.removed.saturating_add(removed as CellCount);
            log::debug!("Removal pass {}: {} gems", self.chain, removed);
        }
        removed
    }

    /// Ends the running chain, returning how many passes it took.
    pub fn finish_chain(&mut self) -> u32 {
        let chain = core::mem::take(&mut self.chain);
        if chain > 0 {
            log::debug!("Cascade chain finished after {} passes", chain);
        }
        chain
    }

    /// A column falls only when it has a hole and none of its cells animate.
    pub fn column_ready(board: &Board, col: Coord) -> bool {
        let mut has_hole = false;
        for cell in board.column(col) {
            if !cell.is_settled() {
                return false;
            }
            has_hole |= cell.is_empty();
        }
        has_hole
    }

    /// Collapses every ready column, returning how many columns moved.
    pub fn collapse<S: GemSource>(
        &mut self,
        board: &mut Board,
        source: &mut S,
        timings: &Timings,
    ) -> usize {
        let mut collapsed = 0;
        for col in 0..board.cols() {
            if Self::column_ready(board, col) {
                let refilled = self.collapse_column(board, col, source, timings);
                log::trace!("Column {} collapsed, {} new gems", col, refilled);
                collapsed += 1;
            }
        }
        collapsed
    }

    /// Shifts gems down over the holes below them, then drops fresh gems into
    /// the top cells. Every fall lasts in proportion to the rows it covers.
    fn collapse_column<S: GemSource>(
        &mut self,
        board: &mut Board,
        col: Coord,
        source: &mut S,
        timings: &Timings,
    ) -> Coord {
        let mut holes: Coord = 0;

        for row in (0..board.rows()).rev() {
            let coords = (row, col);
            if board.get(coords).is_empty() {
                holes += 1;
                continue;
            }
            if holes == 0 {
                continue;
            }
            let Some(gem) = board.gem_at(coords) else {
                continue;
            };
            let distance = f32::from(holes);
            board
                .get_mut((row + holes, col))
                .drop_in(gem, distance, timings.refill_fall_per_row * distance);
            board.get_mut(coords).set_gem(None);
        }

        let distance = f32::from(holes);
        for row in 0..holes {
            let gem = source.next_gem();
            board
                .get_mut((row, col))
                .drop_in(gem, distance, timings.refill_fall_per_row * distance);
        }
        self.refilled = self.refilled.saturating_add(CellCount::from(holes));
        holes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GemType::*;

    fn settle(board: &mut Board) {
        board.advance(100.0);
        assert!(board.is_settled());
    }

    fn column_gems(board: &Board, col: Coord) -> alloc::vec::Vec<Option<GemType>> {
        board.column(col).map(Cell::gem).collect()
    }

    #[test]
    fn gems_fall_over_holes_and_refill_from_top() {
        let mut board = Board::from_gems(
            (4, 2),
            &[Green, Exp, Red, Exp, Yellow, Exp, Blue, Exp],
        )
        .unwrap();
        let mut cascade = CascadeResolver::new();
        let mut source = SequenceGemSource::new(&[Gold]);
        let timings = Timings::default();

        board.get_mut((1, 0)).start_removal(0.0);
        board.get_mut((3, 0)).start_removal(0.0);
        settle(&mut board);

        assert_eq!(cascade.collapse(&mut board, &mut source, &timings), 1);
        assert_eq!(
            column_gems(&board, 0),
            [Some(Gold), Some(Gold), Some(Green), Some(Yellow)]
        );
        assert_eq!(column_gems(&board, 1), [Some(Exp); 4]);
        assert_eq!(cascade.refilled(), 2);

        // Yellow falls one row, Green two, refills two from above the board.
        assert_eq!(board.get((3, 0)).offset(), -1.0);
        assert_eq!(board.get((2, 0)).offset(), -2.0);
        assert_eq!(board.get((0, 0)).offset(), -2.0);
        assert!(board.get((0, 1)).is_settled());

        settle(&mut board);
        assert!(board.is_full());
    }

    #[test]
    fn column_waits_for_fades() {
        let mut board = Board::from_gems((3, 1), &[Green, Red, Blue]).unwrap();
        let mut cascade = CascadeResolver::new();
        let mut source = SequenceGemSource::new(&[Gold]);
        let timings = Timings::default();

        board.get_mut((2, 0)).start_removal(0.0);
        board.get_mut((0, 0)).start_removal(0.5);
        board.advance(0.1);

        assert!(board.get((2, 0)).is_empty());
        assert!(!CascadeResolver::column_ready(&board, 0));
        assert_eq!(cascade.collapse(&mut board, &mut source, &timings), 0);

        board.advance(0.5);
        assert!(CascadeResolver::column_ready(&board, 0));
        cascade.collapse(&mut board, &mut source, &timings);
        assert_eq!(column_gems(&board, 0), [Some(Gold), Some(Gold), Some(Red)]);
    }

    #[test]
    fn full_column_is_never_ready() {
        let board = Board::from_gems((2, 1), &[Green, Red]).unwrap();
        assert!(!CascadeResolver::column_ready(&board, 0));
    }

    #[test]
    fn crossing_cell_is_removed_once() {
        let mut board = Board::from_gems(
            (3, 3),
            &[Exp, Blue, Gold, Blue, Blue, Blue, Gold, Blue, Exp],
        )
        .unwrap();
        let mut cascade = CascadeResolver::new();
        let matches = find_matches(&board);
        assert_eq!(matches.len(), 6);

        let removed = cascade.remove_matches(&mut board, &matches, &Timings::default());

        assert_eq!(removed, 5);
        assert_eq!(cascade.chain_length(), 1);
        assert_eq!(cascade.finish_chain(), 1);
        assert!(!cascade.is_chaining());
    }
}
