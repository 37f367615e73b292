use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Waiting for the board to settle or for the swap animation to finish.
    Pending,
    /// The swap produced a match and was kept.
    Committed,
    /// The swap produced nothing and was undone.
    Reverted,
}

/// A swap between two adjacent cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub a: Coord2,
    pub b: Coord2,
    /// Result of the trial swap, known once the swap animation starts.
    pub produces_match: bool,
    pub outcome: MoveOutcome,
    sliding: bool,
}

impl Move {
    pub const fn new(a: Coord2, b: Coord2) -> Self {
        Self {
            a,
            b,
            produces_match: false,
            outcome: MoveOutcome::Pending,
            sliding: false,
        }
    }

    pub const fn is_sliding(&self) -> bool {
        self.sliding
    }
}

/// Valid transitions:
/// - Idle -> FirstSelected
/// - FirstSelected -> Idle (same cell again)
/// - FirstSelected -> FirstSelected (non-adjacent cell)
/// - FirstSelected -> PendingSwap (adjacent cell)
/// - Idle/FirstSelected -> PendingSwap (drag)
/// - PendingSwap -> Idle (committed)
/// - PendingSwap -> RevertingSwap -> Idle
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolverState {
    #[default]
    Idle,
    FirstSelected(Coord2),
    PendingSwap(Move),
    RevertingSwap(Move),
}

impl ResolverState {
    /// A swap is in flight and input is ignored.
    pub const fn is_busy(self) -> bool {
        matches!(self, Self::PendingSwap(_) | Self::RevertingSwap(_))
    }
}

/// What the resolver did during one update step.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveStep {
    Idle,
    Waiting,
    SwapStarted(Move),
    Committed { mv: Move, matches: Vec<Match> },
    RevertStarted(Move),
    Reverted(Move),
}

/// Trial-swaps `a` and `b` and reports whether either gem lands in a run.
///
/// Runs elsewhere on the board do not count. The board is back to its
/// previous content when this returns.
pub fn swap_produces_match(board: &mut Board, a: Coord2, b: Coord2) -> bool {
    if board.gem_at(a) == board.gem_at(b) {
        return false;
    }
    let trial = board.trial_swap(a, b);
    has_match_at(&trial, a) || has_match_at(&trial, b)
}

fn slide_toward(from: Coord2, to: Coord2) -> (f32, f32) {
    (
        f32::from(to.0) - f32::from(from.0),
        f32::from(to.1) - f32::from(from.1),
    )
}

/// Selection and swap state machine. At most one move is in flight.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveResolver {
    state: ResolverState,
    last_move: Option<Move>,
}

impl MoveResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Last move that finished, committed or reverted.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// Cells currently highlighted by the selection.
    pub fn selection(&self) -> [Option<Coord2>; 2] {
        match self.state {
            ResolverState::Idle => [None, None],
            ResolverState::FirstSelected(first) => [Some(first), None],
            ResolverState::PendingSwap(mv) | ResolverState::RevertingSwap(mv) => {
                [Some(mv.a), Some(mv.b)]
            }
        }
    }

    /// Click on a cell.
    pub fn select(&mut self, coords: Coord2) -> InputOutcome {
        use ResolverState::*;

        match self.state {
            Idle => {
                self.state = FirstSelected(coords);
                log::trace!("Selected {:?}", coords);
                InputOutcome::Selected(coords)
            }
            FirstSelected(first) if first == coords => {
                self.state = Idle;
                log::trace!("Deselected {:?}", coords);
                InputOutcome::Deselected
            }
            FirstSelected(first) if !is_adjacent(first, coords) => {
                self.state = FirstSelected(coords);
                log::trace!("Reselected {:?} over {:?}", coords, first);
                InputOutcome::Reselected(coords)
            }
            FirstSelected(first) => self.queue_swap(first, coords),
            PendingSwap(_) | RevertingSwap(_) => InputOutcome::Ignored,
        }
    }

    /// Drag from one cell onto an adjacent one.
    pub fn drag(&mut self, from: Coord2, to: Coord2) -> InputOutcome {
        if self.is_busy() || !is_adjacent(from, to) {
            return InputOutcome::Ignored;
        }
        self.queue_swap(from, to)
    }

    fn queue_swap(&mut self, a: Coord2, b: Coord2) -> InputOutcome {
        let mv = Move::new(a, b);
        self.state = ResolverState::PendingSwap(mv);
        log::debug!("Queued swap {:?} <-> {:?}", a, b);
        InputOutcome::SwapQueued(mv)
    }

    /// Drops any selection or move in flight, clearing swap animations.
    pub fn force_idle(&mut self, board: &mut Board) {
        if let ResolverState::PendingSwap(mv) | ResolverState::RevertingSwap(mv) = self.state {
            if matches!(self.state, ResolverState::RevertingSwap(_)) {
                // content is swapped while reverting, put it back
                board.swap(mv.a, mv.b);
            }
            board.get_mut(mv.a).clear_slide();
            board.get_mut(mv.b).clear_slide();
            log::debug!("Dropped swap {:?} <-> {:?}", mv.a, mv.b);
        }
        self.state = ResolverState::Idle;
    }

    /// Advances the move in flight.
    ///
    /// A pending swap only starts once the whole board is settled. When the
    /// slide completes the gems are swapped for real: a match commits the move
    /// and scores it through `sink`, otherwise the gems slide back and the
    /// second swap restores the board.
    pub fn step<S>(&mut self, board: &mut Board, sink: &mut S, timings: &Timings) -> ResolveStep
    where
        S: ScoreSink + ?Sized,
    {
        match self.state {
            ResolverState::Idle | ResolverState::FirstSelected(_) => ResolveStep::Idle,
            ResolverState::PendingSwap(mut mv) if !mv.sliding => {
                if !board.is_settled() {
                    return ResolveStep::Waiting;
                }
                mv.produces_match = swap_produces_match(board, mv.a, mv.b);
                mv.sliding = true;
                board.get_mut(mv.a).start_slide(slide_toward(mv.a, mv.b), timings.swap_slide);
                board.get_mut(mv.b).start_slide(slide_toward(mv.b, mv.a), timings.swap_slide);
                self.state = ResolverState::PendingSwap(mv);
                log::trace!("Swap {:?} <-> {:?} started, match: {}", mv.a, mv.b, mv.produces_match);
                ResolveStep::SwapStarted(mv)
            }
            ResolverState::PendingSwap(mut mv) => {
                if !self.slides_finished(board, &mv) {
                    return ResolveStep::Waiting;
                }
                board.swap(mv.a, mv.b);
                board.get_mut(mv.a).clear_slide();
                board.get_mut(mv.b).clear_slide();

                let kept = has_match_at(board, mv.a) || has_match_at(board, mv.b);
                if mv.produces_match && kept {
                    mv.outcome = MoveOutcome::Committed;
                    self.state = ResolverState::Idle;
                    self.last_move = Some(mv);
                    let matches = score_matches(board, sink, timings);
                    sink.on_move_committed();
                    log::debug!("Committed swap {:?} <-> {:?}", mv.a, mv.b);
                    ResolveStep::Committed { mv, matches }
                } else {
                    mv.produces_match = false;
                    board.get_mut(mv.a).start_slide(slide_toward(mv.a, mv.b), timings.swap_slide);
                    board.get_mut(mv.b).start_slide(slide_toward(mv.b, mv.a), timings.swap_slide);
                    self.state = ResolverState::RevertingSwap(mv);
                    log::debug!("Swap {:?} <-> {:?} has no match, reverting", mv.a, mv.b);
                    ResolveStep::RevertStarted(mv)
                }
            }
            ResolverState::RevertingSwap(mut mv) => {
                if !self.slides_finished(board, &mv) {
                    return ResolveStep::Waiting;
                }
                board.swap(mv.a, mv.b);
                board.get_mut(mv.a).clear_slide();
                board.get_mut(mv.b).clear_slide();
                mv.outcome = MoveOutcome::Reverted;
                self.state = ResolverState::Idle;
                self.last_move = Some(mv);
                log::debug!("Reverted swap {:?} <-> {:?}", mv.a, mv.b);
                ResolveStep::Reverted(mv)
            }
        }
    }

    fn slides_finished(&self, board: &Board, mv: &Move) -> bool {
        board.get(mv.a).slide_finished() && board.get(mv.b).slide_finished()
    }
}
