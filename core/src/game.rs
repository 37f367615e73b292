use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardPhase {
    /// A fresh board is falling in.
    #[default]
    Generating,
    Playing,
    /// No move was left: the old gems drop away and a new board follows.
    Reshuffling,
    /// Every gem was destroyed, nothing happens until a restart.
    Cleared,
}

impl BoardPhase {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// What a single [`GameState::update`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    pub recolored: usize,
    pub removed: usize,
    pub collapsed_columns: usize,
    /// A move that committed or finished reverting during this frame.
    pub resolved: Option<Move>,
    pub reshuffled: bool,
    pub regenerated: bool,
}

impl FrameReport {
    pub fn has_update(&self) -> bool {
        self.recolored > 0
            || self.removed > 0
            || self.collapsed_columns > 0
            || self.resolved.is_some()
            || self.reshuffled
            || self.regenerated
    }
}

/// One board with everything that acts on it.
///
/// Each [`update`](Self::update) runs the same passes in the same order:
/// animations, removal of runs, column collapse, the move in flight with the
/// selector, and finally the deadlock check.
#[derive(Clone, Debug)]
pub struct GameState<S = Scoreboard, G = RandomGemSource> {
    config: GameConfig,
    board: Board,
    resolver: MoveResolver,
    cascade: CascadeResolver,
    scanner: DeadlockScanner,
    selector: Selector,
    sink: S,
    source: G,
    phase: BoardPhase,
    clock: FixedTimestep,
    hovered: Option<Coord2>,
    drag_start: Option<Coord2>,
    no_moves_message: f32,
    frames: u64,
}

impl GameState {
    /// Two-player game on a random board.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_parts(config, Scoreboard::new(), RandomGemSource::new(seed))
    }
}

impl<S: ScoreSink, G: GemSource> GameState<S, G> {
    /// Generates a board from `source`; play starts once it has fallen in.
    pub fn with_parts(config: GameConfig, sink: S, source: G) -> Self {
        let mut game = Self::assemble(config, Board::new(config.size), sink, source);
        game.generate();
        game
    }

    /// Starts playing on an existing board, skipping the opening fall.
    pub fn from_board(config: GameConfig, board: Board, sink: S, source: G) -> Self {
        let config = GameConfig {
            size: board.size(),
            ..config
        };
        let mut game = Self::assemble(config, board, sink, source);
        game.phase = BoardPhase::Playing;
        game
    }

    fn assemble(config: GameConfig, board: Board, sink: S, source: G) -> Self {
        Self {
            config,
            board,
            resolver: MoveResolver::new(),
            cascade: CascadeResolver::new(),
            scanner: DeadlockScanner::new(),
            selector: Selector::default(),
            sink,
            source,
            phase: BoardPhase::Generating,
            clock: FixedTimestep::default(),
            hovered: None,
            drag_start: None,
            no_moves_message: 0.0,
            frames: 0,
        }
    }

    pub fn with_clock(self, clock: FixedTimestep) -> Self {
        Self { clock, ..self }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn source(&self) -> &G {
        &self.source
    }

    pub fn resolver(&self) -> &MoveResolver {
        &self.resolver
    }

    pub fn cascade(&self) -> &CascadeResolver {
        &self.cascade
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn hovered(&self) -> Option<Coord2> {
        self.hovered
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn no_moves_message(&self) -> f32 {
        self.no_moves_message
    }

    pub fn last_move(&self) -> Option<Move> {
        self.resolver.last_move()
    }

    /// Nothing animates and no swap is in flight.
    pub fn is_settled(&self) -> bool {
        self.board.is_settled() && !self.resolver.is_busy()
    }

    /// Settled, full, and free of runs: the board waits for the player.
    pub fn is_idle(&self) -> bool {
        self.phase == BoardPhase::Playing
            && self.is_settled()
            && self.board.is_full()
            && !has_match(&self.board)
    }

    fn check_playing(&self) -> Result<()> {
        match self.phase {
            BoardPhase::Playing => Ok(()),
            BoardPhase::Generating => Err(GameError::BoardBusy),
            BoardPhase::Reshuffling | BoardPhase::Cleared => Err(GameError::BoardInactive),
        }
    }

    /// Refills the whole board from the gem source.
    pub fn generate(&mut self) {
        self.resolver.force_idle(&mut self.board);
        self.selector.clear();
        self.drag_start = None;
        self.cascade = CascadeResolver::new();
        self.scanner.invalidate();
        self.board.generate(&mut self.source, &self.config.timings);
        self.phase = BoardPhase::Generating;
    }

    /// New board for a new round. Scores are the sink owner's business.
    pub fn restart(&mut self) {
        self.no_moves_message = 0.0;
        self.clock.reset();
        self.generate();
        log::info!("Restarted {:?} board", self.board.size());
    }

    /// Drops every gem off the board. Play stays off until [`restart`](Self::restart).
    pub fn destroy_all_gems(&mut self) {
        self.clear_board();
        self.phase = BoardPhase::Cleared;
        log::info!("Destroyed all gems");
    }

    fn clear_board(&mut self) {
        self.resolver.force_idle(&mut self.board);
        self.selector.clear();
        self.drag_start = None;
        self.scanner.invalidate();

        let distance = f32::from(self.board.rows()) + 1.0;
        let duration = self.config.timings.destroy_fall;
        for cell in self.board.cells_mut() {
            cell.start_exit(distance, duration);
        }
    }

    fn start_reshuffle(&mut self) {
        self.clear_board();
        self.no_moves_message = 1.0;
        self.phase = BoardPhase::Reshuffling;
        self.sink.on_no_moves_available();
        log::info!("No moves left, reshuffling");
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Result<InputOutcome> {
        let coords = self.board.validate_coords(event.coords)?;

        Ok(match event.kind {
            InputKind::Move => {
                self.hovered = Some(coords);
                InputOutcome::Hovered(coords)
            }
            InputKind::Release => {
                self.drag_start = None;
                InputOutcome::Released
            }
            InputKind::Press | InputKind::Drag if !self.phase.accepts_input() => {
                log::trace!("Ignored {:?} during {:?}", event.kind, self.phase);
                InputOutcome::Ignored
            }
            InputKind::Press => {
                let outcome = self.resolver.select(coords);
                self.drag_start = match outcome {
                    InputOutcome::Ignored | InputOutcome::SwapQueued(_) => None,
                    _ => Some(coords),
                };
                outcome
            }
            InputKind::Drag => match self.drag_start {
                Some(start) if is_adjacent(start, coords) => {
                    self.drag_start = None;
                    self.resolver.drag(start, coords)
                }
                _ => InputOutcome::Ignored,
            },
        })
    }

    /// Queues a swap without going through pointer gestures.
    pub fn request_swap(&mut self, a: Coord2, b: Coord2) -> Result<Move> {
        let a = self.board.validate_coords(a)?;
        let b = self.board.validate_coords(b)?;
        self.check_playing()?;
        if self.resolver.is_busy() {
            return Err(GameError::BoardBusy);
        }
        if !is_adjacent(a, b) {
            return Err(GameError::NotAdjacent);
        }
        match self.resolver.drag(a, b) {
            InputOutcome::SwapQueued(mv) => Ok(mv),
            _ => Err(GameError::BoardBusy),
        }
    }

    /// A swap that would produce a match on the settled board, if any.
    pub fn hint(&mut self) -> Option<(Coord2, Coord2)> {
        if !self.is_idle() {
            return None;
        }
        find_available_move(&mut self.board)
    }

    /// Feeds wall-clock time through the fixed timestep, returning how many
    /// updates ran.
    pub fn tick(&mut self, elapsed: Duration) -> u32 {
        let steps = self.clock.advance(elapsed);
        let dt = self.clock.step_secs();
        for _ in 0..steps {
            self.update(dt);
        }
        steps
    }

    /// Runs one frame of `dt` seconds.
    pub fn update(&mut self, dt: f32) -> FrameReport {
        let dt = dt.max(0.0);
        let timings = self.config.timings;
        let mut report = FrameReport::default();
        self.frames += 1;

        report.recolored = self.board.advance(dt);

        match self.phase {
            BoardPhase::Generating if self.board.is_settled() => {
                self.phase = BoardPhase::Playing;
                log::debug!("Board ready after {} frames", self.frames);
            }
            BoardPhase::Reshuffling if self.board.is_settled() => {
                self.generate();
                self.sink.on_board_regenerated();
                report.regenerated = true;
            }
            _ => {}
        }

        if self.phase == BoardPhase::Playing {
            report.removed = self.removal_pass(&timings);
            report.collapsed_columns = self
                .cascade
                .collapse(&mut self.board, &mut self.source, &timings);
            report.resolved = self.resolve_move(&timings);
        }
        self.selector.update(dt, &self.resolver, &mut self.board, &timings);
        self.fade_message(dt, &timings);

        if report.recolored > 0 || report.removed > 0 || report.collapsed_columns > 0 {
            self.scanner.invalidate();
        }
        if self.phase == BoardPhase::Playing {
            report.reshuffled = self.deadlock_pass();
        }
        report
    }

    /// Unscored removal of whatever runs a settled full board holds.
    fn removal_pass(&mut self, timings: &Timings) -> usize {
        if self.resolver.is_busy() || !self.board.is_settled() || !self.board.is_full() {
            return 0;
        }
        let matches = find_matches(&self.board);
        if matches.is_empty() {
            self.cascade.finish_chain();
            return 0;
        }
        self.cascade.remove_matches(&mut self.board, &matches, timings)
    }

    fn resolve_move(&mut self, timings: &Timings) -> Option<Move> {
        match self.resolver.step(&mut self.board, &mut self.sink, timings) {
            ResolveStep::Committed { mv, matches } => {
                self.cascade.remove_matches(&mut self.board, &matches, timings);
                self.selector.start_fade(&mv);
                self.scanner.invalidate();
                Some(mv)
            }
            ResolveStep::Reverted(mv) => Some(mv),
            _ => None,
        }
    }

    fn fade_message(&mut self, dt: f32, timings: &Timings) {
        if self.phase == BoardPhase::Reshuffling || self.no_moves_message <= 0.0 {
            return;
        }
        self.no_moves_message = if timings.message_fade > 0.0 {
            (self.no_moves_message - dt / timings.message_fade).max(0.0)
        } else {
            0.0
        };
    }

    fn deadlock_pass(&mut self) -> bool {
        if !self.is_idle() || self.cascade.is_chaining() {
            return false;
        }
        if self.scanner.has_moves(&mut self.board) {
            return false;
        }
        self.start_reshuffle();
        true
    }

    pub fn cell_view(&self, coords: Coord2) -> Result<CellView> {
        let coords = self.board.validate_coords(coords)?;
        Ok(CellView::of(self.board.get(coords)))
    }

    pub fn render_state(&self) -> RenderState {
        RenderState {
            size: self.board.size(),
            cells: self.board.cells().map(CellView::of).collect(),
            selector: SelectorView {
                cells: self.selector.cells(),
                opacity: self.selector.opacity(),
                scale: self.selector.scale(&self.config.timings),
            },
            hovered: self.hovered,
            no_moves_message: self.no_moves_message,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use GemType::*;

    const FRAME: f32 = 1.0 / 60.0;

    /// Keeps every event for inspection.
    #[derive(Clone, Debug, Default)]
    struct Recorder {
        matches: Vec<(GemType, u8)>,
        committed: u32,
        no_moves: u32,
        regenerated: u32,
    }

    impl ScoreSink for Recorder {
        fn on_match(&mut self, gem: GemType, run_length: u8) {
            self.matches.push((gem, run_length));
        }

        fn on_move_committed(&mut self) {
            self.committed += 1;
        }

        fn on_no_moves_available(&mut self) {
            self.no_moves += 1;
        }

        fn on_board_regenerated(&mut self) {
            self.regenerated += 1;
        }
    }

    const PATTERN: [GemType; 4] = [Red, Yellow, Exp, Gold];

    /// Rows repeat every four cells, shifted by two per row: no runs anywhere.
    fn pattern_gems() -> Vec<GemType> {
        (0..8u8)
            .flat_map(|row| (0..8u8).map(move |col| PATTERN[usize::from(col + 2 * row) % 4]))
            .collect()
    }

    fn pattern_board(tweaks: &[(Coord2, GemType)]) -> Board {
        let mut board = Board::from_gems((8, 8), &pattern_gems()).unwrap();
        for &(coords, gem) in tweaks {
            board.set(coords, gem);
        }
        board
    }

    /// The plain pattern has no move, one red in the second row opens a few.
    fn playable_board() -> Board {
        pattern_board(&[((1, 1), Red)])
    }

    fn game(board: Board, refill: &[GemType]) -> GameState<Recorder, SequenceGemSource> {
        GameState::from_board(
            GameConfig::default(),
            board,
            Recorder::default(),
            SequenceGemSource::new(refill),
        )
    }

    fn run_until_idle<S: ScoreSink, G: GemSource>(
        game: &mut GameState<S, G>,
        max_frames: u32,
    ) -> u32 {
        for frame in 0..max_frames {
            game.update(FRAME);
            if game.is_idle() && game.resolver().state() == ResolverState::Idle {
                return frame + 1;
            }
        }
        panic!("board still busy after {max_frames} frames");
    }

    fn count(board: &Board, gem: GemType) -> usize {
        board.cells().filter(|cell| cell.gem() == Some(gem)).count()
    }

    #[test]
    fn opening_row_swap_scores_single_run_of_four() {
        let mut board = pattern_board(&[((1, 3), Green)]);
        for (col, gem) in [Green, Green, Green, Red, Yellow, Exp, Gold, Skull]
            .into_iter()
            .enumerate()
        {
            board.set((0, col as Coord), gem);
        }
        let reds_before = count(&board, Red);
        let mut game = game(board, &[Exp, Yellow]);

        assert_eq!(
            game.handle_input(InputEvent::press((0, 3))),
            Ok(InputOutcome::Selected((0, 3)))
        );
        assert!(matches!(
            game.handle_input(InputEvent::press((1, 3))),
            Ok(InputOutcome::SwapQueued(_))
        ));
        run_until_idle(&mut game, 600);

        assert_eq!(game.sink().matches, [(Green, 4)]);
        assert_eq!(game.sink().committed, 1);
        assert_eq!(game.last_move().map(|mv| mv.outcome), Some(MoveOutcome::Committed));

        let board = game.board();
        assert!(board.is_full());
        assert_eq!(count(board, Skull), 0);
        assert_eq!(count(board, Red), reds_before + 1);
        assert_eq!(board.gem_at((0, 7)), Some(Red));
        assert_eq!(board.gem_at((1, 3)), Some(Red));
        assert_eq!(
            (0..4).map(|col| board.gem_at((0, col))).collect::<Vec<_>>(),
            [Some(Exp), Some(Yellow), Some(Exp), Some(Yellow)]
        );
    }

    #[test]
    fn blue_run_turns_every_red_into_skull() {
        let board = pattern_board(&[((1, 1), Red), ((7, 0), Blue), ((7, 1), Blue), ((7, 3), Blue)]);
        let mut game = game(board, &[Exp, Gold]);

        game.request_swap((7, 2), (7, 3)).unwrap();
        run_until_idle(&mut game, 600);

        assert_eq!(game.sink().matches, [(Blue, 3)]);
        assert_eq!(count(game.board(), Red), 0);
        assert_eq!(count(game.board(), Skull), 17);
    }

    #[test]
    fn swap_without_match_reverts() {
        let board = playable_board();
        let before = board.gems();
        let mut game = game(board, &[Gold]);

        game.request_swap((0, 0), (0, 1)).unwrap();
        assert_eq!(game.request_swap((0, 0), (0, 1)), Err(GameError::BoardBusy));
        assert_eq!(game.handle_input(InputEvent::press((4, 4))), Ok(InputOutcome::Ignored));
        run_until_idle(&mut game, 600);

        assert_eq!(game.board().gems(), before);
        assert!(game.sink().matches.is_empty());
        assert_eq!(game.sink().committed, 0);
        assert_eq!(game.last_move().map(|mv| mv.outcome), Some(MoveOutcome::Reverted));
    }

    #[test]
    fn drag_onto_neighbour_queues_swap() {
        let mut game = game(playable_board(), &[Gold, Exp, Yellow]);

        game.handle_input(InputEvent::press((1, 0))).unwrap();
        assert_eq!(game.handle_input(InputEvent::drag((3, 0))), Ok(InputOutcome::Ignored));
        let outcome = game.handle_input(InputEvent::drag((1, 1))).unwrap();

        assert_eq!(outcome, InputOutcome::SwapQueued(Move::new((1, 0), (1, 1))));
        run_until_idle(&mut game, 600);
        assert_eq!(game.sink().committed, 1);
        assert_eq!(game.sink().matches, [(Red, 3)]);
    }

    #[test]
    fn swap_queued_during_cascade_ignores_leftover_run() {
        let mut game = game(playable_board(), &[Gold, Gold, Gold, Exp, Yellow, Exp]);

        game.request_swap((1, 0), (1, 1)).unwrap();
        let mut frames = 0;
        while game.update(FRAME).resolved.is_none() {
            frames += 1;
            assert!(frames < 600, "first swap never resolved");
        }
        assert_eq!(game.last_move().map(|mv| mv.outcome), Some(MoveOutcome::Committed));
        assert!(!game.board().is_settled());

        game.request_swap((6, 4), (6, 5)).unwrap();
        run_until_idle(&mut game, 600);

        let last = game.last_move().unwrap();
        assert_eq!(last.outcome, MoveOutcome::Reverted);
        assert!(!last.produces_match);
        assert_eq!(game.sink().matches, [(Red, 3)]);
        assert_eq!(game.sink().committed, 1);

        let board = game.board();
        assert_eq!(board.gem_at((6, 4)), Some(Red));
        assert_eq!(board.gem_at((6, 5)), Some(Yellow));
        assert_eq!(
            (0..4).map(|row| board.gem_at((row, 0))).collect::<Vec<_>>(),
            [Some(Exp), Some(Yellow), Some(Exp), Some(Exp)]
        );
        assert!(!has_match(board));
    }

    #[test]
    fn input_validation() {
        let mut game = game(playable_board(), &[Gold]);

        assert_eq!(
            game.handle_input(InputEvent::press((8, 0))),
            Err(GameError::InvalidCoords)
        );
        assert_eq!(game.request_swap((0, 0), (2, 0)), Err(GameError::NotAdjacent));
        assert_eq!(
            game.handle_input(InputEvent::hover((2, 5))),
            Ok(InputOutcome::Hovered((2, 5)))
        );
        assert_eq!(game.render_state().hovered, Some((2, 5)));

        game.destroy_all_gems();
        assert_eq!(game.request_swap((0, 0), (0, 1)), Err(GameError::BoardInactive));
        assert_eq!(game.handle_input(InputEvent::press((0, 0))), Ok(InputOutcome::Ignored));
    }

    #[test]
    fn random_board_cascades_settle_full() {
        let mut game = GameState::new(GameConfig::default(), 0x5eed);
        assert_eq!(game.phase(), BoardPhase::Generating);

        run_until_idle(&mut game, 10_000);

        assert!(game.board().is_full());
        assert!(!has_match(game.board()));
        assert!(game.hint().is_some());
    }

    #[test]
    fn locked_board_reshuffles_into_new_board() {
        #[rustfmt::skip]
        let regenerated = [
            Green, Green, Red,
            Blue,  Skull, Green,
            Gold,  Exp,   Yellow,
        ];
        #[rustfmt::skip]
        let locked = Board::from_gems((3, 3), &[
            Green, Red,   Yellow,
            Blue,  Skull, Exp,
            Gold,  Green, Red,
        ]).unwrap();
        let mut game = game(locked, &regenerated);

        let report = game.update(FRAME);
        assert!(report.reshuffled);
        assert_eq!(game.phase(), BoardPhase::Reshuffling);
        assert_eq!(game.sink().no_moves, 1);
        assert_eq!(game.no_moves_message(), 1.0);
        assert_eq!(game.handle_input(InputEvent::press((0, 0))), Ok(InputOutcome::Ignored));

        run_until_idle(&mut game, 600);

        assert_eq!(game.sink().regenerated, 1);
        assert_eq!(game.sink().no_moves, 1);
        let expected: Vec<_> = regenerated.iter().copied().map(Some).collect();
        assert_eq!(game.board().gems(), expected);
        assert_eq!(game.hint(), Some(((0, 2), (1, 2))));
    }

    #[test]
    fn reshuffle_exit_fades_gems_out() {
        #[rustfmt::skip]
        let locked = Board::from_gems((3, 3), &[
            Green, Red,   Yellow,
            Blue,  Skull, Exp,
            Gold,  Green, Red,
        ]).unwrap();
        let mut game = game(locked, &[Green, Green, Red, Blue, Skull, Green, Gold, Exp, Yellow]);

        game.update(FRAME);
        for _ in 0..60 {
            game.update(FRAME);
        }

        assert_eq!(game.phase(), BoardPhase::Reshuffling);
        let view = game.cell_view((0, 0)).unwrap();
        assert!(view.offset.0 > 0.0);
        assert!(view.opacity < 1.0 && view.opacity > 0.0);
    }

    #[test]
    fn message_fades_after_regeneration() {
        #[rustfmt::skip]
        let locked = Board::from_gems((3, 3), &[
            Green, Red,   Yellow,
            Blue,  Skull, Exp,
            Gold,  Green, Red,
        ]).unwrap();
        let mut game = game(locked, &[Green, Green, Red, Blue, Skull, Green, Gold, Exp, Yellow]);

        game.update(FRAME);
        run_until_idle(&mut game, 600);
        for _ in 0..120 {
            game.update(FRAME);
        }

        assert_eq!(game.no_moves_message(), 0.0);
        assert_eq!(game.render_state().no_moves_message, 0.0);
    }

    #[test]
    fn destroyed_board_waits_for_restart() {
        let mut game = game(playable_board(), &[Gold, Gold, Exp, Exp, Red]);

        game.destroy_all_gems();
        for _ in 0..200 {
            game.update(FRAME);
        }
        assert_eq!(game.phase(), BoardPhase::Cleared);
        assert!(game.board().get((0, 0)).offset() > 8.0);

        game.restart();
        assert_eq!(game.phase(), BoardPhase::Generating);
        run_until_idle(&mut game, 10_000);
        assert!(game.board().is_full());
    }

    #[test]
    fn tick_runs_fixed_steps() {
        let mut game = GameState::new(GameConfig::default(), 7)
            .with_clock(FixedTimestep::new(Duration::from_millis(10)));

        assert_eq!(game.tick(Duration::from_millis(35)), 3);
        assert_eq!(game.frames(), 3);
        assert_eq!(game.tick(Duration::from_millis(5)), 1);
    }

    #[test]
    fn render_state_is_row_major() {
        let game = game(playable_board(), &[Gold]);
        let state = game.render_state();

        assert_eq!(state.cells.len(), 64);
        assert_eq!(state.cell((1, 1)).and_then(|view| view.gem), Some(Red));
        assert_eq!(state.cell((0, 1)).and_then(|view| view.gem), Some(Yellow));
        assert_eq!(state.cell((8, 0)), None);
        assert_eq!(state.phase, BoardPhase::Playing);
        assert_eq!(game.cell_view((9, 9)), Err(GameError::InvalidCoords));
    }
}
