use serde::{Deserialize, Serialize};

use crate::*;

/// Receives the scoring events the engine emits. Totals, health and victory
/// all live on the implementor's side.
pub trait ScoreSink {
    /// Called once per scored run, not per matched cell.
    fn on_match(&mut self, gem: GemType, run_length: u8);

    /// A player swap was kept because it produced a match.
    fn on_move_committed(&mut self) {}

    fn on_no_moves_available(&mut self) {}

    fn on_board_regenerated(&mut self) {}
}

impl<F: FnMut(GemType, u8)> ScoreSink for F {
    fn on_match(&mut self, gem: GemType, run_length: u8) {
        self(gem, run_length)
    }
}

/// Sink that drops every event, used for dry runs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn on_match(&mut self, _gem: GemType, _run_length: u8) {}
}

pub const DEFAULT_HEALTH: u8 = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub const fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    gem_counts: [CellCount; GemType::COUNT],
    pub health: u8,
    pub max_health: u8,
}

impl Default for PlayerScore {
    fn default() -> Self {
        Self {
            gem_counts: [0; GemType::COUNT],
            health: DEFAULT_HEALTH,
            max_health: DEFAULT_HEALTH,
        }
    }
}

impl PlayerScore {
    pub fn restart(&mut self) {
        *self = Self::default();
    }

    pub fn gem_count(&self, gem: GemType) -> CellCount {
        self.gem_counts[gem.index()]
    }

    pub fn gem_counts(&self) -> &[CellCount; GemType::COUNT] {
        &self.gem_counts
    }

    pub fn add_gems(&mut self, gem: GemType, count: CellCount) {
        let slot = &mut self.gem_counts[gem.index()];
        *slot = slot.saturating_add(count);
    }

    pub fn set_gem_count(&mut self, gem: GemType, count: CellCount) {
        self.gem_counts[gem.index()] = count;
    }

    pub fn clear_gem(&mut self, gem: GemType) {
        self.gem_counts[gem.index()] = 0;
    }

    pub fn take_damage(&mut self, amount: u8) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }
}

/// Two-player tally fed by the engine.
///
/// The current player collects every matched gem, skull runs hurt the
/// opponent by the run length, and the turn passes after each kept swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    players: [PlayerScore; 2],
    current: PlayerId,
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self {
            players: Default::default(),
            current: PlayerId::One,
        }
    }
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restart(&mut self) {
        for player in &mut self.players {
            player.restart();
        }
        self.current = PlayerId::One;
    }

    pub fn current_player(&self) -> PlayerId {
        self.current
    }

    pub fn player(&self, id: PlayerId) -> &PlayerScore {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut PlayerScore {
        &mut self.players[id.index()]
    }

    pub fn end_turn(&mut self) {
        self.current = self.current.other();
    }

    /// The player whose opponent ran out of health, if any.
    pub fn winner(&self) -> Option<PlayerId> {
        if self.player(PlayerId::Two).is_defeated() {
            Some(PlayerId::One)
        } else if self.player(PlayerId::One).is_defeated() {
            Some(PlayerId::Two)
        } else {
            None
        }
    }
}

impl ScoreSink for Scoreboard {
    fn on_match(&mut self, gem: GemType, run_length: u8) {
        let current = self.current;
        self.player_mut(current)
            .add_gems(gem, CellCount::from(run_length));
        if gem.is_skull() {
            self.player_mut(current.other()).take_damage(run_length);
        }
        log::trace!("{:?} collected {} {} gems", current, run_length, gem);
    }

    fn on_move_committed(&mut self) {
        self.end_turn();
        log::debug!("Turn passes to {:?}", self.current);
    }
}
