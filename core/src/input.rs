use serde::{Deserialize, Serialize};

use crate::*;

/// Gesture kind, already resolved from screen space by the caller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Press,
    Release,
    Move,
    Drag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub kind: InputKind,
    pub coords: Coord2,
}

impl InputEvent {
    pub const fn press(coords: Coord2) -> Self {
        Self {
            kind: InputKind::Press,
            coords,
        }
    }

    pub const fn release(coords: Coord2) -> Self {
        Self {
            kind: InputKind::Release,
            coords,
        }
    }

    pub const fn hover(coords: Coord2) -> Self {
        Self {
            kind: InputKind::Move,
            coords,
        }
    }

    pub const fn drag(coords: Coord2) -> Self {
        Self {
            kind: InputKind::Drag,
            coords,
        }
    }
}

/// What an input event did to the selection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputOutcome {
    /// Nothing changed, e.g. while a swap is animating.
    Ignored,
    Selected(Coord2),
    Deselected,
    /// A non-adjacent cell replaced the previous selection.
    Reselected(Coord2),
    SwapQueued(Move),
    Hovered(Coord2),
    Released,
}

impl InputOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        use InputOutcome::*;
        match self {
            Ignored => false,
            Selected(_) => true,
            Deselected => true,
            Reselected(_) => true,
            SwapQueued(_) => true,
            Hovered(_) => false,
            Released => false,
        }
    }
}
