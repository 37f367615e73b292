use core::fmt;

use serde::{Deserialize, Serialize};

/// Kind of tile that can sit in a board cell.
///
/// Declaration order is also the column order used by saved games.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GemType {
    Green,
    Red,
    Yellow,
    Blue,
    Skull,
    Exp,
    Gold,
}

impl GemType {
    pub const COUNT: usize = 7;

    pub const ALL: [GemType; Self::COUNT] = [
        Self::Green,
        Self::Red,
        Self::Yellow,
        Self::Blue,
        Self::Skull,
        Self::Exp,
        Self::Gold,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Whether this is the wild/skull kind.
    pub const fn is_skull(self) -> bool {
        matches!(self, Self::Skull)
    }

    /// Recolor triggered on the whole board when a run of this kind scores.
    ///
    /// Returns `(from, to)`: every cell holding `from` fades out and comes
    /// back as `to`. Green turns skulls red, blue turns reds into skulls.
    pub const fn recolor_rule(self) -> Option<(GemType, GemType)> {
        match self {
            Self::Green => Some((Self::Skull, Self::Red)),
            Self::Blue => Some((Self::Red, Self::Skull)),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        use GemType::*;
        match self {
            Green => "green",
            Red => "red",
            Yellow => "yellow",
            Blue => "blue",
            Skull => "skull",
            Exp => "exp",
            Gold => "gold",
        }
    }

    /// Single character used in text dumps of a board.
    pub const fn symbol(self) -> char {
        use GemType::*;
        match self {
            Green => 'G',
            Red => 'R',
            Yellow => 'Y',
            Blue => 'B',
            Skull => 'S',
            Exp => 'E',
            Gold => '$',
        }
    }
}

impl fmt::Display for GemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
