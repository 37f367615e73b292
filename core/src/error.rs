use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Board shape does not match declared size")]
    InvalidBoardShape,
    #[error("Cells are not adjacent")]
    NotAdjacent,
    #[error("Board is still animating, no new moves are accepted")]
    BoardBusy,
    #[error("Board was cleared, restart before playing")]
    BoardInactive,
}

pub type Result<T> = core::result::Result<T, GameError>;
