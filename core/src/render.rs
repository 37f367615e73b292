use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Distance between two cell origins in pixels: a 71px block plus a 3px gap.
pub const DEFAULT_CELL_PITCH: f32 = 74.0;

/// What a renderer needs to draw one cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub gem: Option<GemType>,
    /// Offset from the resting position in cells, `(rows, cols)`.
    pub offset: (f32, f32),
    pub opacity: f32,
    /// Degrees.
    pub rotation: f32,
}

impl CellView {
    pub fn of(cell: &Cell) -> Self {
        let (slide_rows, slide_cols) = cell.slide_offset();
        Self {
            gem: cell.gem(),
            offset: (cell.offset() + slide_rows, slide_cols),
            opacity: cell.opacity(),
            rotation: cell.rotation(),
        }
    }

    pub fn pixel_offset(&self, pitch: f32) -> (f32, f32) {
        (self.offset.0 * pitch, self.offset.1 * pitch)
    }
}

/// Highlight drawn over the selected cells. After a kept swap it stays on
/// the pair, growing and fading out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selector {
    cells: [Option<Coord2>; 2],
    fade: Option<f32>,
    opacity: f32,
}

impl Selector {
    pub fn cells(&self) -> [Option<Coord2>; 2] {
        self.cells
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Drawn size relative to a cell.
    pub fn scale(&self, timings: &Timings) -> f32 {
        match self.fade {
            Some(elapsed) if timings.selector_fade > 0.0 => {
                1.0 + 0.5 * (elapsed / timings.selector_fade).min(1.0)
            }
            _ => 1.0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn start_fade(&mut self, mv: &Move) {
        self.cells = [Some(mv.a), Some(mv.b)];
        self.fade = Some(0.0);
        self.opacity = 1.0;
    }

    /// Follows the resolver selection, runs the fade, and spins the gems
    /// under the selector while the others rest upright.
    pub(crate) fn update(
        &mut self,
        dt: f32,
        resolver: &MoveResolver,
        board: &mut Board,
        timings: &Timings,
    ) {
        let selection = resolver.selection();
        if selection[0].is_some() {
            self.cells = selection;
            self.fade = None;
            self.opacity = 1.0;
        } else if let Some(elapsed) = self.fade {
            let elapsed = elapsed + dt;
            if elapsed >= timings.selector_fade {
                self.clear();
            } else {
                self.fade = Some(elapsed);
                self.opacity = 1.0 - elapsed / timings.selector_fade;
            }
        } else {
            self.clear();
        }

        for position in board.all_positions() {
            let cell = board.get_mut(position);
            if self.cells.contains(&Some(position)) {
                cell.spin(timings.selector_spin * dt);
            } else if cell.rotation() != 0.0 {
                cell.reset_rotation();
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelectorView {
    pub cells: [Option<Coord2>; 2],
    pub opacity: f32,
    pub scale: f32,
}

/// Snapshot of everything drawable, cells in row-major order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub size: Coord2,
    pub cells: Vec<CellView>,
    pub selector: SelectorView,
    pub hovered: Option<Coord2>,
    /// Opacity of the "no moves" message.
    pub no_moves_message: f32,
    pub phase: BoardPhase,
}

impl RenderState {
    pub fn cell(&self, (row, col): Coord2) -> Option<&CellView> {
        let (rows, cols) = self.size;
        if row >= rows || col >= cols {
            return None;
        }
        self.cells
            .get(usize::from(row) * usize::from(cols) + usize::from(col))
    }

    /// Top-left pixel of a cell's resting position.
    pub fn cell_origin(&self, (row, col): Coord2, pitch: f32) -> (f32, f32) {
        (f32::from(col) * pitch, f32::from(row) * pitch)
    }
}
