use serde::{Deserialize, Serialize};

use crate::GemType;

/// Linear interpolation of a single value over a fixed duration in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
}

impl Tween {
    pub fn new(from: f32, to: f32, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// Normalized progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.progress()
    }

    pub fn target(&self) -> f32 {
        self.to
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
    }
}

/// Horizontal or vertical slide used while two gems trade places.
///
/// Offsets are in cells, `(rows, cols)`. A finished slide holds its end
/// position until the owner clears it.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    toward: (f32, f32),
    tween: Tween,
}

impl Slide {
    fn new(toward: (f32, f32), duration: f32) -> Self {
        Self {
            toward,
            tween: Tween::new(0.0, 1.0, duration),
        }
    }

    pub fn offset(&self) -> (f32, f32) {
        let p = self.tween.value();
        (self.toward.0 * p, self.toward.1 * p)
    }

    pub fn is_complete(&self) -> bool {
        self.tween.is_complete()
    }
}

/// What happened to a cell during one animation step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellStep {
    Idle,
    Animating,
    FadeFinished,
    Recolored(GemType),
}

/// One slot of the board: content plus the animation state a renderer reads.
///
/// Vertical offsets are expressed in cells; negative values are above the
/// resting position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    gem: Option<GemType>,
    pending_recolor: Option<GemType>,
    offset: f32,
    fall: Option<Tween>,
    opacity: f32,
    fade: Option<Tween>,
    slide: Option<Slide>,
    rotation: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            gem: None,
            pending_recolor: None,
            offset: 0.0,
            fall: None,
            opacity: 0.0,
            fade: None,
            slide: None,
            rotation: 0.0,
        }
    }
}

impl Cell {
    /// Settled cell showing `gem`.
    pub fn with_gem(gem: GemType) -> Self {
        Self {
            gem: Some(gem),
            opacity: 1.0,
            ..Default::default()
        }
    }

    pub fn gem(&self) -> Option<GemType> {
        self.gem
    }

    pub fn pending_recolor(&self) -> Option<GemType> {
        self.pending_recolor
    }

    /// Absent gem that has finished fading out: the cell awaits refill.
    pub fn is_empty(&self) -> bool {
        self.gem.is_none() && self.fade.is_none() && self.pending_recolor.is_none()
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn is_falling(&self) -> bool {
        self.fall.is_some()
    }

    pub fn is_sliding(&self) -> bool {
        self.slide.is_some_and(|slide| !slide.is_complete())
    }

    pub fn is_settled(&self) -> bool {
        !self.is_falling() && !self.is_fading() && !self.is_sliding()
    }

    /// Current vertical offset in cells.
    pub fn offset(&self) -> f32 {
        self.fall.map_or(self.offset, |fall| fall.value())
    }

    pub fn slide_offset(&self) -> (f32, f32) {
        self.slide.map_or((0.0, 0.0), |slide| slide.offset())
    }

    pub fn opacity(&self) -> f32 {
        self.fade.map_or(self.opacity, |fade| fade.value())
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn fall_progress(&self) -> f32 {
        self.fall.map_or(1.0, |fall| fall.progress())
    }

    pub fn fade_progress(&self) -> f32 {
        self.fade.map_or(1.0, |fade| fade.progress())
    }

    /// Advances every running animation by `dt` seconds.
    pub(crate) fn advance(&mut self, dt: f32) -> CellStep {
        let mut step = CellStep::Idle;

        if let Some(fall) = self.fall.as_mut() {
            fall.advance(dt);
            if fall.is_complete() {
                self.offset = fall.target();
                self.fall = None;
            } else {
                step = CellStep::Animating;
            }
        }

        if let Some(slide) = self.slide.as_mut() {
            if !slide.is_complete() {
                slide.tween.advance(dt);
                step = CellStep::Animating;
            }
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.advance(dt);
            if fade.is_complete() {
                self.fade = None;
                self.opacity = 0.0;
                step = match self.pending_recolor.take() {
                    Some(gem) => {
                        self.gem = Some(gem);
                        self.opacity = 1.0;
                        CellStep::Recolored(gem)
                    }
                    None => CellStep::FadeFinished,
                };
            } else if step == CellStep::Idle {
                step = CellStep::Animating;
            }
        }

        step
    }

    /// Exchanges content with `other`, leaving both animation states in place.
    pub(crate) fn swap_contents(&mut self, other: &mut Cell) {
        core::mem::swap(&mut self.gem, &mut other.gem);
        core::mem::swap(&mut self.pending_recolor, &mut other.pending_recolor);
    }

    pub(crate) fn set_gem(&mut self, gem: Option<GemType>) {
        self.gem = gem;
        self.opacity = if gem.is_some() { 1.0 } else { 0.0 };
    }

    /// Removes the gem and fades the cell out.
    pub(crate) fn start_removal(&mut self, duration: f32) {
        self.gem = None;
        self.start_fade(duration);
    }

    /// Fades the gem out and brings it back as `to` once the fade completes.
    pub(crate) fn queue_recolor(&mut self, to: GemType, duration: f32) {
        self.pending_recolor = Some(to);
        self.start_fade(duration);
    }

    fn start_fade(&mut self, duration: f32) {
        let from = self.opacity();
        self.fade = Some(Tween::new(from, 0.0, duration));
    }

    /// Places `gem` starting `rows_above` cells above its resting position.
    pub(crate) fn drop_in(&mut self, gem: GemType, rows_above: f32, duration: f32) {
        self.gem = Some(gem);
        self.pending_recolor = None;
        self.opacity = 1.0;
        self.fade = None;
        self.offset = 0.0;
        self.fall = if rows_above > 0.0 {
            Some(Tween::new(-rows_above, 0.0, duration))
        } else {
            None
        };
    }

    /// Drops the gem out of sight below the board while it fades out.
    pub(crate) fn start_exit(&mut self, rows_below: f32, duration: f32) {
        let from = self.offset();
        self.slide = None;
        self.pending_recolor = None;
        self.fall = Some(Tween::new(from, from + rows_below, duration));
        self.start_fade(duration);
    }

    pub(crate) fn start_slide(&mut self, toward: (f32, f32), duration: f32) {
        self.slide = Some(Slide::new(toward, duration));
    }

    pub(crate) fn clear_slide(&mut self) {
        self.slide = None;
    }

    pub(crate) fn slide_finished(&self) -> bool {
        self.slide.is_none_or(|slide| slide.is_complete())
    }

    pub(crate) fn spin(&mut self, degrees: f32) {
        self.rotation = (self.rotation + degrees) % 360.0;
    }

    pub(crate) fn reset_rotation(&mut self) {
        self.rotation = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        a - b < 1e-6 && b - a < 1e-6
    }

    #[test]
    fn removal_fades_to_empty() {
        let mut cell = Cell::with_gem(GemType::Gold);
        cell.start_removal(0.5);

        assert!(cell.is_fading());
        assert!(!cell.is_empty());
        assert_eq!(cell.advance(0.25), CellStep::Animating);
        assert!(close(cell.opacity(), 0.5));
        assert_eq!(cell.advance(0.25), CellStep::FadeFinished);
        assert!(cell.is_empty());
        assert_eq!(cell.opacity(), 0.0);
        assert!(cell.is_settled());
    }

    #[test]
    fn exit_falls_and_fades_together() {
        let mut cell = Cell::with_gem(GemType::Blue);
        cell.queue_recolor(GemType::Skull, 0.25);
        cell.start_exit(9.0, 1.5);

        cell.advance(0.75);
        assert!(close(cell.offset(), 4.5));
        assert!(close(cell.opacity(), 0.5));

        assert_eq!(cell.advance(0.75), CellStep::FadeFinished);
        assert!(close(cell.offset(), 9.0));
        assert_eq!(cell.opacity(), 0.0);
        assert_eq!(cell.gem(), Some(GemType::Blue));
        assert!(cell.is_settled());
    }

    #[test]
    fn recolor_applies_after_fade() {
        let mut cell = Cell::with_gem(GemType::Skull);
        cell.queue_recolor(GemType::Red, 0.2);

        assert_eq!(cell.gem(), Some(GemType::Skull));
        assert_eq!(cell.advance(0.1), CellStep::Animating);
        assert_eq!(cell.gem(), Some(GemType::Skull));
        assert_eq!(cell.advance(0.1), CellStep::Recolored(GemType::Red));
        assert_eq!(cell.gem(), Some(GemType::Red));
        assert_eq!(cell.opacity(), 1.0);
        assert_eq!(cell.pending_recolor(), None);
    }

    #[test]
    fn drop_in_lands_at_rest() {
        let mut cell = Cell::default();
        cell.drop_in(GemType::Blue, 2.0, 0.4);

        assert_eq!(cell.offset(), -2.0);
        assert!(!cell.is_settled());
        cell.advance(0.2);
        assert!(close(cell.offset(), -1.0));
        cell.advance(0.2);
        assert_eq!(cell.offset(), 0.0);
        assert!(cell.is_settled());
    }

    #[test]
    fn finished_slide_holds_until_cleared() {
        let mut cell = Cell::with_gem(GemType::Green);
        cell.start_slide((0.0, 1.0), 0.2);
        cell.advance(0.3);

        assert!(cell.is_settled());
        assert!(cell.slide_finished());
        assert_eq!(cell.slide_offset(), (0.0, 1.0));
        cell.clear_slide();
        assert_eq!(cell.slide_offset(), (0.0, 0.0));
    }

    #[test]
    fn swap_contents_keeps_animation_state() {
        let mut a = Cell::with_gem(GemType::Red);
        let mut b = Cell::with_gem(GemType::Yellow);
        a.start_slide((1.0, 0.0), 0.2);
        b.queue_recolor(GemType::Skull, 0.2);

        a.swap_contents(&mut b);

        assert_eq!(a.gem(), Some(GemType::Yellow));
        assert_eq!(a.pending_recolor(), Some(GemType::Skull));
        assert!(a.is_sliding());
        assert!(!a.is_fading());
        assert_eq!(b.gem(), Some(GemType::Red));
        assert!(b.is_fading());
    }
}
