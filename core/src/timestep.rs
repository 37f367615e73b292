use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Turns variable wall-clock time into a whole number of fixed update steps.
///
/// Leftover time carries over to the next call. When more than `max_steps`
/// steps are owed at once, the excess is dropped so a stalled caller does not
/// spin trying to catch up.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedTimestep {
    step: Duration,
    accumulated: Duration,
    max_steps: u32,
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(Self::DEFAULT_STEP)
    }
}

impl FixedTimestep {
    /// 60 updates per second.
    pub const DEFAULT_STEP: Duration = Duration::from_nanos(16_666_667);
    pub const DEFAULT_MAX_STEPS: u32 = 8;

    pub fn new(step: Duration) -> Self {
        let step = if step.is_zero() {
            Self::DEFAULT_STEP
        } else {
            step
        };
        Self {
            step,
            accumulated: Duration::ZERO,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }

    pub fn with_max_steps(self, max_steps: u32) -> Self {
        Self {
            max_steps: max_steps.max(1),
            ..self
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Fraction of a step accumulated but not yet simulated.
    pub fn alpha(&self) -> f32 {
        self.accumulated.as_secs_f32() / self.step.as_secs_f32()
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    /// Adds `elapsed` and returns how many steps to simulate now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated = self.accumulated.saturating_add(elapsed);

        let mut steps = 0;
        while self.accumulated >= self.step {
            self.accumulated -= self.step;
            steps += 1;
            if steps == self.max_steps {
                if self.accumulated >= self.step {
                    log::warn!(
                        "Dropping {:?} of simulation time after {} steps",
                        self.accumulated,
                        steps
                    );
                    self.accumulated = Duration::ZERO;
                }
                break;
            }
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_leftover_time() {
        let mut clock = FixedTimestep::new(Duration::from_millis(10));

        assert_eq!(clock.advance(Duration::from_millis(25)), 2);
        assert_eq!(clock.advance(Duration::from_millis(4)), 0);
        assert_eq!(clock.advance(Duration::from_millis(1)), 1);
        assert_eq!(clock.alpha(), 0.0);
    }

    #[test]
    fn caps_steps_and_drops_backlog() {
        let mut clock = FixedTimestep::new(Duration::from_millis(10)).with_max_steps(3);

        assert_eq!(clock.advance(Duration::from_secs(1)), 3);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn zero_step_falls_back_to_default() {
        let clock = FixedTimestep::new(Duration::ZERO);
        assert_eq!(clock.step(), FixedTimestep::DEFAULT_STEP);
    }
}
