use winit::event::MouseScrollDelta;

/// Turns wheel events into whole scroll steps.
///
/// Each line notch is one step. Pixel deltas from touchpads arrive in
/// small pieces and are summed until they cover a full `step`; the
/// remainder carries over to the next event.
#[derive(Debug, Clone, Copy)]
pub struct WheelScroll {
    step: f32,
    /// Downward distance not yet turned into a step. Negative is upward.
    pending: f32,
}

impl WheelScroll {
    pub fn new(step: f32) -> Self {
        Self { step, pending: 0.0 }
    }

    /// Steps to scroll for one event: positive scrolls down, negative up.
    pub fn steps(&mut self, delta: MouseScrollDelta) -> i32 {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => {
                self.pending = 0.0;
                if y < 0.0 {
                    1
                } else if y > 0.0 {
                    -1
                } else {
                    0
                }
            }
            MouseScrollDelta::PixelDelta(pos) => {
                if self.step <= 0.0 {
                    return 0;
                }
                self.pending -= pos.y as f32;
                let steps = (self.pending / self.step).trunc();
                self.pending -= steps * self.step;
                steps as i32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    fn pixels(dy: f64) -> MouseScrollDelta {
        MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, dy))
    }

    #[test]
    fn test_line_delta_is_one_step() {
        let mut wheel = WheelScroll::new(100.0);
        assert_eq!(wheel.steps(MouseScrollDelta::LineDelta(0.0, -1.0)), 1);
        assert_eq!(wheel.steps(MouseScrollDelta::LineDelta(0.0, 3.0)), -1);
        assert_eq!(wheel.steps(MouseScrollDelta::LineDelta(0.0, 0.0)), 0);
    }

    #[test]
    fn test_small_pixel_deltas_accumulate() {
        let mut wheel = WheelScroll::new(100.0);
        assert_eq!(wheel.steps(pixels(-30.0)), 0);
        assert_eq!(wheel.steps(pixels(-30.0)), 0);
        assert_eq!(wheel.steps(pixels(-30.0)), 0);
        assert_eq!(wheel.steps(pixels(-30.0)), 1);
        // 20 left over, so 80 more completes the next step.
        assert_eq!(wheel.steps(pixels(-80.0)), 1);
    }

    #[test]
    fn test_reversal_cancels_pending_distance() {
        let mut wheel = WheelScroll::new(100.0);
        assert_eq!(wheel.steps(pixels(-60.0)), 0);
        assert_eq!(wheel.steps(pixels(60.0)), 0);
        assert_eq!(wheel.steps(pixels(150.0)), -1);
    }

    #[test]
    fn test_large_pixel_delta_gives_several_steps() {
        let mut wheel = WheelScroll::new(100.0);
        assert_eq!(wheel.steps(pixels(-350.0)), 3);
    }
}
