/// Converts variable frame time into a whole number of fixed physics steps.
pub struct FixedTimestep {
    /// Length of one physics step.
    dt: f32,
    /// Frame time not yet consumed by a step.
    accumulator: f32,
    max_steps: u32,
}

impl FixedTimestep {
    /// Default cap on steps per frame, so a long stall does not snowball.
    pub const MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: Self::MAX_STEPS,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Feed one frame's elapsed time. Returns how many steps to run now.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Fraction of a step left over, in [0, 1). Used to interpolate poses.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_frame_runs_one_step() {
        let mut ts = FixedTimestep::new(1.0 / 40.0);
        assert_eq!(ts.accumulate(1.0 / 40.0), 1);
    }

    #[test]
    fn short_frames_carry_over() {
        let mut ts = FixedTimestep::new(1.0 / 40.0);
        assert_eq!(ts.accumulate(0.015), 0);
        assert_eq!(ts.accumulate(0.015), 1);
        let a = ts.alpha();
        assert!(a > 0.15 && a < 0.25, "alpha was {}", a);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut ts = FixedTimestep::new(1.0 / 40.0);
        assert_eq!(ts.accumulate(5.0), FixedTimestep::MAX_STEPS);
        let mut ts = FixedTimestep::new(1.0 / 40.0).with_max_steps(3);
        assert_eq!(ts.accumulate(5.0), 3);
    }
}
