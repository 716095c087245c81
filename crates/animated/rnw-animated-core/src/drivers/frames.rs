//! Frame-based animation: a precomputed progress curve sampled at a fixed rate.

use serde::{Deserialize, Serialize};

use crate::error::{AnimatedError, Result};
use crate::ids::AnimationId;

use super::default_iterations;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramesConfig {
    /// Progress samples in `[0, 1]` (overshoot allowed), one per frame.
    pub frames: Vec<f64>,
    pub to_value: f64,
    #[serde(default = "default_iterations")]
    pub iterations: i64,
}

#[derive(Clone, Debug)]
pub struct FramesDriver {
    frames: Vec<f64>,
    to_value: f64,
    from_value: f64,
    frames_per_second: f64,
    start_ms: Option<f64>,
}

impl FramesDriver {
    pub fn new(config: FramesConfig, frames_per_second: f64) -> Self {
        Self {
            frames: config.frames,
            to_value: config.to_value,
            from_value: 0.0,
            frames_per_second,
            start_ms: None,
        }
    }

    /// Returns `true` once the last sample has been written.
    pub(crate) fn step(
        &mut self,
        id: AnimationId,
        now_ms: f64,
        value: &mut f64,
        first_loop: bool,
    ) -> Result<bool> {
        let start_ms = match self.start_ms {
            Some(start) => start,
            None => {
                if first_loop {
                    self.from_value = *value;
                }
                self.start_ms = Some(now_ms);
                now_ms
            }
        };

        let index = ((now_ms - start_ms) * self.frames_per_second / 1000.0).floor();
        if index < 0.0 {
            return Err(AnimatedError::InvalidFrameTime { animation: id });
        }
        let index = index as usize;

        if index >= self.frames.len().saturating_sub(1) {
            *value = self.to_value;
            return Ok(true);
        }
        let progress = self.frames[index];
        *value = self.from_value + progress * (self.to_value - self.from_value);
        Ok(false)
    }

    /// The next step starts a new loop from `from_value`.
    pub(crate) fn restart_loop(&mut self) {
        self.start_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn driver(frames: &[f64], to_value: f64) -> FramesDriver {
        FramesDriver::new(
            FramesConfig {
                frames: frames.to_vec(),
                to_value,
                iterations: 1,
            },
            60.0,
        )
    }

    #[test]
    fn samples_curve_by_frame_index() {
        let mut d = driver(&[0.0, 0.5, 1.0], 100.0);
        let mut value = 0.0;
        let frame_ms = 1000.0 / 60.0;
        let id = AnimationId(1);

        assert!(!d.step(id, 1000.0, &mut value, true).unwrap());
        assert_relative_eq!(value, 0.0);
        assert!(!d.step(id, 1000.0 + frame_ms + 0.1, &mut value, true).unwrap());
        assert_relative_eq!(value, 50.0);
        assert!(d.step(id, 1000.0 + 2.0 * frame_ms + 0.1, &mut value, true).unwrap());
        assert_relative_eq!(value, 100.0);
    }

    #[test]
    fn blends_from_the_captured_start_value() {
        let mut d = driver(&[0.0, 0.25, 1.0], 20.0);
        let mut value = 10.0;
        d.step(AnimationId(1), 0.0, &mut value, true).unwrap();
        d.step(AnimationId(1), 17.0, &mut value, true).unwrap();
        assert_relative_eq!(value, 12.5);
    }

    #[test]
    fn negative_index_is_rejected() {
        let mut d = driver(&[0.0, 1.0], 1.0);
        let mut value = 0.0;
        d.step(AnimationId(4), 100.0, &mut value, true).unwrap();
        let err = d.step(AnimationId(4), 50.0, &mut value, true).unwrap_err();
        assert_eq!(err, AnimatedError::InvalidFrameTime { animation: AnimationId(4) });
    }

    #[test]
    fn empty_curve_jumps_to_target() {
        let mut d = driver(&[], 3.0);
        let mut value = 0.0;
        assert!(d.step(AnimationId(1), 0.0, &mut value, true).unwrap());
        assert_eq!(value, 3.0);
    }
}
