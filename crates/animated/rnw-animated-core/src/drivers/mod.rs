//! Animation drivers: per-frame integrators that write a value node's raw `value`.
//!
//! Every driver shares the loop bookkeeping in [`AnimationDriver`]; the integrator
//! itself only reports when one loop is complete.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::error::{AnimatedError, Result};
use crate::ids::{AnimationId, NodeTag};

pub mod decay;
pub mod frames;
pub mod spring;

pub use decay::{DecayConfig, DecayDriver};
pub use frames::{FramesConfig, FramesDriver};
pub use spring::{SpringConfig, SpringDriver};

/// Every `type` discriminator accepted by `startAnimatingNode`.
pub const ANIMATION_TYPES: &[&str] = &["frames", "spring", "decay"];

/// Iteration count meaning "loop until stopped".
pub const INFINITE_ITERATIONS: i64 = -1;

pub(crate) fn default_iterations() -> i64 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnimationConfig {
    Frames(FramesConfig),
    Spring(SpringConfig),
    Decay(DecayConfig),
}

impl AnimationConfig {
    pub fn from_json(config: &JsonValue) -> Result<Self> {
        let type_name = config
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| AnimatedError::invalid_config("animation config is missing 'type'"))?;
        if !ANIMATION_TYPES.contains(&type_name) {
            return Err(AnimatedError::UnknownAnimationType {
                type_name: type_name.to_string(),
            });
        }
        Ok(serde_json::from_value(config.clone())?)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            AnimationConfig::Frames(_) => "frames",
            AnimationConfig::Spring(_) => "spring",
            AnimationConfig::Decay(_) => "decay",
        }
    }

    pub fn iterations(&self) -> i64 {
        match self {
            AnimationConfig::Frames(c) => c.iterations,
            AnimationConfig::Spring(c) => c.iterations,
            AnimationConfig::Decay(c) => c.iterations,
        }
    }

    /// Same animation retargeted at `to_value`. Decay has no target and is unchanged.
    pub fn with_to_value(&self, to_value: f64) -> Self {
        let mut config = self.clone();
        match &mut config {
            AnimationConfig::Frames(c) => c.to_value = to_value,
            AnimationConfig::Spring(c) => c.to_value = to_value,
            AnimationConfig::Decay(_) => {}
        }
        config
    }
}

/// Outcome handed to an animation's end callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndResult {
    /// `true` when the animation ran to completion, `false` when it was stopped.
    pub finished: bool,
}

pub type EndCallback = Box<dyn FnOnce(EndResult) + Send>;

enum DriverState {
    Frames(FramesDriver),
    Spring(SpringDriver),
    Decay(DecayDriver),
}

/// An active animation bound to one value node.
pub struct AnimationDriver {
    id: AnimationId,
    node: NodeTag,
    end_callback: Option<EndCallback>,
    state: DriverState,
    iterations: i64,
    current_loop: i64,
    finished: bool,
}

impl AnimationDriver {
    pub fn new(
        id: AnimationId,
        node: NodeTag,
        config: AnimationConfig,
        end_callback: Option<EndCallback>,
        solver: &Config,
    ) -> Result<Self> {
        let iterations = config.iterations();
        if iterations < INFINITE_ITERATIONS {
            return Err(AnimatedError::invalid_config(format!(
                "iterations must be -1 or non-negative, got {iterations}"
            )));
        }
        let state = match config {
            AnimationConfig::Frames(c) => {
                DriverState::Frames(FramesDriver::new(c, solver.frames_per_second))
            }
            AnimationConfig::Spring(c) => DriverState::Spring(SpringDriver::new(c, solver.spring)),
            AnimationConfig::Decay(c) => DriverState::Decay(DecayDriver::new(c, solver.decay)?),
        };
        Ok(Self {
            id,
            node,
            end_callback,
            state,
            iterations,
            current_loop: 1,
            finished: iterations == 0,
        })
    }

    pub fn id(&self) -> AnimationId {
        self.id
    }

    /// Tag of the value node this driver writes.
    pub fn node(&self) -> NodeTag {
        self.node
    }

    pub fn kind(&self) -> &'static str {
        match self.state {
            DriverState::Frames(_) => "frames",
            DriverState::Spring(_) => "spring",
            DriverState::Decay(_) => "decay",
        }
    }

    /// Monotone: once true it never resets.
    pub fn has_finished(&self) -> bool {
        self.finished
    }

    /// Advance to `frame_time`, writing the target node's raw value.
    pub fn run_animation_step(&mut self, frame_time: Duration, value: &mut f64) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let now_ms = frame_time.as_secs_f64() * 1000.0;
        let first_loop = self.current_loop == 1;
        let loop_done = match &mut self.state {
            DriverState::Frames(d) => d.step(self.id, now_ms, value, first_loop)?,
            DriverState::Spring(d) => d.step(now_ms, value, first_loop),
            DriverState::Decay(d) => d.step(now_ms, value, first_loop),
        };
        if loop_done {
            if self.iterations == INFINITE_ITERATIONS || self.current_loop < self.iterations {
                self.current_loop += 1;
                match &mut self.state {
                    DriverState::Frames(d) => d.restart_loop(),
                    DriverState::Spring(d) => d.restart_loop(value),
                    DriverState::Decay(d) => d.restart_loop(),
                }
            } else {
                self.finished = true;
            }
        }
        Ok(())
    }

    /// Take over `previous`'s end callback unless this driver already has one.
    pub(crate) fn inherit_end_callback(&mut self, previous: &mut AnimationDriver) {
        if self.end_callback.is_none() {
            self.end_callback = previous.end_callback.take();
        }
    }

    /// Fire the end callback, at most once.
    pub fn end(&mut self, finished: bool) {
        if let Some(callback) = self.end_callback.take() {
            callback(EndResult { finished });
        }
    }
}

impl fmt::Debug for AnimationDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationDriver")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("kind", &self.kind())
            .field("current_loop", &self.current_loop)
            .field("iterations", &self.iterations)
            .field("finished", &self.finished)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn decodes_types_and_rejects_unknown() {
        let frames =
            AnimationConfig::from_json(&json!({ "type": "frames", "frames": [0, 1], "toValue": 5 }))
                .unwrap();
        assert_eq!(frames.type_name(), "frames");
        assert_eq!(frames.iterations(), 1);

        let spring = AnimationConfig::from_json(
            &json!({ "type": "spring", "friction": 7, "tension": 40, "toValue": 1, "iterations": -1 }),
        )
        .unwrap();
        assert_eq!(spring.iterations(), INFINITE_ITERATIONS);

        let err = AnimationConfig::from_json(&json!({ "type": "bezier" })).unwrap_err();
        assert_eq!(
            err,
            AnimatedError::UnknownAnimationType {
                type_name: "bezier".into()
            }
        );
        let err = AnimationConfig::from_json(&json!({ "type": "decay" })).unwrap_err();
        assert!(matches!(err, AnimatedError::InvalidConfig { .. }));
    }

    #[test]
    fn with_to_value_retargets() {
        let frames =
            AnimationConfig::from_json(&json!({ "type": "frames", "frames": [0, 1], "toValue": 5 }))
                .unwrap();
        let AnimationConfig::Frames(c) = frames.with_to_value(9.0) else {
            panic!("expected frames");
        };
        assert_eq!(c.to_value, 9.0);
    }

    #[test]
    fn zero_iterations_finish_immediately() {
        let config = AnimationConfig::from_json(
            &json!({ "type": "frames", "frames": [0, 1], "toValue": 5, "iterations": 0 }),
        )
        .unwrap();
        let mut driver =
            AnimationDriver::new(AnimationId(1), NodeTag(1), config, None, &Config::default())
                .unwrap();
        assert!(driver.has_finished());
        let mut value = 0.0;
        driver.run_animation_step(ms(16), &mut value).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn frames_loop_the_requested_number_of_times() {
        let config = AnimationConfig::from_json(
            &json!({ "type": "frames", "frames": [0, 1], "toValue": 10, "iterations": 2 }),
        )
        .unwrap();
        let mut driver =
            AnimationDriver::new(AnimationId(1), NodeTag(1), config, None, &Config::default())
                .unwrap();
        let mut value = 0.0;
        let mut t = 0;
        let mut steps = 0;
        while !driver.has_finished() {
            driver.run_animation_step(ms(t), &mut value).unwrap();
            t += 20;
            steps += 1;
            assert!(steps < 10, "driver never finished");
        }
        // Two steps per loop: index 0 then index >= last.
        assert_eq!(steps, 4);
        assert_eq!(value, 10.0);
    }

    #[test]
    fn end_callback_fires_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = AnimationConfig::from_json(
            &json!({ "type": "frames", "frames": [0, 1], "toValue": 1 }),
        )
        .unwrap();
        let mut driver = AnimationDriver::new(
            AnimationId(3),
            NodeTag(1),
            config,
            Some(Box::new(move |r: EndResult| sink.lock().unwrap().push(r.finished))),
            &Config::default(),
        )
        .unwrap();
        driver.end(false);
        driver.end(true);
        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }
}
