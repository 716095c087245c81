//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AnimatedError, Result};

/// Sizing hints and integrator constants.
///
/// The defaults reproduce the behavior Animated.js expects from every platform host;
/// changing them is only useful for tests and tooling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial capacity of the node registry.
    pub node_capacity: usize,
    /// Initial capacity of the active animation list.
    pub animation_capacity: usize,
    /// Sample rate of the progress curve handed to frame-based animations.
    pub frames_per_second: f64,
    pub spring: SpringSolver,
    pub decay: DecaySolver,
}

/// Fixed-step RK4 parameters for spring animations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringSolver {
    /// Inner integration step in milliseconds.
    pub solver_timestep_ms: f64,
    /// Longest outer step simulated per frame; longer frame gaps are dropped.
    pub max_delta_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecaySolver {
    /// The first step is treated as if the animation started this long ago.
    pub first_frame_lead_ms: f64,
    /// Per-step displacement under which a decay is considered at rest.
    pub rest_delta: f64,
}

impl Config {
    /// Reject constants under which a driver would never advance or never settle.
    /// Comparisons are written to also reject NaN.
    pub fn validate(&self) -> Result<()> {
        if !(self.frames_per_second > 0.0 && self.frames_per_second.is_finite()) {
            return Err(AnimatedError::invalid_config(format!(
                "frames_per_second must be positive, got {}",
                self.frames_per_second
            )));
        }
        let spring = &self.spring;
        if !(spring.solver_timestep_ms > 0.0 && spring.solver_timestep_ms.is_finite()) {
            return Err(AnimatedError::invalid_config(format!(
                "spring.solver_timestep_ms must be positive, got {}",
                spring.solver_timestep_ms
            )));
        }
        if !(spring.max_delta_ms >= 0.0) {
            return Err(AnimatedError::invalid_config(format!(
                "spring.max_delta_ms must not be negative, got {}",
                spring.max_delta_ms
            )));
        }
        let decay = &self.decay;
        if !(decay.first_frame_lead_ms >= 0.0) {
            return Err(AnimatedError::invalid_config(format!(
                "decay.first_frame_lead_ms must not be negative, got {}",
                decay.first_frame_lead_ms
            )));
        }
        if !(decay.rest_delta > 0.0) {
            return Err(AnimatedError::invalid_config(format!(
                "decay.rest_delta must be positive, got {}",
                decay.rest_delta
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_capacity: 64,
            animation_capacity: 8,
            frames_per_second: 60.0,
            spring: SpringSolver::default(),
            decay: DecaySolver::default(),
        }
    }
}

impl Default for SpringSolver {
    fn default() -> Self {
        Self {
            solver_timestep_ms: 1.0,
            max_delta_ms: 64.0,
        }
    }
}

impl Default for DecaySolver {
    fn default() -> Self {
        Self {
            first_frame_lead_ms: 16.0,
            rest_delta: 0.1,
        }
    }
}
