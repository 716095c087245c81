//! Damped spring integrated with fixed-step RK4.
//!
//! Time inside the solver is in seconds; `tension` and `friction` are the Origami-style
//! coefficients Animated.js converts its spring configs to.

use serde::{Deserialize, Serialize};

use crate::config::SpringSolver;

use super::default_iterations;

fn default_rest_threshold() -> f64 {
    0.001
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpringConfig {
    pub friction: f64,
    pub tension: f64,
    pub to_value: f64,
    #[serde(default)]
    pub initial_velocity: f64,
    #[serde(default = "default_rest_threshold")]
    pub rest_speed_threshold: f64,
    #[serde(default = "default_rest_threshold")]
    pub rest_displacement_threshold: f64,
    #[serde(default)]
    pub overshoot_clamping: bool,
    #[serde(default = "default_iterations")]
    pub iterations: i64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
struct PhysicsState {
    position: f64,
    velocity: f64,
}

#[derive(Clone, Debug)]
pub struct SpringDriver {
    config: SpringConfig,
    solver: SpringSolver,
    state: PhysicsState,
    start_value: f64,
    end_value: f64,
    original_value: f64,
    last_time_ms: f64,
    time_accumulator_s: f64,
    started: bool,
}

impl SpringDriver {
    pub fn new(config: SpringConfig, solver: SpringSolver) -> Self {
        Self {
            end_value: config.to_value,
            config,
            solver,
            state: PhysicsState::default(),
            start_value: 0.0,
            original_value: 0.0,
            last_time_ms: 0.0,
            time_accumulator_s: 0.0,
            started: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.state.position
    }

    pub fn velocity(&self) -> f64 {
        self.state.velocity
    }

    /// Target the spring is currently pulling towards; pinned once at rest.
    pub fn end_value(&self) -> f64 {
        self.end_value
    }

    /// Returns `true` when the spring came to rest during this step.
    pub(crate) fn step(&mut self, now_ms: f64, value: &mut f64, first_loop: bool) -> bool {
        if !self.started {
            if first_loop {
                self.original_value = *value;
            }
            self.state.position = *value;
            self.start_value = *value;
            self.state.velocity = self.config.initial_velocity;
            self.last_time_ms = now_ms;
            self.time_accumulator_s = 0.0;
            self.started = true;
        }

        self.advance((now_ms - self.last_time_ms) / 1000.0);
        self.last_time_ms = now_ms;
        *value = self.state.position;
        self.is_at_rest()
    }

    /// Rewind to the original value and configured target for another loop.
    pub(crate) fn restart_loop(&mut self, value: &mut f64) {
        self.started = false;
        self.end_value = self.config.to_value;
        *value = self.original_value;
    }

    fn is_at_rest(&self) -> bool {
        self.state.velocity.abs() <= self.config.rest_speed_threshold
            && ((self.end_value - self.state.position).abs()
                <= self.config.rest_displacement_threshold
                || self.config.tension == 0.0)
    }

    fn is_overshooting(&self) -> bool {
        self.config.tension > 0.0
            && ((self.start_value < self.end_value && self.state.position > self.end_value)
                || (self.start_value > self.end_value && self.state.position < self.end_value))
    }

    fn advance(&mut self, delta_s: f64) {
        let max_delta_s = self.solver.max_delta_ms / 1000.0;
        let step = self.solver.solver_timestep_ms / 1000.0;
        self.time_accumulator_s += delta_s.clamp(0.0, max_delta_s);

        while self.time_accumulator_s >= step {
            self.time_accumulator_s -= step;
            self.state = self.rk4(self.state, step);
        }

        if self.is_at_rest() || (self.config.overshoot_clamping && self.is_overshooting()) {
            if self.config.tension > 0.0 {
                self.start_value = self.end_value;
                self.state.position = self.end_value;
            } else {
                self.end_value = self.state.position;
                self.start_value = self.end_value;
            }
            self.state.velocity = 0.0;
        }
    }

    fn acceleration(&self, position: f64, velocity: f64) -> f64 {
        self.config.tension * (self.end_value - position) - self.config.friction * velocity
    }

    fn rk4(&self, s: PhysicsState, dt: f64) -> PhysicsState {
        let a_v = s.velocity;
        let a_a = self.acceleration(s.position, s.velocity);

        let b_v = s.velocity + a_a * dt * 0.5;
        let b_a = self.acceleration(s.position + a_v * dt * 0.5, b_v);

        let c_v = s.velocity + b_a * dt * 0.5;
        let c_a = self.acceleration(s.position + b_v * dt * 0.5, c_v);

        let d_v = s.velocity + c_a * dt;
        let d_a = self.acceleration(s.position + c_v * dt, d_v);

        let dxdt = (a_v + 2.0 * (b_v + c_v) + d_v) / 6.0;
        let dvdt = (a_a + 2.0 * (b_a + c_a) + d_a) / 6.0;
        PhysicsState {
            position: s.position + dxdt * dt,
            velocity: s.velocity + dvdt * dt,
        }
    }
}
