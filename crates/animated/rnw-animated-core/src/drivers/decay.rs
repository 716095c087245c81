//! Exponential velocity decay, as used by scroll flings.

use serde::{Deserialize, Serialize};

use crate::config::DecaySolver;
use crate::error::{AnimatedError, Result};

use super::default_iterations;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayConfig {
    /// Initial velocity in units per millisecond.
    pub velocity: f64,
    /// Per-millisecond retention factor, strictly below 1.
    pub deceleration: f64,
    #[serde(default = "default_iterations")]
    pub iterations: i64,
}

#[derive(Clone, Debug)]
pub struct DecayDriver {
    velocity: f64,
    deceleration: f64,
    solver: DecaySolver,
    start_ms: Option<f64>,
    from_value: f64,
    last_value: f64,
}

impl DecayDriver {
    pub fn new(config: DecayConfig, solver: DecaySolver) -> Result<Self> {
        if !(config.deceleration < 1.0) {
            return Err(AnimatedError::invalid_config(format!(
                "decay deceleration must be below 1, got {}",
                config.deceleration
            )));
        }
        Ok(Self {
            velocity: config.velocity,
            deceleration: config.deceleration,
            solver,
            start_ms: None,
            from_value: 0.0,
            last_value: 0.0,
        })
    }

    /// Returns `true` once the per-step displacement falls under the rest delta.
    pub(crate) fn step(&mut self, now_ms: f64, value: &mut f64, first_loop: bool) -> bool {
        let start_ms = match self.start_ms {
            Some(start) => start,
            None => {
                let start = now_ms - self.solver.first_frame_lead_ms;
                self.start_ms = Some(start);
                if first_loop {
                    self.from_value = *value;
                } else {
                    *value = self.from_value;
                }
                self.last_value = *value;
                start
            }
        };

        let k = 1.0 - self.deceleration;
        let next = self.from_value + self.velocity / k * (1.0 - (-k * (now_ms - start_ms)).exp());
        if (self.last_value - next).abs() < self.solver.rest_delta {
            return true;
        }
        self.last_value = next;
        *value = next;
        false
    }

    pub(crate) fn restart_loop(&mut self) {
        self.start_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn driver(velocity: f64, deceleration: f64) -> DecayDriver {
        DecayDriver::new(
            DecayConfig {
                velocity,
                deceleration,
                iterations: 1,
            },
            DecaySolver::default(),
        )
        .unwrap()
    }

    #[test]
    fn first_step_uses_one_frame_lead() {
        let mut d = driver(2.0, 0.998);
        let mut value = 100.0;
        assert!(!d.step(1_000.0, &mut value, true));
        let k: f64 = 0.002;
        assert_relative_eq!(value, 100.0 + 2.0 / k * (1.0 - (-k * 16.0).exp()), epsilon = 1e-9);
    }

    #[test]
    fn comes_to_rest_and_stays_bounded() {
        let mut d = driver(1.0, 0.99);
        let mut value = 0.0;
        let mut t = 0.0;
        let mut finished = false;
        for _ in 0..10_000 {
            if d.step(t, &mut value, true) {
                finished = true;
                break;
            }
            t += 16.0;
        }
        assert!(finished);
        // Asymptote is v / (1 - d) = 100.
        assert!(value < 100.0 && value > 90.0, "value {value}");
    }

    #[test]
    fn rejects_deceleration_of_one_or_more() {
        for deceleration in [1.0, 1.5, f64::NAN] {
            let err = DecayDriver::new(
                DecayConfig {
                    velocity: 1.0,
                    deceleration,
                    iterations: 1,
                },
                DecaySolver::default(),
            )
            .unwrap_err();
            assert!(matches!(err, AnimatedError::InvalidConfig { .. }));
        }
    }
}
