//! Piecewise-linear mapping of a single parent value.

use crate::error::{AnimatedError, Result};
use crate::ids::NodeTag;

use super::config::{Extrapolate, InterpolationConfig};
use super::NodeRegistry;

#[derive(Clone, Debug, PartialEq)]
pub struct InterpolationNode {
    input_range: Vec<f64>,
    output_range: Vec<f64>,
    extrapolate_left: Extrapolate,
    extrapolate_right: Extrapolate,
    parent: Option<NodeTag>,
}

impl InterpolationNode {
    pub fn new(config: InterpolationConfig) -> Result<Self> {
        let InterpolationConfig {
            input_range,
            output_range,
            extrapolate_left,
            extrapolate_right,
        } = config;
        if input_range.len() < 2 || input_range.len() != output_range.len() {
            return Err(AnimatedError::invalid_config(format!(
                "interpolation ranges must have the same length (at least 2), got {} and {}",
                input_range.len(),
                output_range.len()
            )));
        }
        if !input_range.windows(2).all(|w| w[0] <= w[1]) {
            return Err(AnimatedError::invalid_config(
                "interpolation inputRange must be non-decreasing",
            ));
        }
        Ok(Self {
            input_range,
            output_range,
            extrapolate_left,
            extrapolate_right,
            parent: None,
        })
    }

    pub fn parent(&self) -> Option<NodeTag> {
        self.parent
    }

    pub(crate) fn attach_parent(
        &mut self,
        tag: NodeTag,
        parent: NodeTag,
        parent_is_value: bool,
    ) -> Result<()> {
        if self.parent.is_some() {
            return Err(AnimatedError::AlreadyAttached { tag });
        }
        if !parent_is_value {
            return Err(AnimatedError::WrongNodeType {
                tag: parent,
                expected: "value",
            });
        }
        self.parent = Some(parent);
        Ok(())
    }

    pub(crate) fn detach_parent(&mut self, tag: NodeTag, parent: NodeTag) -> Result<()> {
        if self.parent != Some(parent) {
            return Err(AnimatedError::NotAttached { tag });
        }
        self.parent = None;
        Ok(())
    }

    pub(crate) fn evaluate(&self, tag: NodeTag, nodes: &NodeRegistry) -> Result<f64> {
        let parent = self.parent.ok_or(AnimatedError::NotAttached { tag })?;
        Ok(self.map(nodes.output_value(parent)?))
    }

    /// Map `value` through the segment containing it.
    pub fn map(&self, value: f64) -> f64 {
        let last_segment = self.input_range.len() - 2;
        let index = self
            .input_range
            .iter()
            .rposition(|&x| x <= value)
            .unwrap_or(0)
            .min(last_segment);
        interpolate(
            value,
            (self.input_range[index], self.input_range[index + 1]),
            (self.output_range[index], self.output_range[index + 1]),
            self.extrapolate_left,
            self.extrapolate_right,
        )
    }
}

fn interpolate(
    value: f64,
    (input_min, input_max): (f64, f64),
    (output_min, output_max): (f64, f64),
    left: Extrapolate,
    right: Extrapolate,
) -> f64 {
    let mut result = value;
    if result < input_min {
        match left {
            Extrapolate::Identity => return result,
            Extrapolate::Clamp => result = input_min,
            Extrapolate::Extend => {}
        }
    }
    if result > input_max {
        match right {
            Extrapolate::Identity => return result,
            Extrapolate::Clamp => result = input_max,
            Extrapolate::Extend => {}
        }
    }

    if output_min == output_max {
        return output_min;
    }
    if input_min == input_max {
        return if value <= input_min {
            output_min
        } else {
            output_max
        };
    }
    output_min + (output_max - output_min) * (result - input_min) / (input_max - input_min)
}
