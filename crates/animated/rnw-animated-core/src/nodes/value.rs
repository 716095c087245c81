//! Value nodes: plain values plus every operator whose output is a number.

use std::fmt;

use crate::error::{AnimatedError, Result};
use crate::ids::NodeTag;

use super::interpolation::InterpolationNode;
use super::NodeRegistry;

/// Single-subscriber change listener, called with `value + offset`.
pub type ValueListener = Box<dyn FnMut(f64) + Send>;

/// One-shot callback receiving the current output of a value node.
pub type ValueCallback = Box<dyn FnOnce(f64) + Send>;

/// A node with a numeric output.
///
/// Drivers and `setValue` write `value`; readers (operators, props, listeners) see
/// `value + offset`.
pub struct ValueNode {
    pub value: f64,
    pub offset: f64,
    listener: Option<ValueListener>,
    pub(crate) operator: ValueOperator,
}

/// How a value node derives its value from its inputs on `update`.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueOperator {
    /// Written directly by the bridge or a driver.
    Plain,
    Addition(Vec<NodeTag>),
    Subtraction(Vec<NodeTag>),
    Multiplication(Vec<NodeTag>),
    Division(Vec<NodeTag>),
    Modulus { input: NodeTag, modulus: f64 },
    DiffClamp(DiffClamp),
    Interpolation(InterpolationNode),
}

/// Integrates the deltas of its input and clamps the running total.
#[derive(Clone, Debug, PartialEq)]
pub struct DiffClamp {
    pub input: NodeTag,
    pub min: f64,
    pub max: f64,
    pub last_value: f64,
}

impl ValueNode {
    pub fn new(value: f64, offset: f64, operator: ValueOperator) -> Self {
        Self {
            value,
            offset,
            listener: None,
            operator,
        }
    }

    pub fn plain(value: f64) -> Self {
        Self::new(value, 0.0, ValueOperator::Plain)
    }

    /// Output seen by readers.
    #[inline]
    pub fn output(&self) -> f64 {
        self.value + self.offset
    }

    pub fn operator(&self) -> &ValueOperator {
        &self.operator
    }

    pub fn flatten_offset(&mut self) {
        self.value += self.offset;
        self.offset = 0.0;
    }

    pub fn extract_offset(&mut self) {
        self.offset += self.value;
        self.value = 0.0;
    }

    /// Replace (or clear) the listener slot.
    pub fn set_listener(&mut self, listener: Option<ValueListener>) {
        self.listener = listener;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    pub(crate) fn notify_listener(&mut self) {
        let output = self.output();
        if let Some(listener) = self.listener.as_mut() {
            listener(output);
        }
    }

    /// Recompute `value` from the inputs resolved through `nodes`.
    pub(crate) fn update(&mut self, tag: NodeTag, nodes: &NodeRegistry) -> Result<()> {
        match &mut self.operator {
            ValueOperator::Plain => {}
            ValueOperator::Addition(inputs) => {
                self.value = fold_inputs(nodes, inputs, 0.0, |acc, v| acc + v)?;
            }
            ValueOperator::Multiplication(inputs) => {
                self.value = fold_inputs(nodes, inputs, 1.0, |acc, v| acc * v)?;
            }
            ValueOperator::Subtraction(inputs) => {
                self.value = match inputs.split_first() {
                    Some((first, rest)) => {
                        let first = nodes.output_value(*first)?;
                        fold_inputs(nodes, rest, first, |acc, v| acc - v)?
                    }
                    None => 0.0,
                };
            }
            ValueOperator::Division(inputs) => {
                let Some((first, rest)) = inputs.split_first() else {
                    self.value = 0.0;
                    return Ok(());
                };
                let mut quotient = nodes.output_value(*first)?;
                for input in rest {
                    let divisor = nodes.output_value(*input)?;
                    if divisor == 0.0 {
                        return Err(AnimatedError::DivisionByZero { tag });
                    }
                    quotient /= divisor;
                }
                self.value = quotient;
            }
            ValueOperator::Modulus { input, modulus } => {
                if *modulus == 0.0 {
                    return Err(AnimatedError::DivisionByZero { tag });
                }
                let x = nodes.output_value(*input)?;
                self.value = ((x % *modulus) + *modulus) % *modulus;
            }
            ValueOperator::DiffClamp(clamp) => {
                let input = nodes.output_value(clamp.input)?;
                let diff = input - clamp.last_value;
                clamp.last_value = input;
                self.value = (self.value + diff).clamp(clamp.min, clamp.max);
            }
            ValueOperator::Interpolation(interpolation) => {
                self.value = interpolation.evaluate(tag, nodes)?;
            }
        }
        Ok(())
    }
}

fn fold_inputs(
    nodes: &NodeRegistry,
    inputs: &[NodeTag],
    init: f64,
    op: impl Fn(f64, f64) -> f64,
) -> Result<f64> {
    inputs
        .iter()
        .try_fold(init, |acc, tag| Ok(op(acc, nodes.output_value(*tag)?)))
}

impl fmt::Debug for ValueNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueNode")
            .field("value", &self.value)
            .field("offset", &self.offset)
            .field("has_listener", &self.listener.is_some())
            .field("operator", &self.operator)
            .finish()
    }
}
