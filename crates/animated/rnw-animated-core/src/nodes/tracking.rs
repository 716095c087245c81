use crate::drivers::AnimationConfig;
use crate::error::Result;
use crate::ids::{AnimationId, NodeTag};

use super::config::TrackingConfig;
use super::{NodeEffect, NodeRegistry};

/// Restarts an animation on `value` whenever the `to_value` node changes, retargeted at
/// its current output.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingNode {
    animation_id: AnimationId,
    to_value: NodeTag,
    value: NodeTag,
    animation_config: AnimationConfig,
}

impl TrackingNode {
    pub fn new(config: TrackingConfig) -> Self {
        Self {
            animation_id: config.animation_id,
            to_value: config.to_value,
            value: config.value,
            animation_config: config.animation_config,
        }
    }

    pub(crate) fn update(&self, nodes: &NodeRegistry) -> Result<NodeEffect> {
        let target = nodes.output_value(self.to_value)?;
        Ok(NodeEffect::StartAnimation {
            id: self.animation_id,
            node: self.value,
            config: self.animation_config.with_to_value(target),
        })
    }
}
