//! Animated nodes and the tag-keyed registry that owns them.
//!
//! Nodes never hold references to each other: every edge is a [`NodeTag`] resolved
//! through the [`NodeRegistry`] for the duration of a single call.

use hashbrown::HashMap;
use log::trace;

use crate::drivers::AnimationConfig;
use crate::error::{AnimatedError, Result};
use crate::ids::{AnimationId, NodeTag, ViewTag};
use crate::value::PropMap;

pub mod config;
pub mod interpolation;
pub mod props;
pub mod style;
pub mod tracking;
pub mod value;

pub use config::{Extrapolate, InterpolationConfig, NodeConfig, TrackingConfig, TransformConfig};
pub use interpolation::InterpolationNode;
pub use props::PropsNode;
pub use style::{StyleNode, TransformNode};
pub use tracking::TrackingNode;
pub use value::{DiffClamp, ValueCallback, ValueListener, ValueNode, ValueOperator};

/// Color every node starts with; traversal never stamps it.
pub(crate) const INITIAL_BFS_COLOR: u32 = 0;

/// A vertex of the animated graph: identity, outgoing edges and traversal bookkeeping
/// around one of the closed set of node kinds.
#[derive(Debug)]
pub struct AnimatedNode {
    tag: NodeTag,
    children: Vec<NodeTag>,
    pub(crate) bfs_color: u32,
    pub(crate) active_incoming_nodes: usize,
    pub kind: NodeKind,
}

#[derive(Debug)]
pub enum NodeKind {
    Value(ValueNode),
    Style(StyleNode),
    Transform(TransformNode),
    Props(PropsNode),
    Tracking(TrackingNode),
}

/// Side effect requested by a node update, applied by the manager once the node is
/// back in the registry.
#[derive(Debug, PartialEq)]
pub(crate) enum NodeEffect {
    None,
    CommitProps {
        view: ViewTag,
        props: PropMap,
    },
    StartAnimation {
        id: AnimationId,
        node: NodeTag,
        config: AnimationConfig,
    },
}

impl NodeKind {
    /// Build a node from a decoded config. Some kinds snapshot existing nodes here.
    pub fn from_config(config: NodeConfig, nodes: &NodeRegistry) -> Result<Self> {
        let kind = match config {
            NodeConfig::Value { value, offset } => {
                NodeKind::Value(ValueNode::new(value, offset, ValueOperator::Plain))
            }
            NodeConfig::Style { style } => NodeKind::Style(StyleNode::new(style)),
            NodeConfig::Props { props } => NodeKind::Props(PropsNode::new(props)),
            NodeConfig::Transform { transforms } => {
                NodeKind::Transform(TransformNode::new(transforms))
            }
            NodeConfig::Interpolation(cfg) => NodeKind::Value(ValueNode::new(
                0.0,
                0.0,
                ValueOperator::Interpolation(InterpolationNode::new(cfg)?),
            )),
            NodeConfig::Addition { input } => operator(ValueOperator::Addition(input)),
            NodeConfig::Subtraction { input } => operator(ValueOperator::Subtraction(input)),
            NodeConfig::Multiplication { input } => {
                operator(ValueOperator::Multiplication(input))
            }
            NodeConfig::Division { input } => operator(ValueOperator::Division(input)),
            NodeConfig::Modulus { input, modulus } => {
                operator(ValueOperator::Modulus { input, modulus })
            }
            NodeConfig::DiffClamp { input, min, max } => {
                // Also rejects NaN bounds; `f64::clamp` panics on either.
                if !(min <= max) {
                    return Err(AnimatedError::invalid_config(format!(
                        "diffclamp min ({min}) must not exceed max ({max})"
                    )));
                }
                let initial = nodes.output_value(input)?;
                NodeKind::Value(ValueNode::new(
                    initial,
                    0.0,
                    ValueOperator::DiffClamp(DiffClamp {
                        input,
                        min,
                        max,
                        last_value: initial,
                    }),
                ))
            }
            NodeConfig::Tracking(cfg) => NodeKind::Tracking(TrackingNode::new(cfg)),
        };
        Ok(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Value(_) => "value",
            NodeKind::Style(_) => "style",
            NodeKind::Transform(_) => "transform",
            NodeKind::Props(_) => "props",
            NodeKind::Tracking(_) => "tracking",
        }
    }
}

fn operator(op: ValueOperator) -> NodeKind {
    NodeKind::Value(ValueNode::new(0.0, 0.0, op))
}

impl AnimatedNode {
    pub fn new(tag: NodeTag, kind: NodeKind) -> Self {
        Self {
            tag,
            children: Vec::new(),
            bfs_color: INITIAL_BFS_COLOR,
            active_incoming_nodes: 0,
            kind,
        }
    }

    pub fn tag(&self) -> NodeTag {
        self.tag
    }

    /// Outgoing edges in connection order.
    pub fn children(&self) -> &[NodeTag] {
        &self.children
    }

    pub fn as_value(&self) -> Option<&ValueNode> {
        match &self.kind {
            NodeKind::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_value_mut(&mut self) -> Option<&mut ValueNode> {
        match &mut self.kind {
            NodeKind::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_props(&self) -> Option<&PropsNode> {
        match &self.kind {
            NodeKind::Props(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_props_mut(&mut self) -> Option<&mut PropsNode> {
        match &mut self.kind {
            NodeKind::Props(p) => Some(p),
            _ => None,
        }
    }

    fn add_child(&mut self, child: NodeTag) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    fn remove_child(&mut self, child: NodeTag) {
        self.children.retain(|c| *c != child);
    }

    /// Called on the child before the edge `parent -> self` is added.
    fn on_attached_to_node(&mut self, parent: NodeTag, parent_is_value: bool) -> Result<()> {
        if let NodeKind::Value(ValueNode {
            operator: ValueOperator::Interpolation(interpolation),
            ..
        }) = &mut self.kind
        {
            interpolation.attach_parent(self.tag, parent, parent_is_value)?;
        }
        Ok(())
    }

    /// Called on the child before the edge `parent -> self` is removed.
    fn on_detached_from_node(&mut self, parent: NodeTag) -> Result<()> {
        if let NodeKind::Value(ValueNode {
            operator: ValueOperator::Interpolation(interpolation),
            ..
        }) = &mut self.kind
        {
            interpolation.detach_parent(self.tag, parent)?;
        }
        Ok(())
    }

    /// Recompute this node from its inputs. `nodes` must not contain `self`.
    pub(crate) fn update(&mut self, nodes: &NodeRegistry) -> Result<NodeEffect> {
        let tag = self.tag;
        match &mut self.kind {
            NodeKind::Value(value) => {
                value.update(tag, nodes)?;
                Ok(NodeEffect::None)
            }
            // Collected on demand by the props node that owns them.
            NodeKind::Style(_) | NodeKind::Transform(_) => Ok(NodeEffect::None),
            NodeKind::Props(props) => {
                if props.connected_view().is_none() {
                    trace!("props node {tag} has no view yet; skipping commit");
                    return Ok(NodeEffect::None);
                }
                let (view, props) = props.update_view(tag, nodes)?;
                Ok(NodeEffect::CommitProps { view, props })
            }
            NodeKind::Tracking(tracking) => tracking.update(nodes),
        }
    }
}

/// Owner of every live node, keyed by the caller-assigned tag.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<NodeTag, AnimatedNode>,
}

impl NodeRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, tag: NodeTag) -> bool {
        self.nodes.contains_key(&tag)
    }

    pub fn insert(&mut self, node: AnimatedNode) -> Result<()> {
        let tag = node.tag;
        if self.nodes.contains_key(&tag) {
            return Err(AnimatedError::DuplicateTag { tag });
        }
        self.nodes.insert(tag, node);
        Ok(())
    }

    pub fn remove(&mut self, tag: NodeTag) -> Option<AnimatedNode> {
        self.nodes.remove(&tag)
    }

    pub fn get(&self, tag: NodeTag) -> Result<&AnimatedNode> {
        self.nodes
            .get(&tag)
            .ok_or(AnimatedError::NodeNotFound { tag })
    }

    pub fn get_mut(&mut self, tag: NodeTag) -> Result<&mut AnimatedNode> {
        self.nodes
            .get_mut(&tag)
            .ok_or(AnimatedError::NodeNotFound { tag })
    }

    pub fn value_node(&self, tag: NodeTag) -> Result<&ValueNode> {
        self.get(tag)?
            .as_value()
            .ok_or(AnimatedError::WrongNodeType {
                tag,
                expected: "value",
            })
    }

    pub fn value_node_mut(&mut self, tag: NodeTag) -> Result<&mut ValueNode> {
        self.get_mut(tag)?
            .as_value_mut()
            .ok_or(AnimatedError::WrongNodeType {
                tag,
                expected: "value",
            })
    }

    pub fn props_node_mut(&mut self, tag: NodeTag) -> Result<&mut PropsNode> {
        self.get_mut(tag)?
            .as_props_mut()
            .ok_or(AnimatedError::WrongNodeType {
                tag,
                expected: "props",
            })
    }

    /// `value + offset` of a value node.
    pub fn output_value(&self, tag: NodeTag) -> Result<f64> {
        Ok(self.value_node(tag)?.output())
    }

    pub fn tags(&self) -> impl Iterator<Item = NodeTag> + '_ {
        self.nodes.keys().copied()
    }

    /// Add the edge `parent -> child`, running the child's attach hook first.
    ///
    /// Children form an ordered set: connecting an existing edge again is a no-op, so a
    /// single [`disconnect`](Self::disconnect) afterwards removes the edge entirely.
    pub fn connect(&mut self, parent: NodeTag, child: NodeTag) -> Result<()> {
        let parent_is_value = self.get(parent)?.as_value().is_some();
        self.get_mut(child)?
            .on_attached_to_node(parent, parent_is_value)?;
        self.get_mut(parent)?.add_child(child);
        Ok(())
    }

    /// Remove the edge `parent -> child`, running the child's detach hook first.
    pub fn disconnect(&mut self, parent: NodeTag, child: NodeTag) -> Result<()> {
        self.get(parent)?;
        self.get_mut(child)?.on_detached_from_node(parent)?;
        self.get_mut(parent)?.remove_child(child);
        Ok(())
    }

    /// Take `tag` out of the registry, hand it to `f` alongside the remaining nodes and
    /// put it back, whatever `f` returns.
    pub(crate) fn with_detached<R>(
        &mut self,
        tag: NodeTag,
        f: impl FnOnce(&mut AnimatedNode, &NodeRegistry) -> Result<R>,
    ) -> Result<R> {
        let mut node = self
            .nodes
            .remove(&tag)
            .ok_or(AnimatedError::NodeNotFound { tag })?;
        let result = f(&mut node, self);
        self.nodes.insert(tag, node);
        result
    }

    /// Zero every fan-in counter after an aborted pass.
    pub(crate) fn reset_traversal_state(&mut self) {
        for node in self.nodes.values_mut() {
            node.active_incoming_nodes = 0;
        }
    }
}
