use indexmap::IndexMap;

use crate::error::{AnimatedError, Result};
use crate::ids::NodeTag;
use crate::value::{PropMap, PropValue};

use super::config::TransformConfig;
use super::{NodeKind, NodeRegistry};

/// Style property name to child node. Collected into the owning props patch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StyleNode {
    mapping: IndexMap<String, NodeTag>,
}

impl StyleNode {
    pub fn new(mapping: IndexMap<String, NodeTag>) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &IndexMap<String, NodeTag> {
        &self.mapping
    }

    /// Append this style's entries to `out`. Transform children write `"transform"`.
    pub fn collect(&self, tag: NodeTag, nodes: &NodeRegistry, out: &mut PropMap) -> Result<()> {
        for (key, child) in &self.mapping {
            match &nodes.get(*child)?.kind {
                NodeKind::Transform(transform) => transform.collect(nodes, out)?,
                NodeKind::Value(value) => {
                    out.insert(key.clone(), value.output().into());
                }
                _ => {
                    return Err(AnimatedError::UnsupportedChildNodeType {
                        parent: tag,
                        child: *child,
                    })
                }
            }
        }
        Ok(())
    }
}

/// Ordered transform components, each static or read from a value node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransformNode {
    transforms: Vec<TransformConfig>,
}

impl TransformNode {
    pub fn new(transforms: Vec<TransformConfig>) -> Self {
        Self { transforms }
    }

    pub fn collect(&self, nodes: &NodeRegistry, out: &mut PropMap) -> Result<()> {
        let list = self
            .transforms
            .iter()
            .map(|transform| {
                let (property, value) = match transform {
                    TransformConfig::Animated { property, node_tag } => {
                        (property, nodes.output_value(*node_tag)?)
                    }
                    TransformConfig::Static { property, value } => (property, *value),
                };
                let mut entry = PropMap::with_capacity(1);
                entry.insert(property.clone(), value.into());
                Ok(PropValue::Map(entry))
            })
            .collect::<Result<Vec<_>>>()?;
        out.insert("transform".to_string(), PropValue::List(list));
        Ok(())
    }
}
