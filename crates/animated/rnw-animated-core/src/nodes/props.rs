use indexmap::{IndexMap, IndexSet};

use crate::error::{AnimatedError, Result};
use crate::ids::{NodeTag, ViewTag};
use crate::value::{PropMap, PropValue};

use super::{NodeKind, NodeRegistry};

/// Builds the property patch for at most one bound native view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropsNode {
    mapping: IndexMap<String, NodeTag>,
    view: Option<ViewTag>,
    committed_keys: IndexSet<String>,
}

impl PropsNode {
    pub fn new(mapping: IndexMap<String, NodeTag>) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    pub fn connected_view(&self) -> Option<ViewTag> {
        self.view
    }

    /// Keys this node has ever committed, in first-commit order.
    pub fn committed_keys(&self) -> impl Iterator<Item = &str> {
        self.committed_keys.iter().map(String::as_str)
    }

    pub(crate) fn connect_to_view(&mut self, tag: NodeTag, view: ViewTag) -> Result<()> {
        if let Some(current) = self.view {
            return Err(AnimatedError::AlreadyConnected { tag, view: current });
        }
        self.view = Some(view);
        Ok(())
    }

    pub(crate) fn disconnect_from_view(&mut self, tag: NodeTag, view: ViewTag) -> Result<()> {
        if self.view != Some(view) {
            return Err(AnimatedError::NotConnected {
                tag,
                requested: Some(view),
            });
        }
        self.view = None;
        Ok(())
    }

    /// Assemble the full patch for the bound view.
    pub fn update_view(&mut self, tag: NodeTag, nodes: &NodeRegistry) -> Result<(ViewTag, PropMap)> {
        let view = self.view.ok_or(AnimatedError::NotConnected {
            tag,
            requested: None,
        })?;
        let mut props = PropMap::with_capacity(self.mapping.len());
        for (key, child) in &self.mapping {
            match &nodes.get(*child)?.kind {
                NodeKind::Style(style) => style.collect(*child, nodes, &mut props)?,
                NodeKind::Value(value) => {
                    props.insert(key.clone(), value.output().into());
                }
                _ => {
                    return Err(AnimatedError::UnsupportedChildNodeType {
                        parent: tag,
                        child: *child,
                    })
                }
            }
        }
        self.committed_keys.extend(props.keys().cloned());
        Ok((view, props))
    }

    /// A patch resetting every previously committed key, if a view is bound.
    pub(crate) fn restore_default_values(&self) -> Option<(ViewTag, PropMap)> {
        let view = self.view?;
        let props = self
            .committed_keys
            .iter()
            .map(|key| (key.clone(), PropValue::Null))
            .collect();
        Some((view, props))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{AnimatedNode, StyleNode, ValueNode};

    fn registry() -> NodeRegistry {
        let mut nodes = NodeRegistry::default();
        nodes
            .insert(AnimatedNode::new(NodeTag(1), NodeKind::Value(ValueNode::plain(0.5))))
            .unwrap();
        nodes
            .insert(AnimatedNode::new(NodeTag(2), NodeKind::Value(ValueNode::plain(8.0))))
            .unwrap();
        nodes
            .insert(AnimatedNode::new(
                NodeTag(3),
                NodeKind::Style(StyleNode::new(IndexMap::from([(
                    "opacity".to_string(),
                    NodeTag(1),
                )]))),
            ))
            .unwrap();
        nodes
    }

    #[test]
    fn view_binding_is_exclusive() {
        let me = NodeTag(4);
        let mut props = PropsNode::default();
        props.connect_to_view(me, ViewTag(7)).unwrap();
        assert_eq!(
            props.connect_to_view(me, ViewTag(8)).unwrap_err(),
            AnimatedError::AlreadyConnected {
                tag: me,
                view: ViewTag(7)
            }
        );
        assert_eq!(
            props.disconnect_from_view(me, ViewTag(8)).unwrap_err(),
            AnimatedError::NotConnected {
                tag: me,
                requested: Some(ViewTag(8))
            }
        );
        props.disconnect_from_view(me, ViewTag(7)).unwrap();
        assert_eq!(props.connected_view(), None);
    }

    #[test]
    fn update_view_flattens_style_and_records_keys() {
        let nodes = registry();
        let me = NodeTag(4);
        let mut props = PropsNode::new(IndexMap::from([
            ("style".to_string(), NodeTag(3)),
            ("width".to_string(), NodeTag(2)),
        ]));

        assert_eq!(
            props.update_view(me, &nodes).unwrap_err(),
            AnimatedError::NotConnected {
                tag: me,
                requested: None
            }
        );

        props.connect_to_view(me, ViewTag(7)).unwrap();
        let (view, patch) = props.update_view(me, &nodes).unwrap();
        assert_eq!(view, ViewTag(7));
        assert_eq!(patch.get("opacity"), Some(&PropValue::Number(0.5)));
        assert_eq!(patch.get("width"), Some(&PropValue::Number(8.0)));
        assert!(!patch.contains_key("style"));

        let (_, reset) = props.restore_default_values().unwrap();
        assert_eq!(reset.keys().collect::<Vec<_>>(), ["opacity", "width"]);
        assert!(reset.values().all(PropValue::is_null));
    }
}
