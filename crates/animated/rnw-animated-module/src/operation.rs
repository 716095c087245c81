use std::fmt;

use rnw_animated_core::{
    AnimationId, EndCallback, EventMapping, NativeAnimatedNodesManager, NodeTag, ValueCallback,
    ValueListener, ViewTag, ViewUpdater,
};
use serde_json::Value as JsonValue;

/// One bridge call, captured on the bridge thread and applied later on the UI thread.
pub enum AnimatedOperation {
    CreateAnimatedNode {
        tag: NodeTag,
        config: JsonValue,
    },
    DropAnimatedNode {
        tag: NodeTag,
    },
    SetAnimatedNodeValue {
        tag: NodeTag,
        value: f64,
    },
    SetAnimatedNodeOffset {
        tag: NodeTag,
        offset: f64,
    },
    FlattenAnimatedNodeOffset {
        tag: NodeTag,
    },
    ExtractAnimatedNodeOffset {
        tag: NodeTag,
    },
    GetValue {
        tag: NodeTag,
        callback: ValueCallback,
    },
    StartListeningToAnimatedNodeValue {
        tag: NodeTag,
        listener: ValueListener,
    },
    StopListeningToAnimatedNodeValue {
        tag: NodeTag,
    },
    ConnectAnimatedNodes {
        parent: NodeTag,
        child: NodeTag,
    },
    DisconnectAnimatedNodes {
        parent: NodeTag,
        child: NodeTag,
    },
    ConnectAnimatedNodeToView {
        tag: NodeTag,
        view: ViewTag,
    },
    DisconnectAnimatedNodeFromView {
        tag: NodeTag,
        view: ViewTag,
    },
    RestoreDefaultValues {
        tag: NodeTag,
    },
    StartAnimatingNode {
        id: AnimationId,
        tag: NodeTag,
        config: JsonValue,
        end_callback: Option<EndCallback>,
    },
    StopAnimation {
        id: AnimationId,
    },
    AddAnimatedEventToView {
        view: ViewTag,
        event_name: String,
        mapping: EventMapping,
    },
    RemoveAnimatedEventFromView {
        view: ViewTag,
        event_name: String,
        animated_value_tag: NodeTag,
    },
}

impl AnimatedOperation {
    /// Bridge method name, for logs and error context.
    pub fn name(&self) -> &'static str {
        use AnimatedOperation::*;
        match self {
            CreateAnimatedNode { .. } => "createAnimatedNode",
            DropAnimatedNode { .. } => "dropAnimatedNode",
            SetAnimatedNodeValue { .. } => "setAnimatedNodeValue",
            SetAnimatedNodeOffset { .. } => "setAnimatedNodeOffset",
            FlattenAnimatedNodeOffset { .. } => "flattenAnimatedNodeOffset",
            ExtractAnimatedNodeOffset { .. } => "extractAnimatedNodeOffset",
            GetValue { .. } => "getValue",
            StartListeningToAnimatedNodeValue { .. } => "startListeningToAnimatedNodeValue",
            StopListeningToAnimatedNodeValue { .. } => "stopListeningToAnimatedNodeValue",
            ConnectAnimatedNodes { .. } => "connectAnimatedNodes",
            DisconnectAnimatedNodes { .. } => "disconnectAnimatedNodes",
            ConnectAnimatedNodeToView { .. } => "connectAnimatedNodeToView",
            DisconnectAnimatedNodeFromView { .. } => "disconnectAnimatedNodeFromView",
            RestoreDefaultValues { .. } => "restoreDefaultValues",
            StartAnimatingNode { .. } => "startAnimatingNode",
            StopAnimation { .. } => "stopAnimation",
            AddAnimatedEventToView { .. } => "addAnimatedEventToView",
            RemoveAnimatedEventFromView { .. } => "removeAnimatedEventFromView",
        }
    }

    pub fn apply<V: ViewUpdater>(
        self,
        manager: &mut NativeAnimatedNodesManager<V>,
    ) -> rnw_animated_core::Result<()> {
        use AnimatedOperation::*;
        match self {
            CreateAnimatedNode { tag, config } => manager.create_animated_node(tag, &config),
            DropAnimatedNode { tag } => {
                manager.drop_animated_node(tag);
                Ok(())
            }
            SetAnimatedNodeValue { tag, value } => manager.set_animated_node_value(tag, value),
            SetAnimatedNodeOffset { tag, offset } => manager.set_animated_node_offset(tag, offset),
            FlattenAnimatedNodeOffset { tag } => manager.flatten_animated_node_offset(tag),
            ExtractAnimatedNodeOffset { tag } => manager.extract_animated_node_offset(tag),
            GetValue { tag, callback } => manager.get_value(tag, callback),
            StartListeningToAnimatedNodeValue { tag, listener } => {
                manager.start_listening_to_animated_node_value(tag, listener)
            }
            StopListeningToAnimatedNodeValue { tag } => {
                manager.stop_listening_to_animated_node_value(tag)
            }
            ConnectAnimatedNodes { parent, child } => manager.connect_animated_nodes(parent, child),
            DisconnectAnimatedNodes { parent, child } => {
                manager.disconnect_animated_nodes(parent, child)
            }
            ConnectAnimatedNodeToView { tag, view } => {
                manager.connect_animated_node_to_view(tag, view)
            }
            DisconnectAnimatedNodeFromView { tag, view } => {
                manager.disconnect_animated_node_from_view(tag, view)
            }
            RestoreDefaultValues { tag } => manager.restore_default_values(tag),
            StartAnimatingNode {
                id,
                tag,
                config,
                end_callback,
            } => manager.start_animating_node(id, tag, &config, end_callback),
            StopAnimation { id } => {
                manager.stop_animation(id);
                Ok(())
            }
            AddAnimatedEventToView {
                view,
                event_name,
                mapping,
            } => manager.add_animated_event_to_view(view, &event_name, mapping),
            RemoveAnimatedEventFromView {
                view,
                event_name,
                animated_value_tag,
            } => {
                manager.remove_animated_event_from_view(view, &event_name, animated_value_tag);
                Ok(())
            }
        }
    }
}

impl fmt::Debug for AnimatedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use AnimatedOperation::*;
        let mut s = f.debug_struct(self.name());
        match self {
            CreateAnimatedNode { tag, config } => s.field("tag", tag).field("config", config),
            DropAnimatedNode { tag }
            | FlattenAnimatedNodeOffset { tag }
            | ExtractAnimatedNodeOffset { tag }
            | GetValue { tag, .. }
            | StartListeningToAnimatedNodeValue { tag, .. }
            | StopListeningToAnimatedNodeValue { tag }
            | RestoreDefaultValues { tag } => s.field("tag", tag),
            SetAnimatedNodeValue { tag, value } => s.field("tag", tag).field("value", value),
            SetAnimatedNodeOffset { tag, offset } => s.field("tag", tag).field("offset", offset),
            ConnectAnimatedNodes { parent, child } | DisconnectAnimatedNodes { parent, child } => {
                s.field("parent", parent).field("child", child)
            }
            ConnectAnimatedNodeToView { tag, view }
            | DisconnectAnimatedNodeFromView { tag, view } => {
                s.field("tag", tag).field("view", view)
            }
            StartAnimatingNode {
                id,
                tag,
                config,
                end_callback,
            } => s
                .field("id", id)
                .field("tag", tag)
                .field("config", config)
                .field("has_end_callback", &end_callback.is_some()),
            StopAnimation { id } => s.field("id", id),
            AddAnimatedEventToView {
                view,
                event_name,
                mapping,
            } => s
                .field("view", view)
                .field("event_name", event_name)
                .field("mapping", mapping),
            RemoveAnimatedEventFromView {
                view,
                event_name,
                animated_value_tag,
            } => s
                .field("view", view)
                .field("event_name", event_name)
                .field("animated_value_tag", animated_value_tag),
        };
        s.finish()
    }
}
