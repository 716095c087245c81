//! Bridge-side command buffer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::trace;
use rnw_animated_core::{
    AnimationId, EndCallback, EventMapping, NodeTag, ValueCallback, ValueListener, ViewTag,
};
use serde_json::Value as JsonValue;

use crate::operation::AnimatedOperation;

/// Batches handed from the bridge thread to the UI thread.
pub(crate) type ReadyOperations = Arc<Mutex<Vec<AnimatedOperation>>>;

/// A panicking producer must not wedge the frame loop; the queue holds plain data.
pub(crate) fn lock(ready: &ReadyOperations) -> MutexGuard<'_, Vec<AnimatedOperation>> {
    ready.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owned by the bridge thread. Operations accumulate in `pending` until
/// [`on_batch_complete`](Self::on_batch_complete) publishes them.
pub struct BridgeQueue {
    pending: Vec<AnimatedOperation>,
    ready: ReadyOperations,
}

impl BridgeQueue {
    pub(crate) fn new(ready: ReadyOperations) -> Self {
        Self {
            pending: Vec::new(),
            ready,
        }
    }

    pub fn push(&mut self, operation: AnimatedOperation) {
        self.pending.push(operation);
    }

    /// Operations issued since the last batch boundary.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Publish the current batch. Appends if the UI thread has not drained the last one.
    pub fn on_batch_complete(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.pending);
        let count = batch.len();
        let mut ready = lock(&self.ready);
        if ready.is_empty() {
            *ready = batch;
        } else {
            ready.extend(batch);
        }
        trace!("published batch of {count} animated operations");
    }

    pub fn create_animated_node(&mut self, tag: NodeTag, config: JsonValue) {
        self.push(AnimatedOperation::CreateAnimatedNode { tag, config });
    }

    pub fn drop_animated_node(&mut self, tag: NodeTag) {
        self.push(AnimatedOperation::DropAnimatedNode { tag });
    }

    pub fn set_animated_node_value(&mut self, tag: NodeTag, value: f64) {
        self.push(AnimatedOperation::SetAnimatedNodeValue { tag, value });
    }

    pub fn set_animated_node_offset(&mut self, tag: NodeTag, offset: f64) {
        self.push(AnimatedOperation::SetAnimatedNodeOffset { tag, offset });
    }

    pub fn flatten_animated_node_offset(&mut self, tag: NodeTag) {
        self.push(AnimatedOperation::FlattenAnimatedNodeOffset { tag });
    }

    pub fn extract_animated_node_offset(&mut self, tag: NodeTag) {
        self.push(AnimatedOperation::ExtractAnimatedNodeOffset { tag });
    }

    pub fn get_value(&mut self, tag: NodeTag, callback: ValueCallback) {
        self.push(AnimatedOperation::GetValue { tag, callback });
    }

    pub fn start_listening_to_animated_node_value(&mut self, tag: NodeTag, listener: ValueListener) {
        self.push(AnimatedOperation::StartListeningToAnimatedNodeValue { tag, listener });
    }

    pub fn stop_listening_to_animated_node_value(&mut self, tag: NodeTag) {
        self.push(AnimatedOperation::StopListeningToAnimatedNodeValue { tag });
    }

    pub fn connect_animated_nodes(&mut self, parent: NodeTag, child: NodeTag) {
        self.push(AnimatedOperation::ConnectAnimatedNodes { parent, child });
    }

    pub fn disconnect_animated_nodes(&mut self, parent: NodeTag, child: NodeTag) {
        self.push(AnimatedOperation::DisconnectAnimatedNodes { parent, child });
    }

    pub fn connect_animated_node_to_view(&mut self, tag: NodeTag, view: ViewTag) {
        self.push(AnimatedOperation::ConnectAnimatedNodeToView { tag, view });
    }

    pub fn disconnect_animated_node_from_view(&mut self, tag: NodeTag, view: ViewTag) {
        self.push(AnimatedOperation::DisconnectAnimatedNodeFromView { tag, view });
    }

    pub fn restore_default_values(&mut self, tag: NodeTag) {
        self.push(AnimatedOperation::RestoreDefaultValues { tag });
    }

    pub fn start_animating_node(
        &mut self,
        id: AnimationId,
        tag: NodeTag,
        config: JsonValue,
        end_callback: Option<EndCallback>,
    ) {
        self.push(AnimatedOperation::StartAnimatingNode {
            id,
            tag,
            config,
            end_callback,
        });
    }

    pub fn stop_animation(&mut self, id: AnimationId) {
        self.push(AnimatedOperation::StopAnimation { id });
    }

    pub fn add_animated_event_to_view(
        &mut self,
        view: ViewTag,
        event_name: impl Into<String>,
        mapping: EventMapping,
    ) {
        self.push(AnimatedOperation::AddAnimatedEventToView {
            view,
            event_name: event_name.into(),
            mapping,
        });
    }

    pub fn remove_animated_event_from_view(
        &mut self,
        view: ViewTag,
        event_name: impl Into<String>,
        animated_value_tag: NodeTag,
    ) {
        self.push(AnimatedOperation::RemoveAnimatedEventFromView {
            view,
            event_name: event_name.into(),
            animated_value_tag,
        });
    }
}
