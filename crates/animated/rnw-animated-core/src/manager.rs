//! The node registry's owner: graph mutation API, animation bookkeeping and the
//! per-frame propagation pass.

use std::collections::VecDeque;
use std::time::Duration;

use hashbrown::HashMap;
use indexmap::IndexSet;
use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::Config;
use crate::drivers::{AnimationConfig, AnimationDriver, EndCallback};
use crate::error::{AnimatedError, Result};
use crate::events::{EventAnimationDriver, EventMapping};
use crate::ids::{AnimationId, NodeTag, ViewTag};
use crate::nodes::{
    AnimatedNode, NodeConfig, NodeEffect, NodeKind, NodeRegistry, ValueCallback, ValueListener,
    INITIAL_BFS_COLOR,
};
use crate::view::ViewUpdater;

/// Counters from one propagation pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStats {
    /// Drivers stepped in phase 0.
    pub animations_stepped: usize,
    /// Nodes reachable from the seeds (phase 1).
    pub active_nodes: usize,
    /// Nodes visited in topological order (phase 2).
    pub updated_nodes: usize,
    /// Drivers that completed and were removed.
    pub finished_animations: usize,
}

/// Owns every animated node and active animation of one root view hierarchy.
///
/// All methods must be called from the thread that owns the manager; cross-thread
/// producers go through the module crate's queue.
pub struct NativeAnimatedNodesManager<V: ViewUpdater> {
    config: Config,
    nodes: NodeRegistry,
    active_animations: Vec<AnimationDriver>,
    updated_nodes: IndexSet<NodeTag>,
    event_drivers: HashMap<(ViewTag, String), Vec<EventAnimationDriver>>,
    animated_graph_bfs_color: u32,
    view_updater: V,
}

impl<V: ViewUpdater> NativeAnimatedNodesManager<V> {
    pub fn new(view_updater: V) -> Self {
        Self::from_parts(Config::default(), view_updater)
    }

    /// Fails with `InvalidConfig` when the integrator constants could not make progress.
    pub fn with_config(config: Config, view_updater: V) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, view_updater))
    }

    fn from_parts(config: Config, view_updater: V) -> Self {
        Self {
            nodes: NodeRegistry::with_capacity(config.node_capacity),
            active_animations: Vec::with_capacity(config.animation_capacity),
            updated_nodes: IndexSet::new(),
            event_drivers: HashMap::new(),
            animated_graph_bfs_color: INITIAL_BFS_COLOR,
            config,
            view_updater,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    pub fn node(&self, tag: NodeTag) -> Result<&AnimatedNode> {
        self.nodes.get(tag)
    }

    /// `value + offset` of a value node.
    pub fn node_value(&self, tag: NodeTag) -> Result<f64> {
        self.nodes.output_value(tag)
    }

    pub fn active_animation_count(&self) -> usize {
        self.active_animations.len()
    }

    pub fn view_updater(&self) -> &V {
        &self.view_updater
    }

    pub fn view_updater_mut(&mut self) -> &mut V {
        &mut self.view_updater
    }

    /// Whether the next [`run_updates`](Self::run_updates) has anything to do.
    pub fn has_active_animations(&self) -> bool {
        !self.active_animations.is_empty() || !self.updated_nodes.is_empty()
    }

    // --- Nodes ---------------------------------------------------------------------------

    /// Create a node from a bridge payload carrying a `type` discriminator.
    pub fn create_animated_node(&mut self, tag: NodeTag, config: &JsonValue) -> Result<()> {
        if self.nodes.contains(tag) {
            return Err(AnimatedError::DuplicateTag { tag });
        }
        let config = NodeConfig::from_json(config)?;
        self.create_animated_node_from_config(tag, config)
    }

    pub fn create_animated_node_from_config(
        &mut self,
        tag: NodeTag,
        config: NodeConfig,
    ) -> Result<()> {
        if self.nodes.contains(tag) {
            return Err(AnimatedError::DuplicateTag { tag });
        }
        let type_name = config.type_name();
        let kind = NodeKind::from_config(config, &self.nodes)?;
        self.nodes.insert(AnimatedNode::new(tag, kind))?;
        debug!("created {type_name} node {tag}");
        Ok(())
    }

    /// Remove a node. Edges pointing at it are left in place.
    pub fn drop_animated_node(&mut self, tag: NodeTag) {
        if self.nodes.remove(tag).is_none() {
            warn!("drop of unknown animated node {tag} ignored");
            return;
        }
        self.updated_nodes.shift_remove(&tag);
        debug!("dropped node {tag}");
    }

    pub fn set_animated_node_value(&mut self, tag: NodeTag, value: f64) -> Result<()> {
        self.nodes.value_node_mut(tag)?.value = value;
        self.mark_updated(tag);
        Ok(())
    }

    pub fn set_animated_node_offset(&mut self, tag: NodeTag, offset: f64) -> Result<()> {
        self.nodes.value_node_mut(tag)?.offset = offset;
        self.mark_updated(tag);
        Ok(())
    }

    pub fn flatten_animated_node_offset(&mut self, tag: NodeTag) -> Result<()> {
        self.nodes.value_node_mut(tag)?.flatten_offset();
        Ok(())
    }

    pub fn extract_animated_node_offset(&mut self, tag: NodeTag) -> Result<()> {
        self.nodes.value_node_mut(tag)?.extract_offset();
        Ok(())
    }

    /// Hand the current output of a value node to `callback`, synchronously.
    pub fn get_value(&self, tag: NodeTag, callback: ValueCallback) -> Result<()> {
        let value = self.nodes.output_value(tag)?;
        callback(value);
        Ok(())
    }

    pub fn start_listening_to_animated_node_value(
        &mut self,
        tag: NodeTag,
        listener: ValueListener,
    ) -> Result<()> {
        self.nodes.value_node_mut(tag)?.set_listener(Some(listener));
        Ok(())
    }

    pub fn stop_listening_to_animated_node_value(&mut self, tag: NodeTag) -> Result<()> {
        self.nodes.value_node_mut(tag)?.set_listener(None);
        Ok(())
    }

    pub fn connect_animated_nodes(&mut self, parent: NodeTag, child: NodeTag) -> Result<()> {
        self.nodes.connect(parent, child)?;
        debug!("connected {parent} -> {child}");
        Ok(())
    }

    pub fn disconnect_animated_nodes(&mut self, parent: NodeTag, child: NodeTag) -> Result<()> {
        self.nodes.disconnect(parent, child)?;
        debug!("disconnected {parent} -> {child}");
        Ok(())
    }

    pub fn connect_animated_node_to_view(&mut self, tag: NodeTag, view: ViewTag) -> Result<()> {
        self.nodes.props_node_mut(tag)?.connect_to_view(tag, view)?;
        debug!("props node {tag} bound to view {view}");
        Ok(())
    }

    pub fn disconnect_animated_node_from_view(
        &mut self,
        tag: NodeTag,
        view: ViewTag,
    ) -> Result<()> {
        self.nodes
            .props_node_mut(tag)?
            .disconnect_from_view(tag, view)?;
        debug!("props node {tag} unbound from view {view}");
        Ok(())
    }

    /// Reset every property a props node has committed back to the view default.
    pub fn restore_default_values(&mut self, tag: NodeTag) -> Result<()> {
        if !self.nodes.contains(tag) {
            // Commonly dropped earlier in the same batch.
            debug!("restore defaults for missing node {tag} ignored");
            return Ok(());
        }
        if let Some((view, props)) = self.nodes.props_node_mut(tag)?.restore_default_values() {
            self.view_updater.synchronously_update_view(view, &props);
        }
        Ok(())
    }

    /// Commit a props node's current patch outside of an update pass.
    pub fn update_view(&mut self, tag: NodeTag) -> Result<()> {
        let (view, props) = self.nodes.with_detached(tag, |node, nodes| {
            node.as_props_mut()
                .ok_or(AnimatedError::WrongNodeType {
                    tag,
                    expected: "props",
                })?
                .update_view(tag, nodes)
        })?;
        self.view_updater.synchronously_update_view(view, &props);
        Ok(())
    }

    fn mark_updated(&mut self, tag: NodeTag) {
        self.updated_nodes.insert(tag);
    }

    // --- Animations ----------------------------------------------------------------------

    /// Start an animation from a bridge payload carrying a `type` discriminator.
    pub fn start_animating_node(
        &mut self,
        id: AnimationId,
        tag: NodeTag,
        config: &JsonValue,
        end_callback: Option<EndCallback>,
    ) -> Result<()> {
        self.nodes.value_node(tag)?;
        let config = AnimationConfig::from_json(config)?;
        self.start_animating_node_with_config(id, tag, config, end_callback)
    }

    /// Start (or restart) animation `id` on value node `tag`.
    ///
    /// An active animation with the same id is replaced in place without being ended;
    /// it hands its end callback over when `end_callback` is `None`.
    pub fn start_animating_node_with_config(
        &mut self,
        id: AnimationId,
        tag: NodeTag,
        config: AnimationConfig,
        end_callback: Option<EndCallback>,
    ) -> Result<()> {
        self.nodes.value_node(tag)?;
        let kind = config.type_name();
        let mut driver = AnimationDriver::new(id, tag, config, end_callback, &self.config)?;

        match self.active_animations.iter_mut().find(|d| d.id() == id) {
            Some(existing) => {
                driver.inherit_end_callback(existing);
                *existing = driver;
                debug!("restarted {kind} animation {id} on node {tag}");
            }
            None => {
                self.active_animations.push(driver);
                debug!("started {kind} animation {id} on node {tag}");
            }
        }
        Ok(())
    }

    /// Stop an animation, ending it with `finished = false`. Unknown ids are ignored.
    pub fn stop_animation(&mut self, id: AnimationId) {
        let Some(index) = self.active_animations.iter().position(|d| d.id() == id) else {
            trace!("stop of inactive animation {id} ignored");
            return;
        };
        let mut driver = self.active_animations.remove(index);
        driver.end(false);
        debug!("stopped animation {id}");
    }

    fn stop_animations_for_node(&mut self, tag: NodeTag) {
        if !self.active_animations.iter().any(|d| d.node() == tag) {
            return;
        }
        let (stopped, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.active_animations)
            .into_iter()
            .partition(|d| d.node() == tag);
        self.active_animations = running;
        for mut driver in stopped {
            debug!("stopped animation {} on node {tag}", driver.id());
            driver.end(false);
        }
    }

    // --- Native events -------------------------------------------------------------------

    pub fn add_animated_event_to_view(
        &mut self,
        view: ViewTag,
        event_name: &str,
        mapping: EventMapping,
    ) -> Result<()> {
        self.nodes.value_node(mapping.animated_value_tag)?;
        let value_tag = mapping.animated_value_tag;
        self.event_drivers
            .entry((view, event_name.to_string()))
            .or_default()
            .push(EventAnimationDriver::new(view, event_name, mapping));
        debug!("view {view} '{event_name}' now drives node {value_tag}");
        Ok(())
    }

    pub fn remove_animated_event_from_view(
        &mut self,
        view: ViewTag,
        event_name: &str,
        animated_value_tag: NodeTag,
    ) {
        let key = (view, event_name.to_string());
        let Some(drivers) = self.event_drivers.get_mut(&key) else {
            return;
        };
        drivers.retain(|d| d.value_tag() != animated_value_tag);
        if drivers.is_empty() {
            self.event_drivers.remove(&key);
        }
    }

    /// Feed a native event to its mapped value nodes and propagate right away.
    ///
    /// Returns whether any driver was registered for the event.
    pub fn handle_event(
        &mut self,
        view: ViewTag,
        event_name: &str,
        payload: &JsonValue,
    ) -> Result<bool> {
        let Some(drivers) = self.event_drivers.get(&(view, event_name.to_string())) else {
            return Ok(false);
        };
        let drivers = drivers.clone();

        let mut written = IndexSet::with_capacity(drivers.len());
        for driver in &drivers {
            let tag = driver.value_tag();
            self.stop_animations_for_node(tag);
            let node = self.nodes.value_node_mut(tag)?;
            if let Some(value) = driver.extract(payload) {
                node.value = value;
            }
            written.insert(tag);
        }

        if let Err(err) = self.update_nodes(&written) {
            self.nodes.reset_traversal_state();
            return Err(err);
        }
        Ok(true)
    }

    // --- Per-frame pass ------------------------------------------------------------------

    /// Step every driver, then propagate from every changed value node in dependency
    /// order, committing props and notifying listeners along the way.
    pub fn run_updates(&mut self, frame_time: Duration) -> Result<UpdateStats> {
        let seeds = std::mem::take(&mut self.updated_nodes);
        let result = self.run_updates_from(frame_time, seeds);
        if result.is_err() {
            self.nodes.reset_traversal_state();
        }
        result
    }

    fn run_updates_from(
        &mut self,
        frame_time: Duration,
        mut seeds: IndexSet<NodeTag>,
    ) -> Result<UpdateStats> {
        let mut stats = UpdateStats {
            animations_stepped: self.active_animations.len(),
            ..UpdateStats::default()
        };

        for driver in &mut self.active_animations {
            let value = self.nodes.value_node_mut(driver.node())?;
            driver.run_animation_step(frame_time, &mut value.value)?;
            seeds.insert(driver.node());
        }

        let (active, updated) = self.update_nodes(&seeds)?;
        stats.active_nodes = active;
        stats.updated_nodes = updated;

        if self.active_animations.iter().any(AnimationDriver::has_finished) {
            let (finished, running): (Vec<_>, Vec<_>) =
                std::mem::take(&mut self.active_animations)
                    .into_iter()
                    .partition(AnimationDriver::has_finished);
            self.active_animations = running;
            stats.finished_animations = finished.len();
            for mut driver in finished {
                debug!("animation {} finished", driver.id());
                driver.end(true);
            }
        }

        trace!("frame at {frame_time:?}: {stats:?}");
        Ok(stats)
    }

    fn next_bfs_color(&mut self) -> u32 {
        self.animated_graph_bfs_color = self.animated_graph_bfs_color.wrapping_add(1);
        if self.animated_graph_bfs_color == INITIAL_BFS_COLOR {
            self.animated_graph_bfs_color = self.animated_graph_bfs_color.wrapping_add(1);
        }
        self.animated_graph_bfs_color
    }

    /// Two-phase BFS from `seeds`. Returns `(active, updated)` node counts.
    fn update_nodes(&mut self, seeds: &IndexSet<NodeTag>) -> Result<(usize, usize)> {
        let mut queue = VecDeque::new();

        // Phase 1: everything reachable from the seeds, counting active fan-in per node.
        let color = self.next_bfs_color();
        let mut active = 0;
        for &tag in seeds {
            let node = self.nodes.get_mut(tag)?;
            if node.bfs_color != color {
                node.bfs_color = color;
                active += 1;
                queue.push_back(tag);
            }
        }
        while let Some(tag) = queue.pop_front() {
            let children = self.nodes.get(tag)?.children().to_vec();
            for child in children {
                let node = self.nodes.get_mut(child)?;
                node.active_incoming_nodes += 1;
                if node.bfs_color != color {
                    node.bfs_color = color;
                    active += 1;
                    queue.push_back(child);
                }
            }
        }

        // Phase 2: visit a node only once all of its active parents have been updated.
        let color = self.next_bfs_color();
        let mut updated = 0;
        for &tag in seeds {
            let node = self.nodes.get_mut(tag)?;
            if node.active_incoming_nodes == 0 && node.bfs_color != color {
                node.bfs_color = color;
                updated += 1;
                queue.push_back(tag);
            }
        }
        while let Some(tag) = queue.pop_front() {
            let effect = self.nodes.with_detached(tag, |node, nodes| {
                let effect = node.update(nodes)?;
                if let Some(value) = node.as_value_mut() {
                    value.notify_listener();
                }
                Ok(effect)
            })?;
            self.apply_effect(effect)?;

            let children = self.nodes.get(tag)?.children().to_vec();
            for child in children {
                let node = self.nodes.get_mut(child)?;
                node.active_incoming_nodes = node.active_incoming_nodes.saturating_sub(1);
                if node.active_incoming_nodes == 0 && node.bfs_color != color {
                    node.bfs_color = color;
                    updated += 1;
                    queue.push_back(child);
                }
            }
        }

        if active != updated {
            error!(
                "animated graph has cycles or missing producers: {active} active nodes, {updated} updated"
            );
            return Err(AnimatedError::GraphCycle { active, updated });
        }
        Ok((active, updated))
    }

    fn apply_effect(&mut self, effect: NodeEffect) -> Result<()> {
        match effect {
            NodeEffect::None => Ok(()),
            NodeEffect::CommitProps { view, props } => {
                self.view_updater.synchronously_update_view(view, &props);
                Ok(())
            }
            NodeEffect::StartAnimation { id, node, config } => {
                self.start_animating_node_with_config(id, node, config, None)
            }
        }
    }
}
