#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rnw_animated_core::{
    EndCallback, EndResult, NativeAnimatedNodesManager, NodeTag, RecordingViewUpdater, ViewTag,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;

pub type Manager = NativeAnimatedNodesManager<RecordingViewUpdater>;

#[derive(Debug, Deserialize)]
pub struct GraphFixture {
    pub nodes: Vec<NodeFixture>,
    pub edges: Vec<(NodeTag, NodeTag)>,
    pub views: Vec<(NodeTag, ViewTag)>,
}

#[derive(Debug, Deserialize)]
pub struct NodeFixture {
    pub tag: NodeTag,
    pub config: JsonValue,
}

pub fn manager() -> Manager {
    NativeAnimatedNodesManager::new(RecordingViewUpdater::new())
}

/// Build a manager holding the named graph fixture, nodes created in file order.
pub fn manager_from_fixture(name: &str) -> anyhow::Result<Manager> {
    let graph: GraphFixture = rnw_animated_test_fixtures::graphs::load(name)?;
    let mut m = manager();
    for node in &graph.nodes {
        m.create_animated_node(node.tag, &node.config)?;
    }
    for (parent, child) in &graph.edges {
        m.connect_animated_nodes(*parent, *child)?;
    }
    for (props, view) in &graph.views {
        m.connect_animated_node_to_view(*props, *view)?;
    }
    Ok(m)
}

pub fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

pub fn approx(a: f64, b: f64, eps: f64) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

/// End callback recording `(label, finished)` into a shared log.
pub fn end_recorder(log: &Arc<Mutex<Vec<(&'static str, bool)>>>, label: &'static str) -> EndCallback {
    let log = Arc::clone(log);
    Box::new(move |result: EndResult| log.lock().unwrap().push((label, result.finished)))
}

pub fn tag(raw: i64) -> NodeTag {
    NodeTag(raw)
}
