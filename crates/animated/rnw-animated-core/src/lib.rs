//! rnw-animated-core: the native-driven animated node graph.
//!
//! Animated.js describes a dataflow graph of nodes (values, arithmetic, interpolation,
//! style/transform/props) plus animation drivers that pulse value nodes once per frame.
//! This crate owns that graph on the UI thread:
//!
//! - [`nodes`] holds the closed set of node kinds and the tag-keyed registry.
//! - [`drivers`] holds the frame-based, spring and decay integrators.
//! - [`events`] maps native view events onto value nodes.
//! - [`manager`] hosts [`NativeAnimatedNodesManager`], the graph mutation API and the
//!   two-phase topological update run for every frame.
//!
//! Thread marshalling lives in `rnw-animated-module`; everything here is single-threaded.

pub mod config;
pub mod drivers;
pub mod error;
pub mod events;
pub mod ids;
pub mod manager;
pub mod nodes;
pub mod value;
pub mod view;

pub use config::Config;
pub use drivers::{AnimationConfig, AnimationDriver, EndCallback, EndResult};
pub use error::{AnimatedError, Result};
pub use events::{EventAnimationDriver, EventMapping};
pub use ids::{AnimationId, NodeTag, ViewTag};
pub use manager::{NativeAnimatedNodesManager, UpdateStats};
pub use nodes::{AnimatedNode, NodeConfig, NodeKind, NodeRegistry, ValueCallback, ValueListener};
pub use value::{PropMap, PropValue};
pub use view::{RecordingViewUpdater, ViewUpdater};
