//! Error types for the animated node graph.
//!
//! Every variant is a contract violation by the caller (or a corrupt graph) and is
//! surfaced synchronously by the call that detected it. The host decides how to report
//! it; nothing in this crate retries or recovers.

use crate::ids::{AnimationId, NodeTag, ViewTag};

/// Result alias used throughout the crate.
pub type Result<T, E = AnimatedError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimatedError {
    #[error("animated node with tag {tag} already exists")]
    DuplicateTag { tag: NodeTag },

    #[error("unsupported node type: '{type_name}'")]
    UnknownNodeType { type_name: String },

    #[error("unsupported animation type: '{type_name}'")]
    UnknownAnimationType { type_name: String },

    #[error("animated node with tag {tag} does not exist")]
    NodeNotFound { tag: NodeTag },

    #[error("animated node with tag {tag} is not a {expected} node")]
    WrongNodeType { tag: NodeTag, expected: &'static str },

    #[error("animated node {tag} already has a parent attached")]
    AlreadyAttached { tag: NodeTag },

    #[error("animated node {tag} is not attached to the expected parent")]
    NotAttached { tag: NodeTag },

    #[error("animated node {tag} is already connected to view {view}")]
    AlreadyConnected { tag: NodeTag, view: ViewTag },

    #[error("animated node {tag} is not connected to the requested view")]
    NotConnected {
        tag: NodeTag,
        requested: Option<ViewTag>,
    },

    #[error(
        "looks like the animated node graph has cycles: {active} active nodes but only {updated} were updated"
    )]
    GraphCycle { active: usize, updated: usize },

    #[error("animated node {child} used by node {parent} has an unsupported type")]
    UnsupportedChildNodeType { parent: NodeTag, child: NodeTag },

    #[error("invalid animated config: {reason}")]
    InvalidConfig { reason: String },

    #[error("calculated frame index for animation {animation} is negative")]
    InvalidFrameTime { animation: AnimationId },

    #[error("detected a division by zero in animated node {tag}")]
    DivisionByZero { tag: NodeTag },
}

impl AnimatedError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for AnimatedError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}
