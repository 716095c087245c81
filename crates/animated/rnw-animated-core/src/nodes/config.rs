//! Typed node configs decoded from the bridge's JSON payloads.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::drivers::AnimationConfig;
use crate::error::{AnimatedError, Result};
use crate::ids::{AnimationId, NodeTag};

/// Every `type` discriminator accepted by node creation.
pub const NODE_TYPES: &[&str] = &[
    "value",
    "style",
    "props",
    "interpolation",
    "addition",
    "subtraction",
    "multiplication",
    "division",
    "modulus",
    "diffclamp",
    "transform",
    "tracking",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeConfig {
    Value {
        #[serde(default)]
        value: f64,
        #[serde(default)]
        offset: f64,
    },
    Style {
        style: IndexMap<String, NodeTag>,
    },
    Props {
        props: IndexMap<String, NodeTag>,
    },
    Interpolation(InterpolationConfig),
    Addition {
        input: Vec<NodeTag>,
    },
    Subtraction {
        input: Vec<NodeTag>,
    },
    Multiplication {
        input: Vec<NodeTag>,
    },
    Division {
        input: Vec<NodeTag>,
    },
    Modulus {
        input: NodeTag,
        modulus: f64,
    },
    DiffClamp {
        input: NodeTag,
        min: f64,
        max: f64,
    },
    Transform {
        transforms: Vec<TransformConfig>,
    },
    Tracking(TrackingConfig),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterpolationConfig {
    pub input_range: Vec<f64>,
    pub output_range: Vec<f64>,
    #[serde(default)]
    pub extrapolate_left: Extrapolate,
    #[serde(default)]
    pub extrapolate_right: Extrapolate,
}

/// Behavior outside of `inputRange`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Extrapolate {
    /// Keep the slope of the boundary segment.
    #[default]
    Extend,
    /// Pin to the boundary output.
    Clamp,
    /// Pass the input through unchanged.
    Identity,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransformConfig {
    Animated {
        property: String,
        #[serde(rename = "nodeTag")]
        node_tag: NodeTag,
    },
    Static {
        property: String,
        value: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingConfig {
    pub animation_id: AnimationId,
    pub to_value: NodeTag,
    pub value: NodeTag,
    pub animation_config: AnimationConfig,
}

impl NodeConfig {
    /// Decode a bridge payload, separating unknown discriminators from malformed fields.
    pub fn from_json(config: &JsonValue) -> Result<Self> {
        let type_name = config
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| AnimatedError::invalid_config("node config is missing 'type'"))?;
        if !NODE_TYPES.contains(&type_name) {
            return Err(AnimatedError::UnknownNodeType {
                type_name: type_name.to_string(),
            });
        }
        let decoded = serde_json::from_value(config.clone())?;
        Ok(decoded)
    }

    /// The discriminator this config was (or would be) decoded from.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeConfig::Value { .. } => "value",
            NodeConfig::Style { .. } => "style",
            NodeConfig::Props { .. } => "props",
            NodeConfig::Interpolation(_) => "interpolation",
            NodeConfig::Addition { .. } => "addition",
            NodeConfig::Subtraction { .. } => "subtraction",
            NodeConfig::Multiplication { .. } => "multiplication",
            NodeConfig::Division { .. } => "division",
            NodeConfig::Modulus { .. } => "modulus",
            NodeConfig::DiffClamp { .. } => "diffclamp",
            NodeConfig::Transform { .. } => "transform",
            NodeConfig::Tracking(_) => "tracking",
        }
    }
}
