//! Property patches committed to native views.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Insertion-ordered name → value mapping handed to the view collaborator.
pub type PropMap = IndexMap<String, PropValue>;

/// A single property value. Style and transform collection produce nested lists/maps;
/// `Null` resets a property to the view's default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Null,
    Number(f64),
    List(Vec<PropValue>),
    Map(PropMap),
}

impl PropValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_plain_json() {
        let mut transform = PropMap::new();
        transform.insert("translateX".into(), 4.0.into());
        let mut props = PropMap::new();
        props.insert("opacity".into(), 0.5.into());
        props.insert(
            "transform".into(),
            PropValue::List(vec![PropValue::Map(transform)]),
        );
        props.insert("width".into(), PropValue::Null);

        let encoded = serde_json::to_value(&props).unwrap();
        assert_eq!(
            encoded,
            json!({ "opacity": 0.5, "transform": [{ "translateX": 4.0 }], "width": null })
        );
    }
}
