//! Native view events feeding value nodes directly (`Animated.event` with the native
//! driver).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ids::{NodeTag, ViewTag};

/// Where in an event payload to read the number, and which value node receives it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMapping {
    pub animated_value_tag: NodeTag,
    pub native_event_path: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventAnimationDriver {
    pub view: ViewTag,
    pub event_name: String,
    pub mapping: EventMapping,
}

impl EventAnimationDriver {
    pub fn new(view: ViewTag, event_name: impl Into<String>, mapping: EventMapping) -> Self {
        Self {
            view,
            event_name: event_name.into(),
            mapping,
        }
    }

    pub fn value_tag(&self) -> NodeTag {
        self.mapping.animated_value_tag
    }

    /// The number at `native_event_path`, if the payload has one there.
    pub fn extract(&self, payload: &JsonValue) -> Option<f64> {
        self.mapping
            .native_event_path
            .iter()
            .try_fold(payload, |current, key| current.get(key))?
            .as_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scroll_driver() -> EventAnimationDriver {
        let mapping: EventMapping = serde_json::from_value(json!({
            "animatedValueTag": 3,
            "nativeEventPath": ["contentOffset", "y"]
        }))
        .unwrap();
        EventAnimationDriver::new(ViewTag(11), "onScroll", mapping)
    }

    #[test]
    fn reads_nested_number() {
        let driver = scroll_driver();
        assert_eq!(driver.value_tag(), NodeTag(3));
        assert_eq!(
            driver.extract(&json!({ "contentOffset": { "x": 0, "y": 42 } })),
            Some(42.0)
        );
    }

    #[test]
    fn missing_or_non_numeric_paths_yield_none() {
        let driver = scroll_driver();
        assert_eq!(driver.extract(&json!({ "contentOffset": {} })), None);
        assert_eq!(driver.extract(&json!({ "contentOffset": { "y": "far" } })), None);
        assert_eq!(driver.extract(&json!(null)), None);
    }
}
