//! Identifiers assigned by the bridge caller.
//!
//! Tags are chosen on the JS side and are only unique among live nodes (or active
//! animations), so none of these are allocated here.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! bridge_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                $name(raw)
            }
        }
    };
}

bridge_id!(
    /// Tag of an animated node, unique within one manager while the node is alive.
    NodeTag
);
bridge_id!(
    /// Id of a started animation; unique among the currently active animations.
    AnimationId
);
bridge_id!(
    /// Tag of a native view that a props node may be bound to.
    ViewTag
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_as_plain_integers() {
        let tag: NodeTag = serde_json::from_str("42").unwrap();
        assert_eq!(tag, NodeTag(42));
        assert_eq!(serde_json::to_string(&ViewTag(7)).unwrap(), "7");
        assert_eq!(AnimationId::from(3).to_string(), "3");
    }
}
