//! Entity state as written to the home-automation platform.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State string for entities whose source could not be read.
pub const STATE_UNAVAILABLE: &str = "unavailable";

/// Entity platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    BinarySensor,
    Sensor,
}

impl EntityKind {
    /// Entity id domain prefix.
    pub fn domain(&self) -> &'static str {
        match self {
            EntityKind::BinarySensor => "binary_sensor",
            EntityKind::Sensor => "sensor",
        }
    }
}

/// One entity's full state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityState {
    pub entity_id: String,
    pub kind: EntityKind,
    pub state: String,
    pub attributes: Map<String, Value>,
}

impl EntityState {
    /// Body for `POST /api/states/<entity_id>`.
    pub fn to_payload(&self) -> Value {
        serde_json::json!({
            "state": self.state,
            "attributes": self.attributes,
        })
    }

    /// Whether the entity is marked unavailable.
    pub fn is_unavailable(&self) -> bool {
        self.state == STATE_UNAVAILABLE
    }

    /// Look up a single attribute.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}
