use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to a captured image. The core never decodes it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ImageHandle {
    pub id: Uuid,
    pub source: String,
}

impl ImageHandle {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source: source.into(),
        }
    }
}
