//! Stable identifiers for paragraphs, runs and other document nodes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a node in a loaded document.
///
/// Ids are random (UUID v4) and only meaningful for the lifetime of one
/// loaded document; the docx writer uses them to map model nodes back to
/// their source XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for NodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}
