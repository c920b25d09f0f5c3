//! Run identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque run handle returned at submission and used for polling.
///
/// Serialized as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(String);

impl RunId {
    /// Wrap an id taken from a request path.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh v4 UUID; unique without consulting the store.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
