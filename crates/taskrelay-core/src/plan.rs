//! Task plan types: what a client asks the relay to do.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Two-part connector identifier, written `kind:name` on the wire.
///
/// The kind selects a capability family (`official_api`, `vendor`, `site`)
/// and the name selects the capability within it. Neither part is checked
/// here; unknown pairs are rejected when the task executes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRef {
    /// Capability family.
    pub kind: String,

    /// Capability within the family.
    pub name: String,
}

impl SourceRef {
    /// Create a new SourceRef.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Parse the `kind:name` form. Text without a separator becomes a kind
    /// with an empty name.
    pub fn parse(text: &str) -> Self {
        match text.split_once(':') {
            Some((kind, name)) => Self::new(kind.trim(), name.trim()),
            None => Self::new(text.trim(), ""),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

impl From<&str> for SourceRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for SourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accepted input shapes for a source.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceRepr {
    Text(String),
    Parts {
        kind: String,
        #[serde(default)]
        name: String,
    },
}

impl<'de> Deserialize<'de> for SourceRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match SourceRepr::deserialize(deserializer)? {
            SourceRepr::Text(text) => Self::parse(&text),
            SourceRepr::Parts { kind, name } => Self::new(kind, name),
        })
    }
}

/// What a task intends to do with its source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskMode {
    /// Read from the source. The only mode read-only connectors execute.
    #[default]
    Fetch,
    /// Write to the source.
    Write,
    /// Transform previously fetched data.
    Transform,
}

impl TaskMode {
    /// Wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Write => "write",
            Self::Transform => "transform",
        }
    }
}

impl fmt::Display for TaskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested operation against one connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Connector to call.
    pub source: SourceRef,

    /// Requested mode, `fetch` when omitted.
    #[serde(default)]
    pub mode: TaskMode,

    /// Connector-specific parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl TaskSpec {
    /// Create a fetch task with no parameters.
    pub fn fetch(source: impl Into<SourceRef>) -> Self {
        Self {
            source: source.into(),
            mode: TaskMode::Fetch,
            params: Map::new(),
        }
    }

    /// Builder method to add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Builder method to set the mode.
    pub fn with_mode(mut self, mode: TaskMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Ordered task list plus opaque delivery targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Tasks in execution order.
    pub tasks: Vec<TaskSpec>,

    /// Delivery targets, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Value>,
}

impl RunPlan {
    /// Create a plan from its tasks.
    pub fn new(tasks: Vec<TaskSpec>) -> Self {
        Self {
            tasks,
            delivery: None,
        }
    }

    /// Builder method to attach delivery targets.
    pub fn with_delivery(mut self, delivery: Value) -> Self {
        self.delivery = Some(delivery);
        self
    }

    /// Number of tasks in the plan.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the plan has no tasks.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
