//! Capability resolution: maps a `kind:name` source onto a known capability
//! with a typed view of its parameters.
//!
//! The typed view never gates a call. Tools receive the caller's parameter
//! map exactly as submitted and report malformed input themselves.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use taskrelay_core::SourceRef;

use super::GatewayError;

/// Parameters for free-text search capabilities (mail, documents,
/// knowledge base, designs).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchParams {
    /// Search query.
    #[serde(default)]
    pub query: Option<String>,

    /// Result cap.
    #[serde(default)]
    pub max_results: Option<u32>,

    /// Keys not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parameters for calendar-event search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CalendarParams {
    /// Window start (RFC 3339).
    #[serde(default)]
    pub time_min: Option<String>,

    /// Window end (RFC 3339).
    #[serde(default)]
    pub time_max: Option<String>,

    /// Optional text filter.
    #[serde(default)]
    pub query: Option<String>,

    /// Result cap.
    #[serde(default)]
    pub max_results: Option<u32>,

    /// Keys not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resolved capability together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Capability {
    /// `official_api:gmail`
    MailSearch(SearchParams),
    /// `official_api:drive`
    DocumentSearch(SearchParams),
    /// `official_api:calendar`
    CalendarSearch(CalendarParams),
    /// `official_api:notion`
    KnowledgeSearch(SearchParams),
    /// `official_api:canva`
    DesignSearch(SearchParams),
    /// Known capability with no live backend yet.
    Unwired {
        source: SourceRef,
        params: Map<String, Value>,
    },
}

/// Vendor search/news providers the relay knows about.
const VENDORS: &[&str] = &["newsapi", "serpapi", "exa"];

impl Capability {
    /// Resolve a source and its raw parameters.
    ///
    /// Only an unknown source fails; parameters are never rejected here.
    pub fn resolve(source: &SourceRef, params: &Map<String, Value>) -> Result<Self, GatewayError> {
        let capability = match (source.kind.as_str(), source.name.as_str()) {
            ("official_api", "gmail") => Self::MailSearch(typed(source, params)),
            ("official_api", "drive") => Self::DocumentSearch(typed(source, params)),
            ("official_api", "calendar") => Self::CalendarSearch(typed(source, params)),
            ("official_api", "notion") => Self::KnowledgeSearch(typed(source, params)),
            ("official_api", "canva") => Self::DesignSearch(typed(source, params)),
            ("official_api", "github") => Self::unwired(source, params),
            ("vendor", name) if VENDORS.contains(&name) => Self::unwired(source, params),
            ("site", name) if !name.is_empty() => Self::unwired(source, params),
            _ => return Err(GatewayError::UnsupportedSource(source.clone())),
        };
        Ok(capability)
    }

    /// Tool operation name for wired capabilities.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::MailSearch(_) => Some("gmail_search"),
            Self::DocumentSearch(_) => Some("drive_search"),
            Self::CalendarSearch(_) => Some("calendar_search_events"),
            Self::KnowledgeSearch(_) => Some("notion_search"),
            Self::DesignSearch(_) => Some("canva_search_designs"),
            Self::Unwired { .. } => None,
        }
    }

    /// Free-text query, when the parameters carry one.
    pub fn query(&self) -> Option<&str> {
        match self {
            Self::MailSearch(p)
            | Self::DocumentSearch(p)
            | Self::KnowledgeSearch(p)
            | Self::DesignSearch(p) => p.query.as_deref(),
            Self::CalendarSearch(p) => p.query.as_deref(),
            Self::Unwired { .. } => None,
        }
    }

    fn unwired(source: &SourceRef, params: &Map<String, Value>) -> Self {
        Self::Unwired {
            source: source.clone(),
            params: params.clone(),
        }
    }
}

/// Best-effort typed view of raw parameters; falls back to an empty view
/// when a value has the wrong JSON type.
fn typed<T: DeserializeOwned + Default>(source: &SourceRef, params: &Map<String, Value>) -> T {
    serde_json::from_value(Value::Object(params.clone())).unwrap_or_else(|e| {
        debug!(source = %source, error = %e, "Params do not fit the capability shape");
        T::default()
    })
}
