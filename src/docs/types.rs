use crate::registry::AuthDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::overlay::MetaPatch;

/// Opaque structured description of a validation schema.
///
/// Produced by an injected [`SchemaDescriber`](super::SchemaDescriber) and
/// passed through unmodified; the engine only ever tests for presence, never
/// shape.
pub type SchemaDescription = Value;

/// Display name reported for listeners registered without an identifier.
pub const ANONYMOUS_HANDLER: &str = "(anonymous)";

/// Documentation record for one (path, method) route binding.
///
/// Every optional field is genuinely absent from the serialized form when
/// unset; consumers branch on absence, not on placeholder values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDoc {
    pub path: String,
    /// Lowercase HTTP method.
    pub method: String,
    /// The most specific auth descriptor in effect for the route.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthDescriptor>,
    /// The global default that a route-local auth config displaced.
    #[serde(rename = "overriddenAuth", skip_serializing_if = "Option::is_none")]
    pub overridden_auth: Option<AuthDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<SchemaDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<SchemaDescription>,
}

impl RouteDoc {
    pub(crate) fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            auth: None,
            overridden_auth: None,
            tags: None,
            notes: None,
            description: None,
            payload: None,
            query: None,
        }
    }
}

/// Documentation record for one registered server method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDoc {
    /// Dot-qualified, unique name (`"db.users.count"`).
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaDescription>,
    /// `Some(true)` purely on presence of a cache configuration; never
    /// `Some(false)`.
    #[serde(rename = "cacheEnabled", skip_serializing_if = "Option::is_none")]
    pub cache_enabled: Option<bool>,
}

/// Documentation record for one event channel with at least one listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDoc {
    pub name: String,
    /// Listener display names in registration order, which is invocation
    /// order. Anonymous listeners contribute [`ANONYMOUS_HANDLER`].
    pub handlers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Documentation record for one auth strategy referenced by a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDoc {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The structured documentation output: the four final collections.
///
/// Collections are arrays rather than maps so the mandated orders survive
/// serialization; each element carries its identity key as a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiDocument {
    pub routes: Vec<RouteDoc>,
    pub methods: Vec<MethodDoc>,
    pub events: Vec<EventDoc>,
    pub strategies: Vec<StrategyDoc>,
}

/// A documentation record the meta overlay can address.
pub trait Documented {
    /// Identity key the overlay matches against.
    fn doc_key(&self) -> &str;
    /// Apply the fields a patch carries; the identity key is never touched.
    fn merge_meta(&mut self, patch: &MetaPatch);
}

impl Documented for RouteDoc {
    fn doc_key(&self) -> &str {
        &self.path
    }

    fn merge_meta(&mut self, patch: &MetaPatch) {
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        if let Some(tags) = &patch.tags {
            self.tags = Some(tags.clone());
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
    }
}

impl Documented for MethodDoc {
    fn doc_key(&self) -> &str {
        &self.name
    }

    fn merge_meta(&mut self, patch: &MetaPatch) {
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
    }
}

impl Documented for EventDoc {
    fn doc_key(&self) -> &str {
        &self.name
    }

    fn merge_meta(&mut self, patch: &MetaPatch) {
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
    }
}

impl Documented for StrategyDoc {
    fn doc_key(&self) -> &str {
        &self.name
    }

    fn merge_meta(&mut self, patch: &MetaPatch) {
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
    }
}
