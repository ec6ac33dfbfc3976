use super::auth::AuthDescriptor;
use http::Method;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// Validation configuration declared on a route.
///
/// The schema values are opaque to the documentation engine; they belong to
/// the host's validation library and are only ever passed through a
/// [`SchemaDescriber`](crate::docs::SchemaDescriber). Either sub-schema may be
/// absent independently.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ValidationSpec {
    pub payload: Option<Value>,
    pub query: Option<Value>,
}

impl ValidationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn payload(mut self, schema: Value) -> Self {
        self.payload = Some(schema);
        self
    }

    pub fn query(mut self, schema: Value) -> Self {
        self.query = Some(schema);
        self
    }
}

/// One entry of the host's live route table.
///
/// Everything the documentation engine reads about a route is declared here:
/// the path and method binding, descriptive tags and notes, the local auth
/// configuration, the validation config, and the per-plugin metadata side
/// channel keyed by plugin name.
#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub path: String,
    pub method: Method,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub auth: Option<AuthDescriptor>,
    pub validate: Option<ValidationSpec>,
    pub plugins: HashMap<String, Value>,
}

impl RouteRecord {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            tags: None,
            notes: None,
            auth: None,
            validate: None,
            plugins: HashMap::new(),
        }
    }

    /// Append a tag, preserving declaration order.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.get_or_insert_with(Vec::new).push(tag.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn auth(mut self, descriptor: AuthDescriptor) -> Self {
        self.auth = Some(descriptor);
        self
    }

    pub fn validate(mut self, spec: ValidationSpec) -> Self {
        self.validate = Some(spec);
        self
    }

    /// Attach side-channel metadata under a plugin's namespace key.
    pub fn plugin(mut self, name: impl Into<String>, metadata: Value) -> Self {
        self.plugins.insert(name.into(), metadata);
        self
    }
}
