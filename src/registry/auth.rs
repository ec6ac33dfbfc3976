use serde::{Deserialize, Serialize};

/// Describes how a route authenticates incoming requests.
///
/// The pair of an access `mode` (for example `"required"` or `"try"`) and the
/// ordered list of strategy names consulted for the route. The documentation
/// engine only ever describes this configuration; enforcement stays with the
/// host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthDescriptor {
    pub mode: String,
    pub strategies: Vec<String>,
}

impl AuthDescriptor {
    pub fn new(mode: impl Into<String>) -> Self {
        Self {
            mode: mode.into(),
            strategies: Vec::new(),
        }
    }

    /// Append a strategy name, preserving declaration order.
    pub fn strategy(mut self, name: impl Into<String>) -> Self {
        self.strategies.push(name.into());
        self
    }
}

/// Host-wide authentication configuration.
///
/// Holds the global default descriptor, if one is configured. Routes without
/// a local auth config inherit this default.
#[derive(Debug, Clone, Default)]
pub struct AuthRegistry {
    default: Option<AuthDescriptor>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    pub fn set_default(&mut self, descriptor: AuthDescriptor) {
        self.default = Some(descriptor);
    }

    pub fn default(&self) -> Option<&AuthDescriptor> {
        self.default.as_ref()
    }
}
