use anyhow::{bail, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Callable backing a registered server method.
pub type MethodFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Cache configuration attached to a server method.
///
/// The documentation engine only reports that caching is enabled; the expiry
/// detail is host-side configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub expires_in_ms: u64,
}

/// A callable registered with the host, with its optional documentation
/// attributes.
pub struct ServerMethod {
    pub callable: MethodFn,
    pub description: Option<String>,
    pub schema: Option<Value>,
    pub cache: Option<CacheConfig>,
}

impl ServerMethod {
    pub fn new(callable: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self {
            callable: Arc::new(callable),
            description: None,
            schema: None,
            cache: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach the opaque argument schema the host validates calls against.
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = Some(config);
        self
    }
}

impl fmt::Debug for ServerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerMethod")
            .field("description", &self.description)
            .field("has_schema", &self.schema.is_some())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

/// One node of the method namespace tree.
///
/// The registry has exactly two shapes: a leaf holding a callable, or a
/// namespace mapping further segments to nodes.
#[derive(Debug)]
pub enum MethodNode {
    Leaf(ServerMethod),
    Namespace(HashMap<String, MethodNode>),
}

/// The host's namespaced method registry.
///
/// Methods register under dot-qualified names (`"db.users.count"`); each
/// segment but the last becomes a namespace. Iteration order of namespaces is
/// unspecified; consumers that need a deterministic order sort the flattened
/// result themselves.
#[derive(Debug, Default)]
pub struct MethodRegistry {
    root: HashMap<String, MethodNode>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `method` under a dot-qualified name, creating intermediate
    /// namespaces as needed.
    ///
    /// # Errors
    ///
    /// Fails on an empty name or segment, on a name already taken by a leaf
    /// or namespace, and on a path that would descend through an existing
    /// leaf.
    pub fn register(&mut self, name: &str, method: ServerMethod) -> Result<()> {
        let segments: Vec<&str> = name.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            bail!("invalid method name {name:?}");
        }
        let (leaf, namespaces) = segments
            .split_last()
            .ok_or_else(|| anyhow::anyhow!("invalid method name {name:?}"))?;

        let mut current = &mut self.root;
        for segment in namespaces {
            let node = current
                .entry(segment.to_string())
                .or_insert_with(|| MethodNode::Namespace(HashMap::new()));
            match node {
                MethodNode::Namespace(children) => current = children,
                MethodNode::Leaf(_) => {
                    bail!("cannot register {name:?}: {segment:?} is already a method")
                }
            }
        }
        match current.entry(leaf.to_string()) {
            std::collections::hash_map::Entry::Occupied(_) => {
                bail!("method {name:?} is already registered")
            }
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(MethodNode::Leaf(method));
                Ok(())
            }
        }
    }

    /// Resolve a dot-qualified name to its leaf, for host-side invocation.
    pub fn get(&self, name: &str) -> Option<&ServerMethod> {
        let mut current = &self.root;
        let mut segments = name.split('.').peekable();
        while let Some(segment) = segments.next() {
            match current.get(segment)? {
                MethodNode::Leaf(method) => {
                    return segments.peek().is_none().then_some(method);
                }
                MethodNode::Namespace(children) => current = children,
            }
        }
        None
    }

    /// Top-level namespace, the entry point for traversal.
    pub fn root(&self) -> &HashMap<String, MethodNode> {
        &self.root
    }
}
