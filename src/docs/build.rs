use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::describe::SchemaDescriber;
use super::types::{EventDoc, MethodDoc, RouteDoc, StrategyDoc, ANONYMOUS_HANDLER};
use crate::registry::{AuthRegistry, EventRegistry, MethodNode, MethodRegistry, RouteRecord, ValidationSpec};

/// Namespace key this engine owns inside a route's plugin metadata.
///
/// A manual validation override lives at `plugins["selfdoc"].validate` and
/// fully replaces the route's declared validation config for documentation
/// purposes.
pub const PLUGIN_NAMESPACE: &str = "selfdoc";

/// Route selection applied while harvesting.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFilter<'a> {
    /// Comma-separated tag list; a route is kept when its own tag set
    /// intersects the requested set (match-ANY). Empty behaves as absent.
    pub tags: Option<&'a str>,
    /// Exact path to skip, so the documentation endpoint never documents
    /// itself.
    pub exclude_path: Option<&'a str>,
}

impl<'a> RouteFilter<'a> {
    fn requested_tags(&self) -> Option<Vec<&'a str>> {
        let raw = self.tags?;
        let tags: Vec<&str> = raw.split(',').filter(|t| !t.is_empty()).collect();
        if tags.is_empty() {
            None
        } else {
            Some(tags)
        }
    }
}

/// Harvest the route table into documentation records.
///
/// Applies self-exclusion and tag filtering, resolves auth inheritance
/// against the registry default, and runs the effective validation config
/// through the describer. Output order is the table's own order; the sorter
/// imposes the final one.
///
/// # Errors
///
/// Fails when a manual validation override under [`PLUGIN_NAMESPACE`] is
/// malformed, or when the describer rejects a schema. Both propagate
/// unchanged: they are configuration defects, not conditions to paper over.
pub fn harvest_routes(
    records: &[RouteRecord],
    auth: &AuthRegistry,
    describer: &dyn SchemaDescriber,
    filter: &RouteFilter<'_>,
) -> Result<Vec<RouteDoc>> {
    let requested = filter.requested_tags();
    let mut docs = Vec::new();
    for record in records {
        if filter.exclude_path == Some(record.path.as_str()) {
            continue;
        }
        if let Some(requested) = &requested {
            let own = record.tags.as_deref().unwrap_or_default();
            if !requested.iter().any(|tag| own.iter().any(|own_tag| own_tag.as_str() == *tag)) {
                continue;
            }
        }

        let mut doc = RouteDoc::new(&record.path, record.method.as_str().to_ascii_lowercase());
        doc.tags = record.tags.clone();
        doc.notes = record.notes.clone();
        resolve_auth(&mut doc, record, auth);
        extract_schemas(&mut doc, record, describer)?;
        docs.push(doc);
    }
    debug!(total = records.len(), documented = docs.len(), "routes harvested");
    Ok(docs)
}

/// Resolve the auth descriptor in effect for a route.
///
/// A global default seeds `auth`; a route-local config displaces it into
/// `overridden_auth` and takes its place. The net contract: `auth` is always
/// the most specific descriptor, and `overridden_auth` is present iff both a
/// default and a local override exist.
fn resolve_auth(doc: &mut RouteDoc, record: &RouteRecord, registry: &AuthRegistry) {
    if let Some(default) = registry.default() {
        doc.auth = Some(default.clone());
    }
    if let Some(local) = &record.auth {
        doc.overridden_auth = doc.auth.take();
        doc.auth = Some(local.clone());
    }
}

/// The validation config documentation reports for a route: the manual
/// override stored under this engine's plugin namespace when present,
/// otherwise the declared config. Never a merge of the two.
fn effective_validation(record: &RouteRecord) -> Result<Option<ValidationSpec>> {
    if let Some(metadata) = record.plugins.get(PLUGIN_NAMESPACE) {
        if let Some(raw) = metadata.get("validate") {
            let spec: ValidationSpec = serde_json::from_value(raw.clone()).with_context(|| {
                format!("malformed {PLUGIN_NAMESPACE:?} validation override on {}", record.path)
            })?;
            return Ok(Some(spec));
        }
    }
    Ok(record.validate.clone())
}

fn extract_schemas(
    doc: &mut RouteDoc,
    record: &RouteRecord,
    describer: &dyn SchemaDescriber,
) -> Result<()> {
    let Some(spec) = effective_validation(record)? else {
        return Ok(());
    };
    if let Some(payload) = &spec.payload {
        let described = describer
            .describe(payload)
            .with_context(|| format!("describing payload schema of {} {}", doc.method, doc.path))?;
        doc.payload = Some(described);
    }
    if let Some(query) = &spec.query {
        let described = describer
            .describe(query)
            .with_context(|| format!("describing query schema of {} {}", doc.method, doc.path))?;
        doc.query = Some(described);
    }
    Ok(())
}

/// Flatten the method registry into documentation records.
///
/// Qualified names join ancestor namespace segments with `.`. Traversal
/// order is deliberately irrelevant; [`sort_methods`] owns the final order.
///
/// # Errors
///
/// Fails when the describer rejects a method's schema attribute.
pub fn harvest_methods(registry: &MethodRegistry, describer: &dyn SchemaDescriber) -> Result<Vec<MethodDoc>> {
    let mut docs = Vec::new();
    let mut segments = Vec::new();
    walk_namespace(registry.root(), &mut segments, &mut docs, describer)?;
    debug!(methods = docs.len(), "methods harvested");
    Ok(docs)
}

fn walk_namespace(
    nodes: &HashMap<String, MethodNode>,
    segments: &mut Vec<String>,
    docs: &mut Vec<MethodDoc>,
    describer: &dyn SchemaDescriber,
) -> Result<()> {
    for (name, node) in nodes {
        segments.push(name.clone());
        match node {
            MethodNode::Leaf(method) => {
                let qualified = segments.join(".");
                let schema = match &method.schema {
                    Some(raw) => Some(
                        describer
                            .describe(raw)
                            .with_context(|| format!("describing schema of method {qualified}"))?,
                    ),
                    None => None,
                };
                docs.push(MethodDoc {
                    name: qualified,
                    description: method.description.clone(),
                    schema,
                    cache_enabled: method.cache.is_some().then_some(true),
                });
            }
            MethodNode::Namespace(children) => {
                walk_namespace(children, segments, docs, describer)?;
            }
        }
        segments.pop();
    }
    Ok(())
}

/// Group registered listeners into documentation records.
///
/// Channels without listeners are omitted. Handler order is registration
/// order, which is invocation order, and is never re-sorted.
pub fn harvest_events(registry: &EventRegistry) -> Vec<EventDoc> {
    registry
        .channels()
        .iter()
        .filter(|channel| !channel.listeners.is_empty())
        .map(|channel| EventDoc {
            name: channel.name.clone(),
            handlers: channel
                .listeners
                .iter()
                .map(|listener| {
                    listener
                        .id
                        .clone()
                        .unwrap_or_else(|| ANONYMOUS_HANDLER.to_string())
                })
                .collect(),
            description: None,
        })
        .collect()
}

/// Derive the strategies referenced by the harvested routes.
///
/// First-seen order over the route list as harvested, de-duplicated by name.
/// Never alphabetized: discovery order is the meaningful one.
pub fn aggregate_strategies(routes: &[RouteDoc]) -> Vec<StrategyDoc> {
    let mut seen = HashSet::new();
    let mut docs = Vec::new();
    for route in routes {
        let Some(auth) = &route.auth else { continue };
        for strategy in &auth.strategies {
            if seen.insert(strategy.clone()) {
                docs.push(StrategyDoc {
                    name: strategy.clone(),
                    description: None,
                });
            }
        }
    }
    docs
}

/// Sort routes by path, ordinal comparison. The sort is stable, so routes
/// that share a path keep their relative harvest order.
pub fn sort_routes(routes: &mut [RouteDoc]) {
    routes.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Sort methods by qualified name, case-insensitively.
pub fn sort_methods(methods: &mut [MethodDoc]) {
    methods.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}
