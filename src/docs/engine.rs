use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use super::build::{self, RouteFilter};
use super::describe::{JsonSchemaDescriber, SchemaDescriber, SchemaFormatter};
use super::html;
use super::overlay::{apply_overlay, DocOverlay, OverlaySource};
use super::types::ApiDocument;
use crate::registry::{AuthRegistry, EventRegistry, MethodRegistry, RouteRecord};

/// Engine configuration, fixed at construction.
#[derive(Default)]
pub struct DocOptions {
    /// Path of the structured documentation endpoint. Drives self-exclusion
    /// and the tag filter links in HTML output.
    pub docs_endpoint: Option<String>,
    /// Markup formatter for schema cells in HTML output. Absent means the
    /// schema columns are not rendered at all.
    pub schema_renderer: Option<Arc<dyn SchemaFormatter>>,
    /// Curated annotations, as a value or a producer run once.
    pub overlay: Option<OverlaySource>,
}

impl std::fmt::Debug for DocOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocOptions")
            .field("docs_endpoint", &self.docs_endpoint)
            .field("schema_renderer", &self.schema_renderer.is_some())
            .field("overlay", &self.overlay.is_some())
            .finish()
    }
}

/// Per-request parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocQuery {
    /// Comma-separated tags; routes matching any of them are kept.
    pub tags: Option<String>,
}

/// Read-only view of the host registries for one documentation pass.
///
/// The engine borrows and never stores these, so every call observes the
/// live registries as they are at that moment.
#[derive(Debug, Clone, Copy)]
pub struct DocSources<'a> {
    pub routes: &'a [RouteRecord],
    pub methods: &'a MethodRegistry,
    pub events: &'a EventRegistry,
    pub auth: &'a AuthRegistry,
}

/// The documentation engine: a pure transform from registry state to an
/// [`ApiDocument`].
///
/// Construction resolves the overlay and pins the describer; after that the
/// engine is immutable and cheap to share. [`document`](Self::document) runs
/// the full pipeline: harvest, strategy aggregation, overlay merge, sort.
pub struct DocEngine {
    describer: Arc<dyn SchemaDescriber>,
    docs_endpoint: Option<String>,
    schema_renderer: Option<Arc<dyn SchemaFormatter>>,
    overlay: DocOverlay,
}

impl DocEngine {
    /// Build an engine with the stock [`JsonSchemaDescriber`].
    pub fn new(options: DocOptions) -> Self {
        Self::with_describer(Arc::new(JsonSchemaDescriber), options)
    }

    /// Build an engine around a custom describer. An overlay producer in
    /// `options` is invoked here, exactly once.
    pub fn with_describer(describer: Arc<dyn SchemaDescriber>, options: DocOptions) -> Self {
        let overlay = options.overlay.map(OverlaySource::resolve).unwrap_or_default();
        Self {
            describer,
            docs_endpoint: options.docs_endpoint,
            schema_renderer: options.schema_renderer,
            overlay,
        }
    }

    /// Path of the structured documentation endpoint, when configured.
    pub fn docs_endpoint(&self) -> Option<&str> {
        self.docs_endpoint.as_deref()
    }

    /// Assemble the documentation for the given registry snapshot.
    ///
    /// Strategies aggregate over the routes as harvested, before sorting, so
    /// their order reflects route registration order. The overlay merges into
    /// all four collections before the sorters run.
    ///
    /// # Errors
    ///
    /// Propagates describer failures and malformed plugin metadata from the
    /// harvesters.
    pub fn document(&self, sources: &DocSources<'_>, query: &DocQuery) -> Result<ApiDocument> {
        let filter = RouteFilter {
            tags: query.tags.as_deref(),
            exclude_path: self.docs_endpoint.as_deref(),
        };
        let mut routes =
            build::harvest_routes(sources.routes, sources.auth, self.describer.as_ref(), &filter)?;
        let mut strategies = build::aggregate_strategies(&routes);
        let mut methods = build::harvest_methods(sources.methods, self.describer.as_ref())?;
        let mut events = build::harvest_events(sources.events);

        apply_overlay(&mut routes, &self.overlay.routes);
        apply_overlay(&mut methods, &self.overlay.methods);
        apply_overlay(&mut events, &self.overlay.events);
        apply_overlay(&mut strategies, &self.overlay.strategies);

        build::sort_routes(&mut routes);
        build::sort_methods(&mut methods);

        debug!(
            routes = routes.len(),
            methods = methods.len(),
            events = events.len(),
            strategies = strategies.len(),
            "document assembled"
        );
        Ok(ApiDocument { routes, methods, events, strategies })
    }

    /// Serialize a document to its wire JSON.
    pub fn to_json(&self, document: &ApiDocument) -> Result<Value> {
        serde_json::to_value(document).context("serializing api document")
    }

    /// Render a document as a single HTML page.
    pub fn render_html(&self, document: &ApiDocument) -> Result<String> {
        html::render(document, self.docs_endpoint.as_deref(), self.schema_renderer.as_deref())
    }
}
