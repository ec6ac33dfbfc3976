//! The documentation engine.
//!
//! Everything in this module is a pure transform: harvesters read borrowed
//! registry state into doc records, the overlay merges curated annotations,
//! the sorters impose deterministic order, and the renderers emit JSON or
//! HTML. No registry is ever mutated and nothing is cached between calls,
//! so the output always reflects the host as it currently is.

mod build;
mod describe;
mod engine;
mod html;
mod overlay;
mod types;

pub use build::{
    aggregate_strategies, harvest_events, harvest_methods, harvest_routes, sort_methods,
    sort_routes, RouteFilter, PLUGIN_NAMESPACE,
};
pub use describe::{JsonSchemaDescriber, JsonSchemaFormatter, SchemaDescriber, SchemaFormatter};
pub use engine::{DocEngine, DocOptions, DocQuery, DocSources};
pub use overlay::{apply_overlay, DocOverlay, MetaPatch, OverlaySource};
pub use types::{
    ApiDocument, Documented, EventDoc, MethodDoc, RouteDoc, SchemaDescription, StrategyDoc,
    ANONYMOUS_HANDLER,
};
