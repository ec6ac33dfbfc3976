//! # selfdoc
//!
//! **selfdoc** makes a running HTTP host describe itself: it harvests the
//! host's route table, server methods, event channels and auth strategies
//! into a structured document, served as JSON or rendered HTML.
//!
//! ## Overview
//!
//! Documentation is derived, never declared twice. The host registers routes,
//! methods, events and a default auth policy as part of its normal assembly;
//! the documentation endpoints read those registries live on every request,
//! so what they report is what the host actually runs at that moment. A
//! curated overlay can add prose on top, matched by route path or name, and
//! an injected describer/formatter pair decides how validation schemas are
//! explained and displayed.
//!
//! ## Architecture
//!
//! The library is organized into three modules:
//!
//! - **[`registry`]** - the host-side sources of truth: route records, the
//!   namespaced method registry, event channels, the default auth policy
//! - **[`docs`]** - the engine: harvesters, auth inheritance resolution,
//!   the meta overlay, deterministic sorting, JSON and HTML renderers
//! - **[`server`]** - host glue: a `may_minihttp` service exposing the
//!   documentation endpoints next to the host's own routes
//!
//! ## Quick Start
//!
//! ```no_run
//! use http::Method;
//! use selfdoc::docs::{DocEngine, DocOptions};
//! use selfdoc::registry::{AuthDescriptor, RouteRecord, ServerMethod};
//! use selfdoc::server::{DocService, HttpServer};
//! use serde_json::json;
//!
//! let engine = DocEngine::new(DocOptions {
//!     docs_endpoint: Some("/docs".to_string()),
//!     ..Default::default()
//! });
//! let service = DocService::new(engine);
//! service.set_default_auth(AuthDescriptor::new("required").strategy("session"));
//! service.route(
//!     RouteRecord::new(Method::GET, "/pets").tag("public"),
//!     |_req| (200, json!([])),
//! );
//! service.method("db.count", ServerMethod::new(|v| v)).unwrap();
//!
//! let handle = HttpServer(service).start("0.0.0.0:8080").unwrap();
//! handle.join().unwrap();
//! ```
//!
//! `GET /docs` now returns the structured document; `GET /docs?tags=public`
//! narrows it to matching routes.
//!
//! ## Features
//!
//! - **Live introspection**: registries are read per request, so documentation
//!   can never drift from the running host
//! - **Auth inheritance**: a host-wide default applies everywhere, and a
//!   route-local override reports both itself and what it displaced
//! - **Tag filtering**: `?tags=a,b` keeps routes carrying any requested tag
//! - **Curated overlay**: descriptions, tags and notes merged in by identity
//!   key, without touching the registries
//! - **Pluggable schemas**: a `SchemaDescriber` explains validation schemas,
//!   a `SchemaFormatter` turns them into HTML markup
//!
//! ## Runtime Considerations
//!
//! The demo server uses the `may` coroutine runtime, not tokio or async-std.
//! This means:
//!
//! - All handlers run in coroutines (lightweight threads)
//! - Stack size is configurable via `SELFDOC_STACK_SIZE` environment variable
//! - The runtime is incompatible with tokio-based libraries without bridging
//!
//! The engine itself is synchronous and runtime-agnostic; only the glue in
//! [`server`] binds to `may`.

pub mod docs;
pub mod registry;
pub mod runtime_config;
pub mod server;

pub use docs::{
    ApiDocument, DocEngine, DocOptions, DocOverlay, DocQuery, DocSources, MetaPatch,
    SchemaDescriber, SchemaFormatter,
};
pub use registry::{AuthDescriptor, RouteRecord, ServerMethod};
pub use server::{DocService, HttpServer};
