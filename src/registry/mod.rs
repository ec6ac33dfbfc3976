//! # Registry Module
//!
//! The host-facing live registries the documentation engine introspects:
//! the route table, the namespaced method registry, the event registry, and
//! the authentication registry.
//!
//! These are the sole sources of truth for documentation. The engine borrows
//! them read-only on every call and never caches what it reads, so a record
//! added here is visible in the very next documentation request.

mod auth;
mod events;
mod methods;
mod routes;

pub use auth::{AuthDescriptor, AuthRegistry};
pub use events::{EventChannel, EventListener, EventRegistry, ListenerFn};
pub use methods::{CacheConfig, MethodFn, MethodNode, MethodRegistry, ServerMethod};
pub use routes::{RouteRecord, ValidationSpec};
