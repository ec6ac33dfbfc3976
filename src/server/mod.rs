pub mod config;
pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use config::ServiceConfig;
pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, ParsedRequest};
pub use service::{DocService, HostState, HtmlGuard, RouteHandler, DEFAULT_DOCS_PATH};
