use super::request::{parse_request, ParsedRequest};
use super::response::{write_html, write_json, write_json_error};
use crate::docs::{DocEngine, DocQuery, DocSources};
use crate::registry::{
    AuthDescriptor, AuthRegistry, EventRegistry, MethodRegistry, RouteRecord, ServerMethod,
};
use anyhow::Result;
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Path served when the engine carries no endpoint of its own.
pub const DEFAULT_DOCS_PATH: &str = "/docs";

/// Handler invoked for a registered route. Returns a status code and a JSON
/// body.
pub type RouteHandler = Arc<dyn Fn(&ParsedRequest) -> (u16, Value) + Send + Sync>;

/// Access guard for the rendered documentation endpoint. Rejections become
/// 401 responses; the engine itself never enforces anything.
pub type HtmlGuard = Arc<dyn Fn(&ParsedRequest) -> bool + Send + Sync>;

/// The registries a host accumulates as it is assembled. The documentation
/// engine reads these fresh on every request.
#[derive(Debug, Default)]
pub struct HostState {
    pub routes: Vec<RouteRecord>,
    pub methods: MethodRegistry,
    pub events: EventRegistry,
    pub auth: AuthRegistry,
}

impl HostState {
    /// Borrow the registries as one engine input.
    pub fn sources(&self) -> DocSources<'_> {
        DocSources {
            routes: &self.routes,
            methods: &self.methods,
            events: &self.events,
            auth: &self.auth,
        }
    }
}

/// A self-describing HTTP host.
///
/// Routes, methods, events and the default auth policy register through this
/// service and land in shared [`HostState`]; the documentation endpoints
/// read that state live, so registrations made after startup show up on the
/// next request. The docs routes are entered in the host's own route table,
/// which is what makes the engine's self-exclusion observable.
pub struct DocService {
    engine: Arc<DocEngine>,
    state: Arc<RwLock<HostState>>,
    handlers: Arc<RwLock<HashMap<(String, String), RouteHandler>>>,
    docs_path: String,
    html_path: Option<String>,
    html_descriptor: Option<AuthDescriptor>,
    html_guard: Option<HtmlGuard>,
}

impl Clone for DocService {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            state: self.state.clone(),
            handlers: self.handlers.clone(),
            docs_path: self.docs_path.clone(),
            html_path: self.html_path.clone(),
            html_descriptor: self.html_descriptor.clone(),
            html_guard: self.html_guard.clone(),
        }
    }
}

impl DocService {
    /// Wrap an engine in a service. The structured documentation endpoint is
    /// taken from the engine's configuration, falling back to
    /// [`DEFAULT_DOCS_PATH`], and is registered as a route of the host.
    pub fn new(engine: DocEngine) -> Self {
        let docs_path = engine
            .docs_endpoint()
            .unwrap_or(DEFAULT_DOCS_PATH)
            .to_string();
        let service = Self {
            engine: Arc::new(engine),
            state: Arc::new(RwLock::new(HostState::default())),
            handlers: Arc::new(RwLock::new(HashMap::new())),
            docs_path: docs_path.clone(),
            html_path: None,
            html_descriptor: None,
            html_guard: None,
        };
        service
            .state
            .write()
            .unwrap()
            .routes
            .push(RouteRecord::new(Method::GET, docs_path));
        service
    }

    /// Serve the rendered documentation at `path` as well. The route is
    /// entered in the host's table like any other.
    pub fn html_endpoint(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.state
            .write()
            .unwrap()
            .routes
            .push(RouteRecord::new(Method::GET, path.clone()));
        self.html_path = Some(path);
        self.apply_html_descriptor();
        self
    }

    /// Guard the rendered endpoint. `descriptor` is what its route table
    /// entry advertises; `guard` is what actually decides, per request.
    /// Order relative to [`html_endpoint`](Self::html_endpoint) does not
    /// matter.
    pub fn with_html_guard(
        mut self,
        descriptor: Option<AuthDescriptor>,
        guard: impl Fn(&ParsedRequest) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.html_descriptor = descriptor;
        self.html_guard = Some(Arc::new(guard));
        self.apply_html_descriptor();
        self
    }

    fn apply_html_descriptor(&self) {
        let (Some(path), Some(descriptor)) = (&self.html_path, &self.html_descriptor) else {
            return;
        };
        let mut state = self.state.write().unwrap();
        if let Some(record) = state
            .routes
            .iter_mut()
            .find(|r| r.method == Method::GET && r.path == *path)
        {
            record.auth = Some(descriptor.clone());
        }
    }

    /// Shared registry state, for hosts that need direct access.
    pub fn state(&self) -> &Arc<RwLock<HostState>> {
        &self.state
    }

    /// Register a route and its handler. The record is what documentation
    /// reports; the handler is what dispatch invokes on an exact
    /// (method, path) match.
    pub fn route(
        &self,
        record: RouteRecord,
        handler: impl Fn(&ParsedRequest) -> (u16, Value) + Send + Sync + 'static,
    ) {
        let key = (record.method.as_str().to_string(), record.path.clone());
        self.state.write().unwrap().routes.push(record);
        self.handlers.write().unwrap().insert(key, Arc::new(handler));
    }

    /// Register a server method under a dot-qualified name.
    pub fn method(&self, name: &str, method: ServerMethod) -> Result<()> {
        self.state.write().unwrap().methods.register(name, method)
    }

    /// Subscribe a listener to an event channel, creating the channel if
    /// needed.
    pub fn on(&self, event: &str, id: Option<&str>, listener: impl Fn(&Value) + Send + Sync + 'static) {
        self.state.write().unwrap().events.on(event, id, listener);
    }

    /// Set the host-wide default auth policy.
    pub fn set_default_auth(&self, descriptor: AuthDescriptor) {
        self.state.write().unwrap().auth.set_default(descriptor);
    }

    /// Emit an event to its listeners. Returns how many ran.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        self.state.read().unwrap().events.emit(event, payload)
    }

    fn serve_docs(&self, parsed: &ParsedRequest, res: &mut Response) {
        let query = DocQuery {
            tags: parsed.query_params.get("tags").cloned(),
        };
        let state = self.state.read().unwrap();
        let result = self
            .engine
            .document(&state.sources(), &query)
            .and_then(|doc| self.engine.to_json(&doc));
        match result {
            Ok(body) => write_json(res, 200, &body),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "documentation build failed");
                write_json_error(
                    res,
                    500,
                    json!({ "error": "Documentation failed", "detail": format!("{err:#}") }),
                );
            }
        }
    }

    fn serve_html(&self, parsed: &ParsedRequest, res: &mut Response) {
        if let Some(guard) = &self.html_guard {
            if !guard(parsed) {
                write_json_error(res, 401, json!({ "error": "Unauthorized" }));
                return;
            }
        }
        let query = DocQuery {
            tags: parsed.query_params.get("tags").cloned(),
        };
        let state = self.state.read().unwrap();
        let result = self
            .engine
            .document(&state.sources(), &query)
            .and_then(|doc| self.engine.render_html(&doc));
        match result {
            Ok(body) => write_html(res, 200, body),
            Err(err) => {
                warn!(error = %format!("{err:#}"), "documentation render failed");
                write_json_error(
                    res,
                    500,
                    json!({ "error": "Documentation failed", "detail": format!("{err:#}") }),
                );
            }
        }
    }
}

impl HttpService for DocService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let parsed = parse_request(req);

        if parsed.method == "GET" && parsed.path == self.docs_path {
            self.serve_docs(&parsed, res);
            return Ok(());
        }
        if self.html_path.as_deref() == Some(parsed.path.as_str()) && parsed.method == "GET" {
            self.serve_html(&parsed, res);
            return Ok(());
        }

        let handler = {
            let handlers = self.handlers.read().unwrap();
            handlers
                .get(&(parsed.method.clone(), parsed.path.clone()))
                .cloned()
        };
        match handler {
            Some(handler) => {
                let (status, body) = handler(&parsed);
                debug!(method = %parsed.method, path = %parsed.path, status, "handler dispatched");
                write_json(res, status, &body);
            }
            None => {
                write_json_error(
                    res,
                    404,
                    json!({ "error": "Not Found", "method": parsed.method, "path": parsed.path }),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{DocOptions, DocQuery};

    fn engine_with_endpoint(path: &str) -> DocEngine {
        DocEngine::new(DocOptions {
            docs_endpoint: Some(path.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_new_registers_docs_route() {
        let service = DocService::new(engine_with_endpoint("/docs"));
        let state = service.state().read().unwrap();
        assert_eq!(state.routes.len(), 1);
        assert_eq!(state.routes[0].path, "/docs");
        assert_eq!(state.routes[0].method, Method::GET);
    }

    #[test]
    fn test_default_docs_path_without_engine_endpoint() {
        let service = DocService::new(DocEngine::new(DocOptions::default()));
        let state = service.state().read().unwrap();
        assert_eq!(state.routes[0].path, DEFAULT_DOCS_PATH);
    }

    #[test]
    fn test_html_guard_descriptor_applies_in_either_order() {
        let descriptor = AuthDescriptor::new("required").strategy("session");

        let guarded_first = DocService::new(engine_with_endpoint("/docs"))
            .with_html_guard(Some(descriptor.clone()), |_| true)
            .html_endpoint("/documentation");
        let endpoint_first = DocService::new(engine_with_endpoint("/docs"))
            .html_endpoint("/documentation")
            .with_html_guard(Some(descriptor.clone()), |_| true);

        for service in [guarded_first, endpoint_first] {
            let state = service.state().read().unwrap();
            let record = state
                .routes
                .iter()
                .find(|r| r.path == "/documentation")
                .unwrap();
            assert_eq!(record.auth.as_ref(), Some(&descriptor));
        }
    }

    #[test]
    fn test_route_registration_reaches_documentation() {
        let service = DocService::new(engine_with_endpoint("/docs"));
        service.route(RouteRecord::new(Method::GET, "/pets"), |_| (200, json!([])));

        let state = service.state().read().unwrap();
        let doc = service
            .engine
            .document(&state.sources(), &DocQuery::default())
            .unwrap();
        let paths: Vec<&str> = doc.routes.iter().map(|r| r.path.as_str()).collect();
        // the docs route excluded itself
        assert_eq!(paths, vec!["/pets"]);
    }
}
