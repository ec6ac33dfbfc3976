use std::sync::Arc;

use http::Method;
use selfdoc::docs::{DocEngine, DocOptions, DocQuery, DocSources, SchemaDescriber};
use selfdoc::registry::{
    AuthDescriptor, AuthRegistry, CacheConfig, EventRegistry, MethodRegistry, RouteRecord,
    ServerMethod, ValidationSpec,
};
use serde_json::{json, Value};

struct Host {
    routes: Vec<RouteRecord>,
    methods: MethodRegistry,
    events: EventRegistry,
    auth: AuthRegistry,
}

impl Host {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            methods: MethodRegistry::new(),
            events: EventRegistry::new(),
            auth: AuthRegistry::new(),
        }
    }

    fn sources(&self) -> DocSources<'_> {
        DocSources {
            routes: &self.routes,
            methods: &self.methods,
            events: &self.events,
            auth: &self.auth,
        }
    }
}

fn engine() -> DocEngine {
    DocEngine::new(DocOptions::default())
}

fn tags_query(tags: &str) -> DocQuery {
    DocQuery {
        tags: Some(tags.to_string()),
    }
}

fn route_order(engine: &DocEngine, host: &Host, query: &DocQuery) -> Vec<(String, String)> {
    engine
        .document(&host.sources(), query)
        .unwrap()
        .routes
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect()
}

#[test]
fn test_routes_sorted_by_path_with_stable_method_order() {
    let mut host = Host::new();
    host.routes.push(RouteRecord::new(Method::POST, "/appian"));
    host.routes.push(RouteRecord::new(Method::GET, "/appian"));
    host.routes.push(RouteRecord::new(Method::GET, "/khyber"));

    let order = route_order(&engine(), &host, &DocQuery::default());
    assert_eq!(
        order,
        vec![
            ("post".to_string(), "/appian".to_string()),
            ("get".to_string(), "/appian".to_string()),
            ("get".to_string(), "/khyber".to_string()),
        ]
    );
}

#[test]
fn test_tag_filter_keeps_routes_matching_any_requested_tag() {
    let mut host = Host::new();
    host.routes
        .push(RouteRecord::new(Method::GET, "/sessions").tag("secure"));
    host.routes
        .push(RouteRecord::new(Method::GET, "/widgets").tag("api").tag("internal"));
    host.routes
        .push(RouteRecord::new(Method::GET, "/sandbox").tag("development"));
    host.routes.push(RouteRecord::new(Method::GET, "/plain"));

    let order = route_order(&engine(), &host, &tags_query("secure,api"));
    let paths: Vec<&str> = order.iter().map(|(_, p)| p.as_str()).collect();
    // /widgets carries only one of the requested tags and still matches;
    // untagged routes never match a filter
    assert_eq!(paths, vec!["/sessions", "/widgets"]);
}

#[test]
fn test_empty_tag_filter_behaves_as_absent() {
    let mut host = Host::new();
    host.routes
        .push(RouteRecord::new(Method::GET, "/tagged").tag("api"));
    host.routes.push(RouteRecord::new(Method::GET, "/plain"));

    let all = route_order(&engine(), &host, &DocQuery::default());
    assert_eq!(route_order(&engine(), &host, &tags_query("")), all);
    assert_eq!(route_order(&engine(), &host, &tags_query(",,")), all);
}

#[test]
fn test_documenting_twice_yields_identical_output() {
    let mut host = Host::new();
    host.auth
        .set_default(AuthDescriptor::new("required").strategy("session"));
    host.routes.push(
        RouteRecord::new(Method::POST, "/pets")
            .tag("pets")
            .notes("Add a pet")
            .validate(ValidationSpec::new().payload(json!({ "type": "object" }))),
    );
    host.routes.push(
        RouteRecord::new(Method::GET, "/admin")
            .auth(AuthDescriptor::new("required").strategy("admin-token")),
    );
    host.methods
        .register(
            "db.count",
            ServerMethod::new(|v| v).cache(CacheConfig { expires_in_ms: 1_000 }),
        )
        .unwrap();
    host.events.on("startup", Some("warm"), |_| {});

    let engine = engine();
    let first = engine.document(&host.sources(), &DocQuery::default()).unwrap();
    let second = engine.document(&host.sources(), &DocQuery::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_default_auth_inherited_and_override_reported() {
    let mut host = Host::new();
    host.auth
        .set_default(AuthDescriptor::new("required").strategy("session"));
    host.routes.push(RouteRecord::new(Method::GET, "/inherited"));
    host.routes.push(
        RouteRecord::new(Method::GET, "/overridden")
            .auth(AuthDescriptor::new("try").strategy("token")),
    );

    let doc = engine().document(&host.sources(), &DocQuery::default()).unwrap();
    let inherited = doc.routes.iter().find(|r| r.path == "/inherited").unwrap();
    assert_eq!(inherited.auth.as_ref().unwrap().mode, "required");
    assert!(inherited.overridden_auth.is_none());

    let overridden = doc.routes.iter().find(|r| r.path == "/overridden").unwrap();
    assert_eq!(overridden.auth.as_ref().unwrap().mode, "try");
    assert_eq!(overridden.overridden_auth.as_ref().unwrap().mode, "required");
}

#[test]
fn test_local_auth_without_default_reports_no_override() {
    let mut host = Host::new();
    host.routes.push(
        RouteRecord::new(Method::GET, "/local")
            .auth(AuthDescriptor::new("try").strategy("token")),
    );
    host.routes.push(RouteRecord::new(Method::GET, "/plain"));

    let doc = engine().document(&host.sources(), &DocQuery::default()).unwrap();
    let local = doc.routes.iter().find(|r| r.path == "/local").unwrap();
    assert_eq!(local.auth.as_ref().unwrap().mode, "try");
    assert!(local.overridden_auth.is_none());

    let plain = doc.routes.iter().find(|r| r.path == "/plain").unwrap();
    assert!(plain.auth.is_none());
    assert!(plain.overridden_auth.is_none());
}

#[test]
fn test_method_names_qualified_and_sorted_case_insensitively() {
    let mut host = Host::new();
    host.methods.register("zeta", ServerMethod::new(|v| v)).unwrap();
    host.methods.register("a.b.c", ServerMethod::new(|v| v)).unwrap();
    host.methods
        .register("Auth.check", ServerMethod::new(|v| v))
        .unwrap();
    host.methods
        .register("auth.revoke", ServerMethod::new(|v| v))
        .unwrap();

    let doc = engine().document(&host.sources(), &DocQuery::default()).unwrap();
    let names: Vec<&str> = doc.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["a.b.c", "Auth.check", "auth.revoke", "zeta"]);
}

#[test]
fn test_method_schema_described_and_cache_flag_serialized() {
    let schema = json!({
        "type": "object",
        "properties": { "id": { "type": "integer" } }
    });
    let mut host = Host::new();
    host.methods
        .register(
            "db.lookup",
            ServerMethod::new(|v| v)
                .schema(schema.clone())
                .cache(CacheConfig { expires_in_ms: 5_000 }),
        )
        .unwrap();
    host.methods
        .register("db.flush", ServerMethod::new(|v| v))
        .unwrap();

    let engine = engine();
    let doc = engine.document(&host.sources(), &DocQuery::default()).unwrap();
    let json = engine.to_json(&doc).unwrap();
    let methods = json["methods"].as_array().unwrap();

    let flush = &methods[0];
    assert_eq!(flush["name"], "db.flush");
    assert!(flush.get("cacheEnabled").is_none());
    assert!(flush.get("schema").is_none());

    let lookup = &methods[1];
    assert_eq!(lookup["name"], "db.lookup");
    assert_eq!(lookup["cacheEnabled"], json!(true));
    assert_eq!(lookup["schema"], schema);
}

#[test]
fn test_manual_validation_override_replaces_declared_spec() {
    let override_payload = json!({
        "type": "object",
        "properties": { "pName": {}, "pHash": {}, "pid": {} }
    });
    let mut host = Host::new();
    host.routes.push(
        RouteRecord::new(Method::POST, "/profiles")
            .validate(
                ValidationSpec::new()
                    .payload(json!({
                        "type": "object",
                        "properties": { "name": {}, "hash": {}, "id": {} }
                    }))
                    .query(json!({ "type": "object" })),
            )
            .plugin(
                "selfdoc",
                json!({ "validate": { "payload": override_payload.clone() } }),
            ),
    );

    let doc = engine().document(&host.sources(), &DocQuery::default()).unwrap();
    // the override is the whole validation story, not a field-level merge
    assert_eq!(doc.routes[0].payload.as_ref(), Some(&override_payload));
    assert!(doc.routes[0].query.is_none());
}

#[test]
fn test_strategy_aggregation_first_seen_deduplicated() {
    let mut host = Host::new();
    host.routes.push(
        RouteRecord::new(Method::GET, "/a").auth(AuthDescriptor::new("required").strategy("local")),
    );
    host.routes.push(
        RouteRecord::new(Method::GET, "/b").auth(AuthDescriptor::new("required").strategy("local")),
    );
    host.routes.push(
        RouteRecord::new(Method::GET, "/c")
            .auth(AuthDescriptor::new("required").strategy("default")),
    );

    let doc = engine().document(&host.sources(), &DocQuery::default()).unwrap();
    let names: Vec<&str> = doc.strategies.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["local", "default"]);
}

#[test]
fn test_events_listed_with_handlers_in_subscription_order() {
    let mut host = Host::new();
    host.events.on("db.connected", Some("rebuild_cache"), |_| {});
    host.events.on("db.connected", None, |_| {});
    host.events.on("shutdown", Some("flush_logs"), |_| {});
    host.events.register("silent");

    let doc = engine().document(&host.sources(), &DocQuery::default()).unwrap();
    assert_eq!(doc.events.len(), 2);
    assert_eq!(doc.events[0].name, "db.connected");
    assert_eq!(doc.events[0].handlers, vec!["rebuild_cache", "(anonymous)"]);
    assert_eq!(doc.events[1].name, "shutdown");
}

#[test]
fn test_absent_fields_are_omitted_from_json() {
    let mut host = Host::new();
    host.routes.push(RouteRecord::new(Method::GET, "/bare"));

    let engine = engine();
    let doc = engine.document(&host.sources(), &DocQuery::default()).unwrap();
    let json = engine.to_json(&doc).unwrap();

    let route = json["routes"][0].as_object().unwrap();
    assert_eq!(route.len(), 2);
    assert_eq!(route["path"], "/bare");
    assert_eq!(route["method"], "get");
    assert!(!json.to_string().contains("null"));
}

#[test]
fn test_docs_endpoint_excluded_from_its_own_output() {
    let mut host = Host::new();
    host.routes.push(RouteRecord::new(Method::GET, "/docs"));
    host.routes.push(RouteRecord::new(Method::GET, "/pets"));

    let engine = DocEngine::new(DocOptions {
        docs_endpoint: Some("/docs".to_string()),
        ..Default::default()
    });
    let doc = engine.document(&host.sources(), &DocQuery::default()).unwrap();
    let paths: Vec<&str> = doc.routes.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["/pets"]);
}

#[test]
fn test_describer_failure_propagates() {
    struct FailingDescriber;
    impl SchemaDescriber for FailingDescriber {
        fn describe(&self, _schema: &Value) -> anyhow::Result<Value> {
            anyhow::bail!("unsupported schema dialect")
        }
    }

    let mut host = Host::new();
    host.routes.push(
        RouteRecord::new(Method::POST, "/pets")
            .validate(ValidationSpec::new().payload(json!({ "type": "object" }))),
    );

    let engine = DocEngine::with_describer(Arc::new(FailingDescriber), DocOptions::default());
    let err = engine
        .document(&host.sources(), &DocQuery::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("unsupported schema dialect"));
}

#[test]
fn test_invalid_schema_rejected_by_stock_describer() {
    let mut host = Host::new();
    host.routes.push(
        RouteRecord::new(Method::POST, "/pets")
            .validate(ValidationSpec::new().payload(json!({ "type": 12 }))),
    );

    assert!(engine().document(&host.sources(), &DocQuery::default()).is_err());
}

#[test]
fn test_malformed_plugin_override_propagates() {
    let mut host = Host::new();
    host.routes.push(
        RouteRecord::new(Method::POST, "/pets")
            .plugin("selfdoc", json!({ "validate": ["not", "a", "spec"] })),
    );

    let err = engine()
        .document(&host.sources(), &DocQuery::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("/pets"));
}
