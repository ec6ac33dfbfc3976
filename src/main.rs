use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use http::Method;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use selfdoc::docs::{DocEngine, DocOptions, JsonSchemaFormatter, OverlaySource, SchemaFormatter};
use selfdoc::registry::{AuthDescriptor, CacheConfig, RouteRecord, ServerMethod, ValidationSpec};
use selfdoc::runtime_config::RuntimeConfig;
use selfdoc::server::{DocService, HttpServer, ServiceConfig};

/// Demo host: a small pet store that documents itself.
#[derive(Parser)]
#[command(name = "selfdoc")]
#[command(about = "Self-describing demo host", long_about = None)]
struct Cli {
    /// YAML config file; the flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long)]
    addr: Option<String>,

    /// Structured documentation endpoint
    #[arg(long)]
    docs_path: Option<String>,

    /// Rendered documentation endpoint
    #[arg(long)]
    html_path: Option<String>,

    /// Include schema columns in HTML output
    #[arg(long, default_value_t = false)]
    render_schema: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(addr) = cli.addr {
        config.addr = addr;
    }
    if let Some(docs_path) = cli.docs_path {
        config.docs_path = docs_path;
    }
    if let Some(html_path) = cli.html_path {
        config.html_path = Some(html_path);
    }
    if cli.render_schema {
        config.render_schema = true;
    }

    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let schema_renderer: Option<Arc<dyn SchemaFormatter>> = if config.render_schema {
        Some(Arc::new(JsonSchemaFormatter))
    } else {
        None
    };
    let engine = DocEngine::new(DocOptions {
        docs_endpoint: Some(config.docs_path.clone()),
        schema_renderer,
        overlay: config.overlay.clone().map(OverlaySource::Static),
    });

    let mut service = DocService::new(engine);
    if let Some(html_path) = &config.html_path {
        service = service.html_endpoint(html_path.clone());
    }
    register_sample_host(&service)?;

    service.emit("host.startup", &json!({ "addr": config.addr }));

    info!(addr = %config.addr, docs_path = %config.docs_path, "selfdoc demo host listening");
    let handle = HttpServer(service).start(config.addr.as_str())?;
    handle
        .join()
        .map_err(|e| anyhow::anyhow!("server failed: {e:?}"))?;
    Ok(())
}

/// A pet store worth documenting: tagged routes with validation schemas, an
/// auth override, namespaced methods, and event listeners.
fn register_sample_host(service: &DocService) -> Result<()> {
    service.set_default_auth(AuthDescriptor::new("required").strategy("session"));

    service.route(
        RouteRecord::new(Method::GET, "/pets")
            .tag("pets")
            .tag("public")
            .notes("List every pet in the store")
            .validate(ValidationSpec::new().query(json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "minimum": 1 },
                    "offset": { "type": "integer", "minimum": 0 }
                }
            }))),
        |_req| {
            (
                200,
                json!([
                    { "name": "Fluffy", "species": "Cat" },
                    { "name": "Rex", "species": "Dog" }
                ]),
            )
        },
    );

    let state = service.state().clone();
    service.route(
        RouteRecord::new(Method::POST, "/pets")
            .tag("pets")
            .notes("Add a pet")
            .validate(ValidationSpec::new().payload(json!({
                "type": "object",
                "required": ["name", "species"],
                "properties": {
                    "name": { "type": "string" },
                    "species": { "type": "string" }
                }
            }))),
        move |req| {
            let pet = req.body.clone().unwrap_or_else(|| json!({}));
            state.read().unwrap().events.emit("pet.created", &pet);
            (201, pet)
        },
    );

    let state = service.state().clone();
    service.route(
        RouteRecord::new(Method::GET, "/pets/count").tag("pets"),
        move |_req| {
            let state = state.read().unwrap();
            match state.methods.get("db.pets.count") {
                Some(method) => (200, json!({ "count": (method.callable)(json!(null)) })),
                None => (500, json!({ "error": "method missing" })),
            }
        },
    );

    service.route(
        RouteRecord::new(Method::GET, "/admin/settings")
            .tag("admin")
            .notes("Host settings, admins only")
            .auth(AuthDescriptor::new("required").strategy("admin-token")),
        |_req| (200, json!({ "maintenance": false })),
    );

    service.method(
        "db.pets.count",
        ServerMethod::new(|_| json!(2))
            .description("Number of pets in the store")
            .cache(CacheConfig { expires_in_ms: 60_000 }),
    )?;
    service.method(
        "mailer.send",
        ServerMethod::new(|v| v)
            .description("Queue an outbound mail")
            .schema(json!({
                "type": "object",
                "required": ["to"],
                "properties": { "to": { "type": "string", "format": "email" } }
            })),
    )?;

    service.on("host.startup", Some("warm_cache"), |payload| {
        info!(?payload, "cache warmed");
    });
    service.on("host.startup", None, |_| {});
    service.on("pet.created", Some("notify_keeper"), |payload| {
        info!(?payload, "keeper notified");
    });

    Ok(())
}
