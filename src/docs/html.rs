use anyhow::{Context, Result};
use minijinja::{context, Environment};
use serde::Serialize;

use super::describe::SchemaFormatter;
use super::types::{ApiDocument, EventDoc, MethodDoc, RouteDoc, StrategyDoc};
use crate::registry::AuthDescriptor;

// Named with an .html suffix so the environment auto-escapes every
// interpolation; schema markup is the one deliberate `|safe` exception.
const TEMPLATE_NAME: &str = "docs.html";

const DOC_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>API Documentation</title>
<style>
  table {
    width: 100%;
    border-collapse: collapse;
  }
  th {
    text-align: left;
  }
  td, th {
    padding: 5px;
  }
  tr:nth-child(even) {
    background-color: #f2f2f2
  }
</style>
</head>
<body>
{%- macro menu() %}
<div style="float: right"><a href="#routes">Routes</a> | <a href="#methods">Methods</a> | <a href="#events">Events</a> | <a href="#strategies">Strategies</a></div>
{%- endmacro %}
{{ menu() }}
selfdoc v{{ version }}
<h1 id="routes">Routes</h1>
<table>
  <tr>
    <th>Path</th>
    <th>Method</th>
    <th>Description</th>
    <th>Auth</th>
    <th>Tags</th>
    {%- if render_schema %}
    <th>Payload Schema</th>
    <th>Query Schema</th>
    {%- endif %}
  </tr>
  {%- for r in routes %}
  <tr>
    <td>{% if r.method == "get" %}<a href="{{ r.path }}">{{ r.path }}</a>{% else %}{{ r.path }}{% endif %}</td>
    <td>{{ r.method }}</td>
    <td>{{ r.description }}</td>
    <td>{% if r.auth_mode %}<b>mode:</b> {{ r.auth_mode }} <b>strategies:</b> {{ r.auth_strategies }}{% if r.overridden_mode %}<br><i>overridden mode:</i> {{ r.overridden_mode }} <i>strategies:</i> {{ r.overridden_strategies }}{% endif %}{% endif %}</td>
    <td>{% for tag in r.tags %}{% if not loop.first %} , {% endif %}{% if tag_links %}<a href="?tags={{ tag }}">{{ tag }}</a>{% else %}{{ tag }}{% endif %}{% endfor %}</td>
    {%- if render_schema %}
    <td>{{ r.payload|safe }}</td>
    <td>{{ r.query|safe }}</td>
    {%- endif %}
  </tr>
  {%- endfor %}
</table>
{{ menu() }}
<h1 id="methods">Methods</h1>
<table>
  <tr>
    <th>Name</th>
    <th>Description</th>
    <th>Cached</th>
    {%- if render_schema %}
    <th>Schema</th>
    {%- endif %}
  </tr>
  {%- for m in methods %}
  <tr>
    <td>{{ m.name }}</td>
    <td>{{ m.description }}</td>
    <td>{{ m.cached }}</td>
    {%- if render_schema %}
    <td>{{ m.schema|safe }}</td>
    {%- endif %}
  </tr>
  {%- endfor %}
</table>
{{ menu() }}
<h1 id="events">Registered Events</h1>
<table>
  <tr>
    <th>Event Name</th>
    <th>Handlers</th>
    <th>Description</th>
  </tr>
  {%- for e in events %}
  <tr>
    <td>{{ e.name }}</td>
    <td>{{ e.handlers }}</td>
    <td>{{ e.description }}</td>
  </tr>
  {%- endfor %}
</table>
{{ menu() }}
<h1 id="strategies">Registered Strategies</h1>
<table>
  <tr>
    <th>Strategy Name</th>
    <th>Description</th>
  </tr>
  {%- for s in strategies %}
  <tr>
    <td>{{ s.name }}</td>
    <td>{{ s.description }}</td>
  </tr>
  {%- endfor %}
</table>
</body>
</html>
"##;

#[derive(Serialize)]
struct RouteRow {
    path: String,
    method: String,
    description: String,
    auth_mode: String,
    auth_strategies: String,
    overridden_mode: String,
    overridden_strategies: String,
    tags: Vec<String>,
    payload: String,
    query: String,
}

#[derive(Serialize)]
struct MethodRow {
    name: String,
    description: String,
    cached: String,
    schema: String,
}

#[derive(Serialize)]
struct EventRow {
    name: String,
    handlers: String,
    description: String,
}

#[derive(Serialize)]
struct StrategyRow {
    name: String,
    description: String,
}

/// Render the whole document as one HTML page.
///
/// `docs_endpoint` turns tag values into same-page filter links; `formatter`
/// turns the schema columns on and supplies their markup. Absent fields
/// become empty cells.
pub(crate) fn render(
    document: &ApiDocument,
    docs_endpoint: Option<&str>,
    formatter: Option<&dyn SchemaFormatter>,
) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, DOC_TEMPLATE)
        .context("registering documentation template")?;
    let template = env
        .get_template(TEMPLATE_NAME)
        .context("loading documentation template")?;
    template
        .render(context! {
            version => env!("CARGO_PKG_VERSION"),
            tag_links => docs_endpoint.is_some(),
            render_schema => formatter.is_some(),
            routes => route_rows(&document.routes, formatter),
            methods => method_rows(&document.methods, formatter),
            events => event_rows(&document.events),
            strategies => strategy_rows(&document.strategies),
        })
        .context("rendering documentation template")
}

fn route_rows(routes: &[RouteDoc], formatter: Option<&dyn SchemaFormatter>) -> Vec<RouteRow> {
    routes
        .iter()
        .map(|route| {
            let (auth_mode, auth_strategies) = auth_cell(route.auth.as_ref());
            let (overridden_mode, overridden_strategies) = auth_cell(route.overridden_auth.as_ref());
            RouteRow {
                path: route.path.clone(),
                method: route.method.clone(),
                description: route
                    .notes
                    .clone()
                    .or_else(|| route.description.clone())
                    .unwrap_or_default(),
                auth_mode,
                auth_strategies,
                overridden_mode,
                overridden_strategies,
                tags: route.tags.clone().unwrap_or_default(),
                payload: schema_cell(route.payload.as_ref(), formatter),
                query: schema_cell(route.query.as_ref(), formatter),
            }
        })
        .collect()
}

fn method_rows(methods: &[MethodDoc], formatter: Option<&dyn SchemaFormatter>) -> Vec<MethodRow> {
    methods
        .iter()
        .map(|method| MethodRow {
            name: method.name.clone(),
            description: method.description.clone().unwrap_or_default(),
            cached: if method.cache_enabled.unwrap_or(false) { "true" } else { "" }.to_string(),
            schema: schema_cell(method.schema.as_ref(), formatter),
        })
        .collect()
}

fn event_rows(events: &[EventDoc]) -> Vec<EventRow> {
    events
        .iter()
        .map(|event| EventRow {
            name: event.name.clone(),
            handlers: event.handlers.join(", "),
            description: event.description.clone().unwrap_or_default(),
        })
        .collect()
}

fn strategy_rows(strategies: &[StrategyDoc]) -> Vec<StrategyRow> {
    strategies
        .iter()
        .map(|strategy| StrategyRow {
            name: strategy.name.clone(),
            description: strategy.description.clone().unwrap_or_default(),
        })
        .collect()
}

fn auth_cell(auth: Option<&AuthDescriptor>) -> (String, String) {
    match auth {
        Some(descriptor) => (descriptor.mode.clone(), descriptor.strategies.join(", ")),
        None => (String::new(), String::new()),
    }
}

fn schema_cell(
    schema: Option<&serde_json::Value>,
    formatter: Option<&dyn SchemaFormatter>,
) -> String {
    match (schema, formatter) {
        (Some(schema), Some(formatter)) => formatter.format(schema),
        _ => String::new(),
    }
}
