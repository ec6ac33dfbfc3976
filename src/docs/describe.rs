use anyhow::Result;
use jsonschema::JSONSchema;
use serde_json::Value;

use super::types::SchemaDescription;

/// Converts a raw validation schema into the description the documentation
/// reports.
///
/// The host injects this capability; the engine never looks inside either the
/// input schema or the produced description. A describer failure is a
/// configuration defect at the boundary and propagates to the caller
/// untouched.
pub trait SchemaDescriber: Send + Sync {
    fn describe(&self, schema: &Value) -> Result<SchemaDescription>;
}

/// Formats a schema description as markup for an HTML table cell.
///
/// Configuring a formatter is what turns the schema columns on in the
/// rendered view. Output is embedded as-is, so implementations escape their
/// own text.
pub trait SchemaFormatter: Send + Sync {
    fn format(&self, description: &SchemaDescription) -> String;
}

/// Describer backed by the host's JSON Schema engine.
///
/// Compiles the value to surface malformed schemas at documentation time,
/// then passes the schema through as its own description.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaDescriber;

impl SchemaDescriber for JsonSchemaDescriber {
    fn describe(&self, schema: &Value) -> Result<SchemaDescription> {
        JSONSchema::compile(schema).map_err(|e| anyhow::anyhow!("invalid JSON schema: {e}"))?;
        Ok(schema.clone())
    }
}

/// Renders a description as compact JSON wrapped in a `<code>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaFormatter;

impl SchemaFormatter for JsonSchemaFormatter {
    fn format(&self, description: &SchemaDescription) -> String {
        format!("<code>{}</code>", escape_html(&description.to_string()))
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_describe_passes_schema_through() {
        let schema = json!({ "type": "object", "required": ["name"] });
        let described = JsonSchemaDescriber.describe(&schema).unwrap();
        assert_eq!(described, schema);
    }

    #[test]
    fn test_describe_rejects_malformed_schema() {
        let schema = json!({ "type": "no-such-type" });
        assert!(JsonSchemaDescriber.describe(&schema).is_err());
    }

    #[test]
    fn test_format_escapes_markup() {
        let description = json!({ "title": "<b>" });
        let cell = JsonSchemaFormatter.format(&description);
        assert!(cell.starts_with("<code>"));
        assert!(cell.contains("&lt;b&gt;"));
        assert!(!cell.contains("<b>"));
    }
}
