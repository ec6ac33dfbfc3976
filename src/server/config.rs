use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use super::service::DEFAULT_DOCS_PATH;
use crate::docs::DocOverlay;

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_docs_path() -> String {
    DEFAULT_DOCS_PATH.to_string()
}

/// Demo host configuration, loaded from a YAML file. Every field has a
/// default, so a partial file (or none at all) is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Bind address.
    pub addr: String,
    /// Path of the structured documentation endpoint.
    pub docs_path: String,
    /// Path of the rendered documentation endpoint, when one is wanted.
    pub html_path: Option<String>,
    /// Whether HTML output includes schema columns.
    pub render_schema: bool,
    /// Inline curated annotations.
    pub overlay: Option<DocOverlay>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            docs_path: default_docs_path(),
            html_path: None,
            render_schema: false,
            overlay: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse as a config
    /// document.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
