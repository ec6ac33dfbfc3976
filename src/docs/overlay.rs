use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::types::Documented;

/// Annotations applied to one documented item.
///
/// Every field is optional; only the present ones touch the target. None of
/// them can rename the item, so overlay keys stay stable across merges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Curated annotations keyed by item identity: routes by path, everything
/// else by name. Entries that match nothing are silently ignored, so an
/// overlay can be written ahead of the code it describes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocOverlay {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub routes: HashMap<String, MetaPatch>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub methods: HashMap<String, MetaPatch>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub events: HashMap<String, MetaPatch>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub strategies: HashMap<String, MetaPatch>,
}

impl DocOverlay {
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
            && self.methods.is_empty()
            && self.events.is_empty()
            && self.strategies.is_empty()
    }
}

/// How an overlay reaches the engine: a ready value, or a producer invoked
/// once at engine construction. The producer form suits hosts that assemble
/// annotations from files or remote config at startup.
pub enum OverlaySource {
    Static(DocOverlay),
    Producer(Box<dyn FnOnce() -> DocOverlay + Send>),
}

impl OverlaySource {
    pub(crate) fn resolve(self) -> DocOverlay {
        match self {
            OverlaySource::Static(overlay) => overlay,
            OverlaySource::Producer(producer) => producer(),
        }
    }
}

impl std::fmt::Debug for OverlaySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlaySource::Static(overlay) => f.debug_tuple("Static").field(overlay).finish(),
            OverlaySource::Producer(_) => f.debug_tuple("Producer").field(&"<closure>").finish(),
        }
    }
}

/// Merge patches into harvested docs, matched by each item's identity key.
pub fn apply_overlay<D: Documented>(docs: &mut [D], patches: &HashMap<String, MetaPatch>) {
    if patches.is_empty() {
        return;
    }
    for doc in docs {
        if let Some(patch) = patches.get(doc.doc_key()) {
            doc.merge_meta(patch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::types::{MethodDoc, RouteDoc};

    fn patch(description: &str) -> MetaPatch {
        MetaPatch { description: Some(description.to_string()), ..Default::default() }
    }

    #[test]
    fn test_patch_fields_overwrite_matched_route() {
        let mut docs = vec![RouteDoc::new("/pets", "get")];
        docs[0].notes = Some("from the route table".into());
        let mut patches = HashMap::new();
        patches.insert(
            "/pets".to_string(),
            MetaPatch {
                description: Some("List pets".into()),
                tags: Some(vec!["public".into()]),
                notes: Some("curated".into()),
            },
        );
        apply_overlay(&mut docs, &patches);
        assert_eq!(docs[0].description.as_deref(), Some("List pets"));
        assert_eq!(docs[0].tags.as_deref(), Some(&["public".to_string()][..]));
        assert_eq!(docs[0].notes.as_deref(), Some("curated"));
    }

    #[test]
    fn test_partial_patch_leaves_other_fields() {
        let mut docs = vec![RouteDoc::new("/pets", "get")];
        docs[0].notes = Some("kept".into());
        let mut patches = HashMap::new();
        patches.insert("/pets".to_string(), patch("only description"));
        apply_overlay(&mut docs, &patches);
        assert_eq!(docs[0].description.as_deref(), Some("only description"));
        assert_eq!(docs[0].notes.as_deref(), Some("kept"));
    }

    #[test]
    fn test_unmatched_entries_are_ignored() {
        let mut docs = vec![RouteDoc::new("/pets", "get")];
        let mut patches = HashMap::new();
        patches.insert("/ghosts".to_string(), patch("never lands"));
        apply_overlay(&mut docs, &patches);
        assert!(docs[0].description.is_none());
    }

    #[test]
    fn test_method_patch_cannot_rename() {
        let mut docs = vec![MethodDoc {
            name: "users.create".into(),
            description: None,
            schema: None,
            cache_enabled: None,
        }];
        let mut patches = HashMap::new();
        patches.insert("users.create".to_string(), patch("Creates a user"));
        apply_overlay(&mut docs, &patches);
        assert_eq!(docs[0].name, "users.create");
        assert_eq!(docs[0].description.as_deref(), Some("Creates a user"));
    }

    #[test]
    fn test_overlay_yaml_shape() {
        let overlay: DocOverlay = serde_yaml::from_str(
            r#"
routes:
  /pets:
    description: List pets
strategies:
  session:
    description: Cookie session
"#,
        )
        .unwrap();
        assert_eq!(
            overlay.routes.get("/pets").and_then(|p| p.description.as_deref()),
            Some("List pets")
        );
        assert!(overlay.methods.is_empty());
        assert!(!overlay.is_empty());
    }
}
