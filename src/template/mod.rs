//! # Templates
//!
//! A template descriptor is a named bundle of markup plus a style table.
//! The markup drives both output paths through one parser and one binder;
//! the style table is declarative data shared by the PDF and HTML renderers.

pub mod binder;
pub mod cache;
pub mod parser;

mod builtin;

use std::collections::HashMap;

use crate::error::VitaeError;
use crate::style::StyleMap;

pub use binder::{bind, BindContext, BoundChild, BoundNode, BoundValue};
pub use cache::RenderCache;
pub use parser::{parse, AttrValue, ElementNode, ParseError, TemplateNode};

/// A named bundle of markup and styles driving one rendering path.
#[derive(Debug, Clone)]
pub struct TemplateDescriptor {
    /// Unique within a registry; the cache key.
    pub id: String,
    /// Human-facing display name.
    pub name: String,
    pub markup: String,
    pub style_sheet: StyleMap,
}

impl TemplateDescriptor {
    /// Compile the markup, mapping a parse failure to the distinct
    /// "template invalid" condition carrying this template's identity.
    pub fn compile(&self) -> Result<ElementNode, VitaeError> {
        parse(&self.markup).map_err(|e| VitaeError::Template {
            id: self.id.clone(),
            name: self.name.clone(),
            message: e.message,
            position: e.position,
        })
    }
}

/// Static mapping from template identifier to descriptor.
///
/// Unknown identifiers are the caller's problem: `get` returns `None` and
/// the collaborator decides what to do about it.
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: HashMap<String, TemplateDescriptor>,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Registry seeded with the built-in resume templates.
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        for descriptor in [builtin::onyx(), builtin::carbon()] {
            templates.insert(descriptor.id.clone(), descriptor);
        }
        Self { templates }
    }

    pub fn get(&self, id: &str) -> Option<&TemplateDescriptor> {
        self.templates.get(id)
    }

    /// Register or replace a descriptor, e.g. a user-supplied template.
    pub fn register(&mut self, descriptor: TemplateDescriptor) {
        self.templates.insert(descriptor.id.clone(), descriptor);
    }

    /// (id, display name) pairs, unordered.
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.templates
            .values()
            .map(|t| (t.id.as_str(), t.name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates_compile() {
        let registry = TemplateRegistry::new();
        for (id, _) in registry.list() {
            let descriptor = registry.get(id).unwrap();
            descriptor
                .compile()
                .unwrap_or_else(|e| panic!("built-in template '{id}' must compile: {e}"));
        }
    }

    #[test]
    fn test_unknown_id_is_none() {
        let registry = TemplateRegistry::new();
        assert!(registry.get("no-such-template").is_none());
    }

    #[test]
    fn test_compile_error_carries_template_identity() {
        let descriptor = TemplateDescriptor {
            id: "broken".into(),
            name: "Broken".into(),
            markup: "<a><b></a></b>".into(),
            style_sheet: StyleMap::new(),
        };
        match descriptor.compile() {
            Err(VitaeError::Template { id, name, .. }) => {
                assert_eq!(id, "broken");
                assert_eq!(name, "Broken");
            }
            other => panic!("expected a template error, got {other:?}"),
        }
    }

    #[test]
    fn test_register_replaces_descriptor() {
        let mut registry = TemplateRegistry::new();
        registry.register(TemplateDescriptor {
            id: "onyx".into(),
            name: "Custom Onyx".into(),
            markup: "<view />".into(),
            style_sheet: StyleMap::new(),
        });
        assert_eq!(registry.get("onyx").unwrap().name, "Custom Onyx");
    }
}
