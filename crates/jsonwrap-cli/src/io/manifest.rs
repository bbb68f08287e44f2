//! Class manifest loading.
//!
//! A manifest declares classes as data, for hosts that have no Rust types:
//!
//! ```json
//! {
//!   "classes": [
//!     {"name": "User", "schema": {...}, "references": ["Credential"]},
//!     {"name": "Product", "schema": {...}, "defaults": {"uid": "98765"}}
//!   ],
//!   "config": {"annotation": "nested-only"}
//! }
//! ```
//!
//! `defaults` is the state every new instance starts from; without it
//! instances start as `{}`. A name declared twice keeps its first
//! declaration, as with any registry.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use jsonwrap_core::{ClassDescriptor, ClassRegistry, HydrationConfig};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::io::input;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
    #[serde(default)]
    pub config: HydrationConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default = "ClassDecl::default_schema")]
    pub schema: Value,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub defaults: Option<Value>,
}

impl ClassDecl {
    fn default_schema() -> Value {
        serde_json::json!({"type": "object"})
    }

    fn into_descriptor(self) -> ClassDescriptor {
        let descriptor = self
            .references
            .into_iter()
            .fold(ClassDescriptor::new(self.name, self.schema), |d, r| d.reference(r));
        match self.defaults {
            Some(defaults) => descriptor.defaults(defaults),
            None => descriptor,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("class name must not be empty")]
    EmptyName,
}

impl Manifest {
    pub fn parse(text: &str) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(text).context("invalid class manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = BTreeSet::new();
        for class in &self.classes {
            if class.name.trim().is_empty() {
                return Err(ManifestError::EmptyName);
            }
            seen.insert(class.name.as_str());
        }
        for class in &self.classes {
            for reference in class.references.iter().filter(|r| !seen.contains(r.as_str())) {
                tracing::warn!(
                    class = %class.name,
                    reference = %reference,
                    "referenced class is not declared; its nodes stay plain"
                );
            }
        }
        Ok(())
    }

    pub fn into_registry(self) -> Result<ClassRegistry> {
        let registry = ClassRegistry::with_config(self.config)?;
        for class in self.classes {
            registry.register(class.into_descriptor());
        }
        Ok(registry)
    }
}

/// Load a manifest file and build its registry.
pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<ClassRegistry> {
    let path = path.as_ref();
    let text = input::read_file(path)?;
    let manifest = Manifest::parse(&text).with_context(|| format!("in manifest {}", path.display()))?;
    tracing::debug!(path = %path.display(), classes = manifest.classes.len(), "manifest loaded");
    manifest.into_registry()
}
