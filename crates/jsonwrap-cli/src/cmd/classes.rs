use anyhow::Result;
use serde::Serialize;

use crate::io::manifest;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ClassInfo {
    pub name: String,
    pub references: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassesOut {
    pub annotation: &'static str,
    pub classes: Vec<ClassInfo>,
}

pub fn run(manifest_path: &str) -> Result<()> {
    let registry = manifest::load_registry(manifest_path)?;

    let classes = registry
        .names()
        .into_iter()
        .filter_map(|name| registry.descriptor(&name))
        .map(|d| ClassInfo {
            name: d.name().to_string(),
            references: d.references().to_vec(),
        })
        .collect();

    output::print(&ClassesOut {
        annotation: registry.config().annotation.as_str(),
        classes,
    })
}
