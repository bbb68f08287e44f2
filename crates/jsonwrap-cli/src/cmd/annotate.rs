use anyhow::Result;

use crate::io::manifest;
use crate::output;

pub fn run(manifest_path: &str, class: &str) -> Result<()> {
    let registry = manifest::load_registry(manifest_path)?;
    output::print(&registry.annotated_schema(class)?)
}
