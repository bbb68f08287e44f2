use anyhow::{bail, Result};
use jsonwrap_core::sample::SampleOptions;

use crate::io::manifest;
use crate::output;

pub fn run(manifest_path: &str, class: &str, depth: usize, items: usize, all_fields: bool) -> Result<()> {
    if items == 0 {
        bail!("--items must be at least 1");
    }
    let registry = manifest::load_registry(manifest_path)?;

    let mut options = SampleOptions::fixture(depth, items);
    options.required_only = !all_fields;
    output::print(&registry.sample(class, &options)?)
}
