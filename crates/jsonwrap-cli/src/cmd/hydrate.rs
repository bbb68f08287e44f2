use anyhow::{Context, Result};
use jsonwrap_core::traverse::format_path;
use jsonwrap_core::Instance;
use serde::Serialize;
use serde_json::Value;

use crate::io::{input, manifest};
use crate::output;

#[derive(Debug, Serialize)]
pub struct InstanceInfo {
    pub path: String,
    pub class: String,
}

#[derive(Debug, Serialize)]
pub struct HydrateOut {
    pub class: String,
    pub value: Value,
    pub instances: Vec<InstanceInfo>,
}

pub fn instance_infos(inst: &Instance) -> Vec<InstanceInfo> {
    inst.instances()
        .into_iter()
        .map(|(path, class)| InstanceInfo {
            path: format_path(&path),
            class,
        })
        .collect()
}

pub fn run(manifest_path: &str, input_path: &str, class: &str, explain: bool) -> Result<()> {
    let registry = manifest::load_registry(manifest_path)?;
    let text = input::read_text(input_path)?;
    let inst = registry
        .hydrate_str(class, &text)
        .with_context(|| format!("failed to hydrate {input_path} as {class}"))?;

    if !explain {
        return output::print(&inst);
    }
    output::print(&HydrateOut {
        class: inst.class().to_string(),
        value: inst.to_json_object(),
        instances: instance_infos(&inst),
    })
}
