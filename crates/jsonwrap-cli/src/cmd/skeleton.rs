use anyhow::{Context, Result};
use jsonwrap_core::parse::parse_json_str;
use serde::Serialize;
use serde_json::Value;

use crate::cmd::hydrate::{instance_infos, InstanceInfo};
use crate::io::{input, manifest};
use crate::output;

#[derive(Debug, Serialize)]
pub struct SkeletonOut {
    pub class: String,
    pub skeleton: Value,
    pub instances: Vec<InstanceInfo>,
}

pub fn run(manifest_path: &str, input_path: &str, class: &str) -> Result<()> {
    let registry = manifest::load_registry(manifest_path)?;
    let text = input::read_text(input_path)?;
    let value = parse_json_str(&text, &registry.config().limits)
        .with_context(|| format!("failed to parse {input_path}"))?;
    let skeleton = registry.build_skeleton(class, &value)?;

    output::print(&SkeletonOut {
        class: class.to_string(),
        skeleton: skeleton.to_json_object(),
        instances: instance_infos(&skeleton),
    })
}
