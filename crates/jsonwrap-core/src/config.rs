//! Configuration structures for jsonwrap-core.
//!
//! All configuration is explicit: the core crate does not read environment
//! variables or files. Hosts (the CLI, applications) build a
//! [`HydrationConfig`] and hand it to a [`crate::ClassRegistry`].

use serde::{Deserialize, Serialize};

use crate::errors::{WrapError, WrapResult};
use crate::sample::SampleOptions;

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydrationConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub annotation: AnnotationPolicy,
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Options handed to the sample generator when building skeletons.
///
/// The defaults are the bounded configuration skeletons depend on: one
/// element per array, one extra level of reference expansion, required
/// fields only, nulls kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "SamplingConfig::default_max_ref_depth")]
    pub max_ref_depth: usize,
    #[serde(default = "SamplingConfig::default_items")]
    pub min_items: usize,
    #[serde(default = "SamplingConfig::default_items")]
    pub max_items: usize,
    #[serde(default = "SamplingConfig::default_required_only")]
    pub required_only: bool,
    #[serde(default)]
    pub omit_nulls: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_ref_depth: Self::default_max_ref_depth(),
            min_items: Self::default_items(),
            max_items: Self::default_items(),
            required_only: Self::default_required_only(),
            omit_nulls: false,
        }
    }
}

impl SamplingConfig {
    fn default_max_ref_depth() -> usize {
        1
    }
    fn default_items() -> usize {
        1
    }
    fn default_required_only() -> bool {
        true
    }

    pub fn to_options(&self) -> SampleOptions {
        SampleOptions {
            max_ref_depth: self.max_ref_depth,
            min_items: self.min_items,
            max_items: self.max_items,
            required_only: self.required_only,
            omit_nulls: self.omit_nulls,
        }
    }
}

/// How the annotator recomputes `required`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationPolicy {
    /// Require every field that is an object, an array or a `$class` marker.
    #[default]
    NestedOnly,
    /// As `NestedOnly`, plus a required `$class` marker naming the owning
    /// class at the schema root.
    SelfTagged,
}

impl AnnotationPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NestedOnly => "nested-only",
            Self::SelfTagged => "self-tagged",
        }
    }
}

/// Boundary limits for untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum JSON text size accepted by `parse_json_str`.
    #[serde(default = "LimitsConfig::default_max_input_bytes")]
    pub max_input_bytes: usize,
    /// Maximum nesting depth (objects plus arrays) of a hydrated input.
    #[serde(default = "LimitsConfig::default_max_depth")]
    pub max_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: Self::default_max_input_bytes(),
            max_depth: Self::default_max_depth(),
        }
    }
}

impl LimitsConfig {
    fn default_max_input_bytes() -> usize {
        64 * 1024 * 1024
    }
    fn default_max_depth() -> usize {
        4096
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &HydrationConfig) -> WrapResult<()> {
    if cfg.sampling.max_items == 0 {
        return Err(WrapError::invalid_config(
            "max_items must be at least 1 so arrays keep a template element",
        ));
    }

    if cfg.sampling.min_items > cfg.sampling.max_items {
        return Err(WrapError::invalid_config(
            "min_items must not exceed max_items",
        ));
    }

    if cfg.limits.max_input_bytes == 0 {
        return Err(WrapError::invalid_config(
            "max_input_bytes must be greater than zero",
        ));
    }

    if cfg.limits.max_depth == 0 {
        return Err(WrapError::invalid_config(
            "max_depth must be greater than zero",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = HydrationConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.sampling.min_items, 1);
        assert_eq!(cfg.sampling.max_items, 1);
        assert_eq!(cfg.sampling.max_ref_depth, 1);
        assert!(cfg.sampling.required_only);
        assert!(!cfg.sampling.omit_nulls);
    }

    #[test]
    fn inverted_item_bounds_detected() {
        let mut cfg = HydrationConfig::default();
        cfg.sampling.min_items = 3;
        cfg.sampling.max_items = 2;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn zero_depth_detected() {
        let mut cfg = HydrationConfig::default();
        cfg.limits.max_depth = 0;
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let cfg: HydrationConfig =
            serde_json::from_str(r#"{"annotation":"self-tagged","limits":{"max_depth":16}}"#)
                .unwrap();
        assert_eq!(cfg.annotation, AnnotationPolicy::SelfTagged);
        assert_eq!(cfg.limits.max_depth, 16);
        assert_eq!(cfg.sampling, SamplingConfig::default());
    }
}
