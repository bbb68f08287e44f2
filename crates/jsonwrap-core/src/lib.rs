//! jsonwrap-core
//!
//! Schema-driven hydration of plain JSON into class-tagged object graphs:
//! - schema annotation (`$ref` edges become `$class` markers)
//! - minimal skeletons: one class instance per input branch, pruned to the
//!   paths the input actually has, terminating on recursive schemas
//! - typed deep merge of the input over the skeleton
//! - a name-keyed class registry with once-initialized per-class caches
//!
//! The core performs no I/O and never validates input against schemas;
//! schemas only route values to classes.

pub mod annotate;
pub mod class;
pub mod config;
pub mod errors;
mod merge;
pub mod node;
pub mod parse;
pub mod registry;
pub mod sample;
mod skeleton;
mod stack;
pub mod traverse;

pub use crate::class::{ClassDescriptor, ClassRef, Constructor, JsonClass};
pub use crate::config::{validate_config, AnnotationPolicy, HydrationConfig, LimitsConfig, SamplingConfig};
pub use crate::errors::{ConstructError, WrapError, WrapResult};
pub use crate::node::{Fields, Instance, Node};
pub use crate::registry::{ClassEntry, ClassRegistry};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::annotate::{annotate, CLASS_KEY};
    pub use crate::parse::parse_json_str;
    pub use crate::sample::{SampleGenerator, SampleOptions, SchemaResolver, SchemaSampler};
    pub use crate::traverse::{format_path, walk_mut, PathSegment, Visit};
    pub use crate::{
        ClassDescriptor, ClassRef, ClassRegistry, ConstructError, Fields, HydrationConfig, Instance,
        JsonClass, Node, WrapError, WrapResult,
    };
}
