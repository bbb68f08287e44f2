//! Skeleton building.
//!
//! A skeleton is the merge target for one class boundary: a default instance
//! of the class whose structure mirrors one sample of its annotated schema,
//! restricted to the branches the real input actually has.
//!
//! Steps:
//! 1. sample the annotated schema with the bounded sampling options
//! 2. walk the sample in document order; delete every node whose path exists
//!    neither in the input nor in the class's model instance, before looking
//!    at it any further (an array index matches any element)
//! 3. turn every surviving `{"$class": name}` node into a default instance
//!    of the named class, with the remaining sample fields laid over it;
//!    unknown names degrade to plain objects
//! 4. lay the result over a default instance of the class itself
//!
//! Paths are relative to the class boundary: nested classes build their own
//! skeletons against their own slice of the input.

use serde_json::Value;

use crate::annotate::CLASS_KEY;
use crate::errors::{WrapError, WrapResult};
use crate::node::{Instance, Node};
use crate::registry::{ClassEntry, ClassRegistry};
use crate::traverse::{format_path, value_has_branch, walk_mut, PathSegment, Visit};

pub(crate) fn build(registry: &ClassRegistry, entry: &ClassEntry, input: &Value) -> WrapResult<Instance> {
    let owner = entry.descriptor();
    let annotated = registry.annotated_of(entry);
    let model = registry.model_of(entry)?;

    let options = registry.config().sampling.to_options();
    let mut tree = Node::from(registry.sampler().generate(annotated, &options, registry));
    if let Node::Object(fields) = &mut tree {
        fields.remove(CLASS_KEY);
    }

    let cx = BuildCx {
        registry,
        owner: entry,
        input,
        model,
    };
    cx.resolve(&mut tree, &[])?;

    let mut skeleton = owner.construct()?;
    overlay(skeleton.state_mut(), tree);
    tracing::trace!(class = owner.name(), "skeleton built");
    Ok(skeleton)
}

struct BuildCx<'a> {
    registry: &'a ClassRegistry,
    owner: &'a ClassEntry,
    input: &'a Value,
    model: &'a Instance,
}

impl BuildCx<'_> {
    /// Prune and resolve markers in `tree`, which sits at `base` below the
    /// class boundary.
    fn resolve(&self, tree: &mut Node, base: &[PathSegment]) -> WrapResult<()> {
        let mut full = base.to_vec();
        walk_mut(tree, &mut |path: &[PathSegment], node: &Node| {
            full.truncate(base.len());
            full.extend_from_slice(path);

            if !full.is_empty() && !self.is_used(&full) {
                return Ok::<_, WrapError>(Visit::Delete);
            }
            match marker_name(node) {
                Some(name) => self.instantiate(node, name, &full).map(Visit::Replace),
                None => Ok(Visit::Descend),
            }
        })
    }

    /// A sampled array holds one template element; its path is in use when
    /// any element of the real array has the branch.
    fn is_used(&self, path: &[PathSegment]) -> bool {
        value_has_branch(self.input, path) || self.model.state().has_branch(path)
    }

    fn instantiate(&self, marker: &Node, name: Option<&str>, path: &[PathSegment]) -> WrapResult<Node> {
        let mut rest = strip_marker(marker);
        self.resolve(&mut rest, path)?;

        let resolved = name.and_then(|n| self.registry.resolve_marker(self.owner.descriptor(), n));
        match resolved {
            Some(entry) => {
                let mut inst = entry.descriptor().construct()?;
                // A bare marker adds nothing; scalar-state classes keep their default.
                if !matches!(&rest, Node::Object(fields) if fields.is_empty()) {
                    overlay(inst.state_mut(), rest);
                }
                Ok(Node::from(inst))
            }
            None => {
                tracing::debug!(
                    owner = self.owner.name(),
                    marker = name.unwrap_or("<unnamed>"),
                    path = %format_path(path),
                    "unresolved class marker; keeping plain structure"
                );
                Ok(rest)
            }
        }
    }
}

/// `Some(name)` for marker nodes; the inner option is `None` when the marker
/// carries no usable name.
fn marker_name(node: &Node) -> Option<Option<&str>> {
    match node {
        Node::Object(fields) => fields.get(CLASS_KEY).map(Node::as_str),
        _ => None,
    }
}

fn strip_marker(marker: &Node) -> Node {
    let mut rest = marker.clone();
    if let Node::Object(fields) = &mut rest {
        fields.remove(CLASS_KEY);
    }
    rest
}

/// Lay sample structure over a default state.
///
/// Structure is added, values are not: a source scalar never replaces
/// anything the target already has, so constructor defaults survive. Objects
/// merge by key, arrays by index, and a source instance or container replaces
/// a target that is neither.
pub(crate) fn overlay(target: &mut Node, source: Node) {
    match (target, source) {
        (target, source @ Node::Instance(_)) => *target = source,
        (Node::Instance(inst), source) => overlay(inst.state_mut(), source),
        (Node::Object(dst), Node::Object(src)) => {
            for (k, v) in src {
                match dst.get_mut(&k) {
                    Some(existing) => overlay(existing, v),
                    None => {
                        dst.insert(k, v);
                    }
                }
            }
        }
        (Node::Array(dst), Node::Array(src)) => {
            for (i, v) in src.into_iter().enumerate() {
                match dst.get_mut(i) {
                    Some(existing) => overlay(existing, v),
                    None => dst.push(v),
                }
            }
        }
        (target, source @ (Node::Object(_) | Node::Array(_))) => *target = source,
        _ => {}
    }
}
