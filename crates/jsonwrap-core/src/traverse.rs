//! Structural paths and in-place tree traversal.
//!
//! [`walk_mut`] visits every node of a [`Node`] tree pre-order, in document
//! order, handing the visitor the node's structural path. The visitor decides
//! per node whether to descend, skip the subtree, replace the node or delete
//! it. Deletions are applied after the siblings have been visited, so every
//! sibling is visited under its original path.

use std::fmt;

use serde_json::Value;

use crate::node::Node;

/// One step of a structural path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn key(k: impl Into<String>) -> Self {
        Self::Key(k.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => write!(f, "{}", k.replace('~', "~0").replace('/', "~1")),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Render a path as a JSON pointer (`""` for the root).
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for seg in path {
        out.push('/');
        out.push_str(&seg.to_string());
    }
    out
}

/// Visitor decision for a node.
#[derive(Debug)]
pub enum Visit {
    /// Keep the node and visit its children.
    Descend,
    /// Keep the node, do not visit its children.
    Skip,
    /// Replace the node; the replacement is not visited.
    Replace(Node),
    /// Remove the node from its parent. Deleting the root sets it to null.
    Delete,
}

/// Walk `root` pre-order. Class instances are transparent: their state is
/// visited under the instance's own path.
pub fn walk_mut<F, E>(root: &mut Node, visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&[PathSegment], &Node) -> Result<Visit, E>,
{
    let mut path = Vec::new();
    if !walk_node(root, &mut path, visitor)? {
        *root = Node::Null;
    }
    Ok(())
}

/// Returns false if the node must be removed from its parent.
fn walk_node<F, E>(node: &mut Node, path: &mut Vec<PathSegment>, visitor: &mut F) -> Result<bool, E>
where
    F: FnMut(&[PathSegment], &Node) -> Result<Visit, E>,
{
    match visitor(path, node)? {
        Visit::Descend => {}
        Visit::Skip => return Ok(true),
        Visit::Replace(replacement) => {
            *node = replacement;
            return Ok(true);
        }
        Visit::Delete => return Ok(false),
    }
    walk_children(node, path, visitor)?;
    Ok(true)
}

fn walk_children<F, E>(node: &mut Node, path: &mut Vec<PathSegment>, visitor: &mut F) -> Result<(), E>
where
    F: FnMut(&[PathSegment], &Node) -> Result<Visit, E>,
{
    match node {
        Node::Array(items) => {
            let mut keep = Vec::with_capacity(items.len());
            for (i, item) in items.iter_mut().enumerate() {
                path.push(PathSegment::Index(i));
                let kept = walk_node(item, path, visitor);
                path.pop();
                keep.push(kept?);
            }
            let mut flags = keep.into_iter();
            items.retain(|_| flags.next().unwrap_or(true));
        }
        Node::Object(fields) => {
            let mut doomed = Vec::new();
            for (k, v) in fields.iter_mut() {
                path.push(PathSegment::Key(k.clone()));
                let kept = walk_node(v, path, visitor);
                path.pop();
                if !kept? {
                    doomed.push(k.clone());
                }
            }
            for k in doomed {
                fields.remove(&k);
            }
        }
        Node::Instance(inst) => walk_children(inst.state_mut(), path, visitor)?,
        _ => {}
    }
    Ok(())
}

/// Returns true if `path` addresses an existing node of `value`.
pub fn value_has_path(value: &Value, path: &[PathSegment]) -> bool {
    let mut cur = value;
    for seg in path {
        let next = match (seg, cur) {
            (PathSegment::Key(k), Value::Object(map)) => map.get(k),
            (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
            _ => None,
        };
        match next {
            Some(v) => cur = v,
            None => return false,
        }
    }
    true
}

/// Returns true if some node of `value` sits at `path` when every
/// [`PathSegment::Index`] may stand for any element of its array.
///
/// Sample paths name the template element `0` of each array; this asks
/// whether any real element has that branch.
pub fn value_has_branch(value: &Value, path: &[PathSegment]) -> bool {
    let Some((seg, rest)) = path.split_first() else {
        return true;
    };
    match (seg, value) {
        (PathSegment::Key(k), Value::Object(map)) => map.get(k).is_some_and(|v| value_has_branch(v, rest)),
        (PathSegment::Index(_), Value::Array(items)) => items.iter().any(|v| value_has_branch(v, rest)),
        _ => false,
    }
}

/// Nesting depth of a value: scalars are 0, each object or array level adds 1.
pub fn value_depth(value: &Value) -> usize {
    let mut max = 0;
    let mut stack = vec![(value, 0usize)];
    while let Some((v, depth)) = stack.pop() {
        max = max.max(depth);
        match v {
            Value::Array(items) => stack.extend(items.iter().map(|i| (i, depth + 1))),
            Value::Object(map) => stack.extend(map.values().map(|i| (i, depth + 1))),
            _ => {}
        }
    }
    max
}
