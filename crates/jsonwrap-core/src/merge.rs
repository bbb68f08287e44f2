//! Typed deep merge.
//!
//! Hydration of one class boundary is "build the skeleton, then merge the
//! input over it". The merge is a plain recursive function over [`Node`]
//! with three special cases:
//! - a class instance in the skeleton hands its slice of the input to that
//!   class's own hydration, so nested classes get their own skeleton
//! - skeleton array against input array maps every input element through the
//!   skeleton's template element (index 0), at any array nesting depth
//! - everything else is an ordinary deep merge: input wins field by field,
//!   skeleton-only fields are kept
//!
//! The input is only read; every output node is freshly built.

use serde_json::Value;

use crate::errors::WrapResult;
use crate::node::{Fields, Instance, Node};
use crate::registry::{ClassEntry, ClassRegistry};
use crate::skeleton;
use crate::stack;

/// Hydrate `input` as an instance of the class held by `entry`.
pub(crate) fn hydrate_entry(registry: &ClassRegistry, entry: &ClassEntry, input: &Value) -> WrapResult<Instance> {
    let skeleton = skeleton::build(registry, entry, input)?;
    let state = merge(registry, skeleton.into_state(), input)?;
    Ok(Instance::new(entry.name(), state))
}

fn merge(registry: &ClassRegistry, skeleton: Node, input: &Value) -> WrapResult<Node> {
    stack::guard(|| merge_node(registry, skeleton, input))
}

fn merge_node(registry: &ClassRegistry, skeleton: Node, input: &Value) -> WrapResult<Node> {
    match (skeleton, input) {
        (Node::Instance(inst), input) => hydrate_nested(registry, &inst, input),
        (Node::Array(template), Value::Array(items)) => route_all(registry, template.first(), items),
        (Node::Object(mut fields), Value::Object(map)) => {
            for (key, value) in map {
                let merged = match fields.remove(key) {
                    Some(existing) => merge(registry, existing, value)?,
                    None => Node::from(value),
                };
                fields.insert(key.clone(), merged);
            }
            Ok(Node::Object(fields))
        }
        (_, input) => Ok(Node::from(input)),
    }
}

/// Shape one input element after a template element.
///
/// Unlike [`merge`], nothing of the template survives except class identity:
/// template-only keys are dropped and template scalars are never copied.
fn route(registry: &ClassRegistry, template: Option<&Node>, input: &Value) -> WrapResult<Node> {
    stack::guard(|| route_node(registry, template, input))
}

fn route_node(registry: &ClassRegistry, template: Option<&Node>, input: &Value) -> WrapResult<Node> {
    match (template, input) {
        (Some(Node::Instance(inst)), input) => hydrate_nested(registry, inst, input),
        (Some(Node::Array(inner)), Value::Array(items)) => route_all(registry, inner.first(), items),
        (Some(Node::Object(fields)), Value::Object(map)) => {
            let mut out = Fields::new();
            for (key, value) in map {
                let routed = match fields.get(key) {
                    Some(t) => route(registry, Some(t), value)?,
                    None => Node::from(value),
                };
                out.insert(key.clone(), routed);
            }
            Ok(Node::Object(out))
        }
        (_, input) => Ok(Node::from(input)),
    }
}

fn route_all(registry: &ClassRegistry, template: Option<&Node>, items: &[Value]) -> WrapResult<Node> {
    items
        .iter()
        .map(|item| route(registry, template, item))
        .collect::<WrapResult<Vec<_>>>()
        .map(Node::Array)
}

fn hydrate_nested(registry: &ClassRegistry, inst: &Instance, input: &Value) -> WrapResult<Node> {
    match registry.entry(inst.class()) {
        Ok(entry) => hydrate_entry(registry, &entry, input).map(Node::from),
        Err(_) => {
            // Tagged by a constructor with a class the registry never saw.
            let state = merge(registry, inst.state().clone(), input)?;
            Ok(Node::from(Instance::new(inst.class(), state)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassDescriptor;
    use serde_json::json;

    fn registry() -> ClassRegistry {
        let reg = ClassRegistry::new();
        reg.register(
            ClassDescriptor::new(
                "Grid",
                json!({
                    "type": "object",
                    "properties": {
                        "rows": {"type": "array", "items": {"type": "array", "items": {"$ref": "Cell"}}},
                        "labels": {"type": "array", "items": {"type": "object", "properties": {"cell": {"$ref": "Cell"}}}}
                    }
                }),
            )
            .reference("Cell"),
        );
        reg.register(ClassDescriptor::new("Cell", json!({"type": "object"})).defaults(json!({"kind": "cell"})));
        reg
    }

    #[test]
    fn every_array_element_becomes_its_own_instance() {
        let reg = registry();
        let g = reg
            .hydrate("Grid", &json!({"rows": [[{"v": 1}, {"v": 2}], [{"v": 3}]]}))
            .unwrap();
        let rows = &g["rows"];
        assert!(rows[0][1].instance_of("Cell").is_some());
        assert!(rows[1][0].instance_of("Cell").is_some());
        assert_eq!(
            g.to_json_object(),
            json!({"rows": [[{"kind": "cell", "v": 1}, {"kind": "cell", "v": 2}], [{"kind": "cell", "v": 3}]]})
        );
    }

    #[test]
    fn plain_object_elements_are_routed() {
        let reg = registry();
        let g = reg
            .hydrate("Grid", &json!({"labels": [{"text": "a", "cell": {}}, {"text": "b"}]}))
            .unwrap();
        assert!(g["labels"][0]["cell"].instance_of("Cell").is_some());
        assert_eq!(
            g.to_json_object(),
            json!({"labels": [{"text": "a", "cell": {"kind": "cell"}}, {"text": "b"}]})
        );
    }

    #[test]
    fn input_overwrites_skeleton_values_including_null() {
        let reg = ClassRegistry::new();
        reg.register(ClassDescriptor::new("P", json!({"type": "object"})).defaults(json!({"uid": "1", "keep": 2})));
        let p = reg.hydrate("P", &json!({"uid": null})).unwrap();
        assert_eq!(p.to_json_object(), json!({"uid": null, "keep": 2}));
    }

    #[test]
    fn shape_mismatches_pass_through() {
        let reg = registry();
        let g = reg.hydrate("Grid", &json!({"rows": "none", "labels": [[1]]})).unwrap();
        assert_eq!(g.to_json_object(), json!({"rows": "none", "labels": [[1]]}));
    }

    #[test]
    fn unregistered_instance_tags_keep_their_class() {
        let reg = ClassRegistry::new();
        reg.register(ClassDescriptor::new("Outer", json!({"type": "object"})).constructor(|| {
            let mut fields = Fields::new();
            fields.insert("inner".to_string(), Instance::new("Ghost", Node::object()).into());
            Ok(Node::Object(fields))
        }));
        let o = reg.hydrate("Outer", &json!({"inner": {"x": 1}})).unwrap();
        assert!(o["inner"].instance_of("Ghost").is_some());
        assert_eq!(o.to_json_object(), json!({"inner": {"x": 1}}));
    }
}
