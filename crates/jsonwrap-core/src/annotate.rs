//! Schema annotation.
//!
//! Rewrites a class schema so a generic sample generator produces a sample
//! that is structurally faithful to the class without knowing anything about
//! classes:
//! - every `$ref` node, at any depth, becomes a `$class` marker
//!   (`{"$class": {"enum": [<target>]}}`)
//! - at every object level, `required` becomes the declared `required` plus
//!   every property that is a marker, an object or an array
//!
//! The widened `required` only forces the generator to emit those branches;
//! it is never used to validate input.

use serde_json::{json, Map, Value};

use crate::config::AnnotationPolicy;
use crate::sample::schema_type;

/// Key of class markers in annotated schemas and in samples.
pub const CLASS_KEY: &str = "$class";

/// Keywords whose values are a single subschema.
const SUBSCHEMA_KEYS: &[&str] = &["items", "additionalProperties", "not"];
/// Keywords whose values are maps of subschemas.
const SUBSCHEMA_MAP_KEYS: &[&str] = &["properties", "patternProperties", "definitions", "$defs"];
/// Keywords whose values are lists of subschemas.
const SUBSCHEMA_LIST_KEYS: &[&str] = &["allOf", "anyOf", "oneOf", "items"];

/// Annotate `schema`, owned by the class `self_name`.
pub fn annotate(schema: &Value, self_name: &str, policy: AnnotationPolicy) -> Value {
    let mut out = replace_refs(schema);
    widen_required(&mut out);

    if policy == AnnotationPolicy::SelfTagged {
        tag_root(&mut out, self_name);
    }
    out
}

/// Marker schema for `class`.
pub fn class_marker(class: &str) -> Value {
    json!({ CLASS_KEY: { "enum": [class] } })
}

/// Class named by a marker schema node, if `schema` is one.
pub fn marker_class(schema: &Value) -> Option<&str> {
    schema
        .get(CLASS_KEY)?
        .get("enum")?
        .as_array()?
        .first()?
        .as_str()
}

/// Class name a `$ref` points at: its last path segment.
pub fn ref_target_name(target: &str) -> &str {
    target.rsplit('/').next().unwrap_or(target)
}

fn replace_refs(schema: &Value) -> Value {
    match schema {
        Value::Object(obj) => {
            if let Some(Value::String(target)) = obj.get("$ref") {
                return class_marker(ref_target_name(target));
            }
            Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), replace_refs(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(replace_refs).collect()),
        other => other.clone(),
    }
}

fn widen_required(schema: &mut Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };
    if obj.contains_key(CLASS_KEY) {
        return;
    }

    if let Some(Value::Object(props)) = obj.get("properties") {
        let mut required: Vec<String> = obj
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        for (key, prop) in props {
            if is_structural(prop) && !required.contains(key) {
                required.push(key.clone());
            }
        }

        if !required.is_empty() {
            obj.insert(
                "required".to_string(),
                Value::Array(required.into_iter().map(Value::String).collect()),
            );
        }
    }

    for key in SUBSCHEMA_KEYS {
        if let Some(sub) = obj.get_mut(*key) {
            if sub.is_object() {
                widen_required(sub);
            }
        }
    }
    for key in SUBSCHEMA_MAP_KEYS {
        if let Some(Value::Object(subs)) = obj.get_mut(*key) {
            subs.values_mut().for_each(widen_required);
        }
    }
    for key in SUBSCHEMA_LIST_KEYS {
        if let Some(Value::Array(subs)) = obj.get_mut(*key) {
            subs.iter_mut().for_each(widen_required);
        }
    }
}

fn is_structural(prop: &Value) -> bool {
    let Some(obj) = prop.as_object() else {
        return false;
    };
    obj.contains_key(CLASS_KEY) || matches!(schema_type(obj), Some("object") | Some("array"))
}

fn tag_root(schema: &mut Value, self_name: &str) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };
    if schema_type(obj) != Some("object") {
        return;
    }

    let props = obj
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(props) = props {
        props.insert(CLASS_KEY.to_string(), class_marker(self_name));
    }

    let required = obj
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(required) = required {
        let tag = Value::String(CLASS_KEY.to_string());
        if !required.contains(&tag) {
            required.push(tag);
        }
    }
}
