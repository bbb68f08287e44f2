//! Schema sample generation.
//!
//! Skeleton building only needs *some* value that satisfies a schema and
//! shows every structural branch once. Generation sits behind the
//! [`SampleGenerator`] trait so hosts can plug in their own generator; the
//! built-in [`SchemaSampler`] is deterministic:
//! - `const`, `default`, `enum[0]` and `examples[0]` are used when present
//! - otherwise each type gets a canonical placeholder (`""`, `0`, `false`,
//!   `null`, `{}`, `[]`)
//! - `$class` marker schemas sample to `{"$class": <name>}`
//! - `$ref` schemas expand through a [`SchemaResolver`] until
//!   `max_ref_depth` is reached, then sample to `null`
//!
//! Supported keywords are the structural ones: `type`, `properties`,
//! `required`, `items`, `$ref`, `allOf`, `anyOf`, `oneOf`. Scalar validation
//! keywords are ignored.

use serde_json::{Map, Value};

use crate::annotate::{ref_target_name, CLASS_KEY};

/// Generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleOptions {
    /// How many nested `$ref` expansions a branch may go through.
    pub max_ref_depth: usize,
    pub min_items: usize,
    pub max_items: usize,
    /// Emit only `required` properties.
    pub required_only: bool,
    /// Drop properties whose sample is `null`.
    pub omit_nulls: bool,
}

impl SampleOptions {
    /// The bounded configuration used for skeletons.
    pub fn skeleton() -> Self {
        Self {
            max_ref_depth: 1,
            min_items: 1,
            max_items: 1,
            required_only: true,
            omit_nulls: false,
        }
    }

    /// Fixture configuration: every property, `items` elements per array,
    /// references expanded `depth` levels.
    pub fn fixture(depth: usize, items: usize) -> Self {
        Self {
            max_ref_depth: depth,
            min_items: items,
            max_items: items,
            required_only: false,
            omit_nulls: false,
        }
    }

    fn item_count(&self) -> usize {
        self.min_items.min(self.max_items)
    }
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self::skeleton()
    }
}

/// Resolves non-local `$ref` targets (by class name) to schemas.
pub trait SchemaResolver {
    fn resolve(&self, name: &str) -> Option<Value>;
}

/// Resolver that knows no names.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoResolver;

impl SchemaResolver for NoResolver {
    fn resolve(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Produces a value satisfying a schema.
pub trait SampleGenerator: Send + Sync {
    fn generate(&self, schema: &Value, options: &SampleOptions, resolver: &dyn SchemaResolver) -> Value;
}

/// Deterministic built-in generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaSampler;

impl SampleGenerator for SchemaSampler {
    fn generate(&self, schema: &Value, options: &SampleOptions, resolver: &dyn SchemaResolver) -> Value {
        let cx = SampleCx {
            options,
            resolver,
        };
        cx.sample(schema, schema, 0)
    }
}

struct SampleCx<'a> {
    options: &'a SampleOptions,
    resolver: &'a dyn SchemaResolver,
}

impl SampleCx<'_> {
    fn sample(&self, schema: &Value, root: &Value, ref_depth: usize) -> Value {
        let Some(obj) = schema.as_object() else {
            return Value::Null;
        };

        if let Some(marker) = obj.get(CLASS_KEY) {
            return sample_marker(marker);
        }

        if let Some(Value::String(target)) = obj.get("$ref") {
            return self.sample_ref(target, root, ref_depth);
        }

        for key in ["const", "default"] {
            if let Some(v) = obj.get(key) {
                return v.clone();
            }
        }
        for key in ["enum", "examples"] {
            if let Some(v) = obj.get(key).and_then(Value::as_array).and_then(|a| a.first()) {
                return v.clone();
            }
        }

        if let Some(Value::Array(parts)) = obj.get("allOf") {
            let mut merged = Map::new();
            for part in parts {
                match self.sample(part, root, ref_depth) {
                    Value::Object(m) => merged.extend(m),
                    other if merged.is_empty() => return other,
                    _ => {}
                }
            }
            return Value::Object(merged);
        }
        for key in ["anyOf", "oneOf"] {
            if let Some(first) = obj.get(key).and_then(Value::as_array).and_then(|a| a.first()) {
                return self.sample(first, root, ref_depth);
            }
        }

        match schema_type(obj) {
            Some("object") => self.sample_object(obj, root, ref_depth),
            Some("array") => self.sample_array(obj, root, ref_depth),
            Some("string") => Value::String(String::new()),
            Some("integer") | Some("number") => obj
                .get("minimum")
                .filter(|m| m.is_number())
                .cloned()
                .unwrap_or_else(|| Value::from(0)),
            Some("boolean") => Value::Bool(false),
            _ => Value::Null,
        }
    }

    fn sample_object(&self, obj: &Map<String, Value>, root: &Value, ref_depth: usize) -> Value {
        let mut out = Map::new();
        let Some(props) = obj.get("properties").and_then(Value::as_object) else {
            return Value::Object(out);
        };
        let required = required_set(obj);

        for (key, prop) in props {
            if self.options.required_only && !required.contains(&key.as_str()) {
                continue;
            }
            let v = self.sample(prop, root, ref_depth);
            if v.is_null() && self.options.omit_nulls {
                continue;
            }
            out.insert(key.clone(), v);
        }
        Value::Object(out)
    }

    fn sample_array(&self, obj: &Map<String, Value>, root: &Value, ref_depth: usize) -> Value {
        let item_schema = match obj.get("items") {
            Some(Value::Array(tuple)) => tuple.first(),
            Some(other) => Some(other),
            None => None,
        };
        let Some(item_schema) = item_schema else {
            return Value::Array(Vec::new());
        };
        let n = self.options.item_count();
        Value::Array((0..n).map(|_| self.sample(item_schema, root, ref_depth)).collect())
    }

    fn sample_ref(&self, target: &str, root: &Value, ref_depth: usize) -> Value {
        if ref_depth >= self.options.max_ref_depth {
            return Value::Null;
        }
        if let Some(pointer) = target.strip_prefix('#') {
            return match root.pointer(pointer) {
                Some(local) => self.sample(local, root, ref_depth + 1),
                None => Value::Null,
            };
        }
        match self.resolver.resolve(ref_target_name(target)) {
            Some(resolved) => self.sample(&resolved, &resolved, ref_depth + 1),
            None => Value::Null,
        }
    }
}

fn sample_marker(marker: &Value) -> Value {
    let name = match marker {
        Value::String(s) => Some(s.clone()),
        Value::Object(m) => m
            .get("enum")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    };
    let mut out = Map::new();
    out.insert(
        CLASS_KEY.to_string(),
        name.map(Value::String).unwrap_or(Value::Null),
    );
    Value::Object(out)
}

/// Effective type of a schema object; infers `object`/`array` from
/// `properties`/`items` when `type` is absent. For type unions the first
/// non-null member wins.
pub(crate) fn schema_type(obj: &Map<String, Value>) -> Option<&str> {
    match obj.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => {
            let mut names = types.iter().filter_map(Value::as_str);
            let first = names.clone().next();
            names.find(|t| *t != "null").or(first)
        }
        _ if obj.contains_key("properties") => Some("object"),
        _ if obj.contains_key("items") => Some("array"),
        _ => None,
    }
}

fn required_set(obj: &Map<String, Value>) -> Vec<&str> {
    obj.get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}
