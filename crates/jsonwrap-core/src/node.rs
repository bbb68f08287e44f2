//! Generic tree value for hydrated data.
//!
//! A [`Node`] is a JSON value with one extra variant, [`Node::Instance`],
//! which tags a subtree with the class it was hydrated as. Serializing a node
//! writes only data: class tags are transparent, so an instance serializes
//! exactly like its state.
//!
//! Object fields are kept in a `BTreeMap` so serialized output is ordered
//! deterministically.

use std::collections::BTreeMap;
use std::ops::Index;

use serde::ser::{Serialize, Serializer};
use serde_json::{Number, Value};

use crate::class::JsonClass;
use crate::stack;
use crate::traverse::PathSegment;

/// Object fields of a node.
pub type Fields = BTreeMap<String, Node>;

static NULL: Node = Node::Null;

/// A JSON-like value that may carry class identity.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Node>),
    Object(Fields),
    Instance(Box<Instance>),
}

/// A node tagged with the class that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    class: String,
    state: Node,
}

impl Instance {
    pub fn new(class: impl Into<String>, state: Node) -> Self {
        Self {
            class: class.into(),
            state,
        }
    }

    /// Name of the class this instance belongs to.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn is(&self, class: &str) -> bool {
        self.class == class
    }

    /// Instance data. Usually an object; a scalar when the class was hydrated
    /// from a scalar input.
    pub fn state(&self) -> &Node {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Node {
        &mut self.state
    }

    pub fn into_state(self) -> Node {
        self.state
    }

    /// Field of an object-shaped instance.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.state.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.state.get_mut(key)
    }

    /// Set a field, turning a non-object state into an object first.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Node>) {
        if !matches!(self.state, Node::Object(_)) {
            self.state = Node::object();
        }
        if let Node::Object(fields) = &mut self.state {
            fields.insert(key.into(), value.into());
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Node::as_str)
    }

    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Node::as_f64)
    }

    /// Plain JSON copy of the instance data (class tags dropped).
    pub fn to_json_object(&self) -> Value {
        self.state.to_value()
    }

    // Node serialization with string keys cannot fail.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.state).unwrap_or_default()
    }

    pub fn to_json_string_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.state).unwrap_or_default()
    }

    /// Every class node of this tree, root included, in document order.
    pub fn instances(&self) -> Vec<(Vec<PathSegment>, String)> {
        let mut out = vec![(Vec::new(), self.class.clone())];
        let mut path = Vec::new();
        collect_instances(&self.state, &mut path, &mut out);
        out
    }
}

fn collect_instances(
    node: &Node,
    path: &mut Vec<PathSegment>,
    out: &mut Vec<(Vec<PathSegment>, String)>,
) {
    stack::guard(|| match node {
        Node::Instance(inst) => {
            out.push((path.clone(), inst.class.clone()));
            collect_instances(&inst.state, path, out);
        }
        Node::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(PathSegment::Index(i));
                collect_instances(item, path, out);
                path.pop();
            }
        }
        Node::Object(fields) => {
            for (k, v) in fields {
                path.push(PathSegment::Key(k.clone()));
                collect_instances(v, path, out);
                path.pop();
            }
        }
        _ => {}
    })
}

impl Node {
    /// Empty object node.
    pub fn object() -> Self {
        Node::Object(Fields::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_instance(&self) -> bool {
        matches!(self, Node::Instance(_))
    }

    /// Node with class tags peeled off.
    pub fn data(&self) -> &Node {
        let mut cur = self;
        while let Node::Instance(inst) = cur {
            cur = &inst.state;
        }
        cur
    }

    fn data_mut(&mut self) -> &mut Node {
        let mut cur = self;
        while let Node::Instance(inst) = cur {
            cur = &mut inst.state;
        }
        cur
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Node::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    pub fn as_instance_mut(&mut self) -> Option<&mut Instance> {
        match self {
            Node::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// The instance at this node if it belongs to `class`.
    pub fn instance_of(&self, class: &str) -> Option<&Instance> {
        self.as_instance().filter(|inst| inst.is(class))
    }

    /// Typed view of this node, if it was hydrated as `T`.
    pub fn downcast<T: JsonClass>(&self) -> Option<T> {
        self.instance_of(T::NAME)
            .map(|inst| T::from_instance(inst.clone()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.data() {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.data() {
            Node::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.data() {
            Node::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.data() {
            Node::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Node>> {
        match self.data() {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Fields> {
        match self.data() {
            Node::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Object field lookup, looking through class tags.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_object().and_then(|fields| fields.get(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self.data_mut() {
            Node::Object(fields) => fields.get_mut(key),
            _ => None,
        }
    }

    /// Array element lookup, looking through class tags.
    pub fn at(&self, index: usize) -> Option<&Node> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Returns true if `path` addresses an existing node. Class tags are
    /// transparent to paths.
    pub fn has_path(&self, path: &[PathSegment]) -> bool {
        let mut cur = self;
        for seg in path {
            let next = match seg {
                PathSegment::Key(k) => cur.get(k),
                PathSegment::Index(i) => cur.at(*i),
            };
            match next {
                Some(n) => cur = n,
                None => return false,
            }
        }
        true
    }

    /// Like [`Node::has_path`], but an index segment matches any element of
    /// its array.
    pub fn has_branch(&self, path: &[PathSegment]) -> bool {
        let Some((seg, rest)) = path.split_first() else {
            return true;
        };
        match (seg, self.data()) {
            (PathSegment::Key(k), node) => node.get(k).is_some_and(|n| n.has_branch(rest)),
            (PathSegment::Index(_), Node::Array(items)) => items.iter().any(|n| n.has_branch(rest)),
            _ => false,
        }
    }

    /// Plain JSON copy (class tags dropped).
    pub fn to_value(&self) -> Value {
        stack::guard(|| match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(Node::to_value).collect()),
            Node::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_value()))
                    .collect(),
            ),
            Node::Instance(inst) => inst.state.to_value(),
        })
    }
}

impl Index<&str> for Node {
    type Output = Node;

    /// Missing keys index to `Null`, as with `serde_json::Value`.
    fn index(&self, key: &str) -> &Node {
        self.get(key).unwrap_or(&NULL)
    }
}

impl Index<usize> for Node {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        self.at(index).unwrap_or(&NULL)
    }
}

impl Index<&str> for Instance {
    type Output = Node;

    fn index(&self, key: &str) -> &Node {
        &self.state[key]
    }
}

impl From<&Value> for Node {
    fn from(v: &Value) -> Self {
        stack::guard(|| match v {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(n.clone()),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::Array(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from(v)))
                    .collect(),
            ),
        })
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::from(&v)
    }
}

impl From<Instance> for Node {
    fn from(inst: Instance) -> Self {
        Node::Instance(Box::new(inst))
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Node::String(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Bool(b)
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::Number(n.into())
    }
}

impl From<Fields> for Node {
    fn from(fields: Fields) -> Self {
        Node::Object(fields)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        stack::guard(|| match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(n) => n.serialize(serializer),
            Node::String(s) => serializer.serialize_str(s),
            Node::Array(items) => items.serialize(serializer),
            Node::Object(fields) => fields.serialize(serializer),
            Node::Instance(inst) => inst.state.serialize(serializer),
        })
    }
}

impl Serialize for Instance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.state.serialize(serializer)
    }
}
