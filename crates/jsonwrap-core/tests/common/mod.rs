//! Classes shared by the integration tests.
//!
//! They mirror a small account model: a user with credentials, each holding
//! number pairs and a letter matrix, plus products with a default uid, a
//! house with doors, and a self-referencing tree.

#![allow(dead_code)]

use std::path::PathBuf;

use jsonwrap_core::{ClassRef, Instance, JsonClass, Node};
use serde_json::{json, Value};

/// Route core diagnostics to the test harness; `RUST_LOG` selects levels.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}

fn typed<T: JsonClass>(node: &Node) -> Vec<T> {
    node.as_array()
        .map(|items| items.iter().filter_map(Node::downcast::<T>).collect())
        .unwrap_or_default()
}

pub struct User(Instance);

impl JsonClass for User {
    const NAME: &'static str = "User";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "first_name": {"type": "string"},
                "last_name": {"type": "string"},
                "address": {
                    "type": "object",
                    "properties": {
                        "street": {"type": "string"},
                        "city": {"type": "string"}
                    }
                },
                "credentials": {"type": "array", "items": {"$ref": "Credential"}},
                "products": {"type": "array", "items": {"$ref": "#/definitions/Product"}}
            }
        })
    }

    fn referenced_classes() -> Vec<ClassRef> {
        vec![ClassRef::of::<Credential>(), ClassRef::of::<Product>()]
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.0.str_field("first_name").unwrap_or_default(),
            self.0.str_field("last_name").unwrap_or_default()
        )
    }

    pub fn credentials(&self) -> Vec<Credential> {
        typed(&self.0["credentials"])
    }

    pub fn products(&self) -> Vec<Product> {
        typed(&self.0["products"])
    }
}

pub struct Credential(Instance);

impl JsonClass for Credential {
    const NAME: &'static str = "Credential";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "username": {"type": "string"},
                "password": {"type": "string"},
                "numberPairs": {"type": "array", "items": {"$ref": "Pair"}},
                "matrix": {
                    "type": "array",
                    "items": {"type": "array", "items": {"$ref": "Letter"}}
                }
            },
            "required": ["username"]
        })
    }

    fn referenced_classes() -> Vec<ClassRef> {
        vec![ClassRef::of::<Pair>(), ClassRef::of::<Letter>()]
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl Credential {
    pub fn has_valid_password(&self) -> bool {
        self.0
            .str_field("password")
            .map(|p| p.chars().count() == 8)
            .unwrap_or(false)
    }

    pub fn pairs(&self) -> Vec<Pair> {
        typed(&self.0["numberPairs"])
    }

    pub fn letter(&self, row: usize, col: usize) -> Option<Letter> {
        self.0["matrix"][row][col].downcast()
    }
}

pub struct Pair(Instance);

impl JsonClass for Pair {
    const NAME: &'static str = "Pair";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "firstNumber": {"type": "number"},
                "secondNumber": {"type": "number"}
            }
        })
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl Pair {
    pub fn sum(&self) -> f64 {
        self.0.f64_field("firstNumber").unwrap_or(0.0) + self.0.f64_field("secondNumber").unwrap_or(0.0)
    }
}

/// A single character, hydrated from a JSON string.
pub struct Letter(Instance);

impl JsonClass for Letter {
    const NAME: &'static str = "Letter";

    fn schema() -> Value {
        json!({"type": "string"})
    }

    fn construct() -> Result<Node, jsonwrap_core::ConstructError> {
        Ok(Node::from(""))
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl Letter {
    pub fn to_upper(&self) -> String {
        self.0.state().as_str().unwrap_or_default().to_uppercase()
    }
}

pub struct Product(Instance);

impl JsonClass for Product {
    const NAME: &'static str = "Product";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "uid": {"type": "string"}
            }
        })
    }

    fn construct() -> Result<Node, jsonwrap_core::ConstructError> {
        Ok(Node::from(json!({"uid": "98765"})))
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl Product {
    pub fn uid(&self) -> Option<&str> {
        self.0.str_field("uid")
    }
}

pub struct House(Instance);

impl JsonClass for House {
    const NAME: &'static str = "House";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "rooms": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "door": {"$ref": "Door"}
                        }
                    }
                }
            }
        })
    }

    fn referenced_classes() -> Vec<ClassRef> {
        vec![ClassRef::of::<Door>()]
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl House {
    pub fn door(&self, room: usize) -> Option<Door> {
        self.0["rooms"][room]["door"].downcast()
    }
}

pub struct Door(Instance);

impl JsonClass for Door {
    const NAME: &'static str = "Door";

    fn schema() -> Value {
        json!({"type": "object", "properties": {"color": {"type": "string"}}})
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl Door {
    pub fn ring(&self) -> String {
        format!("ding dong at the {} door", self.0.str_field("color").unwrap_or("plain"))
    }
}

/// Self-referencing tree node.
pub struct Tree(Instance);

impl JsonClass for Tree {
    const NAME: &'static str = "Tree";

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {"type": "string"},
                "children": {"type": "array", "items": {"$ref": "Tree"}}
            }
        })
    }

    fn referenced_classes() -> Vec<ClassRef> {
        vec![ClassRef::of::<Tree>()]
    }

    fn from_instance(instance: Instance) -> Self {
        Self(instance)
    }

    fn instance(&self) -> &Instance {
        &self.0
    }
}

impl Tree {
    pub fn label(&self) -> String {
        format!("<{}>", self.0.str_field("name").unwrap_or("?"))
    }

    pub fn children(&self) -> Vec<Tree> {
        typed(&self.0["children"])
    }
}

/// `{"name": "n0", "children": [{"name": "n1", ...}]}`, `depth` nodes deep.
pub fn chain(depth: usize) -> Value {
    let mut node = json!({"name": format!("n{}", depth - 1), "children": []});
    for i in (0..depth - 1).rev() {
        node = json!({"name": format!("n{i}"), "children": [node]});
    }
    node
}

/// Complete binary tree with `levels` levels.
pub fn binary(levels: usize) -> Value {
    let mut node = json!({"name": "leaf", "children": []});
    for _ in 1..levels {
        node = json!({"name": "inner", "children": [node.clone(), node]});
    }
    node
}
