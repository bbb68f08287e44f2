//! Class declarations.
//!
//! A class is what JSON gets hydrated into. It declares:
//! - a name, used as the `$ref` / `$class` key
//! - a JSON Schema describing its shape
//! - the classes it references through `$ref`
//! - a zero-argument constructor producing its default state
//!
//! Contract: the constructor of every class, and of every class it
//! references, must succeed without arguments. Hydration instantiates
//! referenced classes blindly; a failing constructor aborts hydration with
//! [`WrapError::Construction`].
//!
//! Two declaration styles are supported:
//! - [`ClassDescriptor`] values, built at runtime (used by the CLI manifest)
//! - the [`JsonClass`] trait, for Rust types that carry behavior

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::{ConstructError, WrapError, WrapResult};
use crate::node::{Instance, Node};
use crate::registry::{self, ClassRegistry};

/// Zero-argument constructor producing a class's default state.
pub type Constructor = Arc<dyn Fn() -> Result<Node, ConstructError> + Send + Sync>;

/// Runtime description of a class.
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    schema: Value,
    references: Vec<String>,
    constructor: Constructor,
}

impl ClassDescriptor {
    /// Class with an empty-object default state and no references.
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
            references: Vec::new(),
            constructor: Arc::new(|| Ok(Node::object())),
        }
    }

    /// Declare a referenced class by name.
    pub fn reference(mut self, class: impl Into<String>) -> Self {
        self.references.push(class.into());
        self
    }

    /// Use `defaults` as the default state of every new instance.
    pub fn defaults(self, defaults: Value) -> Self {
        let state = Node::from(defaults);
        self.constructor(move || Ok(state.clone()))
    }

    pub fn constructor<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Result<Node, ConstructError> + Send + Sync + 'static,
    {
        self.constructor = Arc::new(f);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Referenced class names, in declaration order.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Run the default constructor.
    pub fn construct(&self) -> WrapResult<Instance> {
        let state = (self.constructor)().map_err(|e| WrapError::construction(&self.name, e))?;
        Ok(Instance::new(self.name.clone(), state))
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

/// Lazily-resolved reference to a [`JsonClass`].
///
/// Holding a registration function instead of a descriptor lets classes
/// reference themselves or each other.
#[derive(Clone, Copy)]
pub struct ClassRef {
    name: &'static str,
    register: fn(&ClassRegistry),
}

impl ClassRef {
    pub fn of<T: JsonClass>() -> Self {
        Self {
            name: T::NAME,
            register: ClassRegistry::register_class::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn register_into(&self, registry: &ClassRegistry) {
        (self.register)(registry)
    }
}

impl fmt::Debug for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClassRef").field(&self.name).finish()
    }
}

/// A Rust type that JSON can be hydrated into.
///
/// Implementors are thin wrappers around an [`Instance`]; their methods are
/// the class behavior.
///
/// ```
/// use jsonwrap_core::{Instance, JsonClass};
/// use serde_json::{json, Value};
///
/// struct Pair(Instance);
///
/// impl JsonClass for Pair {
///     const NAME: &'static str = "Pair";
///
///     fn schema() -> Value {
///         json!({"type": "object", "properties": {
///             "firstNumber": {"type": "number"},
///             "secondNumber": {"type": "number"}
///         }})
///     }
///
///     fn from_instance(instance: Instance) -> Self {
///         Self(instance)
///     }
///
///     fn instance(&self) -> &Instance {
///         &self.0
///     }
/// }
///
/// impl Pair {
///     fn sum(&self) -> f64 {
///         self.0.f64_field("firstNumber").unwrap_or(0.0)
///             + self.0.f64_field("secondNumber").unwrap_or(0.0)
///     }
/// }
///
/// let pair = Pair::from_json_string(r#"{"firstNumber": 5, "secondNumber": 6}"#).unwrap();
/// assert_eq!(pair.sum(), 11.0);
/// ```
pub trait JsonClass: Sized + 'static {
    /// Class name, matched against `$ref` targets.
    const NAME: &'static str;

    fn schema() -> Value;

    /// Classes reachable through `$ref` in [`JsonClass::schema`].
    fn referenced_classes() -> Vec<ClassRef> {
        Vec::new()
    }

    /// Default state of a new instance. Must not fail.
    fn construct() -> Result<Node, ConstructError> {
        Ok(Node::object())
    }

    fn from_instance(instance: Instance) -> Self;

    fn instance(&self) -> &Instance;

    fn descriptor() -> ClassDescriptor {
        Self::referenced_classes().iter().fold(
            ClassDescriptor::new(Self::NAME, Self::schema()).constructor(Self::construct),
            |d, r| d.reference(r.name()),
        )
    }

    /// Hydrate a parsed JSON value through the process-wide registry.
    fn from_json_object(value: &Value) -> WrapResult<Self> {
        let registry = registry::global();
        registry.register_class::<Self>();
        registry.hydrate(Self::NAME, value).map(Self::from_instance)
    }

    /// Parse and hydrate JSON text through the process-wide registry.
    fn from_json_string(text: &str) -> WrapResult<Self> {
        let registry = registry::global();
        registry.register_class::<Self>();
        registry.hydrate_str(Self::NAME, text).map(Self::from_instance)
    }

    fn to_json_object(&self) -> Value {
        self.instance().to_json_object()
    }

    fn to_json_string(&self) -> String {
        self.instance().to_json_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn builder_collects_references_in_order() {
        let d = ClassDescriptor::new("Credential", json!({"type": "object"}))
            .reference("Pair")
            .reference("Letter");
        assert_eq!(d.references(), ["Pair".to_string(), "Letter".to_string()]);
    }

    #[test]
    fn defaults_are_copied_per_instance() {
        let d = ClassDescriptor::new("Product", json!({})).defaults(json!({"uid": "98765"}));
        let mut a = d.construct().unwrap();
        a.set("uid", "changed");
        let b = d.construct().unwrap();
        assert_eq!(b.to_json_object(), json!({"uid": "98765"}));
    }

    #[test]
    fn failing_constructor_is_a_construction_error() {
        let d = ClassDescriptor::new("Account", json!({}))
            .constructor(|| Err(ConstructError::msg("name is required")));
        assert_matches!(d.construct(), Err(WrapError::Construction { class, .. }) if class == "Account");
    }
}
