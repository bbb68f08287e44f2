//! Class registry.
//!
//! The registry maps class names to their declarations and owns the two
//! per-class caches hydration depends on:
//! - the annotated schema (see [`crate::annotate`])
//! - the model instance, a default-constructed instance used while pruning
//!   skeletons
//!
//! Both caches are filled at most once per class. Hydration is safe to run
//! from several threads against one registry; [`ClassRegistry::warm_up`]
//! fills every cache up front for hosts that prefer a single-threaded
//! warm-up phase.
//!
//! Registration is first-wins: a second declaration under an existing name is
//! ignored.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde_json::Value;

use crate::annotate::annotate;
use crate::class::{ClassDescriptor, JsonClass};
use crate::config::{validate_config, HydrationConfig};
use crate::errors::{WrapError, WrapResult};
use crate::merge;
use crate::node::Instance;
use crate::parse::parse_json_str;
use crate::sample::{SampleGenerator, SampleOptions, SchemaResolver, SchemaSampler};
use crate::skeleton;
use crate::traverse::value_depth;

/// A registered class plus its lazily computed caches.
#[derive(Debug)]
pub struct ClassEntry {
    descriptor: ClassDescriptor,
    annotated: OnceLock<Value>,
    model: OnceLock<Instance>,
}

impl ClassEntry {
    fn new(descriptor: ClassDescriptor) -> Self {
        Self {
            descriptor,
            annotated: OnceLock::new(),
            model: OnceLock::new(),
        }
    }

    pub fn descriptor(&self) -> &ClassDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }
}

/// Name-keyed class store with hydration entry points.
pub struct ClassRegistry {
    config: HydrationConfig,
    sampler: Box<dyn SampleGenerator>,
    classes: RwLock<BTreeMap<String, Arc<ClassEntry>>>,
}

impl ClassRegistry {
    /// Empty registry with the default configuration and the built-in sampler.
    pub fn new() -> Self {
        Self {
            config: HydrationConfig::default(),
            sampler: Box::new(SchemaSampler),
            classes: RwLock::new(BTreeMap::new()),
        }
    }

    /// Empty registry with a validated configuration.
    pub fn with_config(config: HydrationConfig) -> WrapResult<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Replace the sample generator used for skeletons.
    pub fn with_sampler(mut self, sampler: impl SampleGenerator + 'static) -> Self {
        self.sampler = Box::new(sampler);
        self
    }

    pub fn config(&self) -> &HydrationConfig {
        &self.config
    }

    pub(crate) fn sampler(&self) -> &dyn SampleGenerator {
        self.sampler.as_ref()
    }

    /// Register a class. Returns false, keeping the existing declaration, if
    /// the name is already taken.
    pub fn register(&self, descriptor: ClassDescriptor) -> bool {
        let mut classes = self.classes.write();
        if classes.contains_key(descriptor.name()) {
            tracing::warn!(
                class = descriptor.name(),
                "class already registered; keeping the first declaration"
            );
            return false;
        }
        tracing::trace!(
            class = descriptor.name(),
            references = ?descriptor.references(),
            "register class"
        );
        classes.insert(
            descriptor.name().to_string(),
            Arc::new(ClassEntry::new(descriptor)),
        );
        true
    }

    /// Register `T` and, transitively, every class it references. Classes
    /// already present are skipped, which also stops reference cycles.
    pub fn register_class<T: JsonClass>(&self) {
        if self.contains(T::NAME) {
            return;
        }
        {
            let mut classes = self.classes.write();
            if classes.contains_key(T::NAME) {
                return;
            }
            classes.insert(
                T::NAME.to_string(),
                Arc::new(ClassEntry::new(T::descriptor())),
            );
        }
        for class_ref in T::referenced_classes() {
            class_ref.register_into(self);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.read().contains_key(name)
    }

    /// Registered class names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.classes.read().keys().cloned().collect()
    }

    pub fn descriptor(&self, name: &str) -> Option<ClassDescriptor> {
        self.classes.read().get(name).map(|e| e.descriptor.clone())
    }

    pub fn len(&self) -> usize {
        self.classes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.read().is_empty()
    }

    /// Entry for `name`, or [`WrapError::UnknownClass`].
    pub fn entry(&self, name: &str) -> WrapResult<Arc<ClassEntry>> {
        self.classes
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| WrapError::UnknownClass(name.to_string()))
    }

    /// Annotated schema of `name`, computed on first use.
    pub fn annotated_schema(&self, name: &str) -> WrapResult<Value> {
        let entry = self.entry(name)?;
        Ok(self.annotated_of(&entry).clone())
    }

    /// Model instance of `name`, constructed on first use.
    pub fn model_instance(&self, name: &str) -> WrapResult<Instance> {
        let entry = self.entry(name)?;
        self.model_of(&entry).cloned()
    }

    pub(crate) fn annotated_of<'e>(&self, entry: &'e ClassEntry) -> &'e Value {
        entry.annotated.get_or_init(|| {
            tracing::trace!(class = entry.name(), policy = self.config.annotation.as_str(), "annotate schema");
            annotate(entry.descriptor.schema(), entry.name(), self.config.annotation)
        })
    }

    pub(crate) fn model_of<'e>(&self, entry: &'e ClassEntry) -> WrapResult<&'e Instance> {
        if let Some(model) = entry.model.get() {
            return Ok(model);
        }
        let built = entry.descriptor.construct()?;
        Ok(entry.model.get_or_init(|| built))
    }

    /// Class a `$class` marker met inside `owner` stands for. Candidates are
    /// `owner` itself, then its references in declaration order; the first
    /// candidate named `name` wins and must be registered.
    pub fn resolve_marker(&self, owner: &ClassDescriptor, name: &str) -> Option<Arc<ClassEntry>> {
        std::iter::once(owner.name())
            .chain(owner.references().iter().map(String::as_str))
            .find(|candidate| *candidate == name)
            .and_then(|candidate| self.classes.read().get(candidate).cloned())
    }

    /// Compute every cache now.
    pub fn warm_up(&self) -> WrapResult<()> {
        let entries: Vec<Arc<ClassEntry>> = self.classes.read().values().cloned().collect();
        for entry in &entries {
            self.annotated_of(entry);
            self.model_of(entry)?;
        }
        tracing::debug!(classes = entries.len(), "registry warmed up");
        Ok(())
    }

    /// Hydrate a parsed JSON value as an instance of `class`.
    pub fn hydrate(&self, class: &str, input: &Value) -> WrapResult<Instance> {
        let entry = self.entry(class)?;
        let depth = value_depth(input);
        if depth > self.config.limits.max_depth {
            return Err(WrapError::limit_exceeded(format!(
                "input nesting depth {depth} exceeds limit {}",
                self.config.limits.max_depth
            )));
        }
        tracing::debug!(class, depth, "hydrate");
        merge::hydrate_entry(self, &entry, input)
    }

    /// Parse JSON text, then hydrate it as an instance of `class`.
    pub fn hydrate_str(&self, class: &str, text: &str) -> WrapResult<Instance> {
        let entry = self.entry(class)?;
        let input = parse_json_str(text, &self.config.limits)?;
        tracing::debug!(class, bytes = text.len(), "hydrate text");
        merge::hydrate_entry(self, &entry, &input)
    }

    /// Skeleton `class` would merge `input` into.
    pub fn build_skeleton(&self, class: &str, input: &Value) -> WrapResult<Instance> {
        let entry = self.entry(class)?;
        skeleton::build(self, &entry, input)
    }

    /// Sample the declared (not annotated) schema of `class`, expanding
    /// references through this registry.
    pub fn sample(&self, class: &str, options: &SampleOptions) -> WrapResult<Value> {
        let entry = self.entry(class)?;
        Ok(self
            .sampler
            .generate(entry.descriptor.schema(), options, self))
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("config", &self.config)
            .field("classes", &self.names())
            .finish_non_exhaustive()
    }
}

impl SchemaResolver for ClassRegistry {
    fn resolve(&self, name: &str) -> Option<Value> {
        self.classes
            .read()
            .get(name)
            .map(|e| e.descriptor.schema().clone())
    }
}

/// Process-wide registry backing the [`JsonClass`] provided methods.
pub fn global() -> &'static ClassRegistry {
    static GLOBAL: OnceLock<ClassRegistry> = OnceLock::new();
    GLOBAL.get_or_init(ClassRegistry::new)
}
