//! Isolating class loader
//!
//! [`LayeredClassLoader`] resolves binary class names against an ordered
//! list of [`ClassSource`] layers: the instrumented target classpath, the
//! runtime support classpath, then the host classpath. Names under the host
//! prefixes (`java.`, `javax.`, ...) cannot be instrumented and are delegated
//! straight to the host layer. Loaded classes are cached, so every lookup of
//! a name yields the same class identity.

use crate::class::{ClassDef, RuntimeClass};
use crate::types::ClassOrigin;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Class lookup failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("class `{name}` not found (searched: {searched:?})")]
pub struct ClassNotFound {
    /// Requested binary name
    pub name: String,
    /// Layers that were searched, in order
    pub searched: Vec<ClassOrigin>,
}

/// Loads classes of the target program by binary name
pub trait ClassLoader: Send + Sync + Debug {
    /// Load `name` (`a.b.C`)
    ///
    /// # Errors
    /// Returns [`ClassNotFound`] if no layer defines the class.
    fn load_class(&self, name: &str) -> Result<Arc<RuntimeClass>, ClassNotFound>;
}

/// One layer of class definitions
pub trait ClassSource: Send + Sync + Debug {
    /// Definition of `name`, if this layer has it
    fn find_class(&self, name: &str) -> Option<ClassDef>;
}

/// Class source backed by a map of definitions
#[derive(Debug, Clone, Default)]
pub struct InMemoryClassSource {
    classes: HashMap<String, ClassDef>,
}

impl InMemoryClassSource {
    /// Create empty source
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition, replacing any previous one of the same name
    pub fn define(&mut self, def: ClassDef) {
        self.classes.insert(def.name.clone(), def);
    }

    /// Builder-style [`define`](Self::define)
    #[must_use]
    pub fn with(mut self, def: ClassDef) -> Self {
        self.define(def);
        self
    }

    /// Number of definitions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if the source defines nothing
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassDef> for InMemoryClassSource {
    fn from_iter<I: IntoIterator<Item = ClassDef>>(iter: I) -> Self {
        let mut source = Self::new();
        for def in iter {
            source.define(def);
        }
        source
    }
}

impl ClassSource for InMemoryClassSource {
    fn find_class(&self, name: &str) -> Option<ClassDef> {
        self.classes.get(name).cloned()
    }
}

/// Default prefixes of classes that are never instrumented
pub const DEFAULT_HOST_PREFIXES: &[&str] = &["java.", "javax.", "jdk.", "sun.", "com.sun."];

/// Class loader that searches layers in a fixed order and caches results
#[derive(Debug)]
pub struct LayeredClassLoader {
    layers: Vec<(ClassOrigin, Box<dyn ClassSource>)>,
    host_prefixes: Vec<String>,
    cache: RwLock<HashMap<String, Arc<RuntimeClass>>>,
}

impl LayeredClassLoader {
    /// Start building a loader
    #[inline]
    #[must_use]
    pub fn builder() -> LayeredClassLoaderBuilder {
        LayeredClassLoaderBuilder::default()
    }

    /// Number of cached classes
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn is_host_only(&self, name: &str) -> bool {
        self.host_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    fn search(&self, name: &str) -> Result<RuntimeClass, ClassNotFound> {
        let host_only = self.is_host_only(name);
        let mut searched = Vec::new();

        for (origin, source) in &self.layers {
            if host_only && *origin != ClassOrigin::Host {
                continue;
            }
            searched.push(*origin);
            if let Some(def) = source.find_class(name) {
                tracing::trace!(class = name, %origin, "class defined");
                return Ok(RuntimeClass::new(def, *origin));
            }
        }

        Err(ClassNotFound {
            name: name.to_string(),
            searched,
        })
    }
}

impl ClassLoader for LayeredClassLoader {
    fn load_class(&self, name: &str) -> Result<Arc<RuntimeClass>, ClassNotFound> {
        if let Some(class) = self.cache.read().get(name) {
            return Ok(Arc::clone(class));
        }

        let class = Arc::new(self.search(name)?);
        let mut cache = self.cache.write();
        // A concurrent loader may have won the race; keep its identity.
        let entry = cache.entry(name.to_string()).or_insert(class);
        Ok(Arc::clone(entry))
    }
}

/// Builder for [`LayeredClassLoader`]
#[derive(Debug, Default)]
pub struct LayeredClassLoaderBuilder {
    instrumented: Vec<Box<dyn ClassSource>>,
    runtime: Vec<Box<dyn ClassSource>>,
    host: Vec<Box<dyn ClassSource>>,
    host_prefixes: Option<Vec<String>>,
}

impl LayeredClassLoaderBuilder {
    /// Add an instrumented target classpath source
    #[must_use]
    pub fn instrumented(mut self, source: impl ClassSource + 'static) -> Self {
        self.instrumented.push(Box::new(source));
        self
    }

    /// Add a runtime classpath source
    #[must_use]
    pub fn runtime(mut self, source: impl ClassSource + 'static) -> Self {
        self.runtime.push(Box::new(source));
        self
    }

    /// Add a host classpath source
    #[must_use]
    pub fn host(mut self, source: impl ClassSource + 'static) -> Self {
        self.host.push(Box::new(source));
        self
    }

    /// Replace the host-only name prefixes
    #[must_use]
    pub fn host_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.host_prefixes = Some(prefixes.iter().map(|p| (*p).to_string()).collect());
        self
    }

    /// Build the loader
    #[must_use]
    pub fn build(self) -> LayeredClassLoader {
        let layers = self
            .instrumented
            .into_iter()
            .map(|s| (ClassOrigin::Instrumented, s))
            .chain(self.runtime.into_iter().map(|s| (ClassOrigin::Runtime, s)))
            .chain(self.host.into_iter().map(|s| (ClassOrigin::Host, s)))
            .collect();

        LayeredClassLoader {
            layers,
            host_prefixes: self.host_prefixes.unwrap_or_else(|| {
                DEFAULT_HOST_PREFIXES.iter().map(|p| (*p).to_string()).collect()
            }),
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loader() -> LayeredClassLoader {
        LayeredClassLoader::builder()
            .instrumented(
                InMemoryClassSource::new()
                    .with(ClassDef::new("demo.Point"))
                    .with(ClassDef::new("java.lang.String")),
            )
            .runtime(InMemoryClassSource::new().with(ClassDef::new("demo.Point")))
            .host(InMemoryClassSource::new().with(ClassDef::new("java.lang.String")))
            .build()
    }

    #[test]
    fn instrumented_layer_wins() {
        let class = loader().load_class("demo.Point").unwrap();
        assert_eq!(class.origin(), ClassOrigin::Instrumented);
    }

    #[test]
    fn host_prefixes_bypass_target_layers() {
        let class = loader().load_class("java.lang.String").unwrap();
        assert_eq!(class.origin(), ClassOrigin::Host);
    }

    #[test]
    fn missing_class_reports_searched_layers() {
        let err = loader().load_class("demo.Missing").unwrap_err();
        assert_eq!(err.name, "demo.Missing");
        assert_eq!(
            err.searched,
            vec![ClassOrigin::Instrumented, ClassOrigin::Runtime, ClassOrigin::Host]
        );

        let err = loader().load_class("java.util.List").unwrap_err();
        assert_eq!(err.searched, vec![ClassOrigin::Host]);
    }

    #[test]
    fn repeated_loads_share_identity() {
        let loader = loader();
        let a = loader.load_class("demo.Point").unwrap();
        let b = loader.load_class("demo.Point").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.cached(), 1);
    }

    #[test]
    fn custom_host_prefixes() {
        let loader = LayeredClassLoader::builder()
            .instrumented(InMemoryClassSource::new().with(ClassDef::new("java.lang.String")))
            .host_prefixes(&[])
            .build();
        let class = loader.load_class("java.lang.String").unwrap();
        assert_eq!(class.origin(), ClassOrigin::Instrumented);
    }
}
