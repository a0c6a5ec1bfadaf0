//! plancc runtime model
//!
//! The execution side of the bridge: runtime types, the class model of the
//! target program, and the layered class loader that keeps target classes
//! isolated from host classes.
//!
//! # Example
//!
//! ```rust
//! use plancc_runtime::{ClassDef, ClassLoader, ClassOrigin, InMemoryClassSource, LayeredClassLoader};
//!
//! let loader = LayeredClassLoader::builder()
//!     .instrumented(InMemoryClassSource::new().with(ClassDef::new("demo.Point")))
//!     .build();
//! let point = loader.load_class("demo.Point").unwrap();
//! assert_eq!(point.origin(), ClassOrigin::Instrumented);
//! ```

#![warn(missing_docs)]

pub mod bootstrap;
pub mod class;
pub mod loader;
pub mod types;

// Re-exports
pub use bootstrap::{java_lang_classes, java_lang_source};
pub use class::{ClassDef, ClassKind, ConstructorDef, FieldDef, MethodDef, RuntimeClass};
pub use loader::{
    ClassLoader, ClassNotFound, ClassSource, InMemoryClassSource, LayeredClassLoader,
    LayeredClassLoaderBuilder, DEFAULT_HOST_PREFIXES,
};
pub use types::{ClassHandle, ClassOrigin, Primitive, RuntimeType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
