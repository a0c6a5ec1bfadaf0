//! plancc compiler
//!
//! Lowers construction plans into the statement sequence of one executable
//! test. The pieces:
//!
//! - [`TypeBridge`]: analysis types and members resolved through the target
//!   class loader
//! - [`ReferenceTable`]: plan name to variable memo
//! - [`PlanCompiler`]: dispatcher, direct-call lowering and the reflection
//!   bridge
//! - [`TestGenerator`]: loop over candidate plan sets
//! - [`CompilerConfig`]: helper library layout and limits
//!
//! # Example
//!
//! ```rust
//! use plancc_compiler::prelude::*;
//! use plancc_ir::{ClassRef, MethodRef, Parameters, PlanType};
//! use plancc_runtime::{java_lang_source, ClassDef, InMemoryClassSource, LayeredClassLoader};
//!
//! let loader = LayeredClassLoader::builder()
//!     .instrumented(InMemoryClassSource::new().with(ClassDef::new("demo.Point").constructor(&[])))
//!     .host(java_lang_source())
//!     .build();
//! let config = CompilerConfig::default();
//!
//! let ctor = MethodRef::constructor(ClassRef::new("demo/Point"), Vec::new());
//! let test = PlanCompiler::new(&loader, &config)
//!     .compile_test(&ctor, &Parameters::default())
//!     .unwrap();
//! assert_eq!(test.test_case.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod compiler;
pub mod config;
pub mod error;
pub mod generator;
pub mod logging;
mod lower;
mod reflection;
pub mod refs;
pub mod report;
pub mod request;
pub mod type_bridge;

/// Prelude for common imports
pub mod prelude {
    pub use crate::compiler::{CompiledTest, PlanCompiler};
    pub use crate::config::{CompilerConfig, HelperLibrary};
    pub use crate::error::{CompileError, Result};
    pub use crate::generator::{Candidate, TestGenerator};
}

// Re-exports
pub use compiler::{CompiledTest, PlanCompiler};
pub use config::{CompilerConfig, ConfigError, HelperFamily, HelperLibrary, LogConfig};
pub use error::{CompileError, MemberKind};
pub use generator::{Attempt, Candidate, GenerationStats, TestGenerator};
pub use refs::ReferenceTable;
pub use report::{RunReport, StatementSummary, TestReport};
pub use request::{ClassLayers, GenerationRequest};
pub use type_bridge::TypeBridge;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
