//! plancc IR
//!
//! Construction plans as produced by the concolic analysis engine, together
//! with the analysis-side type and member model they are written in.
//!
//! # Overview
//!
//! - [`PlanType`], [`PrimitiveType`]: analysis types, parseable from JVM descriptors
//! - [`ClassRef`], [`FieldRef`], [`MethodRef`]: member references
//! - [`Plan`], [`PlanKind`], [`Action`], [`ReflectionAction`]: the plan IR
//! - [`Parameters`]: root plans of one test
//! - [`PlanGraph`]: name-level validation before compilation
//!
//! # Example
//!
//! ```rust
//! use plancc_ir::{Plan, PlanKind, PrimitiveValue};
//!
//! let five = Plan::new("five", PlanKind::Primitive(PrimitiveValue::Int(5)));
//! assert_eq!(five.kind_label(), "primitive");
//! ```

#![warn(missing_docs)]

pub mod graph;
pub mod member;
pub mod plan;
pub mod types;

// Re-exports
pub use graph::{PlanGraph, PlanGraphError};
pub use member::{parse_method_descriptor, ClassRef, FieldRef, MethodRef, CONSTRUCTOR_NAME};
pub use plan::{
    Action, Parameters, Plan, PlanKind, PlanName, PlanRef, PrimitiveValue, ReflectionAction,
    TestCall,
};
pub use types::{DescriptorError, PlanType, PrimitiveType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
