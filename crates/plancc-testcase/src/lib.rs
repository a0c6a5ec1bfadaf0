//! plancc test cases
//!
//! The statement vocabulary of the test-execution framework: typed
//! variables, inline constants, statements and the append-only
//! [`TestCase`] that enforces the forward-dependency rule.

#![warn(missing_docs)]

pub mod statement;
pub mod test_case;
pub mod value;

// Re-exports
pub use statement::{
    AssignTarget, Callable, ConstructorHandle, FieldHandle, HelperRoutine, MethodHandle,
    Statement, StatementKind,
};
pub use test_case::{TestCase, TestCaseError};
pub use value::{Constant, Operand, VarRef, Variable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
