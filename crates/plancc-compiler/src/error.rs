//! Error types for the plan compiler
//!
//! Every error aborts the compilation of the current test. Errors fall into
//! three groups:
//! - producer contract violations (malformed or inconsistent plans)
//! - class model mismatches (plans naming classes or members the target
//!   loader cannot provide)
//! - unsupported plan shapes

use plancc_ir::{PlanGraphError, PlanName};
use plancc_runtime::ClassNotFound;
use plancc_testcase::TestCaseError;
use std::fmt::{self, Display, Formatter};

/// Kind of class member that failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Constructor
    Constructor,
    /// Method
    Method,
    /// Field
    Field,
    /// Reflection helper routine
    Helper,
}

impl Display for MemberKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constructor => "constructor",
            Self::Method => "method",
            Self::Field => "field",
            Self::Helper => "helper routine",
        })
    }
}

/// Main compiler error type
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// Plan variant the compiler cannot lower
    #[error("unsupported {kind} plan `{name}` of type {ty}")]
    UnsupportedPlan {
        /// Plan name
        name: PlanName,
        /// Variant label
        kind: &'static str,
        /// Declared type
        ty: String,
    },

    /// Recognised operation without a lowering
    #[error("unimplemented: {0}")]
    Unimplemented(&'static str),

    /// Enum constant missing from the loaded enum class
    #[error("enum constant `{name}` not found in {class}")]
    EnumConstantNotFound {
        /// Enum class
        class: String,
        /// Requested constant
        name: String,
    },

    /// Class missing from every searched loader layer
    #[error(transparent)]
    ClassNotFound(#[from] ClassNotFound),

    /// Member missing from a loaded class and its superclasses
    #[error("{kind} `{member}` not found in {class}")]
    MemberNotFound {
        /// Class searched first
        class: String,
        /// Member name and signature
        member: String,
        /// Member kind
        kind: MemberKind,
    },

    /// Index or length operand is not an integer literal leaf
    #[error("plan `{0}` must be a non-negative integer literal")]
    NonLiteralIndex(PlanName),

    /// Array operation on a type that is not an array
    #[error("plan `{name}` requires an array type, found {ty}")]
    NotAnArrayType {
        /// Plan name
        name: PlanName,
        /// Offending type
        ty: String,
    },

    /// Action operates on its owner before the owner has a value
    #[error("plan `{0}` is used before an action binds its value")]
    UnboundOwner(PlanName),

    /// Operand plan compiled without producing a value
    #[error("plan `{0}` produces no value")]
    NoValue(PlanName),

    /// Result of a `void` method bound to a plan
    #[error("plan `{name}` binds the result of void method {method}")]
    VoidResult {
        /// Plan name
        name: PlanName,
        /// Method
        method: String,
    },

    /// Plan reached again while its own body is compiling
    #[error("plan `{0}` depends on itself")]
    CyclicPlan(PlanName),

    /// Plan nesting exceeds the configured limit
    #[error("plan nesting exceeds the limit of {0}")]
    DepthExceeded(usize),

    /// Second value-producing action in one plan
    #[error("plan `{0}` is already bound")]
    DuplicateBinding(PlanName),

    /// Statement appended after the terminal test call
    #[error("statement appended after the test call")]
    AfterTestCall,

    /// Statement rejected by the test case
    #[error(transparent)]
    TestCase(#[from] TestCaseError),

    /// Plan graph failed validation
    #[error(transparent)]
    PlanGraph(#[from] PlanGraphError),
}

impl CompileError {
    /// Plans or class metadata disagree with the loaded classes
    #[inline]
    #[must_use]
    pub fn is_class_model_mismatch(&self) -> bool {
        matches!(
            self,
            Self::ClassNotFound(_) | Self::MemberNotFound { .. } | Self::EnumConstantNotFound { .. }
        )
    }

    /// The plan shape is valid but not supported
    #[inline]
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedPlan { .. } | Self::Unimplemented(_))
    }

    /// The plan producer broke the plan contract
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        !self.is_class_model_mismatch() && !self.is_unsupported()
    }
}

/// Result type for compiler operations
pub type Result<T, E = CompileError> = std::result::Result<T, E>;
