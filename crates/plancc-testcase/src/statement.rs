//! Statements of a generated test
//!
//! Every statement that invokes code names exactly one callable
//! ([`Statement::attribution`]), so trace collectors can key per-statement
//! data by (statement, invoked method).

use crate::value::{Constant, Operand, VarRef};
use plancc_runtime::ClassHandle;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Resolved constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructorHandle {
    /// Declaring class
    pub declaring: ClassHandle,
    /// Parameter type names
    pub params: Vec<String>,
}

/// Resolved method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodHandle {
    /// Class the method was found on
    pub declaring: ClassHandle,
    /// Method name
    pub name: String,
    /// Parameter type names
    pub params: Vec<String>,
    /// Return type name
    pub returns: String,
    /// Static method
    pub is_static: bool,
}

/// Resolved field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldHandle {
    /// Class the field was found on
    pub declaring: ClassHandle,
    /// Field name
    pub name: String,
    /// Declared type name
    pub type_name: String,
    /// Static field
    pub is_static: bool,
}

/// Routine of the reflection helper library
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HelperRoutine {
    /// Helper class
    pub class: ClassHandle,
    /// Routine name
    pub name: String,
}

/// The callable a statement invokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callable<'a> {
    /// Constructor of the target program
    Constructor(&'a ConstructorHandle),
    /// Method of the target program or its libraries
    Method(&'a MethodHandle),
    /// Reflection helper routine
    Helper(&'a HelperRoutine),
}

impl Display for Callable<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constructor(c) => {
                write!(f, "{}.<init>({})", c.declaring.name(), c.params.join(", "))
            }
            Self::Method(m) => {
                write!(f, "{}.{}({})", m.declaring.name(), m.name, m.params.join(", "))
            }
            Self::Helper(h) => write!(f, "{}.{}", h.class.name(), h.name),
        }
    }
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `array[index]`
    ArrayIndex {
        /// Array variable
        array: VarRef,
        /// Literal index
        index: usize,
    },
    /// `owner.field`, or a static field when `owner` is `None`
    Field {
        /// Field
        field: FieldHandle,
        /// Receiver for instance fields
        owner: Option<VarRef>,
    },
}

/// Discriminant of [`Statement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Constructor call
    Constructor,
    /// Method call
    Method,
    /// Reflection helper call
    Reflection,
    /// Constant value
    Primitive,
    /// `null`
    Null,
    /// Field read
    FieldRead,
    /// Assignment
    Assignment,
    /// Array allocation
    NewArray,
}

/// One executable statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `ret = new C(args)`; `ret` is absent for the terminal call
    Constructor {
        /// Constructor
        constructor: ConstructorHandle,
        /// Arguments
        args: Vec<Operand>,
        /// Result variable
        ret: Option<VarRef>,
    },
    /// `ret = callee.m(args)`
    Method {
        /// Method
        method: MethodHandle,
        /// Receiver, absent for static methods
        callee: Option<Operand>,
        /// Arguments
        args: Vec<Operand>,
        /// Result variable
        ret: Option<VarRef>,
    },
    /// `ret = Helper.routine(args)`
    Reflection {
        /// Helper routine
        helper: HelperRoutine,
        /// Arguments
        args: Vec<Operand>,
        /// Result variable
        ret: Option<VarRef>,
    },
    /// `ret = constant`
    Primitive {
        /// Value
        value: Constant,
        /// Result variable
        ret: VarRef,
    },
    /// `ret = null`
    Null {
        /// Result variable
        ret: VarRef,
    },
    /// `ret = owner.field`
    FieldRead {
        /// Field
        field: FieldHandle,
        /// Receiver, absent for static fields
        owner: Option<Operand>,
        /// Result variable
        ret: VarRef,
    },
    /// `target = value`
    Assignment {
        /// Assigned location
        target: AssignTarget,
        /// Value
        value: Operand,
    },
    /// `ret = new T[length]`
    NewArray {
        /// Length
        length: usize,
        /// Result variable
        ret: VarRef,
    },
}

impl Statement {
    /// Discriminant
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Constructor { .. } => StatementKind::Constructor,
            Self::Method { .. } => StatementKind::Method,
            Self::Reflection { .. } => StatementKind::Reflection,
            Self::Primitive { .. } => StatementKind::Primitive,
            Self::Null { .. } => StatementKind::Null,
            Self::FieldRead { .. } => StatementKind::FieldRead,
            Self::Assignment { .. } => StatementKind::Assignment,
            Self::NewArray { .. } => StatementKind::NewArray,
        }
    }

    /// Variable defined by this statement
    #[must_use]
    pub fn defines(&self) -> Option<VarRef> {
        match self {
            Self::Constructor { ret, .. }
            | Self::Method { ret, .. }
            | Self::Reflection { ret, .. } => *ret,
            Self::Primitive { ret, .. }
            | Self::Null { ret }
            | Self::FieldRead { ret, .. }
            | Self::NewArray { ret, .. } => Some(*ret),
            Self::Assignment { .. } => None,
        }
    }

    /// Variables read by this statement, in operand order
    #[must_use]
    pub fn uses(&self) -> Vec<VarRef> {
        fn vars<'a>(operands: impl IntoIterator<Item = &'a Operand>) -> Vec<VarRef> {
            operands.into_iter().filter_map(Operand::var).collect()
        }

        match self {
            Self::Constructor { args, .. } | Self::Reflection { args, .. } => vars(args),
            Self::Method { callee, args, .. } => vars(callee.iter().chain(args)),
            Self::FieldRead { owner, .. } => vars(owner),
            Self::Assignment { target, value } => {
                let mut used = match target {
                    AssignTarget::ArrayIndex { array, .. } => vec![*array],
                    AssignTarget::Field { owner, .. } => owner.iter().copied().collect(),
                };
                used.extend(value.var());
                used
            }
            Self::Primitive { .. } | Self::Null { .. } | Self::NewArray { .. } => Vec::new(),
        }
    }

    /// The one callable this statement invokes
    #[must_use]
    pub fn attribution(&self) -> Option<Callable<'_>> {
        match self {
            Self::Constructor { constructor, .. } => Some(Callable::Constructor(constructor)),
            Self::Method { method, .. } => Some(Callable::Method(method)),
            Self::Reflection { helper, .. } => Some(Callable::Helper(helper)),
            Self::Primitive { .. }
            | Self::Null { .. }
            | Self::FieldRead { .. }
            | Self::Assignment { .. }
            | Self::NewArray { .. } => None,
        }
    }

    /// Returns true for reflection helper calls
    #[inline]
    #[must_use]
    pub fn is_reflection(&self) -> bool {
        matches!(self, Self::Reflection { .. })
    }

    /// Whether search operators may mutate this statement
    ///
    /// Reflection helper calls are fixed once emitted.
    #[inline]
    #[must_use]
    pub fn is_mutable(&self) -> bool {
        !self.is_reflection()
    }
}
