//! Variables, constants and operands

use plancc_runtime::{ClassHandle, Primitive, RuntimeType};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Handle to a variable of a [`TestCase`](crate::TestCase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct VarRef(pub(crate) usize);

impl VarRef {
    /// Position in the variable table
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for VarRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A typed variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub(crate) ty: RuntimeType,
    pub(crate) defined_at: Option<usize>,
    pub(crate) array_length: Option<usize>,
}

impl Variable {
    /// Declared type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &RuntimeType {
        &self.ty
    }

    /// Position of the defining statement, once appended
    #[inline]
    #[must_use]
    pub fn defined_at(&self) -> Option<usize> {
        self.defined_at
    }

    /// Allocated length, for array variables
    #[inline]
    #[must_use]
    pub fn array_length(&self) -> Option<usize> {
        self.array_length
    }
}

/// Inline constant value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char` code unit
    Char(u16),
    /// `short`
    Short(i16),
    /// `int`
    Int(i32),
    /// `long`
    Long(i64),
    /// `float`
    Float(f32),
    /// `double`
    Double(f64),
    /// `java.lang.String`
    String(String),
    /// Class object of a runtime type
    Class(RuntimeType),
    /// Enum constant
    Enum {
        /// Enum class
        class: ClassHandle,
        /// Constant name
        name: String,
    },
}

impl Constant {
    /// Primitive type, for primitive constants
    #[must_use]
    pub fn primitive(&self) -> Option<Primitive> {
        Some(match self {
            Self::Boolean(_) => Primitive::Boolean,
            Self::Byte(_) => Primitive::Byte,
            Self::Char(_) => Primitive::Char,
            Self::Short(_) => Primitive::Short,
            Self::Int(_) => Primitive::Int,
            Self::Long(_) => Primitive::Long,
            Self::Float(_) => Primitive::Float,
            Self::Double(_) => Primitive::Double,
            Self::String(_) | Self::Class(_) | Self::Enum { .. } => return None,
        })
    }

    /// Reflection type name of the constant's static type
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::String(_) => "java.lang.String".into(),
            Self::Class(_) => "java.lang.Class".into(),
            Self::Enum { class, .. } => class.name().into(),
            primitive => primitive
                .primitive()
                .map(|p| p.type_name().to_string())
                .unwrap_or_default(),
        }
    }

    /// Integer value, for index operands
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match *self {
            Self::Int(v) => usize::try_from(v).ok(),
            Self::Short(v) => usize::try_from(v).ok(),
            Self::Byte(v) => usize::try_from(v).ok(),
            Self::Char(v) => Some(usize::from(v)),
            _ => None,
        }
    }
}

/// Statement operand: a variable or an inline constant
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Previously defined variable
    Var(VarRef),
    /// Inline constant
    Constant(Constant),
}

impl Operand {
    /// Referenced variable, if any
    #[inline]
    #[must_use]
    pub fn var(&self) -> Option<VarRef> {
        match self {
            Self::Var(var) => Some(*var),
            Self::Constant(_) => None,
        }
    }
}

impl From<VarRef> for Operand {
    fn from(value: VarRef) -> Self {
        Self::Var(value)
    }
}

impl From<Constant> for Operand {
    fn from(value: Constant) -> Self {
        Self::Constant(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancc_runtime::ClassOrigin;

    #[test]
    fn constant_type_names() {
        assert_eq!(Constant::Int(1).type_name(), "int");
        assert_eq!(Constant::String("s".into()).type_name(), "java.lang.String");
        assert_eq!(
            Constant::Class(RuntimeType::Primitive(Primitive::Int)).type_name(),
            "java.lang.Class"
        );
        let color = ClassHandle::new("demo.Color", ClassOrigin::Instrumented);
        assert_eq!(
            Constant::Enum {
                class: color,
                name: "RED".into()
            }
            .type_name(),
            "demo.Color"
        );
    }

    #[test]
    fn negative_indices_are_rejected() {
        assert_eq!(Constant::Int(2).as_index(), Some(2));
        assert_eq!(Constant::Int(-1).as_index(), None);
        assert_eq!(Constant::Long(2).as_index(), None);
    }
}
