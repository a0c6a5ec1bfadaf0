//! Runtime type representation
//!
//! Types as the test-execution side sees them: classes carry the loader
//! layer they were defined by, so two classes with the same name from
//! different layers are different types.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Runtime primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl Primitive {
    /// All primitives
    pub const ALL: [Primitive; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Type name (`int`)
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Parse a type name
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.type_name() == name)
    }
}

impl Display for Primitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Loader layer a class was defined by
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassOrigin {
    /// Instrumented target classpath
    Instrumented,
    /// Runtime support classpath
    Runtime,
    /// Host classpath
    Host,
}

impl Display for ClassOrigin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Instrumented => "instrumented",
            Self::Runtime => "runtime",
            Self::Host => "host",
        })
    }
}

/// Identity of a loaded class: binary name plus defining layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassHandle {
    name: Arc<str>,
    origin: ClassOrigin,
}

impl ClassHandle {
    /// Create handle
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>, origin: ClassOrigin) -> Self {
        Self {
            name: name.into(),
            origin,
        }
    }

    /// Binary name (`java.lang.String`)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defining layer
    #[inline]
    #[must_use]
    pub fn origin(&self) -> ClassOrigin {
        self.origin
    }
}

/// Runtime type of a variable or member
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuntimeType {
    /// `void`
    Void,
    /// Primitive
    Primitive(Primitive),
    /// Loaded class
    Class(ClassHandle),
    /// Array of the component
    Array(Box<RuntimeType>),
}

impl RuntimeType {
    /// Array of `component`
    #[inline]
    #[must_use]
    pub fn array_of(component: RuntimeType) -> Self {
        Self::Array(Box::new(component))
    }

    /// Type name as reported by reflection (`int`, `java.lang.String[]`)
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Self::Void => "void".into(),
            Self::Primitive(p) => p.type_name().into(),
            Self::Class(class) => class.name().into(),
            Self::Array(component) => format!("{}[]", component.type_name()),
        }
    }

    /// Returns true for primitives
    #[inline]
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns true for arrays
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Component type for arrays
    #[inline]
    #[must_use]
    pub fn component(&self) -> Option<&RuntimeType> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Loaded class, for class types
    #[inline]
    #[must_use]
    pub fn class(&self) -> Option<&ClassHandle> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl Display for RuntimeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}
