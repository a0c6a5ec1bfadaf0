//! Class model of the target program
//!
//! [`ClassDef`] is the metadata a class source hands out; [`RuntimeClass`] is
//! a definition bound to the layer that loaded it. Member signatures use
//! reflection type names (`int`, `java.lang.String[]`), which is what the
//! compiler matches against after translating analysis types.

use crate::types::{ClassHandle, ClassOrigin, RuntimeType};
use serde::{Deserialize, Serialize};

/// Kind of class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// Ordinary class
    #[default]
    Class,
    /// Interface
    Interface,
    /// Enum class
    Enum,
}

/// Constructor signature
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDef {
    /// Parameter type names
    #[serde(default)]
    pub params: Vec<String>,
}

/// Method signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Parameter type names
    #[serde(default)]
    pub params: Vec<String>,
    /// Return type name
    #[serde(default = "void_name")]
    pub returns: String,
    /// Static method
    #[serde(default)]
    pub is_static: bool,
}

/// Field signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Static field
    #[serde(default)]
    pub is_static: bool,
}

fn void_name() -> String {
    "void".to_string()
}

/// Class metadata as provided by a class source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    /// Binary name (`a.b.C`)
    pub name: String,
    /// Kind
    #[serde(default)]
    pub kind: ClassKind,
    /// Binary name of the superclass
    #[serde(default)]
    pub superclass: Option<String>,
    /// Declared constructors
    #[serde(default)]
    pub constructors: Vec<ConstructorDef>,
    /// Declared methods
    #[serde(default)]
    pub methods: Vec<MethodDef>,
    /// Declared fields
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    /// Enum constants, in declaration order
    #[serde(default)]
    pub enum_constants: Vec<String>,
}

impl ClassDef {
    /// Ordinary class with `java.lang.Object` as superclass
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: Some("java.lang.Object".to_string()),
            ..Self::default()
        }
    }

    /// Enum class with the given constants
    #[must_use]
    pub fn enumeration(name: impl Into<String>, constants: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: ClassKind::Enum,
            superclass: Some("java.lang.Enum".to_string()),
            enum_constants: constants.iter().map(|c| (*c).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Set the superclass
    #[must_use]
    pub fn extends(mut self, superclass: Option<&str>) -> Self {
        self.superclass = superclass.map(str::to_string);
        self
    }

    /// Add a constructor
    #[must_use]
    pub fn constructor(mut self, params: &[&str]) -> Self {
        self.constructors.push(ConstructorDef {
            params: params.iter().map(|p| (*p).to_string()).collect(),
        });
        self
    }

    /// Add an instance method
    #[must_use]
    pub fn method(mut self, name: &str, params: &[&str], returns: &str) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            params: params.iter().map(|p| (*p).to_string()).collect(),
            returns: returns.to_string(),
            is_static: false,
        });
        self
    }

    /// Add a static method
    #[must_use]
    pub fn static_method(mut self, name: &str, params: &[&str], returns: &str) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            params: params.iter().map(|p| (*p).to_string()).collect(),
            returns: returns.to_string(),
            is_static: true,
        });
        self
    }

    /// Add an instance field
    #[must_use]
    pub fn field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: false,
        });
        self
    }

    /// Add a static field
    #[must_use]
    pub fn static_field(mut self, name: &str, type_name: &str) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            type_name: type_name.to_string(),
            is_static: true,
        });
        self
    }
}

/// A class definition bound to the layer that loaded it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeClass {
    handle: ClassHandle,
    def: ClassDef,
}

impl RuntimeClass {
    /// Bind `def` to `origin`
    #[must_use]
    pub fn new(def: ClassDef, origin: ClassOrigin) -> Self {
        Self {
            handle: ClassHandle::new(def.name.as_str(), origin),
            def,
        }
    }

    /// Identity
    #[inline]
    #[must_use]
    pub fn handle(&self) -> &ClassHandle {
        &self.handle
    }

    /// Binary name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Defining layer
    #[inline]
    #[must_use]
    pub fn origin(&self) -> ClassOrigin {
        self.handle.origin()
    }

    /// This class as a runtime type
    #[inline]
    #[must_use]
    pub fn as_type(&self) -> RuntimeType {
        RuntimeType::Class(self.handle.clone())
    }

    /// Underlying metadata
    #[inline]
    #[must_use]
    pub fn def(&self) -> &ClassDef {
        &self.def
    }

    /// Returns true for enum classes
    #[inline]
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.def.kind == ClassKind::Enum
    }

    /// Superclass name
    #[inline]
    #[must_use]
    pub fn superclass(&self) -> Option<&str> {
        self.def.superclass.as_deref()
    }

    /// Declared constructor with exactly these parameter types
    #[must_use]
    pub fn declared_constructor(&self, params: &[String]) -> Option<&ConstructorDef> {
        self.def.constructors.iter().find(|c| c.params == params)
    }

    /// Declared method with this name and parameter types
    #[must_use]
    pub fn declared_method(&self, name: &str, params: &[String]) -> Option<&MethodDef> {
        self.def
            .methods
            .iter()
            .find(|m| m.name == name && m.params == params)
    }

    /// Declared field by name
    #[must_use]
    pub fn declared_field(&self, name: &str) -> Option<&FieldDef> {
        self.def.fields.iter().find(|f| f.name == name)
    }

    /// Enum constant by name
    #[must_use]
    pub fn enum_constant(&self, name: &str) -> Option<&str> {
        self.def
            .enum_constants
            .iter()
            .find(|c| c.as_str() == name)
            .map(String::as_str)
    }
}
