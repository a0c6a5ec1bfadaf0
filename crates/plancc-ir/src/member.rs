//! Class member references
//!
//! Plans refer to classes, fields and methods of the analysed program by
//! these descriptors. They carry no runtime identity; the compiler resolves
//! them against the target class loader.

use crate::types::{parse_type_at, DescriptorError, PlanType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Name used by the analysis engine for constructors
pub const CONSTRUCTOR_NAME: &str = "<init>";

/// Reference to a class by internal name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassRef {
    name: String,
}

impl ClassRef {
    /// Create from an internal (`a/b/C`) or binary (`a.b.C`) name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: name.replace('.', "/"),
        }
    }

    /// Internal name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The class as a reference type
    #[inline]
    #[must_use]
    pub fn as_type(&self) -> PlanType {
        PlanType::Class(self.name.clone())
    }
}

impl Display for ClassRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Reference to a field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    /// Declaring class
    pub owner: ClassRef,
    /// Field name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub ty: PlanType,
    /// Static field
    #[serde(default)]
    pub is_static: bool,
}

impl FieldRef {
    /// Instance field
    #[must_use]
    pub fn instance(owner: ClassRef, name: impl Into<String>, ty: PlanType) -> Self {
        Self {
            owner,
            name: name.into(),
            ty,
            is_static: false,
        }
    }

    /// Static field
    #[must_use]
    pub fn of_static(owner: ClassRef, name: impl Into<String>, ty: PlanType) -> Self {
        Self {
            owner,
            name: name.into(),
            ty,
            is_static: true,
        }
    }
}

impl Display for FieldRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.owner, self.name, self.ty)
    }
}

/// Reference to a method or constructor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodRef {
    /// Declaring class
    pub owner: ClassRef,
    /// Method name, [`CONSTRUCTOR_NAME`] for constructors
    pub name: String,
    /// Parameter types
    #[serde(default)]
    pub params: Vec<PlanType>,
    /// Return type, `void` for constructors
    pub returns: PlanType,
    /// Static method
    #[serde(default)]
    pub is_static: bool,
}

impl MethodRef {
    /// Constructor of `owner` with the given parameter types
    #[must_use]
    pub fn constructor(owner: ClassRef, params: Vec<PlanType>) -> Self {
        Self {
            owner,
            name: CONSTRUCTOR_NAME.to_string(),
            params,
            returns: PlanType::Void,
            is_static: false,
        }
    }

    /// Instance method
    #[must_use]
    pub fn instance(
        owner: ClassRef,
        name: impl Into<String>,
        params: Vec<PlanType>,
        returns: PlanType,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            params,
            returns,
            is_static: false,
        }
    }

    /// Static method
    #[must_use]
    pub fn of_static(
        owner: ClassRef,
        name: impl Into<String>,
        params: Vec<PlanType>,
        returns: PlanType,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            params,
            returns,
            is_static: true,
        }
    }

    /// Build from a method descriptor such as `(ILjava/lang/String;)V`
    ///
    /// # Errors
    /// Returns [`DescriptorError`] if `descriptor` is malformed.
    pub fn from_descriptor(
        owner: ClassRef,
        name: impl Into<String>,
        descriptor: &str,
        is_static: bool,
    ) -> Result<Self, DescriptorError> {
        let (params, returns) = parse_method_descriptor(descriptor)?;
        Ok(Self {
            owner,
            name: name.into(),
            params,
            returns,
            is_static,
        })
    }

    /// Returns true for constructors
    #[inline]
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Method descriptor
    #[must_use]
    pub fn descriptor(&self) -> String {
        let params: String = self.params.iter().map(PlanType::to_descriptor).collect();
        format!("({params}){}", self.returns.to_descriptor())
    }
}

impl Display for MethodRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.owner, self.name, self.descriptor())
    }
}

/// Parse a method descriptor into parameter and return types
///
/// # Errors
/// Returns [`DescriptorError`] if `desc` is malformed.
pub fn parse_method_descriptor(desc: &str) -> Result<(Vec<PlanType>, PlanType), DescriptorError> {
    let malformed = || DescriptorError::MalformedMethod(desc.to_string());
    if !desc.starts_with('(') {
        return Err(malformed());
    }
    let close = desc.find(')').ok_or_else(malformed)?;

    let mut params = Vec::new();
    let mut pos = 1;
    while pos < close {
        let (ty, next) = parse_type_at(desc, pos)?;
        if ty.is_void() || next > close {
            return Err(malformed());
        }
        params.push(ty);
        pos = next;
    }

    let (returns, next) = parse_type_at(desc, close + 1)?;
    if next != desc.len() {
        return Err(DescriptorError::TrailingInput(desc.to_string()));
    }
    Ok((params, returns))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PrimitiveType;

    #[test]
    fn method_descriptor_round_trip() {
        let method = MethodRef::from_descriptor(
            ClassRef::new("demo/Point"),
            "move",
            "(I[Ljava/lang/String;)Z",
            false,
        )
        .unwrap();
        assert_eq!(method.params.len(), 2);
        assert_eq!(method.returns, PlanType::Primitive(PrimitiveType::Boolean));
        assert_eq!(method.descriptor(), "(I[Ljava/lang/String;)Z");
    }

    #[test]
    fn constructor_detection() {
        let ctor = MethodRef::constructor(ClassRef::new("demo.Point"), vec![]);
        assert!(ctor.is_constructor());
        assert_eq!(ctor.owner.name(), "demo/Point");
        assert_eq!(ctor.descriptor(), "()V");
    }

    #[test]
    fn rejects_void_parameter() {
        assert!(parse_method_descriptor("(V)V").is_err());
        assert!(parse_method_descriptor("I)V").is_err());
        assert!(parse_method_descriptor("()").is_err());
    }
}
