//! Analysis-side type model
//!
//! Types as the analysis engine sees them. Class names use the internal,
//! slash-separated form (`java/lang/String`); conversion to binary names
//! happens in the compiler's type bridge.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Primitive types of the analysed program
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
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

impl PrimitiveType {
    /// All primitive types, in descriptor-table order
    pub const ALL: [PrimitiveType; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Short,
        Self::Int,
        Self::Long,
        Self::Float,
        Self::Double,
    ];

    /// Source-level keyword (`int`, `boolean`, ...)
    #[must_use]
    pub const fn keyword(self) -> &'static str {
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

    /// Single-character descriptor
    #[must_use]
    pub const fn descriptor(self) -> char {
        match self {
            Self::Boolean => 'Z',
            Self::Byte => 'B',
            Self::Char => 'C',
            Self::Short => 'S',
            Self::Int => 'I',
            Self::Long => 'J',
            Self::Float => 'F',
            Self::Double => 'D',
        }
    }

    /// Parse a source keyword
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    fn from_descriptor_char(c: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.descriptor() as u8 == c)
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Type of a value in the analysis engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum PlanType {
    /// `void`, only valid as a method return type
    Void,
    /// Primitive value type
    Primitive(PrimitiveType),
    /// Reference type by internal name (`java/lang/String`)
    Class(String),
    /// Array of the component type
    Array(Box<PlanType>),
}

/// Errors produced while parsing descriptors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// Descriptor ended early or contained an unknown tag
    #[error("malformed type descriptor `{0}`")]
    MalformedType(String),

    /// Method descriptor is not of the form `(...)R`
    #[error("malformed method descriptor `{0}`")]
    MalformedMethod(String),

    /// Trailing characters after a complete descriptor
    #[error("trailing input in descriptor `{0}`")]
    TrailingInput(String),
}

impl PlanType {
    /// Reference type from an internal or binary class name
    #[inline]
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::Class(name.replace('.', "/"))
    }

    /// Array of `component`
    #[inline]
    #[must_use]
    pub fn array_of(component: PlanType) -> Self {
        Self::Array(Box::new(component))
    }

    /// Returns true for `void`
    #[inline]
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Component type for arrays
    #[inline]
    #[must_use]
    pub fn component(&self) -> Option<&PlanType> {
        match self {
            Self::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Parse a single field descriptor (`I`, `Ljava/lang/String;`, `[[J`)
    ///
    /// # Errors
    /// Returns [`DescriptorError`] if the descriptor is malformed or has
    /// trailing characters.
    pub fn from_descriptor(desc: &str) -> Result<Self, DescriptorError> {
        let (ty, next) = parse_type_at(desc, 0)?;
        if next != desc.len() {
            return Err(DescriptorError::TrailingInput(desc.to_string()));
        }
        Ok(ty)
    }

    /// JVM descriptor for this type
    #[must_use]
    pub fn to_descriptor(&self) -> String {
        match self {
            Self::Void => "V".into(),
            Self::Primitive(p) => p.descriptor().to_string(),
            Self::Class(name) => format!("L{name};"),
            Self::Array(component) => format!("[{}", component.to_descriptor()),
        }
    }
}

impl Display for PlanType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Primitive(p) => Display::fmt(p, f),
            Self::Class(name) => f.write_str(name),
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

pub(crate) fn parse_type_at(desc: &str, pos: usize) -> Result<(PlanType, usize), DescriptorError> {
    let malformed = || DescriptorError::MalformedType(desc.to_string());
    let bytes = desc.as_bytes();
    let tag = *bytes.get(pos).ok_or_else(malformed)?;
    match tag {
        b'V' => Ok((PlanType::Void, pos + 1)),
        b'L' => {
            let semi = desc[pos + 1..].find(';').ok_or_else(malformed)?;
            if semi == 0 {
                return Err(malformed());
            }
            let name = &desc[pos + 1..pos + 1 + semi];
            Ok((PlanType::Class(name.to_string()), pos + semi + 2))
        }
        b'[' => {
            let (component, next) = parse_type_at(desc, pos + 1)?;
            if component.is_void() {
                return Err(malformed());
            }
            Ok((PlanType::array_of(component), next))
        }
        other => PrimitiveType::from_descriptor_char(other)
            .map(|p| (PlanType::Primitive(p), pos + 1))
            .ok_or_else(malformed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_primitive_descriptors() {
        for p in PrimitiveType::ALL {
            let desc = p.descriptor().to_string();
            assert_eq!(PlanType::from_descriptor(&desc).unwrap(), PlanType::Primitive(p));
        }
    }

    #[test]
    fn parses_nested_arrays() {
        let ty = PlanType::from_descriptor("[[Ljava/lang/String;").unwrap();
        assert_eq!(
            ty,
            PlanType::array_of(PlanType::array_of(PlanType::class("java/lang/String")))
        );
        assert_eq!(ty.to_string(), "java/lang/String[][]");
    }

    #[test]
    fn rejects_void_arrays_and_garbage() {
        assert!(PlanType::from_descriptor("[V").is_err());
        assert!(PlanType::from_descriptor("Q").is_err());
        assert!(PlanType::from_descriptor("Ljava/lang/String").is_err());
        assert!(matches!(
            PlanType::from_descriptor("II"),
            Err(DescriptorError::TrailingInput(_))
        ));
    }

    #[test]
    fn class_constructor_normalizes_binary_names() {
        assert_eq!(PlanType::class("java.util.List"), PlanType::Class("java/util/List".into()));
    }

    #[test]
    fn keyword_lookup() {
        assert_eq!(PrimitiveType::from_keyword("long"), Some(PrimitiveType::Long));
        assert_eq!(PrimitiveType::from_keyword("Long"), None);
    }
}
