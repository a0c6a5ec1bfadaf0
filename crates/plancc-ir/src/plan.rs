//! Construction plans
//!
//! A [`Plan`] describes how to produce one value. Plans form a DAG: operands
//! are shared through [`PlanRef`] and identified by [`PlanName`], which is
//! what the compiler memoizes on. Plans are immutable once built.

use crate::member::{ClassRef, FieldRef, MethodRef};
use crate::types::{PlanType, PrimitiveType};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Shared handle to a plan
pub type PlanRef = Arc<Plan>;

/// Stable plan identity, unique within one compilation
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanName(String);

impl PlanName {
    /// Create a plan name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PlanName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlanName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One node of the construction-plan graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Identity used for memoization and back-references
    pub name: PlanName,
    /// Variant
    pub kind: PlanKind,
}

impl Plan {
    /// Create a shared plan
    #[must_use]
    pub fn new(name: impl Into<PlanName>, kind: PlanKind) -> PlanRef {
        Arc::new(Self {
            name: name.into(),
            kind,
        })
    }

    /// Short variant label for diagnostics
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        self.kind.label()
    }

    /// Direct operand plans, in the order the compiler visits them
    ///
    /// The owning plan itself is never included, even when an action
    /// operates on it.
    #[must_use]
    pub fn operands(&self) -> Vec<&PlanRef> {
        match &self.kind {
            PlanKind::Actions(actions) => actions.iter().flat_map(Action::operands).collect(),
            PlanKind::Reflection(actions) => {
                actions.iter().flat_map(ReflectionAction::operands).collect()
            }
            PlanKind::TestCall(call) => call.operands().collect(),
            PlanKind::Primitive(_)
            | PlanKind::String(_)
            | PlanKind::Mock { .. }
            | PlanKind::Unknown { .. } => Vec::new(),
        }
    }
}

impl From<String> for PlanName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Plan variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Ordered operations culminating in the plan's own value
    Actions(Vec<Action>),
    /// Ordered reflective operations culminating in the plan's own value
    Reflection(Vec<ReflectionAction>),
    /// Terminal invocation of the method under test
    TestCall(TestCall),
    /// Primitive leaf, including `null`
    Primitive(PrimitiveValue),
    /// String leaf
    String(String),
    /// Mock object; not supported by the compiler
    Mock {
        /// Mocked type
        #[serde(rename = "type")]
        ty: PlanType,
    },
    /// Value of unknown origin; not supported by the compiler
    Unknown {
        /// Declared type
        #[serde(rename = "type")]
        ty: PlanType,
    },
}

impl PlanKind {
    /// Short variant label for diagnostics
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Actions(_) => "actions",
            Self::Reflection(_) => "reflection",
            Self::TestCall(_) => "test-call",
            Self::Primitive(_) => "primitive",
            Self::String(_) => "string",
            Self::Mock { .. } => "mock",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// Primitive leaf value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveValue {
    /// The `null` reference
    Null,
    /// `boolean`
    Boolean(bool),
    /// `byte`
    Byte(i8),
    /// `char` as a UTF-16 code unit
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
}

impl PrimitiveValue {
    /// Primitive type of a non-null value
    #[must_use]
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Self::Null => return None,
            Self::Boolean(_) => PrimitiveType::Boolean,
            Self::Byte(_) => PrimitiveType::Byte,
            Self::Char(_) => PrimitiveType::Char,
            Self::Short(_) => PrimitiveType::Short,
            Self::Int(_) => PrimitiveType::Int,
            Self::Long(_) => PrimitiveType::Long,
            Self::Float(_) => PrimitiveType::Float,
            Self::Double(_) => PrimitiveType::Double,
        })
    }

    /// Integer value, for index and length operands
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Self::Int(v) => Some(v),
            Self::Short(v) => Some(i32::from(v)),
            Self::Byte(v) => Some(i32::from(v)),
            Self::Char(v) => Some(i32::from(v)),
            _ => None,
        }
    }
}

/// Operation inside an [`PlanKind::Actions`] plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Write `value` at literal `index` of the owner array
    ArrayWrite {
        /// Index, must be an integer leaf
        index: PlanRef,
        /// Element value
        value: PlanRef,
    },
    /// Accessible constructor call producing the owner
    ConstructorCall {
        /// Constructor
        constructor: MethodRef,
        /// Arguments
        args: Vec<PlanRef>,
    },
    /// Constructor of another class producing the owner
    ExternalConstructorCall {
        /// Constructor
        constructor: MethodRef,
        /// Arguments
        args: Vec<PlanRef>,
    },
    /// Inner-class constructor with an explicit outer instance
    InnerClassConstructorCall {
        /// Constructor
        constructor: MethodRef,
        /// Enclosing instance
        outer: PlanRef,
        /// Arguments
        args: Vec<PlanRef>,
    },
    /// Zero-argument constructor of `class`
    DefaultConstructorCall {
        /// Class to instantiate
        class: ClassRef,
    },
    /// Enum constant selected by name
    EnumValueCreation {
        /// Enum class
        class: ClassRef,
        /// Constant name
        name: String,
    },
    /// Instance method called on the owner
    MethodCall {
        /// Method
        method: MethodRef,
        /// Arguments
        args: Vec<PlanRef>,
    },
    /// Method called on another instance, result becomes the owner
    ExternalMethodCall {
        /// Method
        method: MethodRef,
        /// Receiver, absent for static factories
        #[serde(default)]
        instance: Option<PlanRef>,
        /// Arguments
        args: Vec<PlanRef>,
    },
    /// Static method called for its side effects
    StaticMethodCall {
        /// Method
        method: MethodRef,
        /// Arguments
        args: Vec<PlanRef>,
    },
    /// Read an instance field of `instance` into the owner
    FieldGetter {
        /// Object whose field is read
        instance: PlanRef,
        /// Field
        field: FieldRef,
    },
    /// Read a static field into the owner
    StaticFieldGetter {
        /// Field
        field: FieldRef,
    },
    /// Assign an instance field of the owner
    FieldSetter {
        /// Field
        field: FieldRef,
        /// New value
        value: PlanRef,
    },
    /// Assign a static field
    StaticFieldSetter {
        /// Field
        field: FieldRef,
        /// New value
        value: PlanRef,
    },
    /// Allocate an empty array
    NewArray {
        /// Array type
        #[serde(rename = "type")]
        ty: PlanType,
        /// Length, must be an integer leaf
        length: PlanRef,
    },
    /// Allocate an array and fill it in order
    NewArrayWithInitializer {
        /// Array type
        #[serde(rename = "type")]
        ty: PlanType,
        /// Elements, index `0..n`
        elements: Vec<PlanRef>,
    },
    /// Class literal of a non-array type
    ClassConstantGetter {
        /// Type whose class object is produced
        #[serde(rename = "type")]
        ty: PlanType,
    },
    /// Class literal of an array type, built from its element class
    ArrayClassConstantGetter {
        /// Plan producing the element `Class`
        element_type: PlanRef,
    },
}

impl Action {
    /// Operand plans referenced by this action
    #[must_use]
    pub fn operands(&self) -> Vec<&PlanRef> {
        match self {
            Self::ArrayWrite { index, value } => vec![index, value],
            Self::ConstructorCall { args, .. }
            | Self::ExternalConstructorCall { args, .. }
            | Self::MethodCall { args, .. }
            | Self::StaticMethodCall { args, .. } => args.iter().collect(),
            Self::InnerClassConstructorCall { outer, args, .. } => {
                std::iter::once(outer).chain(args).collect()
            }
            Self::ExternalMethodCall { instance, args, .. } => {
                instance.iter().chain(args).collect()
            }
            Self::FieldGetter { instance, .. } => vec![instance],
            Self::FieldSetter { value, .. } | Self::StaticFieldSetter { value, .. } => vec![value],
            Self::NewArray { length, .. } => vec![length],
            Self::NewArrayWithInitializer { elements, .. } => elements.iter().collect(),
            Self::ArrayClassConstantGetter { element_type } => vec![element_type],
            Self::DefaultConstructorCall { .. }
            | Self::EnumValueCreation { .. }
            | Self::StaticFieldGetter { .. }
            | Self::ClassConstantGetter { .. } => Vec::new(),
        }
    }
}

/// Operation inside a [`PlanKind::Reflection`] plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ReflectionAction {
    /// Instantiate by class name, bypassing constructors
    NewInstance {
        /// Instance type
        #[serde(rename = "type")]
        ty: PlanType,
    },
    /// Allocate an array reflectively
    NewArray {
        /// Array type
        #[serde(rename = "type")]
        ty: PlanType,
        /// Length
        length: PlanRef,
    },
    /// Write an element of the owner array
    ArrayWrite {
        /// Index
        index: PlanRef,
        /// Value
        value: PlanRef,
    },
    /// Read an element of `array` into the owner
    ArrayRead {
        /// Array
        array: PlanRef,
        /// Index
        index: PlanRef,
        /// Static element type
        element_type: PlanType,
    },
    /// Set an instance field of the owner
    SetField {
        /// Field
        field: FieldRef,
        /// Value
        value: PlanRef,
    },
    /// Set a static field
    SetStaticField {
        /// Field
        field: FieldRef,
        /// Value
        value: PlanRef,
    },
    /// Read an instance field of `instance` into the owner
    GetField {
        /// Object whose field is read
        instance: PlanRef,
        /// Field
        field: FieldRef,
    },
    /// Read a static field into the owner
    GetStaticField {
        /// Field
        field: FieldRef,
    },
}

impl ReflectionAction {
    /// Operand plans referenced by this action
    #[must_use]
    pub fn operands(&self) -> Vec<&PlanRef> {
        match self {
            Self::NewInstance { .. } | Self::GetStaticField { .. } => Vec::new(),
            Self::NewArray { length, .. } => vec![length],
            Self::ArrayWrite { index, value } => vec![index, value],
            Self::ArrayRead { array, index, .. } => vec![array, index],
            Self::SetField { value, .. } | Self::SetStaticField { value, .. } => vec![value],
            Self::GetField { instance, .. } => vec![instance],
        }
    }
}

/// Terminal invocation of the method or constructor under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCall {
    /// Target method or constructor
    pub method: MethodRef,
    /// Receiver for instance methods
    #[serde(default)]
    pub instance: Option<PlanRef>,
    /// Arguments
    #[serde(default)]
    pub args: Vec<PlanRef>,
}

impl TestCall {
    /// Instance first, then arguments
    pub fn operands(&self) -> impl Iterator<Item = &PlanRef> {
        self.instance.iter().chain(&self.args)
    }
}

/// Root plans for one test: the receiver, the arguments and touched statics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Receiver of the target method
    #[serde(default)]
    pub instance: Option<PlanRef>,
    /// Arguments of the target method
    #[serde(default)]
    pub arguments: Vec<PlanRef>,
    /// Static fields the path depends on
    #[serde(default)]
    pub statics: Vec<PlanRef>,
}

impl Parameters {
    /// All roots, instance first, then arguments, then statics
    pub fn roots(&self) -> impl Iterator<Item = &PlanRef> {
        self.instance
            .iter()
            .chain(&self.arguments)
            .chain(&self.statics)
    }

    /// Terminal invocation of `method` with these parameters
    #[must_use]
    pub fn test_call(&self, method: MethodRef) -> TestCall {
        TestCall {
            method,
            instance: self.instance.clone(),
            args: self.arguments.clone(),
        }
    }
}
