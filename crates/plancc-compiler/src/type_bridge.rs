//! Analysis types to runtime types
//!
//! Every class is resolved through the target [`ClassLoader`], never by a
//! host lookup, so a class loaded twice keeps one identity. Member lookups
//! walk the superclass chain through the same loader.

use crate::error::{CompileError, MemberKind, Result};
use plancc_ir::{ClassRef, FieldRef, MethodRef, PlanType, PrimitiveType};
use plancc_runtime::{ClassLoader, Primitive, RuntimeClass, RuntimeType};
use plancc_testcase::{ConstructorHandle, FieldHandle, MethodHandle};
use std::collections::HashSet;
use std::sync::Arc;

pub(crate) const JAVA_OBJECT: &str = "java.lang.Object";
pub(crate) const JAVA_CLASS: &str = "java.lang.Class";
pub(crate) const JAVA_STRING: &str = "java.lang.String";
pub(crate) const JAVA_REFLECT_ARRAY: &str = "java.lang.reflect.Array";

/// Internal name (`a/b/C`) to binary name (`a.b.C`)
#[inline]
#[must_use]
pub fn binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

fn primitive(ty: PrimitiveType) -> Primitive {
    match ty {
        PrimitiveType::Boolean => Primitive::Boolean,
        PrimitiveType::Byte => Primitive::Byte,
        PrimitiveType::Char => Primitive::Char,
        PrimitiveType::Short => Primitive::Short,
        PrimitiveType::Int => Primitive::Int,
        PrimitiveType::Long => Primitive::Long,
        PrimitiveType::Float => Primitive::Float,
        PrimitiveType::Double => Primitive::Double,
    }
}

/// Resolves analysis types and members against a target class loader
#[derive(Debug, Clone, Copy)]
pub struct TypeBridge<'a> {
    loader: &'a dyn ClassLoader,
}

impl<'a> TypeBridge<'a> {
    /// Bridge backed by `loader`
    #[inline]
    #[must_use]
    pub fn new(loader: &'a dyn ClassLoader) -> Self {
        Self { loader }
    }

    /// Load a class by binary name
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] if no layer defines it.
    pub fn load(&self, binary: &str) -> Result<Arc<RuntimeClass>> {
        Ok(self.loader.load_class(binary)?)
    }

    /// Load the class behind a member reference
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] if no layer defines it.
    pub fn load_ref(&self, class: &ClassRef) -> Result<Arc<RuntimeClass>> {
        self.load(&binary_name(class.name()))
    }

    /// Runtime counterpart of `ty`
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] if a class component cannot
    /// be loaded.
    pub fn to_runtime(&self, ty: &PlanType) -> Result<RuntimeType> {
        Ok(match ty {
            PlanType::Void => RuntimeType::Void,
            PlanType::Primitive(p) => RuntimeType::Primitive(primitive(*p)),
            PlanType::Array(component) => RuntimeType::array_of(self.to_runtime(component)?),
            PlanType::Class(internal) => self.load(&binary_name(internal))?.as_type(),
        })
    }

    /// Runtime type from a reflection type name (`int`, `a.B[]`, `void`)
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] if the element class cannot
    /// be loaded.
    pub fn type_by_name(&self, name: &str) -> Result<RuntimeType> {
        if let Some(component) = name.strip_suffix("[]") {
            return Ok(RuntimeType::array_of(self.type_by_name(component)?));
        }
        if name == "void" {
            return Ok(RuntimeType::Void);
        }
        if let Some(p) = Primitive::from_type_name(name) {
            return Ok(RuntimeType::Primitive(p));
        }
        Ok(self.load(name)?.as_type())
    }

    fn signature(&self, params: &[PlanType]) -> Result<Vec<String>> {
        params
            .iter()
            .map(|p| self.to_runtime(p).map(|t| t.type_name()))
            .collect()
    }

    /// `class` followed by its superclasses, as loaded by the target loader
    fn hierarchy(&self, class: Arc<RuntimeClass>) -> Result<Vec<Arc<RuntimeClass>>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(class);
        while let Some(class) = current {
            if !seen.insert(class.name().to_string()) {
                break;
            }
            current = match class.superclass() {
                Some(parent) => Some(self.load(parent)?),
                None => None,
            };
            chain.push(class);
        }
        Ok(chain)
    }

    /// Resolve a constructor on its declaring class
    ///
    /// Constructors are not inherited, so only the class itself is searched.
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] or
    /// [`CompileError::MemberNotFound`].
    pub fn constructor(
        &self,
        method: &MethodRef,
    ) -> Result<(Arc<RuntimeClass>, ConstructorHandle)> {
        let class = self.load_ref(&method.owner)?;
        let params = self.signature(&method.params)?;
        self.constructor_on(class, params)
    }

    /// Zero-argument constructor of `class`
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] or
    /// [`CompileError::MemberNotFound`].
    pub fn default_constructor(
        &self,
        class: &ClassRef,
    ) -> Result<(Arc<RuntimeClass>, ConstructorHandle)> {
        let class = self.load_ref(class)?;
        self.constructor_on(class, Vec::new())
    }

    fn constructor_on(
        &self,
        class: Arc<RuntimeClass>,
        params: Vec<String>,
    ) -> Result<(Arc<RuntimeClass>, ConstructorHandle)> {
        if class.declared_constructor(&params).is_none() {
            return Err(CompileError::MemberNotFound {
                class: class.name().to_string(),
                member: format!("<init>({})", params.join(", ")),
                kind: MemberKind::Constructor,
            });
        }
        let handle = ConstructorHandle {
            declaring: class.handle().clone(),
            params,
        };
        Ok((class, handle))
    }

    /// Resolve a method, searching superclasses
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] or
    /// [`CompileError::MemberNotFound`].
    pub fn method(&self, method: &MethodRef) -> Result<MethodHandle> {
        let params = self.signature(&method.params)?;
        self.method_by_signature(&binary_name(method.owner.name()), &method.name, params)
    }

    /// Resolve a method from reflection type names, searching superclasses
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] or
    /// [`CompileError::MemberNotFound`].
    pub fn method_by_signature(
        &self,
        class: &str,
        name: &str,
        params: Vec<String>,
    ) -> Result<MethodHandle> {
        let start = self.load(class)?;
        for candidate in self.hierarchy(start)? {
            if let Some(def) = candidate.declared_method(name, &params) {
                return Ok(MethodHandle {
                    declaring: candidate.handle().clone(),
                    name: def.name.clone(),
                    params,
                    returns: def.returns.clone(),
                    is_static: def.is_static,
                });
            }
        }
        Err(CompileError::MemberNotFound {
            class: class.to_string(),
            member: format!("{name}({})", params.join(", ")),
            kind: MemberKind::Method,
        })
    }

    /// Resolve a field, searching superclasses
    ///
    /// # Errors
    /// Returns [`CompileError::ClassNotFound`] or
    /// [`CompileError::MemberNotFound`].
    pub fn field(&self, field: &FieldRef) -> Result<FieldHandle> {
        let start = self.load_ref(&field.owner)?;
        let class = start.name().to_string();
        for candidate in self.hierarchy(start)? {
            if let Some(def) = candidate.declared_field(&field.name) {
                return Ok(FieldHandle {
                    declaring: candidate.handle().clone(),
                    name: def.name.clone(),
                    type_name: def.type_name.clone(),
                    is_static: def.is_static,
                });
            }
        }
        Err(CompileError::MemberNotFound {
            class,
            member: field.name.clone(),
            kind: MemberKind::Field,
        })
    }
}
