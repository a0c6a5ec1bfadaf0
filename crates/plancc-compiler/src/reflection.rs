//! Reflective actions to helper-library calls
//!
//! Each reflective operation becomes one call into the generated helper
//! class. Where the helper family has a routine specialised for the
//! primitive type involved, that routine is used; otherwise the generic
//! routine. Static field access passes a fresh `null` as the owner.
//!
//! Helper calls are emitted as [`Statement::Reflection`], which search
//! operators treat as fixed.

use crate::compiler::PlanCompiler;
use crate::config::HelperFamily;
use crate::error::{CompileError, MemberKind, Result};
use plancc_ir::{FieldRef, Plan, PlanName, ReflectionAction};
use plancc_runtime::RuntimeType;
use plancc_testcase::{Constant, HelperRoutine, Operand, Statement};

impl PlanCompiler<'_> {
    pub(crate) fn lower_reflection(
        &mut self,
        owner: &Plan,
        action: &ReflectionAction,
    ) -> Result<()> {
        let config = self.config;
        let helpers = &config.helpers;
        match action {
            ReflectionAction::NewInstance { ty } => {
                let ty = self.types.to_runtime(ty)?;
                let helper = self.helper(&helpers.new_instance)?;
                let args = vec![Operand::Constant(Constant::String(ty.type_name()))];
                self.define(&owner.name, ty, |ret| Statement::Reflection {
                    helper,
                    args,
                    ret: Some(ret),
                })
                .map(drop)
            }
            ReflectionAction::NewArray { ty, length } => {
                let array_ty = self.array_type(&owner.name, ty)?;
                let element = array_ty
                    .component()
                    .map(RuntimeType::type_name)
                    .unwrap_or_default();
                let length = self.operand(length)?;
                let (name, args) = match helpers.new_array.specialized_for(&element) {
                    Some(name) => (name, vec![length]),
                    None => (
                        helpers.new_array.generic.as_str(),
                        vec![Operand::Constant(Constant::String(element)), length],
                    ),
                };
                let helper = self.helper(name)?;
                self.define(&owner.name, array_ty, |ret| Statement::Reflection {
                    helper,
                    args,
                    ret: Some(ret),
                })
                .map(drop)
            }
            ReflectionAction::ArrayWrite { index, value } => {
                let array = self.owner_var(owner)?;
                let index = self.operand(index)?;
                let value = self.operand(value)?;
                let helper = self.select(&helpers.set_element, &self.operand_type_name(&value))?;
                self.emit(Statement::Reflection {
                    helper,
                    args: vec![Operand::Var(array), index, value],
                    ret: None,
                })
                .map(drop)
            }
            ReflectionAction::ArrayRead {
                array,
                index,
                element_type,
            } => {
                let array = self.operand(array)?;
                let index = self.operand(index)?;
                let ty = self.types.to_runtime(element_type)?;
                let helper = self.select(&helpers.get_element, &ty.type_name())?;
                self.define(&owner.name, ty, |ret| Statement::Reflection {
                    helper,
                    args: vec![array, index],
                    ret: Some(ret),
                })
                .map(drop)
            }
            ReflectionAction::SetField { field, value } => {
                let receiver = Operand::Var(self.owner_var(owner)?);
                self.set_field(Some(receiver), field, value)
            }
            ReflectionAction::SetStaticField { field, value } => self.set_field(None, field, value),
            ReflectionAction::GetField { instance, field } => {
                let receiver = self.operand(instance)?;
                self.get_field(&owner.name, Some(receiver), field)
            }
            ReflectionAction::GetStaticField { field } => self.get_field(&owner.name, None, field),
        }
    }

    /// Declaring class literal and field name, the helper's field locator
    fn field_locator(&self, field: &FieldRef) -> Result<[Operand; 2]> {
        let class = self.types.load_ref(&field.owner)?;
        Ok([
            Operand::Constant(Constant::Class(class.as_type())),
            Operand::Constant(Constant::String(field.name.clone())),
        ])
    }

    /// Receiver operand, a fresh `null` for static access
    ///
    /// Must run after every fallible lookup of the helper call.
    fn receiver(&mut self, receiver: Option<Operand>) -> Result<Operand> {
        match receiver {
            Some(receiver) => Ok(receiver),
            None => self.null_temp(),
        }
    }

    fn set_field(
        &mut self,
        receiver: Option<Operand>,
        field: &FieldRef,
        value: &Plan,
    ) -> Result<()> {
        let value = self.operand(value)?;
        let helper = self.select(&self.config.helpers.set_field, &self.operand_type_name(&value))?;
        let [class, name] = self.field_locator(field)?;
        let receiver = self.receiver(receiver)?;
        self.emit(Statement::Reflection {
            helper,
            args: vec![receiver, class, name, value],
            ret: None,
        })
        .map(drop)
    }

    fn get_field(
        &mut self,
        owner: &PlanName,
        receiver: Option<Operand>,
        field: &FieldRef,
    ) -> Result<()> {
        let ty = self.types.to_runtime(&field.ty)?;
        let helper = self.select(&self.config.helpers.get_field, &ty.type_name())?;
        let [class, name] = self.field_locator(field)?;
        self.ensure_unbound(owner)?;
        let receiver = self.receiver(receiver)?;
        self.define(owner, ty, |ret| Statement::Reflection {
            helper,
            args: vec![receiver, class, name],
            ret: Some(ret),
        })
        .map(drop)
    }

    fn select(&self, family: &HelperFamily, type_name: &str) -> Result<HelperRoutine> {
        self.helper(family.select(type_name))
    }

    /// Resolve a routine of the helper class through the target loader
    fn helper(&self, name: &str) -> Result<HelperRoutine> {
        let class = self.types.load(&self.config.helpers.binary_name())?;
        if !class.def().methods.iter().any(|m| m.name == name) {
            return Err(CompileError::MemberNotFound {
                class: class.name().to_string(),
                member: name.to_string(),
                kind: MemberKind::Helper,
            });
        }
        Ok(HelperRoutine {
            class: class.handle().clone(),
            name: name.to_string(),
        })
    }
}
