//! Direct-call actions to statements

use crate::compiler::{literal_index, PlanCompiler, Receiver};
use crate::error::{CompileError, Result};
use crate::type_bridge::{JAVA_CLASS, JAVA_OBJECT, JAVA_REFLECT_ARRAY};
use plancc_ir::{Action, ClassRef, FieldRef, MethodRef, Plan, PlanName, PlanRef, PlanType};
use plancc_runtime::RuntimeType;
use plancc_testcase::{AssignTarget, Constant, Operand, Statement, VarRef};

impl PlanCompiler<'_> {
    pub(crate) fn lower_action(&mut self, owner: &Plan, action: &Action) -> Result<()> {
        match action {
            Action::ConstructorCall { constructor, args }
            | Action::ExternalConstructorCall { constructor, args } => {
                self.invoke(constructor, Receiver::None, args, Some(&owner.name))
            }
            Action::InnerClassConstructorCall { .. } => {
                Err(CompileError::Unimplemented("inner-class constructor calls"))
            }
            Action::DefaultConstructorCall { class } => {
                let (class, constructor) = self.types.default_constructor(class)?;
                self.define(&owner.name, class.as_type(), |ret| Statement::Constructor {
                    constructor,
                    args: Vec::new(),
                    ret: Some(ret),
                })
                .map(drop)
            }
            Action::EnumValueCreation { class, name } => self.enum_value(owner, class, name),
            Action::MethodCall { method, args } => {
                let receiver = self.owner_var(owner)?;
                self.invoke(method, Receiver::Var(receiver), args, None)
            }
            Action::ExternalMethodCall {
                method,
                instance,
                args,
            } => self.invoke(
                method,
                Receiver::from(instance.as_ref()),
                args,
                Some(&owner.name),
            ),
            Action::StaticMethodCall { method, args } => {
                self.invoke(method, Receiver::None, args, None)
            }
            Action::FieldGetter { instance, field } => {
                self.read_field(owner, field, Some(instance))
            }
            Action::StaticFieldGetter { field } => self.read_field(owner, field, None),
            Action::FieldSetter { field, value } => {
                let receiver = self.owner_var(owner)?;
                self.write_field(field, Some(receiver), value)
            }
            Action::StaticFieldSetter { field, value } => self.write_field(field, None, value),
            Action::NewArray { ty, length } => {
                let array_ty = self.array_type(&owner.name, ty)?;
                let length = literal_index(length)?;
                self.define(&owner.name, array_ty, |ret| Statement::NewArray { length, ret })
                    .map(drop)
            }
            Action::NewArrayWithInitializer { ty, elements } => {
                self.new_initialized_array(owner, ty, elements)
            }
            Action::ArrayWrite { index, value } => {
                let array = self.owner_var(owner)?;
                let index = literal_index(index)?;
                let value = self.operand(value)?;
                self.emit(Statement::Assignment {
                    target: AssignTarget::ArrayIndex { array, index },
                    value,
                })
                .map(drop)
            }
            Action::ClassConstantGetter { ty } => {
                let class_ty = self.types.type_by_name(JAVA_CLASS)?;
                let value = Constant::Class(self.types.to_runtime(ty)?);
                self.define(&owner.name, class_ty, |ret| Statement::Primitive { value, ret })
                    .map(drop)
            }
            Action::ArrayClassConstantGetter { element_type } => {
                self.array_class_constant(owner, element_type)
            }
        }
    }

    /// Call `method`, binding its result to `bind` when given
    pub(crate) fn invoke(
        &mut self,
        method: &MethodRef,
        receiver: Receiver<'_>,
        args: &[PlanRef],
        bind: Option<&PlanName>,
    ) -> Result<()> {
        if let Some(owner) = bind {
            self.ensure_unbound(owner)?;
        }

        if method.is_constructor() {
            let (class, constructor) = self.types.constructor(method)?;
            let args = self.operands(args)?;
            return match bind {
                Some(owner) => self
                    .define(owner, class.as_type(), |ret| Statement::Constructor {
                        constructor,
                        args,
                        ret: Some(ret),
                    })
                    .map(drop),
                None => self
                    .emit(Statement::Constructor {
                        constructor,
                        args,
                        ret: None,
                    })
                    .map(drop),
            };
        }

        let handle = self.types.method(method)?;
        let result_ty = match bind {
            Some(owner) => {
                let ty = self.types.to_runtime(&method.returns)?;
                if ty == RuntimeType::Void {
                    return Err(CompileError::VoidResult {
                        name: owner.clone(),
                        method: method.to_string(),
                    });
                }
                Some((owner, ty))
            }
            None => None,
        };
        let callee = match receiver {
            Receiver::None => None,
            Receiver::Var(var) => Some(Operand::Var(var)),
            Receiver::Plan(plan) => Some(self.operand(plan)?),
        };
        let args = self.operands(args)?;

        match result_ty {
            Some((owner, ty)) => self
                .define(owner, ty, |ret| Statement::Method {
                    method: handle,
                    callee,
                    args,
                    ret: Some(ret),
                })
                .map(drop),
            None => self
                .emit(Statement::Method {
                    method: handle,
                    callee,
                    args,
                    ret: None,
                })
                .map(drop),
        }
    }

    fn enum_value(&mut self, owner: &Plan, class: &ClassRef, name: &str) -> Result<()> {
        let class = self.types.load_ref(class)?;
        let constant = class
            .enum_constant(name)
            .ok_or_else(|| CompileError::EnumConstantNotFound {
                class: class.name().to_string(),
                name: name.to_string(),
            })?;
        let value = Constant::Enum {
            class: class.handle().clone(),
            name: constant.to_string(),
        };
        self.define(&owner.name, class.as_type(), |ret| Statement::Primitive { value, ret })
            .map(drop)
    }

    fn read_field(
        &mut self,
        owner: &Plan,
        field: &FieldRef,
        instance: Option<&PlanRef>,
    ) -> Result<()> {
        let handle = self.types.field(field)?;
        let ty = self.types.to_runtime(&field.ty)?;
        let receiver = match instance {
            Some(instance) => Some(self.operand(instance)?),
            None => None,
        };
        self.define(&owner.name, ty, |ret| Statement::FieldRead {
            field: handle,
            owner: receiver,
            ret,
        })
        .map(drop)
    }

    fn write_field(
        &mut self,
        field: &FieldRef,
        receiver: Option<VarRef>,
        value: &Plan,
    ) -> Result<()> {
        let handle = self.types.field(field)?;
        let value = self.operand(value)?;
        self.emit(Statement::Assignment {
            target: AssignTarget::Field {
                field: handle,
                owner: receiver,
            },
            value,
        })
        .map(drop)
    }

    /// Runtime array type, or [`CompileError::NotAnArrayType`]
    pub(crate) fn array_type(&self, owner: &PlanName, ty: &PlanType) -> Result<RuntimeType> {
        let runtime = self.types.to_runtime(ty)?;
        if !runtime.is_array() {
            return Err(CompileError::NotAnArrayType {
                name: owner.clone(),
                ty: runtime.type_name(),
            });
        }
        Ok(runtime)
    }

    fn new_initialized_array(
        &mut self,
        owner: &Plan,
        ty: &PlanType,
        elements: &[PlanRef],
    ) -> Result<()> {
        let array_ty = self.array_type(&owner.name, ty)?;
        let length = elements.len();
        let array = self.define(&owner.name, array_ty, |ret| Statement::NewArray { length, ret })?;
        for (index, element) in elements.iter().enumerate() {
            let value = self.operand(element)?;
            self.emit(Statement::Assignment {
                target: AssignTarget::ArrayIndex { array, index },
                value,
            })?;
        }
        Ok(())
    }

    /// `Array.newInstance(element, 0).getClass()`
    fn array_class_constant(&mut self, owner: &Plan, element_type: &Plan) -> Result<()> {
        self.ensure_unbound(&owner.name)?;
        let element = self.operand(element_type)?;

        let new_instance = self.types.method_by_signature(
            JAVA_REFLECT_ARRAY,
            "newInstance",
            vec![JAVA_CLASS.to_string(), "int".to_string()],
        )?;
        let array_ty = self.types.type_by_name(&new_instance.returns)?;
        let get_class = self
            .types
            .method_by_signature(JAVA_OBJECT, "getClass", Vec::new())?;
        let class_ty = self.types.type_by_name(JAVA_CLASS)?;

        let array = self.temp(array_ty, |ret| Statement::Method {
            method: new_instance,
            callee: None,
            args: vec![element, Operand::Constant(Constant::Int(0))],
            ret: Some(ret),
        })?;
        self.define(&owner.name, class_ty, |ret| Statement::Method {
            method: get_class,
            callee: Some(Operand::Var(array)),
            args: Vec::new(),
            ret: Some(ret),
        })
        .map(drop)
    }
}
