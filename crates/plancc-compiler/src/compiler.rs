//! Plan dispatcher
//!
//! [`PlanCompiler`] walks a plan graph depth-first and appends statements to
//! one [`TestCase`]. Every plan is lowered at most once: the first
//! compilation binds its name in the [`ReferenceTable`], later references
//! reuse the bound variable. Operands are always compiled before the
//! statement that reads them, so the produced sequence never reads a
//! variable ahead of its definition.
//!
//! Non-null primitive and string leaves used as operands become inline
//! constants. A `null` leaf gets its own memoized statement.

use crate::config::CompilerConfig;
use crate::error::{CompileError, Result};
use crate::refs::ReferenceTable;
use crate::type_bridge::{TypeBridge, JAVA_OBJECT, JAVA_STRING};
use plancc_ir::{
    MethodRef, Parameters, Plan, PlanGraph, PlanKind, PlanName, PlanRef, PrimitiveValue, TestCall,
};
use plancc_runtime::{ClassLoader, RuntimeType};
use plancc_testcase::{Constant, Operand, Statement, TestCase, VarRef};

/// Output of one successful compilation
#[derive(Debug, Clone)]
pub struct CompiledTest {
    /// Statement sequence
    pub test_case: TestCase,
    /// Plan bindings in creation order
    pub bindings: ReferenceTable,
}

impl CompiledTest {
    /// Variable bound to `name`
    #[must_use]
    pub fn binding(&self, name: &str) -> Option<VarRef> {
        self.bindings.get(&PlanName::new(name))
    }
}

/// Receiver of a lowered call
#[derive(Debug, Clone, Copy)]
pub(crate) enum Receiver<'p> {
    /// Static call or constructor
    None,
    /// Already bound variable
    Var(VarRef),
    /// Plan compiled on demand
    Plan(&'p Plan),
}

impl<'p> From<Option<&'p PlanRef>> for Receiver<'p> {
    fn from(plan: Option<&'p PlanRef>) -> Self {
        plan.map_or(Self::None, |p| Self::Plan(p))
    }
}

fn leaf_constant(value: PrimitiveValue) -> Option<Constant> {
    Some(match value {
        PrimitiveValue::Null => return None,
        PrimitiveValue::Boolean(v) => Constant::Boolean(v),
        PrimitiveValue::Byte(v) => Constant::Byte(v),
        PrimitiveValue::Char(v) => Constant::Char(v),
        PrimitiveValue::Short(v) => Constant::Short(v),
        PrimitiveValue::Int(v) => Constant::Int(v),
        PrimitiveValue::Long(v) => Constant::Long(v),
        PrimitiveValue::Float(v) => Constant::Float(v),
        PrimitiveValue::Double(v) => Constant::Double(v),
    })
}

/// Index or length operand as a literal
pub(crate) fn literal_index(plan: &Plan) -> Result<usize> {
    match &plan.kind {
        PlanKind::Primitive(value) => value.as_int().and_then(|v| usize::try_from(v).ok()),
        _ => None,
    }
    .ok_or_else(|| CompileError::NonLiteralIndex(plan.name.clone()))
}

/// Lowers construction plans into one test case
#[derive(Debug)]
pub struct PlanCompiler<'a> {
    pub(crate) types: TypeBridge<'a>,
    pub(crate) config: &'a CompilerConfig,
    test_case: TestCase,
    refs: ReferenceTable,
    active: Vec<PlanName>,
    terminated: bool,
}

impl<'a> PlanCompiler<'a> {
    /// Compiler resolving classes through `loader`
    #[must_use]
    pub fn new(loader: &'a dyn ClassLoader, config: &'a CompilerConfig) -> Self {
        Self {
            types: TypeBridge::new(loader),
            config,
            test_case: TestCase::new(),
            refs: ReferenceTable::new(),
            active: Vec::new(),
            terminated: false,
        }
    }

    /// Statements appended so far
    #[inline]
    #[must_use]
    pub fn test_case(&self) -> &TestCase {
        &self.test_case
    }

    /// Bindings made so far
    #[inline]
    #[must_use]
    pub fn bindings(&self) -> &ReferenceTable {
        &self.refs
    }

    /// Variable bound to `name`
    #[inline]
    #[must_use]
    pub fn binding(&self, name: &PlanName) -> Option<VarRef> {
        self.refs.get(name)
    }

    /// Compile `plan` unless it was compiled before
    ///
    /// # Errors
    /// Returns the first [`CompileError`] raised while lowering the plan or
    /// its operands. Statements appended before the failure remain.
    pub fn compile(&mut self, plan: &Plan) -> Result<()> {
        if self.refs.is_compiled(&plan.name) {
            return Ok(());
        }
        if self.active.contains(&plan.name) {
            return Err(CompileError::CyclicPlan(plan.name.clone()));
        }
        if let Some(limit) = self.config.max_depth {
            if self.active.len() >= limit {
                return Err(CompileError::DepthExceeded(limit));
            }
        }

        tracing::debug!(plan = %plan.name, kind = plan.kind_label(), "compiling plan");
        self.active.push(plan.name.clone());
        let result = self.compile_body(plan);
        self.active.pop();
        result?;
        self.refs.mark_compiled(plan.name.clone());
        Ok(())
    }

    fn compile_body(&mut self, plan: &Plan) -> Result<()> {
        match &plan.kind {
            PlanKind::Actions(actions) => actions
                .iter()
                .try_for_each(|action| self.lower_action(plan, action)),
            PlanKind::Reflection(actions) => actions
                .iter()
                .try_for_each(|action| self.lower_reflection(plan, action)),
            PlanKind::TestCall(call) => self.compile_test_call(call),
            PlanKind::Primitive(_) | PlanKind::String(_) => self.materialize_leaf(plan).map(drop),
            PlanKind::Mock { ty } | PlanKind::Unknown { ty } => {
                tracing::error!(
                    plan = %plan.name,
                    kind = plan.kind_label(),
                    ty = %ty,
                    "plan kind cannot be lowered"
                );
                Err(CompileError::UnsupportedPlan {
                    name: plan.name.clone(),
                    kind: plan.kind_label(),
                    ty: ty.to_string(),
                })
            }
        }
    }

    /// Bind a leaf to its own statement
    fn materialize_leaf(&mut self, plan: &Plan) -> Result<VarRef> {
        match &plan.kind {
            PlanKind::String(value) => {
                let ty = self.types.type_by_name(JAVA_STRING)?;
                let value = Constant::String(value.clone());
                self.define(&plan.name, ty, |ret| Statement::Primitive { value, ret })
            }
            PlanKind::Primitive(value) => match leaf_constant(*value) {
                Some(value) => {
                    let ty = value
                        .primitive()
                        .map_or(RuntimeType::Void, RuntimeType::Primitive);
                    self.define(&plan.name, ty, |ret| Statement::Primitive { value, ret })
                }
                None => {
                    let ty = self.types.type_by_name(JAVA_OBJECT)?;
                    self.define(&plan.name, ty, |ret| Statement::Null { ret })
                }
            },
            _ => Err(CompileError::NoValue(plan.name.clone())),
        }
    }

    /// Terminal invocation of the method under test
    ///
    /// The call binds no result and is always the last statement: any later
    /// append fails with [`CompileError::AfterTestCall`].
    ///
    /// # Errors
    /// Returns [`CompileError`] if the method or an operand cannot be
    /// resolved.
    pub fn compile_test_call(&mut self, call: &TestCall) -> Result<()> {
        self.invoke(
            &call.method,
            Receiver::from(call.instance.as_ref()),
            &call.args,
            None,
        )?;
        self.terminated = true;
        tracing::debug!(method = %call.method, "test call appended");
        Ok(())
    }

    /// Compile every root of `parameters`, instance first
    ///
    /// # Errors
    /// Returns the first [`CompileError`] raised by a root.
    pub fn compile_parameters(&mut self, parameters: &Parameters) -> Result<()> {
        parameters.roots().try_for_each(|root| self.compile(root))
    }

    /// Compile the roots of `parameters` and the call of `method`
    ///
    /// # Errors
    /// Returns the first [`CompileError`]; nothing of the partial test is
    /// returned.
    pub fn compile_test(
        mut self,
        method: &MethodRef,
        parameters: &Parameters,
    ) -> Result<CompiledTest> {
        if self.config.validate_plans {
            PlanGraph::from_roots(parameters.roots())?.validate()?;
        }
        self.compile_parameters(parameters)?;
        self.compile_test_call(&parameters.test_call(method.clone()))?;
        tracing::info!(
            method = %method,
            statements = self.test_case.len(),
            "test compiled"
        );
        Ok(self.finish())
    }

    /// Hand out the test case and bindings
    #[must_use]
    pub fn finish(self) -> CompiledTest {
        CompiledTest {
            test_case: self.test_case,
            bindings: self.refs,
        }
    }

    /// Value of `plan` as a statement operand
    pub(crate) fn operand(&mut self, plan: &Plan) -> Result<Operand> {
        if let Some(var) = self.refs.get(&plan.name) {
            return Ok(Operand::Var(var));
        }
        match &plan.kind {
            PlanKind::Primitive(value) => match leaf_constant(*value) {
                Some(constant) => Ok(Operand::Constant(constant)),
                None => self.materialize_leaf(plan).map(Operand::Var),
            },
            PlanKind::String(value) => Ok(Operand::Constant(Constant::String(value.clone()))),
            _ => {
                self.compile(plan)?;
                self.refs
                    .get(&plan.name)
                    .map(Operand::Var)
                    .ok_or_else(|| CompileError::NoValue(plan.name.clone()))
            }
        }
    }

    /// Values of `plans`, in order
    pub(crate) fn operands(&mut self, plans: &[PlanRef]) -> Result<Vec<Operand>> {
        let mut operands = Vec::with_capacity(plans.len());
        for plan in plans {
            operands.push(self.operand(plan)?);
        }
        Ok(operands)
    }

    /// Variable of a plan its own actions operate on
    pub(crate) fn owner_var(&self, owner: &Plan) -> Result<VarRef> {
        self.refs
            .get(&owner.name)
            .ok_or_else(|| CompileError::UnboundOwner(owner.name.clone()))
    }

    pub(crate) fn ensure_unbound(&self, owner: &PlanName) -> Result<()> {
        if self.refs.is_bound(owner) {
            return Err(CompileError::DuplicateBinding(owner.clone()));
        }
        Ok(())
    }

    /// Append the statement built by `build` and bind its result to `owner`
    pub(crate) fn define(
        &mut self,
        owner: &PlanName,
        ty: RuntimeType,
        build: impl FnOnce(VarRef) -> Statement,
    ) -> Result<VarRef> {
        self.ensure_unbound(owner)?;
        let var = self.temp(ty, build)?;
        self.refs.bind(owner.clone(), var)?;
        Ok(var)
    }

    /// Append the statement built by `build` into an unnamed variable
    pub(crate) fn temp(
        &mut self,
        ty: RuntimeType,
        build: impl FnOnce(VarRef) -> Statement,
    ) -> Result<VarRef> {
        let var = self.test_case.new_variable(ty);
        self.emit(build(var))?;
        Ok(var)
    }

    /// Fresh `null` of type `java.lang.Object`
    pub(crate) fn null_temp(&mut self) -> Result<Operand> {
        let ty = self.types.type_by_name(JAVA_OBJECT)?;
        self.temp(ty, |ret| Statement::Null { ret }).map(Operand::Var)
    }

    pub(crate) fn emit(&mut self, statement: Statement) -> Result<usize> {
        if self.terminated {
            return Err(CompileError::AfterTestCall);
        }
        let kind = statement.kind();
        let position = self.test_case.add_statement(statement)?;
        tracing::trace!(position, ?kind, "statement appended");
        Ok(position)
    }

    /// Reflection type name of an operand, empty if unknown
    pub(crate) fn operand_type_name(&self, operand: &Operand) -> String {
        self.test_case
            .operand_type_name(operand)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plancc_runtime::{java_lang_source, LayeredClassLoader};

    fn loader() -> LayeredClassLoader {
        LayeredClassLoader::builder().host(java_lang_source()).build()
    }

    #[test]
    fn root_leaves_get_their_own_statement() {
        let loader = loader();
        let config = CompilerConfig::default();
        let mut compiler = PlanCompiler::new(&loader, &config);
        let five = Plan::new("five", PlanKind::Primitive(PrimitiveValue::Int(5)));
        compiler.compile(&five).unwrap();
        compiler.compile(&five).unwrap();

        assert_eq!(compiler.test_case().len(), 1);
        let var = compiler.binding(&five.name).unwrap();
        assert_eq!(
            compiler.test_case().statement(0),
            Some(&Statement::Primitive {
                value: Constant::Int(5),
                ret: var
            })
        );
    }

    #[test]
    fn operand_leaves_are_inlined_except_null() {
        let loader = loader();
        let config = CompilerConfig::default();
        let mut compiler = PlanCompiler::new(&loader, &config);

        let text = Plan::new("s", PlanKind::String("hi".into()));
        assert_eq!(
            compiler.operand(&text).unwrap(),
            Operand::Constant(Constant::String("hi".into()))
        );
        assert!(compiler.test_case().is_empty());

        let null = Plan::new("n", PlanKind::Primitive(PrimitiveValue::Null));
        let first = compiler.operand(&null).unwrap();
        let second = compiler.operand(&null).unwrap();
        assert_eq!(first, second);
        assert_eq!(compiler.test_case().len(), 1);
        assert!(matches!(
            compiler.test_case().statement(0),
            Some(Statement::Null { .. })
        ));
    }

    #[test]
    fn literal_index_accepts_only_non_negative_integers() {
        let ok = Plan::new("i", PlanKind::Primitive(PrimitiveValue::Short(3)));
        assert_eq!(literal_index(&ok).unwrap(), 3);
        let negative = Plan::new("n", PlanKind::Primitive(PrimitiveValue::Int(-1)));
        assert!(literal_index(&negative).is_err());
        let long = Plan::new("l", PlanKind::Primitive(PrimitiveValue::Long(1)));
        assert!(literal_index(&long).is_err());
    }
}
