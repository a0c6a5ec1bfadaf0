//! Append-only statement sequence
//!
//! [`TestCase`] owns the statements and the variable table of one generated
//! test. Appending checks the forward-dependency rule: a statement may only
//! read variables defined by statements already in the sequence, and may
//! define a variable at most once.

use crate::statement::{AssignTarget, Callable, Statement};
use crate::value::{Operand, VarRef, Variable};
use plancc_runtime::RuntimeType;

/// Errors raised when appending an inconsistent statement
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestCaseError {
    /// Variable handle does not belong to this test case
    #[error("unknown variable {0}")]
    UnknownVariable(VarRef),

    /// Statement reads a variable that is not defined yet
    #[error("statement {position} reads {var} before it is defined")]
    ForwardReference {
        /// Offending variable
        var: VarRef,
        /// Position the statement would have taken
        position: usize,
    },

    /// Statement defines a variable that already has a definition
    #[error("{var} is already defined by statement {first}")]
    Redefinition {
        /// Offending variable
        var: VarRef,
        /// Existing definition
        first: usize,
    },

    /// Indexed assignment into a non-array variable
    #[error("{0} is not an array")]
    NotAnArray(VarRef),

    /// Indexed assignment past the allocated length
    #[error("index {index} out of bounds for {array} of length {length}")]
    IndexOutOfBounds {
        /// Array variable
        array: VarRef,
        /// Index
        index: usize,
        /// Allocated length
        length: usize,
    },
}

/// Statements and variables of one test
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCase {
    statements: Vec<Statement>,
    variables: Vec<Variable>,
}

impl TestCase {
    /// Create empty test case
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new, not yet defined variable of type `ty`
    pub fn new_variable(&mut self, ty: RuntimeType) -> VarRef {
        self.variables.push(Variable {
            ty,
            defined_at: None,
            array_length: None,
        });
        VarRef(self.variables.len() - 1)
    }

    /// Variable metadata
    #[inline]
    #[must_use]
    pub fn variable(&self, var: VarRef) -> Option<&Variable> {
        self.variables.get(var.0)
    }

    /// Declared type of `var`
    #[inline]
    #[must_use]
    pub fn var_type(&self, var: VarRef) -> Option<&RuntimeType> {
        self.variable(var).map(Variable::ty)
    }

    /// Reflection type name of an operand
    #[must_use]
    pub fn operand_type_name(&self, operand: &Operand) -> Option<String> {
        match operand {
            Operand::Var(var) => self.var_type(*var).map(RuntimeType::type_name),
            Operand::Constant(constant) => Some(constant.type_name()),
        }
    }

    /// Append `statement`, returning its position
    ///
    /// # Errors
    /// Returns [`TestCaseError`] if the statement reads an undefined
    /// variable, redefines one, or writes outside an array. Nothing is
    /// appended on error.
    pub fn add_statement(&mut self, statement: Statement) -> Result<usize, TestCaseError> {
        let position = self.statements.len();

        for var in statement.uses() {
            let variable = self
                .variables
                .get(var.0)
                .ok_or(TestCaseError::UnknownVariable(var))?;
            if variable.defined_at.is_none() {
                return Err(TestCaseError::ForwardReference { var, position });
            }
        }

        if let Statement::Assignment {
            target: AssignTarget::ArrayIndex { array, index },
            ..
        } = &statement
        {
            self.check_index(*array, *index)?;
        }

        if let Some(var) = statement.defines() {
            let variable = self
                .variables
                .get_mut(var.0)
                .ok_or(TestCaseError::UnknownVariable(var))?;
            if let Some(first) = variable.defined_at {
                return Err(TestCaseError::Redefinition { var, first });
            }
            variable.defined_at = Some(position);
            if let Statement::NewArray { length, .. } = &statement {
                variable.array_length = Some(*length);
            }
        }

        self.statements.push(statement);
        Ok(position)
    }

    fn check_index(&self, array: VarRef, index: usize) -> Result<(), TestCaseError> {
        let variable = self
            .variables
            .get(array.0)
            .ok_or(TestCaseError::UnknownVariable(array))?;
        if !variable.ty.is_array() {
            return Err(TestCaseError::NotAnArray(array));
        }
        match variable.array_length {
            Some(length) if index >= length => Err(TestCaseError::IndexOutOfBounds {
                array,
                index,
                length,
            }),
            _ => Ok(()),
        }
    }

    /// Statements in order
    #[inline]
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Statement at `position`
    #[inline]
    #[must_use]
    pub fn statement(&self, position: usize) -> Option<&Statement> {
        self.statements.get(position)
    }

    /// Number of statements
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if no statement was appended
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Number of declared variables
    #[inline]
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Invoked callable per statement position
    #[must_use]
    pub fn attributions(&self) -> Vec<(usize, Callable<'_>)> {
        self.statements
            .iter()
            .enumerate()
            .filter_map(|(pos, stmt)| stmt.attribution().map(|c| (pos, c)))
            .collect()
    }

    /// Re-check the forward-dependency rule over the whole sequence
    ///
    /// Returns the first offending (position, variable) pair.
    #[must_use]
    pub fn first_forward_reference(&self) -> Option<(usize, VarRef)> {
        self.statements.iter().enumerate().find_map(|(pos, stmt)| {
            stmt.uses().into_iter().find_map(|var| {
                match self.variable(var).and_then(Variable::defined_at) {
                    Some(def) if def < pos => None,
                    _ => Some((pos, var)),
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Constant;
    use plancc_runtime::{ClassHandle, ClassOrigin, Primitive};
    use pretty_assertions::assert_eq;

    fn int_array() -> RuntimeType {
        RuntimeType::array_of(RuntimeType::Primitive(Primitive::Int))
    }

    #[test]
    fn append_defines_variables() {
        let mut tc = TestCase::new();
        let v = tc.new_variable(RuntimeType::Primitive(Primitive::Int));
        let pos = tc
            .add_statement(Statement::Primitive {
                value: Constant::Int(4),
                ret: v,
            })
            .unwrap();
        assert_eq!(pos, 0);
        assert_eq!(tc.variable(v).unwrap().defined_at(), Some(0));
    }

    #[test]
    fn forward_reference_is_rejected_without_append() {
        let mut tc = TestCase::new();
        let arr = tc.new_variable(int_array());
        let err = tc
            .add_statement(Statement::Assignment {
                target: AssignTarget::ArrayIndex {
                    array: arr,
                    index: 0,
                },
                value: Operand::Constant(Constant::Int(1)),
            })
            .unwrap_err();
        assert_eq!(
            err,
            TestCaseError::ForwardReference {
                var: arr,
                position: 0
            }
        );
        assert!(tc.is_empty());
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut tc = TestCase::new();
        let v = tc.new_variable(RuntimeType::Primitive(Primitive::Int));
        tc.add_statement(Statement::Null { ret: v }).unwrap();
        assert_eq!(
            tc.add_statement(Statement::Null { ret: v }).unwrap_err(),
            TestCaseError::Redefinition { var: v, first: 0 }
        );
        assert_eq!(tc.len(), 1);
    }

    #[test]
    fn array_bounds_are_checked() {
        let mut tc = TestCase::new();
        let arr = tc.new_variable(int_array());
        tc.add_statement(Statement::NewArray { length: 2, ret: arr })
            .unwrap();
        let write = |index| Statement::Assignment {
            target: AssignTarget::ArrayIndex { array: arr, index },
            value: Operand::Constant(Constant::Int(7)),
        };
        assert!(tc.add_statement(write(1)).is_ok());
        assert!(matches!(
            tc.add_statement(write(2)),
            Err(TestCaseError::IndexOutOfBounds { length: 2, .. })
        ));
    }

    #[test]
    fn indexing_a_non_array_fails() {
        let mut tc = TestCase::new();
        let obj = tc.new_variable(RuntimeType::Class(ClassHandle::new(
            "java.lang.Object",
            ClassOrigin::Host,
        )));
        tc.add_statement(Statement::Null { ret: obj }).unwrap();
        assert_eq!(
            tc.add_statement(Statement::Assignment {
                target: AssignTarget::ArrayIndex {
                    array: obj,
                    index: 0
                },
                value: Operand::Constant(Constant::Int(1)),
            })
            .unwrap_err(),
            TestCaseError::NotAnArray(obj)
        );
    }

    #[test]
    fn sequences_built_through_append_have_no_forward_references() {
        let mut tc = TestCase::new();
        let arr = tc.new_variable(int_array());
        tc.add_statement(Statement::NewArray { length: 1, ret: arr })
            .unwrap();
        tc.add_statement(Statement::Assignment {
            target: AssignTarget::ArrayIndex {
                array: arr,
                index: 0,
            },
            value: Operand::Constant(Constant::Int(1)),
        })
        .unwrap();
        assert_eq!(tc.first_forward_reference(), None);
    }
}
