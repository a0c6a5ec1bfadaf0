//! Plan name to variable bindings for one compilation

use crate::error::{CompileError, Result};
use indexmap::IndexMap;
use plancc_ir::PlanName;
use plancc_testcase::VarRef;
use std::collections::HashSet;

/// Memo of compiled plans
///
/// A plan is entered here once its body has been lowered. Plans that produce
/// a value also carry the variable holding it; plans compiled only for their
/// side effects (static setters, the test call) are recorded without one.
/// Bindings iterate in the order they were made.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    bindings: IndexMap<PlanName, VarRef>,
    completed: HashSet<PlanName>,
}

impl ReferenceTable {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Variable bound to `name`
    #[inline]
    #[must_use]
    pub fn get(&self, name: &PlanName) -> Option<VarRef> {
        self.bindings.get(name).copied()
    }

    /// Returns true if `name` has a variable
    #[inline]
    #[must_use]
    pub fn is_bound(&self, name: &PlanName) -> bool {
        self.bindings.contains_key(name)
    }

    /// Returns true if `name` was compiled, with or without a value
    #[inline]
    #[must_use]
    pub fn is_compiled(&self, name: &PlanName) -> bool {
        self.completed.contains(name) || self.bindings.contains_key(name)
    }

    /// Bind `name` to `var`
    ///
    /// # Errors
    /// Returns [`CompileError::DuplicateBinding`] if `name` is already bound.
    pub fn bind(&mut self, name: PlanName, var: VarRef) -> Result<()> {
        if self.bindings.contains_key(&name) {
            return Err(CompileError::DuplicateBinding(name));
        }
        self.bindings.insert(name, var);
        Ok(())
    }

    pub(crate) fn mark_compiled(&mut self, name: PlanName) {
        self.completed.insert(name);
    }

    /// Number of bound plans
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if nothing is bound
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in creation order
    pub fn iter(&self) -> impl Iterator<Item = (&PlanName, VarRef)> {
        self.bindings.iter().map(|(name, var)| (name, *var))
    }
}
