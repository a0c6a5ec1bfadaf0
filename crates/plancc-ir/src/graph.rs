//! Plan graph validation
//!
//! Plans reference each other by name once they leave the analysis engine,
//! so two structurally different plans sharing a name, or a name reachable
//! from itself, would break memoized compilation. [`PlanGraph`] indexes every
//! plan reachable from a set of roots and checks both before any statement
//! is emitted.

use crate::plan::{PlanName, PlanRef};
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::sync::Arc;

/// Plan graph errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanGraphError {
    /// Two different plans share one name
    #[error("plan name `{0}` is used by more than one distinct plan")]
    NameConflict(PlanName),

    /// A plan depends on itself through its operands
    #[error("plan `{0}` depends on itself")]
    Cycle(PlanName),
}

/// Name-level dependency graph of a set of plans
///
/// Edges point from an operand to the plan that consumes it, so a
/// topological order is a valid compilation order.
#[derive(Debug, Default)]
pub struct PlanGraph {
    graph: DiGraph<PlanName, ()>,
    index: HashMap<PlanName, (NodeIndex, PlanRef)>,
}

impl PlanGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index all plans reachable from `roots`
    ///
    /// # Errors
    /// Returns [`PlanGraphError::NameConflict`] if two distinct plans share a
    /// name.
    pub fn from_roots<'a>(
        roots: impl IntoIterator<Item = &'a PlanRef>,
    ) -> Result<Self, PlanGraphError> {
        let mut graph = Self::new();
        for root in roots {
            graph.insert(root)?;
        }
        Ok(graph)
    }

    /// Index `plan` and everything it references
    ///
    /// # Errors
    /// Returns [`PlanGraphError::NameConflict`] on a name clash.
    pub fn insert(&mut self, plan: &PlanRef) -> Result<NodeIndex, PlanGraphError> {
        if let Some((node, existing)) = self.index.get(&plan.name) {
            if Arc::ptr_eq(existing, plan) || **existing == **plan {
                return Ok(*node);
            }
            return Err(PlanGraphError::NameConflict(plan.name.clone()));
        }

        let node = self.graph.add_node(plan.name.clone());
        self.index.insert(plan.name.clone(), (node, Arc::clone(plan)));

        for operand in plan.operands() {
            let dep = self.insert(operand)?;
            if self.graph.find_edge(dep, node).is_none() {
                self.graph.add_edge(dep, node, ());
            }
        }
        Ok(node)
    }

    /// Number of distinct plans
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if no plan was indexed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up a plan by name
    #[must_use]
    pub fn get(&self, name: &PlanName) -> Option<&PlanRef> {
        self.index.get(name).map(|(_, plan)| plan)
    }

    /// Names of the plans `name` directly depends on
    #[must_use]
    pub fn dependencies(&self, name: &PlanName) -> Vec<&PlanName> {
        let Some((node, _)) = self.index.get(name) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(*node, Direction::Incoming)
            .map(|dep| &self.graph[dep])
            .collect()
    }

    /// Check the graph is acyclic
    ///
    /// # Errors
    /// Returns [`PlanGraphError::Cycle`] naming one plan on a cycle.
    pub fn validate(&self) -> Result<(), PlanGraphError> {
        if is_cyclic_directed(&self.graph) {
            self.compilation_order()?;
        }
        Ok(())
    }

    /// Plans in dependency order: operands before their consumers
    ///
    /// # Errors
    /// Returns [`PlanGraphError::Cycle`] if the graph is cyclic.
    pub fn compilation_order(&self) -> Result<Vec<&PlanName>, PlanGraphError> {
        toposort(&self.graph, None)
            .map(|order| order.into_iter().map(|n| &self.graph[n]).collect())
            .map_err(|cycle| PlanGraphError::Cycle(self.graph[cycle.node_id()].clone()))
    }
}
