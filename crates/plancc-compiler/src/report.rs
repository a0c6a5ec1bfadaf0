//! Per-statement summaries of compiled tests

use crate::compiler::CompiledTest;
use crate::generator::GenerationStats;
use plancc_ir::MethodRef;
use plancc_testcase::{Statement, StatementKind, VarRef};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

fn kind_label(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::Constructor => "constructor",
        StatementKind::Method => "method",
        StatementKind::Reflection => "reflection",
        StatementKind::Primitive => "constant",
        StatementKind::Null => "null",
        StatementKind::FieldRead => "field-read",
        StatementKind::Assignment => "assignment",
        StatementKind::NewArray => "new-array",
    }
}

/// One statement of a compiled test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementSummary {
    /// Position in the sequence
    pub position: usize,
    /// Statement kind
    pub kind: StatementKind,
    /// Variable defined
    pub defines: Option<VarRef>,
    /// Variables read
    pub uses: Vec<VarRef>,
    /// Invoked constructor, method or helper routine
    pub invokes: Option<String>,
    /// Reflection helper call
    pub reflection: bool,
}

impl StatementSummary {
    fn new(position: usize, statement: &Statement, invokes: Option<String>) -> Self {
        Self {
            position,
            kind: statement.kind(),
            defines: statement.defines(),
            uses: statement.uses(),
            invokes,
            reflection: statement.is_reflection(),
        }
    }
}

/// Plan binding as reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingSummary {
    /// Plan name
    pub plan: String,
    /// Bound variable
    pub var: VarRef,
}

/// Summary of one compiled test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    /// Method under test
    pub method: String,
    /// Declared variables
    pub variables: usize,
    /// Plan bindings in creation order
    pub bindings: Vec<BindingSummary>,
    /// Statements in order
    pub statements: Vec<StatementSummary>,
}

impl TestReport {
    /// Summarise `test`, compiled for `method`
    #[must_use]
    pub fn new(method: &MethodRef, test: &CompiledTest) -> Self {
        let mut invoked: BTreeMap<usize, String> = test
            .test_case
            .attributions()
            .into_iter()
            .map(|(position, callable)| (position, callable.to_string()))
            .collect();
        Self {
            method: method.to_string(),
            variables: test.test_case.variable_count(),
            bindings: test
                .bindings
                .iter()
                .map(|(plan, var)| BindingSummary {
                    plan: plan.to_string(),
                    var,
                })
                .collect(),
            statements: test
                .test_case
                .statements()
                .iter()
                .enumerate()
                .map(|(position, statement)| {
                    StatementSummary::new(position, statement, invoked.remove(&position))
                })
                .collect(),
        }
    }

    /// Human-readable listing
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}: {} statements, {} variables\n",
            self.method,
            self.statements.len(),
            self.variables
        );
        for stmt in &self.statements {
            let defines = stmt.defines.map(|v| v.to_string()).unwrap_or_default();
            let uses = stmt
                .uses
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = write!(
                out,
                "{:>4}  {:<12} {:<5} [{}]",
                stmt.position,
                kind_label(stmt.kind),
                defines,
                uses
            );
            if let Some(callable) = &stmt.invokes {
                let _ = write!(out, "  {callable}");
            }
            if stmt.reflection {
                out.push_str("  (fixed)");
            }
            out.push('\n');
        }
        out
    }
}

/// Failed candidate as reported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    /// Index of the candidate in the request
    pub candidate: usize,
    /// Method under test
    pub method: String,
    /// Error message
    pub error: String,
}

/// Everything one `plancc compile` run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    /// Generation counters
    pub stats: GenerationStats,
    /// Compiled tests
    pub tests: Vec<TestReport>,
    /// Failed candidates
    pub failures: Vec<FailureReport>,
}

impl RunReport {
    /// Human-readable listing of every test and failure
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for test in &self.tests {
            out.push_str(&test.render());
        }
        for failure in &self.failures {
            let _ = writeln!(
                out,
                "candidate {} ({}) failed: {}",
                failure.candidate, failure.method, failure.error
            );
        }
        let _ = writeln!(
            out,
            "{} attempted, {} compiled, {} failed, {} skipped",
            self.stats.attempted, self.stats.succeeded, self.stats.failed, self.stats.skipped
        );
        out
    }
}
