//! Test generation loop
//!
//! Candidates arrive from the path selector one at a time. Each is compiled
//! with a fresh [`PlanCompiler`]; a failure is logged and the loop moves on
//! to the next candidate. The first success ends the loop.

use crate::compiler::{CompiledTest, PlanCompiler};
use crate::config::CompilerConfig;
use crate::error::CompileError;
use plancc_ir::{MethodRef, Parameters};
use plancc_runtime::ClassLoader;
use serde::{Deserialize, Serialize};

/// One candidate test: the target method and, if the path was feasible,
/// the root plans that reach it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Method under test
    pub method: MethodRef,
    /// Root plans; absent when no parameters reach the path
    #[serde(default)]
    pub parameters: Option<Parameters>,
}

impl Candidate {
    /// Feasible candidate
    #[must_use]
    pub fn new(method: MethodRef, parameters: Parameters) -> Self {
        Self {
            method,
            parameters: Some(parameters),
        }
    }

    /// Candidate whose path has no parameters
    #[must_use]
    pub fn infeasible(method: MethodRef) -> Self {
        Self {
            method,
            parameters: None,
        }
    }
}

/// Outcome of one candidate
#[derive(Debug)]
pub enum Attempt {
    /// No parameters to compile
    Skipped,
    /// Compiled test
    Compiled(Box<CompiledTest>),
    /// Compilation aborted
    Failed(CompileError),
}

/// Counters over all attempts of one generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    /// Candidates taken from the iterator
    pub attempted: usize,
    /// Candidates without parameters
    pub skipped: usize,
    /// Candidates that failed to compile
    pub failed: usize,
    /// Candidates compiled into a test
    pub succeeded: usize,
}

/// Drives compilation over a stream of candidates
#[derive(Debug)]
pub struct TestGenerator<'a> {
    loader: &'a dyn ClassLoader,
    config: &'a CompilerConfig,
    stats: GenerationStats,
}

impl<'a> TestGenerator<'a> {
    /// Generator sharing `loader` across all candidates
    #[must_use]
    pub fn new(loader: &'a dyn ClassLoader, config: &'a CompilerConfig) -> Self {
        Self {
            loader,
            config,
            stats: GenerationStats::default(),
        }
    }

    /// Counters so far
    #[inline]
    #[must_use]
    pub fn stats(&self) -> GenerationStats {
        self.stats
    }

    /// Compile one candidate and record the outcome
    pub fn attempt(&mut self, candidate: &Candidate) -> Attempt {
        self.stats.attempted += 1;
        let Some(parameters) = &candidate.parameters else {
            tracing::debug!(method = %candidate.method, "candidate has no parameters");
            self.stats.skipped += 1;
            return Attempt::Skipped;
        };

        tracing::debug!(method = %candidate.method, "start test generation");
        let compiler = PlanCompiler::new(self.loader, self.config);
        match compiler.compile_test(&candidate.method, parameters) {
            Ok(test) => {
                self.stats.succeeded += 1;
                Attempt::Compiled(Box::new(test))
            }
            Err(error) => {
                tracing::error!(
                    method = %candidate.method,
                    %error,
                    contract_violation = error.is_contract_violation(),
                    "error while generating test"
                );
                self.stats.failed += 1;
                Attempt::Failed(error)
            }
        }
    }

    /// First candidate that compiles, checking `stop` before each one
    pub fn generate<I>(
        &mut self,
        candidates: I,
        mut stop: impl FnMut() -> bool,
    ) -> Option<(Candidate, CompiledTest)>
    where
        I: IntoIterator<Item = Candidate>,
    {
        tracing::info!("generating test");
        for candidate in candidates {
            if stop() {
                tracing::info!("stopping condition reached");
                break;
            }
            if let Attempt::Compiled(test) = self.attempt(&candidate) {
                tracing::info!(method = %candidate.method, "test generated");
                return Some((candidate, *test));
            }
        }
        tracing::info!(
            attempted = self.stats.attempted,
            failed = self.stats.failed,
            "no candidate produced a test"
        );
        None
    }
}
