/*
 * Symbolic Executor
 *
 * Per-method driver: runs the walker over one method at a time, records
 * completed behaviors in the registry, and recovers from bound trips at
 * the method boundary — an aborted method keeps no partial yields and the
 * caller moves on to the next method.
 *
 * The mandatory checkers run in their fixed order; user-supplied checkers
 * are appended behind them.
 */

use crate::config::ExecutionLimits;
use crate::errors::EngineError;
use crate::features::behavior::registry::BehaviorRegistry;
use crate::features::checks::dispatcher::CheckerPipeline;
use crate::features::checks::issue::Issue;
use crate::features::checks::ports::SymbolicCheck;
use crate::shared::models::method::MethodContext;

use super::engine::ExplodedGraphWalker;

/// Result of analyzing one method
#[derive(Debug)]
pub struct MethodAnalysis {
    pub issues: Vec<Issue>,
    pub outcome: Result<(), EngineError>,
}

impl MethodAnalysis {
    pub fn completed(&self) -> bool {
        self.outcome.is_ok()
    }
}

pub struct SymbolicExecutor {
    limits: ExecutionLimits,
    registry: BehaviorRegistry,
    pipeline: CheckerPipeline,
    cleanup: bool,
}

impl SymbolicExecutor {
    pub fn new() -> Self {
        Self {
            limits: ExecutionLimits::default(),
            registry: BehaviorRegistry::new(),
            pipeline: CheckerPipeline::with_defaults(),
            cleanup: true,
        }
    }

    pub fn with_limits(mut self, limits: ExecutionLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Append a user-supplied checker behind the mandatory ones
    pub fn with_check(mut self, check: Box<dyn SymbolicCheck>) -> Self {
        self.pipeline.add_check(check);
        self
    }

    /// Differential-testing hook; see the walker
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn registry(&self) -> &BehaviorRegistry {
        &self.registry
    }

    /// Analyze one method: explore, collect issues, and on success feed
    /// the completed behavior back into the registry for later callers.
    pub fn analyze_method(&mut self, method: &MethodContext<'_>) -> MethodAnalysis {
        let mut walker = ExplodedGraphWalker::new(method, &self.registry, self.limits)
            .with_cleanup(self.cleanup);
        let outcome = walker.execute(&mut self.pipeline);
        let behavior = walker.into_behavior();
        if outcome.is_ok() {
            self.registry.record(behavior);
        }
        MethodAnalysis {
            issues: self.pipeline.drain_issues(),
            outcome,
        }
    }
}

impl Default for SymbolicExecutor {
    fn default() -> Self {
        Self::new()
    }
}
