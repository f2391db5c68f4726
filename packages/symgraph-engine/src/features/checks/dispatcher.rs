/*
 * Checker Pipeline
 *
 * Fixed-order dispatch of the built-in checkers followed by any
 * user-supplied ones. The order is part of the observable contract:
 * the condition checker runs first so its feasibility bookkeeping
 * precedes every other checker's decisions; traversal order between
 * steps is not part of the contract.
 *
 * The condition checker is held in a dedicated slot because the walker
 * notifies it directly about branch feasibility.
 */

use crate::features::behavior::method_behavior::MethodBehavior;
use crate::features::constraints::domain::CheckId;
use crate::features::constraints::manager::ConstraintManager;
use crate::features::program_state::state::ProgramState;
use crate::shared::models::method::MethodContext;
use crate::shared::models::tree::TreeId;

use super::condition_always::ConditionAlwaysTrueOrFalseCheck;
use super::issue::{Issue, IssueSink};
use super::locks_not_unlocked::LocksNotUnlockedCheck;
use super::no_way_out_loop::NoWayOutLoopCheck;
use super::non_null_set_to_null::NonNullSetToNullCheck;
use super::null_dereference::NullDereferenceCheck;
use super::ports::{CheckerContext, PathOutcome, SymbolicCheck};
use super::unclosed_resources::UnclosedResourcesCheck;

pub struct CheckerPipeline {
    condition_check: ConditionAlwaysTrueOrFalseCheck,
    checks: Vec<Box<dyn SymbolicCheck>>,
    sink: IssueSink,
}

impl CheckerPipeline {
    /// The mandatory checkers in their required order
    pub fn with_defaults() -> Self {
        Self {
            condition_check: ConditionAlwaysTrueOrFalseCheck::new(),
            checks: vec![
                Box::new(NullDereferenceCheck::new()),
                Box::new(UnclosedResourcesCheck::new()),
                Box::new(LocksNotUnlockedCheck::new()),
                Box::new(NonNullSetToNullCheck::new()),
                Box::new(NoWayOutLoopCheck::new()),
            ],
            sink: IssueSink::new(),
        }
    }

    /// Append a user-supplied checker; it runs after the mandatory ones
    pub fn add_check(&mut self, check: Box<dyn SymbolicCheck>) {
        self.checks.push(check);
    }

    pub fn condition_check(&mut self) -> &mut ConditionAlwaysTrueOrFalseCheck {
        &mut self.condition_check
    }

    pub fn init(&mut self, method: &MethodContext<'_>, manager: &mut ConstraintManager) {
        let Self {
            condition_check,
            checks,
            sink,
        } = self;
        condition_check.init(method, manager, sink);
        for check in checks.iter_mut() {
            check.init(method, manager, sink);
        }
    }

    /// Run pre-statement hooks; stops at the first checker that sinks
    pub fn pre_statement(
        &mut self,
        state: &mut ProgramState,
        manager: &mut ConstraintManager,
        behavior: &mut MethodBehavior,
        method: &MethodContext<'_>,
        tree: TreeId,
    ) -> PathOutcome {
        let Self {
            condition_check,
            checks,
            sink,
        } = self;
        let mut ctx = CheckerContext {
            state,
            manager,
            behavior,
            method,
            sink,
        };
        if condition_check.pre_statement(&mut ctx, tree) == PathOutcome::Sink {
            return PathOutcome::Sink;
        }
        for check in checks.iter_mut() {
            if check.pre_statement(&mut ctx, tree) == PathOutcome::Sink {
                return PathOutcome::Sink;
            }
        }
        PathOutcome::Continue
    }

    pub fn post_statement(
        &mut self,
        state: &mut ProgramState,
        manager: &mut ConstraintManager,
        behavior: &mut MethodBehavior,
        method: &MethodContext<'_>,
        tree: TreeId,
    ) {
        let Self {
            condition_check,
            checks,
            sink,
        } = self;
        let mut ctx = CheckerContext {
            state,
            manager,
            behavior,
            method,
            sink,
        };
        condition_check.post_statement(&mut ctx, tree);
        for check in checks.iter_mut() {
            check.post_statement(&mut ctx, tree);
        }
    }

    pub fn end_of_execution_path(
        &mut self,
        state: &mut ProgramState,
        manager: &mut ConstraintManager,
        behavior: &mut MethodBehavior,
        method: &MethodContext<'_>,
    ) {
        let Self {
            condition_check,
            checks,
            sink,
        } = self;
        let mut ctx = CheckerContext {
            state,
            manager,
            behavior,
            method,
            sink,
        };
        condition_check.end_of_execution_path(&mut ctx);
        for check in checks.iter_mut() {
            check.end_of_execution_path(&mut ctx);
        }
    }

    pub fn end_of_execution(&mut self, method: &MethodContext<'_>) {
        let Self {
            condition_check,
            checks,
            sink,
        } = self;
        condition_check.end_of_execution(method, sink);
        for check in checks.iter_mut() {
            check.end_of_execution(method, sink);
        }
    }

    pub fn interrupted_execution(&mut self, method: &MethodContext<'_>) {
        let Self {
            condition_check,
            checks,
            sink,
        } = self;
        condition_check.interrupted_execution(method, sink);
        for check in checks.iter_mut() {
            check.interrupted_execution(method, sink);
        }
    }

    /// Walker-side reporting (no-yield diagnostics)
    pub fn report_issue(&mut self, check: CheckId, tree: TreeId, message: impl Into<String>) {
        self.sink.report(Issue {
            check,
            tree,
            message: message.into(),
            flow: Vec::new(),
        });
    }

    pub fn issues(&self) -> &[Issue] {
        self.sink.issues()
    }

    pub fn drain_issues(&mut self) -> Vec<Issue> {
        self.sink.drain()
    }
}

impl Default for CheckerPipeline {
    fn default() -> Self {
        Self::with_defaults()
    }
}
