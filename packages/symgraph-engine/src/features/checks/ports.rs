/*
 * Checker Plug-in ABI
 *
 * A checker names a stable identity, may register constraint kinds at
 * init, and observes the walker through the hooks below. Hooks receive a
 * context giving mutable access to the current path state, the constraint
 * manager, the behavior under construction and the issue sink.
 *
 * A pre-statement hook may sink the path: the walker then synthesizes a
 * null-failure exception value, registers a yield and abandons the path.
 */

use crate::features::behavior::method_behavior::MethodBehavior;
use crate::features::constraints::domain::CheckId;
use crate::features::constraints::manager::ConstraintManager;
use crate::features::program_state::state::ProgramState;
use crate::shared::models::method::MethodContext;
use crate::shared::models::tree::TreeId;

use super::issue::{FlowStep, Issue, IssueSink};

/// Outcome of a pre-statement hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOutcome {
    Continue,
    /// End the current path at this statement
    Sink,
}

/// What a checker sees while the walker is on a path
pub struct CheckerContext<'a> {
    pub state: &'a mut ProgramState,
    pub manager: &'a mut ConstraintManager,
    pub behavior: &'a mut MethodBehavior,
    pub method: &'a MethodContext<'a>,
    pub(crate) sink: &'a mut IssueSink,
}

impl CheckerContext<'_> {
    pub fn report_issue(&mut self, check: CheckId, tree: TreeId, message: impl Into<String>) {
        self.sink.report(Issue {
            check,
            tree,
            message: message.into(),
            flow: Vec::new(),
        });
    }

    pub fn report_issue_with_flow(
        &mut self,
        check: CheckId,
        tree: TreeId,
        message: impl Into<String>,
        flow: Vec<FlowStep>,
    ) {
        self.sink.report(Issue {
            check,
            tree,
            message: message.into(),
            flow,
        });
    }
}

/// The hooks a symbolic-execution checker implements. Every hook has a
/// default empty body; checkers override what they observe.
pub trait SymbolicCheck {
    fn check_id(&self) -> CheckId;

    /// Once per method, before exploration; register constraint kinds and
    /// inspect the CFG here.
    fn init(
        &mut self,
        _method: &MethodContext<'_>,
        _manager: &mut ConstraintManager,
        _sink: &mut IssueSink,
    ) {
    }

    fn pre_statement(&mut self, _ctx: &mut CheckerContext<'_>, _tree: TreeId) -> PathOutcome {
        PathOutcome::Continue
    }

    fn post_statement(&mut self, _ctx: &mut CheckerContext<'_>, _tree: TreeId) {}

    /// One path reached a method exit
    fn end_of_execution_path(&mut self, _ctx: &mut CheckerContext<'_>) {}

    /// Exploration finished normally
    fn end_of_execution(&mut self, _method: &MethodContext<'_>, _sink: &mut IssueSink) {}

    /// Exploration was aborted by a bound
    fn interrupted_execution(&mut self, _method: &MethodContext<'_>, _sink: &mut IssueSink) {}
}
