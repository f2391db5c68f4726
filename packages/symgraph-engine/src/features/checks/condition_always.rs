/*
 * Condition Always True Or False
 *
 * The walker reports which side of every branch was feasible; a condition
 * that only ever evaluated one way across all explored paths is constant
 * and gets reported at end of execution.
 *
 * Boolean expressions sitting directly under a return statement never go
 * through a branch, so their truth is probed at post-statement time
 * against the current state.
 */

use rustc_hash::FxHashSet;

use crate::features::constraints::domain::{CheckId, Constraint};
use crate::features::constraints::manager::ConstraintManager;
use crate::features::program_state::state::ProgramState;
use crate::features::symbolic_values::value::SymbolicValue;
use crate::shared::models::method::MethodContext;
use crate::shared::models::tree::{BinaryOperator, TreeId, TreeKind, UnaryOperator};

use super::issue::IssueSink;
use super::ports::{CheckerContext, SymbolicCheck};

#[derive(Debug, Default)]
pub struct ConditionAlwaysTrueOrFalseCheck {
    evaluated_true: FxHashSet<TreeId>,
    evaluated_false: FxHashSet<TreeId>,
}

impl ConditionAlwaysTrueOrFalseCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Walker notification: the true side of `condition` was feasible
    pub fn evaluated_to_true(&mut self, condition: TreeId) {
        self.evaluated_true.insert(condition);
    }

    /// Walker notification: the false side of `condition` was feasible
    pub fn evaluated_to_false(&mut self, condition: TreeId) {
        self.evaluated_false.insert(condition);
    }
}

/// Probe whether the state already decides the value's truth
fn decided_truth(
    manager: &ConstraintManager,
    state: &ProgramState,
    sv: SymbolicValue,
) -> Option<bool> {
    let true_feasible = manager
        .set_constraint(state, sv, Constraint::Boolean(true))
        .map(|states| !states.is_empty())
        .unwrap_or(true);
    let false_feasible = manager
        .set_constraint(state, sv, Constraint::Boolean(false))
        .map(|states| !states.is_empty())
        .unwrap_or(true);
    match (true_feasible, false_feasible) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}

impl SymbolicCheck for ConditionAlwaysTrueOrFalseCheck {
    fn check_id(&self) -> CheckId {
        CheckId::ConditionAlwaysTrueOrFalse
    }

    fn init(
        &mut self,
        _method: &MethodContext<'_>,
        _manager: &mut ConstraintManager,
        _sink: &mut IssueSink,
    ) {
        self.evaluated_true.clear();
        self.evaluated_false.clear();
    }

    fn post_statement(&mut self, ctx: &mut CheckerContext<'_>, tree: TreeId) {
        let shaped_like_condition = matches!(
            ctx.method.arena.kind(tree),
            TreeKind::Binary {
                op: BinaryOperator::Equal | BinaryOperator::NotEqual
            } | TreeKind::Unary {
                op: UnaryOperator::LogicalComplement
            }
        );
        if !shaped_like_condition {
            return;
        }
        if !matches!(ctx.method.arena.parent_kind(tree), Some(TreeKind::ReturnStatement)) {
            return;
        }
        let Some(sv) = ctx.state.peek() else {
            return;
        };
        if let Some(value) = decided_truth(ctx.manager, ctx.state, sv) {
            ctx.report_issue(
                CheckId::ConditionAlwaysTrueOrFalse,
                tree,
                format!(
                    "Remove this expression which always evaluates to \"{}\"",
                    value
                ),
            );
        }
    }

    fn end_of_execution(&mut self, _method: &MethodContext<'_>, sink: &mut IssueSink) {
        for &condition in self.evaluated_true.difference(&self.evaluated_false) {
            sink.report(super::issue::Issue {
                check: CheckId::ConditionAlwaysTrueOrFalse,
                tree: condition,
                message: "Change this condition so that it does not always evaluate to \"true\""
                    .to_string(),
                flow: Vec::new(),
            });
        }
        for &condition in self.evaluated_false.difference(&self.evaluated_true) {
            sink.report(super::issue::Issue {
                check: CheckId::ConditionAlwaysTrueOrFalse,
                tree: condition,
                message: "Change this condition so that it does not always evaluate to \"false\""
                    .to_string(),
                flow: Vec::new(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_sided_conditions_are_reported() {
        use crate::shared::liveness::LiveVariables;
        use crate::shared::models::cfg::CfgBuilder;
        use crate::shared::models::symbol::{SymbolInfo, SymbolTable, TypeTable};
        use crate::shared::models::tree::TreeArena;

        let mut check = ConditionAlwaysTrueOrFalseCheck::new();
        check.evaluated_to_true(TreeId(1)); // always true
        check.evaluated_to_true(TreeId(2)); // both sides
        check.evaluated_to_false(TreeId(2));
        check.evaluated_to_false(TreeId(3)); // always false

        let arena = TreeArena::new();
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block();
        builder.set_entry(b0);
        builder.mark_method_exit(b0);
        let cfg = builder.build();
        let mut symbols = SymbolTable::new();
        let types = TypeTable::new();
        let method = symbols.declare(SymbolInfo::method(
            "probe",
            types.well_known().object,
            false,
            true,
        ));
        let live = LiveVariables::analyze(&cfg, &arena);
        let ctx = MethodContext {
            method,
            parameters: &[],
            arena: &arena,
            symbols: &symbols,
            types: &types,
            cfg: &cfg,
            live: &live,
        };

        let mut sink = IssueSink::new();
        check.end_of_execution(&ctx, &mut sink);

        assert_eq!(sink.len(), 2);
        let trees: Vec<TreeId> = sink.issues().iter().map(|i| i.tree).collect();
        assert!(trees.contains(&TreeId(1)));
        assert!(trees.contains(&TreeId(3)));
        assert!(!trees.contains(&TreeId(2)));
        assert!(sink
            .issues()
            .iter()
            .find(|i| i.tree == TreeId(1))
            .unwrap()
            .message
            .contains("true"));
    }

    #[test]
    fn test_decided_truth() {
        use crate::config::ExecutionLimits;
        let mut cm = ConstraintManager::new(&ExecutionLimits::default());
        let sv = cm.create_plain_value();
        let state = ProgramState::new();
        assert_eq!(decided_truth(&cm, &state, sv), None);

        let constrained = state
            .add_constraint(sv, Constraint::Boolean(true), cm.domain())
            .unwrap();
        assert_eq!(decided_truth(&cm, &constrained, sv), Some(true));
        assert_eq!(
            decided_truth(&cm, &ProgramState::new(), SymbolicValue::FALSE),
            Some(false)
        );
    }
}
