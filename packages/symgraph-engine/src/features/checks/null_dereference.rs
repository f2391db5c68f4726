/*
 * Null Dereference
 *
 * Watches member selects and array accesses. Dereferencing a value with a
 * null constraint reports and sinks the path. Dereferencing a value with
 * no nullness fact records a potential null pointer on the method's
 * behavior (callers get warned when they pass null) and pins the value
 * non-null from here on so one unknown receiver is not re-flagged.
 */

use crate::features::constraints::domain::{CheckId, Constraint, ConstraintKind};
use crate::features::symbolic_values::value::SymbolicValue;
use crate::shared::models::tree::{TreeId, TreeKind};

use super::issue::FlowStep;
use super::ports::{CheckerContext, PathOutcome, SymbolicCheck};

#[derive(Debug, Default)]
pub struct NullDereferenceCheck;

impl NullDereferenceCheck {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_dereference(
        &self,
        ctx: &mut CheckerContext<'_>,
        tree: TreeId,
        target: Option<SymbolicValue>,
        name: &str,
    ) -> PathOutcome {
        let Some(sv) = target else {
            return PathOutcome::Continue;
        };
        match ctx.state.constraint(sv, ConstraintKind::Nullness).cloned() {
            Some(Constraint::Null { provenance }) => {
                let mut flow = Vec::new();
                if let Some(site) = provenance {
                    flow.push(FlowStep {
                        tree: site,
                        message: format!("'{}' can be null", name),
                    });
                }
                flow.push(FlowStep {
                    tree,
                    message: format!("'{}' is dereferenced", name),
                });
                ctx.report_issue_with_flow(
                    CheckId::NullDereference,
                    tree,
                    format!(
                        "NullPointerException might be thrown as '{}' is nullable here",
                        name
                    ),
                    flow,
                );
                PathOutcome::Sink
            }
            Some(_) => PathOutcome::Continue,
            None => {
                ctx.behavior.notify_potential_null_pointer(sv, tree);
                *ctx.state = ctx.state.set_single_constraint(sv, Constraint::NotNull);
                PathOutcome::Continue
            }
        }
    }
}

impl SymbolicCheck for NullDereferenceCheck {
    fn check_id(&self) -> CheckId {
        CheckId::NullDereference
    }

    fn pre_statement(&mut self, ctx: &mut CheckerContext<'_>, tree: TreeId) -> PathOutcome {
        match ctx.method.arena.kind(tree) {
            TreeKind::MemberSelect {
                class_literal: false,
                receiver,
                ..
            } => {
                let name = receiver
                    .map(|s| ctx.method.symbols.name(s).to_string())
                    .unwrap_or_else(|| "expression".to_string());
                let target = ctx.state.peek();
                self.check_dereference(ctx, tree, target, &name)
            }
            TreeKind::ArrayAccess => {
                // stack holds [array, index]; the array is one below top
                let target = ctx.state.peek_nth(1);
                self.check_dereference(ctx, tree, target, "expression")
            }
            _ => PathOutcome::Continue,
        }
    }
}
