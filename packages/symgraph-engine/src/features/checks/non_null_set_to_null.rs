/*
 * Non-Null Set To Null
 *
 * Assignments and initializers writing a null-constrained value into a
 * declaration annotated non-null.
 */

use crate::features::constraints::domain::CheckId;
use crate::shared::models::symbol::NONNULL_ANNOTATION;
use crate::shared::models::tree::{TreeId, TreeKind};

use super::ports::{CheckerContext, PathOutcome, SymbolicCheck};

#[derive(Debug, Default)]
pub struct NonNullSetToNullCheck;

impl NonNullSetToNullCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolicCheck for NonNullSetToNullCheck {
    fn check_id(&self) -> CheckId {
        CheckId::NonNullSetToNull
    }

    fn pre_statement(&mut self, ctx: &mut CheckerContext<'_>, tree: TreeId) -> PathOutcome {
        // At an assignment the variable sits on top of the stack and the
        // assigned expression one below; a declaration initializer is on top.
        let (target, value) = match ctx.method.arena.kind(tree) {
            TreeKind::Assignment { op, target } if op.is_plain() => {
                (*target, ctx.state.peek_nth(1))
            }
            TreeKind::VariableDeclaration {
                symbol,
                initialized: true,
            } => (*symbol, ctx.state.peek()),
            _ => return PathOutcome::Continue,
        };
        if !ctx.method.symbols.has_annotation(target, NONNULL_ANNOTATION) {
            return PathOutcome::Continue;
        }
        let Some(value) = value else {
            return PathOutcome::Continue;
        };
        if ctx.state.is_null(value) {
            let name = ctx.method.symbols.name(target);
            ctx.report_issue(
                CheckId::NonNullSetToNull,
                tree,
                format!("\"{}\" is marked \"@Nonnull\" but is set to null", name),
            );
        }
        PathOutcome::Continue
    }
}
