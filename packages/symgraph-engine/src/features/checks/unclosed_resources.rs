/*
 * Unclosed Resources
 *
 * Tracks values of closeable types through a checker-private constraint:
 * OPEN at construction, CLOSED when a close() reaches the value. A path
 * ending with an OPEN value that is not the returned result leaks it.
 */

use crate::features::constraints::domain::{CheckId, Constraint, ConstraintKind};
use crate::shared::models::tree::{TreeId, TreeKind};

use super::ports::{CheckerContext, SymbolicCheck};

const CLOSED: u8 = 0;
const OPEN: u8 = 1;

#[derive(Debug, Default)]
pub struct UnclosedResourcesCheck;

impl UnclosedResourcesCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolicCheck for UnclosedResourcesCheck {
    fn check_id(&self) -> CheckId {
        CheckId::UnclosedResources
    }

    fn post_statement(&mut self, ctx: &mut CheckerContext<'_>, tree: TreeId) {
        match ctx.method.arena.kind(tree) {
            TreeKind::NewClass { class_type, .. } => {
                if !ctx.method.types.info(*class_type).closeable {
                    return;
                }
                if let Some(sv) = ctx.state.peek() {
                    *ctx.state = ctx.state.set_single_constraint(
                        sv,
                        Constraint::Checker {
                            check: CheckId::UnclosedResources,
                            value: OPEN,
                            origin: Some(tree),
                        },
                    );
                }
            }
            TreeKind::MethodInvocation {
                method: Some(m),
                receiver_symbol: Some(receiver),
                ..
            } => {
                if ctx.method.symbols.name(*m) != "close" {
                    return;
                }
                if let Some(sv) = ctx.state.value_of(*receiver) {
                    *ctx.state = ctx.state.set_single_constraint(
                        sv,
                        Constraint::Checker {
                            check: CheckId::UnclosedResources,
                            value: CLOSED,
                            origin: None,
                        },
                    );
                }
            }
            _ => {}
        }
    }

    fn end_of_execution_path(&mut self, ctx: &mut CheckerContext<'_>) {
        let returned = ctx.state.peek();
        let mut leaks: Vec<TreeId> = Vec::new();
        for (sv, constraints) in ctx.state.constraint_entries() {
            if Some(sv) == returned {
                continue;
            }
            if let Some(Constraint::Checker {
                value: OPEN,
                origin: Some(origin),
                ..
            }) = constraints.get(ConstraintKind::Checker(CheckId::UnclosedResources))
            {
                leaks.push(*origin);
            }
        }
        for origin in leaks {
            let type_name = match ctx.method.arena.kind(origin) {
                TreeKind::NewClass { class_type, .. } => {
                    ctx.method.types.simple_name(*class_type).to_string()
                }
                _ => "resource".to_string(),
            };
            ctx.report_issue(
                CheckId::UnclosedResources,
                origin,
                format!("Close this \"{}\"", type_name),
            );
        }
    }
}
