/*
 * Locks Not Unlocked
 *
 * Tracks values of lock types: lock()/tryLock() marks the value held,
 * unlock() releases it. A path ending with a held lock reports at the
 * acquisition site.
 */

use crate::features::constraints::domain::{CheckId, Constraint, ConstraintKind};
use crate::shared::models::tree::{TreeId, TreeKind};

use super::ports::{CheckerContext, SymbolicCheck};

const UNLOCKED: u8 = 0;
const LOCKED: u8 = 1;

#[derive(Debug, Default)]
pub struct LocksNotUnlockedCheck;

impl LocksNotUnlockedCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolicCheck for LocksNotUnlockedCheck {
    fn check_id(&self) -> CheckId {
        CheckId::LocksNotUnlocked
    }

    fn post_statement(&mut self, ctx: &mut CheckerContext<'_>, tree: TreeId) {
        let TreeKind::MethodInvocation {
            method: Some(m),
            receiver_symbol: Some(receiver),
            ..
        } = ctx.method.arena.kind(tree)
        else {
            return;
        };
        let is_lock_type = ctx
            .method
            .symbols
            .declared_type(*receiver)
            .map(|t| ctx.method.types.info(t).lock)
            .unwrap_or(false);
        if !is_lock_type {
            return;
        }
        let Some(sv) = ctx.state.value_of(*receiver) else {
            return;
        };
        match ctx.method.symbols.name(*m) {
            "lock" | "tryLock" => {
                *ctx.state = ctx.state.set_single_constraint(
                    sv,
                    Constraint::Checker {
                        check: CheckId::LocksNotUnlocked,
                        value: LOCKED,
                        origin: Some(tree),
                    },
                );
            }
            "unlock" => {
                *ctx.state = ctx.state.set_single_constraint(
                    sv,
                    Constraint::Checker {
                        check: CheckId::LocksNotUnlocked,
                        value: UNLOCKED,
                        origin: None,
                    },
                );
            }
            _ => {}
        }
    }

    fn end_of_execution_path(&mut self, ctx: &mut CheckerContext<'_>) {
        let mut held: Vec<TreeId> = Vec::new();
        for (_, constraints) in ctx.state.constraint_entries() {
            if let Some(Constraint::Checker {
                value: LOCKED,
                origin: Some(origin),
                ..
            }) = constraints.get(ConstraintKind::Checker(CheckId::LocksNotUnlocked))
            {
                held.push(*origin);
            }
        }
        for origin in held {
            ctx.report_issue(
                CheckId::LocksNotUnlocked,
                origin,
                "Unlock this lock along all executions paths of this method",
            );
        }
    }
}
