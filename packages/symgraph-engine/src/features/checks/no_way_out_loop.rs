/*
 * No Way Out Loop
 *
 * Structural check run at init time: a loop whose condition is the
 * literal true (or a for-loop with no condition) and whose body can never
 * reach the method exit has no way out.
 */

use petgraph::algo::has_path_connecting;
use petgraph::graphmap::DiGraphMap;

use crate::features::constraints::domain::CheckId;
use crate::features::constraints::manager::ConstraintManager;
use crate::shared::models::cfg::{BlockId, TerminatorKind};
use crate::shared::models::method::MethodContext;

use super::issue::{Issue, IssueSink};
use super::ports::SymbolicCheck;

#[derive(Debug, Default)]
pub struct NoWayOutLoopCheck;

impl NoWayOutLoopCheck {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolicCheck for NoWayOutLoopCheck {
    fn check_id(&self) -> CheckId {
        CheckId::NoWayOutLoop
    }

    fn init(
        &mut self,
        method: &MethodContext<'_>,
        _manager: &mut ConstraintManager,
        sink: &mut IssueSink,
    ) {
        let cfg = method.cfg;
        let mut graph: DiGraphMap<BlockId, ()> = DiGraphMap::new();
        for id in cfg.block_ids() {
            graph.add_node(id);
            for &succ in &cfg.block(id).successors {
                graph.add_edge(id, succ, ());
            }
        }

        let exit = cfg.exit();
        for id in cfg.block_ids() {
            let Some(terminator) = cfg.block(id).terminator else {
                continue;
            };
            let endless = match terminator.kind {
                TerminatorKind::While { condition } | TerminatorKind::DoWhile { condition } => {
                    method.arena.is_boolean_literal(condition)
                }
                TerminatorKind::For { condition: None } => true,
                TerminatorKind::For {
                    condition: Some(condition),
                } => method.arena.is_boolean_literal(condition),
                _ => false,
            };
            if endless && !has_path_connecting(&graph, id, exit, None) {
                sink.report(Issue {
                    check: CheckId::NoWayOutLoop,
                    tree: terminator.tree,
                    message: "Add an end condition to this loop".to_string(),
                    flow: Vec::new(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionLimits;
    use crate::shared::liveness::LiveVariables;
    use crate::shared::models::cfg::{CfgBuilder, Terminator};
    use crate::shared::models::symbol::{SymbolInfo, SymbolTable, TypeTable};
    use crate::shared::models::tree::{LiteralKind, TreeArena, TreeKind};

    #[test]
    fn test_endless_loop_with_no_exit_reports() {
        let mut arena = TreeArena::new();
        let while_tree = arena.add(TreeKind::WhileStatement);
        let condition = arena.add_child(while_tree, TreeKind::Literal(LiteralKind::Boolean(true)));

        let mut builder = CfgBuilder::new();
        let head = builder.add_block();
        let body = builder.add_block();
        let exit = builder.add_block();
        builder.set_entry(head);
        builder.add_element(head, condition);
        builder.set_terminator(
            head,
            Terminator {
                tree: while_tree,
                kind: TerminatorKind::While { condition },
            },
        );
        builder.set_branches(head, body, None);
        builder.add_successor(body, head);
        builder.mark_method_exit(exit);
        let cfg = builder.build();

        let mut symbols = SymbolTable::new();
        let types = TypeTable::new();
        let method = symbols.declare(SymbolInfo::method(
            "spin",
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
        let mut manager = ConstraintManager::new(&ExecutionLimits::default());
        let mut check = NoWayOutLoopCheck::new();
        check.init(&ctx, &mut manager, &mut sink);

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.issues()[0].check, CheckId::NoWayOutLoop);
    }

    #[test]
    fn test_loop_with_break_edge_is_silent() {
        let mut arena = TreeArena::new();
        let while_tree = arena.add(TreeKind::WhileStatement);
        let condition = arena.add_child(while_tree, TreeKind::Literal(LiteralKind::Boolean(true)));

        let mut builder = CfgBuilder::new();
        let head = builder.add_block();
        let body = builder.add_block();
        let exit = builder.add_block();
        builder.set_entry(head);
        builder.add_element(head, condition);
        builder.set_terminator(
            head,
            Terminator {
                tree: while_tree,
                kind: TerminatorKind::While { condition },
            },
        );
        builder.set_branches(head, body, None);
        // the body can break out
        builder.add_successor(body, head);
        builder.add_successor(body, exit);
        builder.mark_method_exit(exit);
        let cfg = builder.build();

        let mut symbols = SymbolTable::new();
        let types = TypeTable::new();
        let method = symbols.declare(SymbolInfo::method(
            "bounded",
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
        let mut manager = ConstraintManager::new(&ExecutionLimits::default());
        let mut check = NoWayOutLoopCheck::new();
        check.init(&ctx, &mut manager, &mut sink);

        assert!(sink.is_empty());
    }
}
