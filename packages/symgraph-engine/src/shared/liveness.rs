/*
 * Live-Variable Analysis
 *
 * Backward worklist fixpoint over the CFG, Kildall-style:
 *   live_out(b) = union of live_in(s) for each successor s
 *   live_in(b)  = transfer of live_out(b) backward through b's elements
 *
 * The walker consults live-out sets to drop dead bindings at block exits.
 * Identifiers that are the target of a plain assignment do not count as
 * reads; compound-assignment targets do.
 */

use rustc_hash::{FxHashMap, FxHashSet};

use crate::shared::models::cfg::{BlockId, Cfg};
use crate::shared::models::symbol::SymbolId;
use crate::shared::models::tree::{TreeArena, TreeKind};

/// Live-out sets per block, the cleanup oracle
#[derive(Debug, Clone)]
pub struct LiveVariables {
    live_out: FxHashMap<BlockId, FxHashSet<SymbolId>>,
}

impl LiveVariables {
    /// Run the fixpoint over the whole graph
    pub fn analyze(cfg: &Cfg, arena: &TreeArena) -> Self {
        let mut predecessors: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for id in cfg.block_ids() {
            predecessors.entry(id).or_default();
            for &succ in &cfg.block(id).successors {
                predecessors.entry(succ).or_default().push(id);
            }
        }

        let mut live_in: FxHashMap<BlockId, FxHashSet<SymbolId>> = FxHashMap::default();
        let mut live_out: FxHashMap<BlockId, FxHashSet<SymbolId>> = FxHashMap::default();
        for id in cfg.block_ids() {
            live_in.insert(id, FxHashSet::default());
            live_out.insert(id, FxHashSet::default());
        }

        let mut worklist: Vec<BlockId> = cfg.block_ids().collect();
        while let Some(id) = worklist.pop() {
            let mut out = FxHashSet::default();
            for &succ in &cfg.block(id).successors {
                out.extend(live_in[&succ].iter().copied());
            }

            let new_in = Self::transfer(cfg, arena, id, &out);
            live_out.insert(id, out);

            if new_in != live_in[&id] {
                live_in.insert(id, new_in);
                for &pred in &predecessors[&id] {
                    if !worklist.contains(&pred) {
                        worklist.push(pred);
                    }
                }
            }
        }

        Self { live_out }
    }

    /// Backward transfer over one block's elements
    fn transfer(
        cfg: &Cfg,
        arena: &TreeArena,
        block: BlockId,
        live_out: &FxHashSet<SymbolId>,
    ) -> FxHashSet<SymbolId> {
        let mut live = live_out.clone();
        for &element in cfg.block(block).elements.iter().rev() {
            match arena.kind(element) {
                TreeKind::Identifier { symbol } => {
                    if !arena.is_assignment_target(element) {
                        live.insert(*symbol);
                    }
                }
                TreeKind::Assignment { op, target } => {
                    if op.is_plain() {
                        live.remove(target);
                    } else {
                        live.insert(*target);
                    }
                }
                TreeKind::VariableDeclaration { symbol, .. } => {
                    live.remove(symbol);
                }
                _ => {}
            }
        }
        live
    }

    pub fn live_out(&self, block: BlockId) -> &FxHashSet<SymbolId> {
        &self.live_out[&block]
    }
}
