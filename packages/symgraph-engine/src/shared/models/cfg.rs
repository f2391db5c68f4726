/*
 * CFG Model
 *
 * Per-method control-flow graph consumed by the walker. Construction from
 * source text is an external collaborator's job; `CfgBuilder` is the
 * contract surface through which providers (and tests) assemble graphs.
 *
 * Blocks carry ordered element trees plus an optional terminator. A
 * program point addresses either an element (index < elements.len()) or
 * the terminator evaluation steps past it.
 */

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::symbol::TypeId;
use super::tree::TreeId;

/// Index of a basic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId(pub u32);

/// Position inside a method: a block plus an index that is either an
/// element offset or one/two past the last element (terminator steps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramPoint {
    pub block: BlockId,
    pub index: usize,
}

impl ProgramPoint {
    pub fn new(block: BlockId, index: usize) -> Self {
        Self { block, index }
    }

    pub fn next(&self) -> Self {
        Self {
            block: self.block,
            index: self.index + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminatorKind {
    If { condition: TreeId },
    /// `&&` as terminator; branch decided by the left operand
    ConditionalAnd { left: TreeId },
    /// `||` as terminator; branch decided by the left operand
    ConditionalOr { left: TreeId },
    ConditionalExpression { condition: TreeId },
    For { condition: Option<TreeId> },
    While { condition: TreeId },
    DoWhile { condition: TreeId },
    ForEach,
    Synchronized,
    Return { with_expression: bool },
    Throw { exception: TypeId },
    Switch,
    Break,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminator {
    pub tree: TreeId,
    pub kind: TerminatorKind,
}

#[derive(Debug, Clone, Default)]
pub struct Block {
    pub elements: Vec<TreeId>,
    pub terminator: Option<Terminator>,
    pub successors: Vec<BlockId>,
    pub true_successor: Option<BlockId>,
    pub false_successor: Option<BlockId>,
    /// Where control continues after an enclosing finally block
    pub exit_successor: Option<BlockId>,
    pub is_finally: bool,
    pub is_method_exit: bool,
}

/// Catch/finally wiring of one try statement
#[derive(Debug, Clone, Default)]
pub struct TryRegion {
    /// Catch clauses in declaration order: caught type -> handler entry
    pub catches: Vec<(TypeId, BlockId)>,
    pub finally_block: Option<BlockId>,
}

/// Control-flow graph of a single method body
#[derive(Debug, Clone)]
pub struct Cfg {
    blocks: Vec<Block>,
    entry: BlockId,
    exit: BlockId,
    try_regions: FxHashMap<TreeId, TryRegion>,
}

impl Cfg {
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    pub fn entry(&self) -> BlockId {
        self.entry
    }

    /// The method exit block; uncaught exceptions are routed here
    pub fn exit(&self) -> BlockId {
        self.exit
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        (0..self.blocks.len()).map(|i| BlockId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn try_region(&self, tree: TreeId) -> Option<&TryRegion> {
        self.try_regions.get(&tree)
    }
}

/// Assembles a [`Cfg`]; the contract surface for CFG providers.
#[derive(Debug, Default)]
pub struct CfgBuilder {
    blocks: Vec<Block>,
    entry: Option<BlockId>,
    try_regions: FxHashMap<TreeId, TryRegion>,
}

impl CfgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block::default());
        id
    }

    pub fn set_entry(&mut self, block: BlockId) {
        self.entry = Some(block);
    }

    pub fn add_element(&mut self, block: BlockId, tree: TreeId) {
        self.blocks[block.0 as usize].elements.push(tree);
    }

    pub fn set_terminator(&mut self, block: BlockId, terminator: Terminator) {
        self.blocks[block.0 as usize].terminator = Some(terminator);
    }

    pub fn add_successor(&mut self, block: BlockId, successor: BlockId) {
        self.blocks[block.0 as usize].successors.push(successor);
    }

    /// Wire a conditional terminator's outcomes; both are also successors
    pub fn set_branches(&mut self, block: BlockId, on_true: BlockId, on_false: Option<BlockId>) {
        let b = &mut self.blocks[block.0 as usize];
        b.true_successor = Some(on_true);
        b.successors.push(on_true);
        if let Some(f) = on_false {
            b.false_successor = Some(f);
            b.successors.push(f);
        }
    }

    pub fn set_exit_successor(&mut self, block: BlockId, exit: BlockId) {
        self.blocks[block.0 as usize].exit_successor = Some(exit);
    }

    pub fn mark_finally(&mut self, block: BlockId) {
        self.blocks[block.0 as usize].is_finally = true;
    }

    pub fn mark_method_exit(&mut self, block: BlockId) {
        self.blocks[block.0 as usize].is_method_exit = true;
    }

    pub fn add_try_region(&mut self, tree: TreeId, region: TryRegion) {
        self.try_regions.insert(tree, region);
    }

    /// Finish the graph. Panics on a graph with no entry or no exit block:
    /// both are construction bugs on the provider side.
    pub fn build(self) -> Cfg {
        let entry = self.entry.expect("CFG has no entry block");
        let exit = self
            .blocks
            .iter()
            .position(|b| b.is_method_exit)
            .or_else(|| self.blocks.iter().position(|b| b.successors.is_empty()))
            .map(|i| BlockId(i as u32))
            .expect("CFG has no method exit block");
        Cfg {
            blocks: self.blocks,
            entry,
            exit,
            try_regions: self.try_regions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_graph() {
        let mut builder = CfgBuilder::new();
        let b0 = builder.add_block();
        let b1 = builder.add_block();
        builder.set_entry(b0);
        builder.add_successor(b0, b1);
        builder.mark_method_exit(b1);
        let cfg = builder.build();

        assert_eq!(cfg.entry(), b0);
        assert_eq!(cfg.exit(), b1);
        assert_eq!(cfg.block(b0).successors, vec![b1]);
        assert!(cfg.block(b1).successors.is_empty());
    }

    #[test]
    fn test_branch_wiring() {
        let mut builder = CfgBuilder::new();
        let cond = builder.add_block();
        let then_block = builder.add_block();
        let exit = builder.add_block();
        builder.set_entry(cond);
        builder.set_branches(cond, then_block, Some(exit));
        builder.add_successor(then_block, exit);
        builder.mark_method_exit(exit);
        let cfg = builder.build();

        assert_eq!(cfg.block(cond).true_successor, Some(then_block));
        assert_eq!(cfg.block(cond).false_successor, Some(exit));
        assert_eq!(cfg.block(cond).successors.len(), 2);
    }

    #[test]
    fn test_program_point_next() {
        let pp = ProgramPoint::new(BlockId(3), 1);
        assert_eq!(pp.next(), ProgramPoint::new(BlockId(3), 2));
    }
}
