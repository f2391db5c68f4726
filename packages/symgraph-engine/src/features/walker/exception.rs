/*
 * Exception Flow
 *
 * Resolves where control lands when an exception value surfaces: the
 * first catch clause of a try whose caught type covers the thrown type,
 * else the try's finally block, else the method's last block.
 */

use crate::shared::models::cfg::{BlockId, Cfg};
use crate::shared::models::symbol::{TypeId, TypeTable};
use crate::shared::models::tree::TreeId;

pub struct ExceptionFlow<'a> {
    cfg: &'a Cfg,
    types: &'a TypeTable,
}

impl<'a> ExceptionFlow<'a> {
    pub fn new(cfg: &'a Cfg, types: &'a TypeTable) -> Self {
        Self { cfg, types }
    }

    /// Entry block of the first catch clause covering `thrown`
    pub fn catch_block(&self, try_tree: TreeId, thrown: TypeId) -> Option<BlockId> {
        let region = self.cfg.try_region(try_tree)?;
        region
            .catches
            .iter()
            .find(|(caught, _)| self.types.is_subtype(thrown, *caught))
            .map(|(_, block)| *block)
    }

    /// Entry block of the try's finally clause
    pub fn finally_block(&self, try_tree: TreeId) -> Option<BlockId> {
        self.cfg.try_region(try_tree)?.finally_block
    }

    /// Where uncaught exceptions finalize
    pub fn last_block(&self) -> BlockId {
        self.cfg.exit()
    }
}
