/*
 * Method Under Analysis
 *
 * Bundles everything the walker consumes for one method: the resolved
 * syntax arena, the symbol/type oracle, the CFG and its liveness sets,
 * plus the method's own identity and parameter declarations.
 */

use super::cfg::Cfg;
use super::symbol::{SymbolId, SymbolKind, SymbolTable, TypeTable};
use super::tree::{TreeArena, TreeId};
use crate::shared::liveness::LiveVariables;

/// One declared parameter: its symbol plus its declaration node
#[derive(Debug, Clone, Copy)]
pub struct ParameterDeclaration {
    pub symbol: SymbolId,
    pub tree: TreeId,
}

/// Borrowed view of one method and the oracles needed to analyze it
#[derive(Clone, Copy)]
pub struct MethodContext<'a> {
    pub method: SymbolId,
    pub parameters: &'a [ParameterDeclaration],
    pub arena: &'a TreeArena,
    pub symbols: &'a SymbolTable,
    pub types: &'a TypeTable,
    pub cfg: &'a Cfg,
    pub live: &'a LiveVariables,
}

impl<'a> MethodContext<'a> {
    pub fn name(&self) -> &'a str {
        self.symbols.name(self.method)
    }

    pub fn is_constructor(&self) -> bool {
        matches!(
            self.symbols.info(self.method).kind,
            SymbolKind::Method { is_constructor: true, .. }
        )
    }

    pub fn returns_void(&self) -> bool {
        matches!(
            self.symbols.info(self.method).kind,
            SymbolKind::Method { returns_void: true, .. }
        )
    }

    /// `equals` with a single parameter gets split nullness starting states
    pub fn is_equals_method(&self) -> bool {
        self.name() == "equals" && self.parameters.len() == 1
    }
}
