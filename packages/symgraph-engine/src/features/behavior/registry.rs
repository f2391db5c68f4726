/*
 * Behavior Registry
 *
 * Completed method behaviors, keyed by method symbol. Lookups during an
 * in-progress analysis of the same method return nothing, which routes
 * the call through the unknown-method default; that is the reentrancy
 * contract for recursive methods.
 */

use rustc_hash::FxHashMap;

use crate::shared::models::symbol::SymbolId;

use super::method_behavior::MethodBehavior;

#[derive(Debug, Default)]
pub struct BehaviorRegistry {
    behaviors: FxHashMap<SymbolId, MethodBehavior>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a completed behavior
    pub fn get(&self, method: SymbolId) -> Option<&MethodBehavior> {
        self.behaviors.get(&method).filter(|b| b.is_complete())
    }

    /// Record a finished behavior, marking it complete
    pub fn record(&mut self, mut behavior: MethodBehavior) {
        behavior.mark_complete();
        self.behaviors.insert(behavior.method(), behavior);
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}
