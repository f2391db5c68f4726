/*
 * Program State
 *
 * Immutable snapshot of one execution path:
 * - values:      symbol -> symbolic value bindings
 * - constraints: symbolic value -> constraint set
 * - stack:       operand evaluation stack (back = top)
 * - visited:     program point -> times a state at that point was produced
 *
 * Every operation returns a new state; the maps are persistent (hash
 * tries) so transformations share structure instead of copying.
 *
 * Equality and hashing are deliberately forgetful: only the bindings, the
 * constraints and the top of the stack participate. Paths that differ
 * only in already-consumed operands or in visit counts collapse to one
 * exploded-graph node.
 */

use std::hash::{Hash, Hasher};

use im::{HashMap as ImHashMap, Vector as ImVector};
use rustc_hash::{FxHashSet, FxHasher};

use crate::features::constraints::domain::{
    Constraint, ConstraintDomain, ConstraintKind, Constraints,
};
use crate::features::symbolic_values::value::{SymbolicValue, ValueFactory, ValueKind};
use crate::shared::models::cfg::ProgramPoint;
use crate::shared::models::symbol::{SymbolId, SymbolTable};

#[derive(Debug, Clone)]
pub struct ProgramState {
    values: ImHashMap<SymbolId, SymbolicValue>,
    constraints: ImHashMap<SymbolicValue, Constraints>,
    visited: ImHashMap<ProgramPoint, u32>,
    stack: ImVector<SymbolicValue>,
}

impl ProgramState {
    /// The empty state. It already knows the intrinsic constraints of the
    /// three singletons: null is null, true is true, false is false.
    pub fn new() -> Self {
        let mut constraints = ImHashMap::new();
        constraints.insert(
            SymbolicValue::NULL,
            Constraints::singleton(Constraint::Null { provenance: None }),
        );
        constraints.insert(
            SymbolicValue::TRUE,
            Constraints::singleton(Constraint::Boolean(true)),
        );
        constraints.insert(
            SymbolicValue::FALSE,
            Constraints::singleton(Constraint::Boolean(false)),
        );
        Self {
            values: ImHashMap::new(),
            constraints,
            visited: ImHashMap::new(),
            stack: ImVector::new(),
        }
    }

    // ── Operand stack ────────────────────────────────────────────────

    pub fn stack_value(&self, sv: SymbolicValue) -> Self {
        let mut next = self.clone();
        next.stack.push_back(sv);
        next
    }

    /// Pop `n` values; the returned list is top-first. Popping more than
    /// the stack holds is an interpreter bug and panics.
    pub fn unstack(&self, n: usize) -> (Self, Vec<SymbolicValue>) {
        if n == 0 {
            return (self.clone(), Vec::new());
        }
        assert!(
            self.stack.len() >= n,
            "popping {} values from an operand stack of depth {}",
            n,
            self.stack.len()
        );
        let mut next = self.clone();
        let mut popped = Vec::with_capacity(n);
        for _ in 0..n {
            popped.push(next.stack.pop_back().unwrap());
        }
        (next, popped)
    }

    pub fn peek(&self) -> Option<SymbolicValue> {
        self.stack.last().copied()
    }

    /// Non-mutating read of the value `n` below the top
    pub fn peek_nth(&self, n: usize) -> Option<SymbolicValue> {
        self.stack
            .len()
            .checked_sub(n + 1)
            .and_then(|i| self.stack.get(i))
            .copied()
    }

    pub fn clear_stack(&self) -> Self {
        let mut next = self.clone();
        next.stack = ImVector::new();
        next
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    // ── Bindings ─────────────────────────────────────────────────────

    /// Bind a symbol. Rebinding to the same value returns the input state
    /// unchanged.
    pub fn put(&self, symbol: SymbolId, sv: SymbolicValue) -> Self {
        if self.values.get(&symbol) == Some(&sv) {
            return self.clone();
        }
        let mut next = self.clone();
        next.values.insert(symbol, sv);
        next
    }

    pub fn value_of(&self, symbol: SymbolId) -> Option<SymbolicValue> {
        self.values.get(&symbol).copied()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (SymbolId, SymbolicValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    // ── Constraints ──────────────────────────────────────────────────

    /// Meet a constraint into the value's set. `None` means the state
    /// became infeasible; an entailed constraint returns the input state.
    pub fn add_constraint(
        &self,
        sv: SymbolicValue,
        constraint: Constraint,
        domain: &ConstraintDomain,
    ) -> Option<Self> {
        let current = self.constraints.get(&sv).cloned().unwrap_or_default();
        let (merged, changed) = current.meet_with(constraint, domain)?;
        if !changed {
            return Some(self.clone());
        }
        let mut next = self.clone();
        next.constraints.insert(sv, merged);
        Some(next)
    }

    /// Overwrite the constraint of its kind without a meet; for freshly
    /// minted values whose fact is known by construction.
    pub fn set_single_constraint(&self, sv: SymbolicValue, constraint: Constraint) -> Self {
        let current = self.constraints.get(&sv).cloned().unwrap_or_default();
        let mut next = self.clone();
        next.constraints.insert(sv, current.with(constraint));
        next
    }

    pub fn constraints_of(&self, sv: SymbolicValue) -> Option<&Constraints> {
        self.constraints.get(&sv)
    }

    pub fn constraint(&self, sv: SymbolicValue, kind: ConstraintKind) -> Option<&Constraint> {
        self.constraints.get(&sv).and_then(|set| set.get(kind))
    }

    pub fn is_null(&self, sv: SymbolicValue) -> bool {
        self.constraint(sv, ConstraintKind::Nullness)
            .map(|c| c.is_null())
            .unwrap_or(false)
    }

    pub fn bool_constraint(&self, sv: SymbolicValue) -> Option<bool> {
        match self.constraint(sv, ConstraintKind::Boolean) {
            Some(Constraint::Boolean(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn constraint_entries(
        &self,
    ) -> impl Iterator<Item = (SymbolicValue, &Constraints)> + '_ {
        self.constraints.iter().map(|(k, v)| (*k, v))
    }

    pub fn constraints_size(&self) -> usize {
        self.constraints.len()
    }

    // ── Heap havoc & cleanup ─────────────────────────────────────────

    /// Forget every field binding: each one is rebound to a fresh value.
    /// Invoked on local calls and synchronized blocks.
    pub fn reset_field_values(&self, factory: &mut ValueFactory, symbols: &SymbolTable) -> Self {
        let mut next = self.clone();
        for (symbol, _) in self.values.iter() {
            if symbols.is_field(*symbol) {
                next.values.insert(*symbol, factory.fresh(ValueKind::Plain));
            }
        }
        next
    }

    /// Drop bindings whose symbol is outside the live set
    pub fn cleanup_dead_symbols(&self, live: &FxHashSet<SymbolId>) -> Self {
        let dead: Vec<SymbolId> = self
            .values
            .keys()
            .filter(|s| !live.contains(s))
            .copied()
            .collect();
        if dead.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        for symbol in dead {
            next.values.remove(&symbol);
        }
        next
    }

    /// Drop constraints on values no longer reachable from bindings or
    /// the stack. The singletons keep their intrinsic constraints, and
    /// entries carrying checker facts are path obligations that stay.
    pub fn cleanup_constraints(&self) -> Self {
        let mut referenced: FxHashSet<SymbolicValue> = FxHashSet::default();
        referenced.extend(self.values.values().copied());
        referenced.extend(self.stack.iter().copied());

        let stale: Vec<SymbolicValue> = self
            .constraints
            .iter()
            .filter(|(sv, set)| {
                !sv.is_singleton() && !referenced.contains(sv) && !set.has_checker_fact()
            })
            .map(|(sv, _)| *sv)
            .collect();
        if stale.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        for sv in stale {
            next.constraints.remove(&sv);
        }
        next
    }

    // ── Visit counts ─────────────────────────────────────────────────

    pub fn visited_point(&self, point: ProgramPoint, count: u32) -> Self {
        let mut next = self.clone();
        next.visited.insert(point, count);
        next
    }

    pub fn times_visited(&self, point: ProgramPoint) -> u32 {
        self.visited.get(&point).copied().unwrap_or(0)
    }
}

impl Default for ProgramState {
    fn default() -> Self {
        Self::new()
    }
}

/// Forgetful equality: bindings, constraints and the top of the stack.
impl PartialEq for ProgramState {
    fn eq(&self, other: &Self) -> bool {
        self.peek() == other.peek()
            && self.values == other.values
            && self.constraints == other.constraints
    }
}

impl Eq for ProgramState {}

fn hash_one<T: Hash>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Order-independent hash over the same fields equality uses.
impl Hash for ProgramState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut acc: u64 = 0;
        for entry in self.values.iter() {
            acc = acc.wrapping_add(hash_one(&entry));
        }
        for entry in self.constraints.iter() {
            acc = acc.wrapping_add(hash_one(&entry));
        }
        acc.hash(state);
        self.peek().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::cfg::BlockId;
    use crate::shared::models::symbol::SymbolInfo;

    fn fresh(factory: &mut ValueFactory) -> SymbolicValue {
        factory.fresh(ValueKind::Plain)
    }

    #[test]
    fn test_stack_discipline() {
        let mut factory = ValueFactory::new();
        let a = fresh(&mut factory);
        let b = fresh(&mut factory);

        let state = ProgramState::new().stack_value(a).stack_value(b);
        assert_eq!(state.peek(), Some(b));
        assert_eq!(state.peek_nth(1), Some(a));

        let (state, popped) = state.unstack(2);
        assert_eq!(popped, vec![b, a]);
        assert_eq!(state.peek(), None);
    }

    #[test]
    #[should_panic(expected = "popping 1 values")]
    fn test_unstack_underflow_panics() {
        ProgramState::new().unstack(1);
    }

    #[test]
    fn test_operations_do_not_mutate_input() {
        let mut factory = ValueFactory::new();
        let sv = fresh(&mut factory);
        let symbol = SymbolId(0);

        let state = ProgramState::new();
        let snapshot = state.clone();
        let _ = state.stack_value(sv);
        let _ = state.put(symbol, sv);
        let _ = state.set_single_constraint(sv, Constraint::NotNull);
        let _ = state.visited_point(ProgramPoint::new(BlockId(0), 0), 1);
        assert_eq!(state, snapshot);
        assert_eq!(state.times_visited(ProgramPoint::new(BlockId(0), 0)), 0);
    }

    #[test]
    fn test_rebinding_same_value_is_identity() {
        let mut factory = ValueFactory::new();
        let sv = fresh(&mut factory);
        let symbol = SymbolId(0);

        let state = ProgramState::new().put(symbol, sv);
        let again = state.put(symbol, sv);
        assert_eq!(state, again);
    }

    #[test]
    fn test_equality_ignores_consumed_operands_and_visits() {
        let mut factory = ValueFactory::new();
        let a = fresh(&mut factory);
        let b = fresh(&mut factory);
        let top = fresh(&mut factory);

        let s1 = ProgramState::new().stack_value(a).stack_value(top);
        let s2 = ProgramState::new().stack_value(b).stack_value(top);
        let s3 = s2.visited_point(ProgramPoint::new(BlockId(1), 4), 2);

        assert_eq!(s1, s2);
        assert_eq!(s1, s3);
        assert_eq!(hash_one(&s1), hash_one(&s3));
    }

    #[test]
    fn test_equality_sees_top_of_stack() {
        let mut factory = ValueFactory::new();
        let a = fresh(&mut factory);
        let b = fresh(&mut factory);

        let s1 = ProgramState::new().stack_value(a);
        let s2 = ProgramState::new().stack_value(b);
        assert_ne!(s1, s2);
    }

    #[test]
    fn test_add_constraint_idempotent_and_bottom() {
        let domain = ConstraintDomain::new();
        let mut factory = ValueFactory::new();
        let sv = fresh(&mut factory);

        let state = ProgramState::new()
            .add_constraint(sv, Constraint::NotNull, &domain)
            .unwrap();
        let same = state
            .add_constraint(sv, Constraint::NotNull, &domain)
            .unwrap();
        assert_eq!(state, same);

        assert!(state
            .add_constraint(sv, Constraint::Null { provenance: None }, &domain)
            .is_none());
    }

    #[test]
    fn test_singleton_constraints_are_intrinsic() {
        let state = ProgramState::new();
        assert!(state.is_null(SymbolicValue::NULL));
        assert_eq!(state.bool_constraint(SymbolicValue::TRUE), Some(true));
        assert_eq!(state.bool_constraint(SymbolicValue::FALSE), Some(false));
    }

    #[test]
    fn test_cleanup_dead_symbols() {
        let mut factory = ValueFactory::new();
        let a = fresh(&mut factory);
        let b = fresh(&mut factory);
        let live_symbol = SymbolId(0);
        let dead_symbol = SymbolId(1);

        let state = ProgramState::new()
            .put(live_symbol, a)
            .put(dead_symbol, b);
        let mut live = FxHashSet::default();
        live.insert(live_symbol);

        let cleaned = state.cleanup_dead_symbols(&live);
        assert_eq!(cleaned.value_of(live_symbol), Some(a));
        assert_eq!(cleaned.value_of(dead_symbol), None);
    }

    #[test]
    fn test_cleanup_constraints_drops_unreachable() {
        let domain = ConstraintDomain::new();
        let mut factory = ValueFactory::new();
        let bound = fresh(&mut factory);
        let stale = fresh(&mut factory);

        let state = ProgramState::new()
            .put(SymbolId(0), bound)
            .add_constraint(bound, Constraint::NotNull, &domain)
            .unwrap()
            .add_constraint(stale, Constraint::NotNull, &domain)
            .unwrap();

        let cleaned = state.cleanup_constraints();
        assert!(cleaned.constraints_of(bound).is_some());
        assert!(cleaned.constraints_of(stale).is_none());
        // intrinsic singleton facts survive
        assert!(cleaned.is_null(SymbolicValue::NULL));
    }

    #[test]
    fn test_cleanup_keeps_checker_obligations() {
        use crate::features::constraints::domain::CheckId;
        let mut factory = ValueFactory::new();
        let resource = fresh(&mut factory);

        let state = ProgramState::new().set_single_constraint(
            resource,
            Constraint::Checker {
                check: CheckId::UnclosedResources,
                value: 1,
                origin: None,
            },
        );
        let cleaned = state.cleanup_constraints();
        assert!(cleaned.constraints_of(resource).is_some());
    }

    #[test]
    fn test_reset_field_values() {
        let mut factory = ValueFactory::new();
        let mut symbols = SymbolTable::new();
        let field = symbols.declare(SymbolInfo::field("count", None));
        let local = symbols.declare(SymbolInfo::local("x", None));
        let fv = fresh(&mut factory);
        let lv = fresh(&mut factory);

        let state = ProgramState::new().put(field, fv).put(local, lv);
        let reset = state.reset_field_values(&mut factory, &symbols);

        assert_ne!(reset.value_of(field), Some(fv));
        assert_eq!(reset.value_of(local), Some(lv));
    }

    #[test]
    fn test_visit_counts() {
        let pp = ProgramPoint::new(BlockId(2), 1);
        let state = ProgramState::new();
        assert_eq!(state.times_visited(pp), 0);
        let state = state.visited_point(pp, 1);
        assert_eq!(state.times_visited(pp), 1);
        let state = state.visited_point(pp, 2);
        assert_eq!(state.times_visited(pp), 2);
    }
}
