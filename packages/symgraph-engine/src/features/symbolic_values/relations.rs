/*
 * Relational Constraint Propagation
 *
 * `set_constraint` is the branching primitive behind `assume_dual`:
 * asserting a fact on a value propagates through the value's syntactic
 * kind to its operands and may split one state into several.
 *
 * Contract:
 * - idempotent: asserting an entailed fact returns the input state
 * - monotonic: asserting a contradiction returns no states
 * - bounded: a single assertion never fans out past the caller's budget
 *
 * The walker never sees this algebra; it just branches on whatever state
 * set comes back.
 */

use crate::errors::NestedStateOverflow;
use crate::features::constraints::domain::{Constraint, ConstraintDomain, ConstraintKind};
use crate::features::program_state::state::ProgramState;

use super::value::{SymbolicValue, ValueFactory, ValueKind};

/// Assert `constraint` on `sv` in `state`, returning every feasible
/// refinement. An empty vector means the assertion is infeasible.
pub fn set_constraint(
    factory: &ValueFactory,
    domain: &ConstraintDomain,
    budget: usize,
    state: &ProgramState,
    sv: SymbolicValue,
    constraint: Constraint,
) -> Result<Vec<ProgramState>, NestedStateOverflow> {
    let asserted = match &constraint {
        Constraint::Boolean(b) => Some(*b),
        _ => None,
    };
    let operands = factory.operands(sv);

    match (factory.kind(sv), asserted) {
        (ValueKind::Not, Some(b)) => {
            let operand = unary_operand(sv, operands);
            set_constraint(factory, domain, budget, state, operand, Constraint::Boolean(!b))
        }
        (ValueKind::Equal, Some(b)) => {
            let (left, right) = binary_operands(sv, operands);
            assert_equality(factory, domain, budget, state, left, right, b)
        }
        (ValueKind::NotEqual, Some(b)) => {
            let (left, right) = binary_operands(sv, operands);
            assert_equality(factory, domain, budget, state, left, right, !b)
        }
        (ValueKind::And, Some(true)) => {
            let (left, right) = binary_operands(sv, operands);
            combine(factory, domain, budget, state, left, right, &[(true, true)])
        }
        (ValueKind::And, Some(false)) => {
            let (left, right) = binary_operands(sv, operands);
            combine(
                factory,
                domain,
                budget,
                state,
                left,
                right,
                &[(false, false), (false, true), (true, false)],
            )
        }
        (ValueKind::Or, Some(false)) => {
            let (left, right) = binary_operands(sv, operands);
            combine(factory, domain, budget, state, left, right, &[(false, false)])
        }
        (ValueKind::Or, Some(true)) => {
            let (left, right) = binary_operands(sv, operands);
            combine(
                factory,
                domain,
                budget,
                state,
                left,
                right,
                &[(true, true), (true, false), (false, true)],
            )
        }
        (ValueKind::Xor, Some(b)) => {
            let (left, right) = binary_operands(sv, operands);
            let pairs: &[(bool, bool)] = if b {
                &[(true, false), (false, true)]
            } else {
                &[(true, true), (false, false)]
            };
            combine(factory, domain, budget, state, left, right, pairs)
        }
        (ValueKind::InstanceOf, Some(true)) => {
            // a successful instanceof proves the operand non-null
            let operand = unary_operand(sv, operands);
            let mut out = Vec::new();
            for s in set_plain(domain, state, sv, constraint) {
                out.extend(set_constraint(
                    factory,
                    domain,
                    budget,
                    &s,
                    operand,
                    Constraint::NotNull,
                )?);
            }
            Ok(out)
        }
        _ => Ok(set_plain(domain, state, sv, constraint)),
    }
}

/// Non-propagating assertion: meet into the value's own constraint set
fn set_plain(
    domain: &ConstraintDomain,
    state: &ProgramState,
    sv: SymbolicValue,
    constraint: Constraint,
) -> Vec<ProgramState> {
    match state.add_constraint(sv, constraint, domain) {
        Some(next) => vec![next],
        None => Vec::new(),
    }
}

/// Assert that `left` and `right` are equal (`holds`) or distinct.
fn assert_equality(
    factory: &ValueFactory,
    domain: &ConstraintDomain,
    budget: usize,
    state: &ProgramState,
    left: SymbolicValue,
    right: SymbolicValue,
    holds: bool,
) -> Result<Vec<ProgramState>, NestedStateOverflow> {
    if left == right {
        // x == x is a tautology; its negation is infeasible
        return Ok(if holds { vec![state.clone()] } else { Vec::new() });
    }

    if holds {
        let mut states = vec![state.clone()];
        for kind in [ConstraintKind::Nullness, ConstraintKind::Boolean] {
            let l = state.constraint(left, kind).cloned();
            let r = state.constraint(right, kind).cloned();
            match (l, r) {
                (Some(a), Some(b)) => {
                    if domain.meet(&a, &b).is_none() {
                        return Ok(Vec::new());
                    }
                }
                (Some(a), None) => {
                    states = transfer(factory, domain, budget, states, right, a)?;
                }
                (None, Some(b)) => {
                    states = transfer(factory, domain, budget, states, left, b)?;
                }
                (None, None) => {}
            }
        }
        Ok(states)
    } else {
        let l_null = state.constraint(left, ConstraintKind::Nullness).cloned();
        let r_null = state.constraint(right, ConstraintKind::Nullness).cloned();
        match (&l_null, &r_null) {
            (Some(a), Some(b)) if a.is_null() && b.is_null() => return Ok(Vec::new()),
            _ => {}
        }
        // two equal boolean facts contradict an inequality
        if let (Some(a), Some(b)) = (state.bool_constraint(left), state.bool_constraint(right)) {
            if a == b {
                return Ok(Vec::new());
            }
        }

        let mut states = vec![state.clone()];
        if l_null.as_ref().map(|c| c.is_null()).unwrap_or(false) && r_null.is_none() {
            states = transfer(factory, domain, budget, states, right, Constraint::NotNull)?;
        }
        if r_null.as_ref().map(|c| c.is_null()).unwrap_or(false) && l_null.is_none() {
            states = transfer(factory, domain, budget, states, left, Constraint::NotNull)?;
        }
        Ok(states)
    }
}

/// Apply one transferred constraint across every pending state
fn transfer(
    factory: &ValueFactory,
    domain: &ConstraintDomain,
    budget: usize,
    states: Vec<ProgramState>,
    target: SymbolicValue,
    constraint: Constraint,
) -> Result<Vec<ProgramState>, NestedStateOverflow> {
    let mut out = Vec::new();
    for s in &states {
        out.extend(set_constraint(
            factory,
            domain,
            budget,
            s,
            target,
            constraint.clone(),
        )?);
        if out.len() > budget {
            return Err(NestedStateOverflow);
        }
    }
    Ok(out)
}

/// Assert the given truth-value pairs on the two operands of a
/// non-shortcircuit boolean operator; each feasible pair yields states.
fn combine(
    factory: &ValueFactory,
    domain: &ConstraintDomain,
    budget: usize,
    state: &ProgramState,
    left: SymbolicValue,
    right: SymbolicValue,
    pairs: &[(bool, bool)],
) -> Result<Vec<ProgramState>, NestedStateOverflow> {
    let mut out = Vec::new();
    for &(l, r) in pairs {
        let firsts = set_constraint(factory, domain, budget, state, left, Constraint::Boolean(l))?;
        for s in &firsts {
            out.extend(set_constraint(
                factory,
                domain,
                budget,
                s,
                right,
                Constraint::Boolean(r),
            )?);
            if out.len() > budget {
                return Err(NestedStateOverflow);
            }
        }
    }
    Ok(out)
}

fn unary_operand(sv: SymbolicValue, operands: &[SymbolicValue]) -> SymbolicValue {
    assert!(
        !operands.is_empty(),
        "relational value {:?} has no recorded operand",
        sv
    );
    operands[0]
}

fn binary_operands(sv: SymbolicValue, operands: &[SymbolicValue]) -> (SymbolicValue, SymbolicValue) {
    assert!(
        operands.len() >= 2,
        "relational value {:?} has {} recorded operands, expected 2",
        sv,
        operands.len()
    );
    (operands[0], operands[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (ValueFactory, ConstraintDomain, ProgramState) {
        (ValueFactory::new(), ConstraintDomain::new(), ProgramState::new())
    }

    const BUDGET: usize = 10_000;

    #[test]
    fn test_plain_assertion_idempotent() {
        let (mut factory, domain, state) = setup();
        let sv = factory.fresh(ValueKind::Plain);

        let once =
            set_constraint(&factory, &domain, BUDGET, &state, sv, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(once.len(), 1);
        let twice =
            set_constraint(&factory, &domain, BUDGET, &once[0], sv, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_plain_contradiction_is_infeasible() {
        let (mut factory, domain, state) = setup();
        let sv = factory.fresh(ValueKind::Plain);

        let asserted =
            set_constraint(&factory, &domain, BUDGET, &state, sv, Constraint::Boolean(true))
                .unwrap();
        let refuted = set_constraint(
            &factory,
            &domain,
            BUDGET,
            &asserted[0],
            sv,
            Constraint::Boolean(false),
        )
        .unwrap();
        assert!(refuted.is_empty());
    }

    #[test]
    fn test_not_inverts() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let not = factory.fresh(ValueKind::Not);
        factory.computed_from(not, &[a]);

        let states =
            set_constraint(&factory, &domain, BUDGET, &state, not, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].bool_constraint(a), Some(false));
    }

    #[test]
    fn test_self_equality_tautology() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let eq = factory.fresh(ValueKind::Equal);
        factory.computed_from(eq, &[a, a]);

        let truthy =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(truthy.len(), 1);
        let falsy =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::Boolean(false))
                .unwrap();
        assert!(falsy.is_empty());
    }

    #[test]
    fn test_equality_transfers_nullness() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let eq = factory.fresh(ValueKind::Equal);
        factory.computed_from(eq, &[SymbolicValue::NULL, a]);

        // a == null assumed true: a becomes null
        let truthy =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(truthy.len(), 1);
        assert!(truthy[0].is_null(a));

        // a == null assumed false: a becomes non-null
        let falsy =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::Boolean(false))
                .unwrap();
        assert_eq!(falsy.len(), 1);
        assert!(!falsy[0].is_null(a));
        assert_eq!(
            falsy[0].constraint(a, ConstraintKind::Nullness),
            Some(&Constraint::NotNull)
        );
    }

    #[test]
    fn test_equality_of_two_nulls_cannot_be_false() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let state = state
            .add_constraint(a, Constraint::Null { provenance: None }, &domain)
            .unwrap();
        let eq = factory.fresh(ValueKind::Equal);
        factory.computed_from(eq, &[SymbolicValue::NULL, a]);

        let falsy =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::Boolean(false))
                .unwrap();
        assert!(falsy.is_empty());
    }

    #[test]
    fn test_conflicting_operand_facts_make_equality_infeasible() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let b = factory.fresh(ValueKind::Plain);
        let state = state
            .add_constraint(a, Constraint::Null { provenance: None }, &domain)
            .unwrap()
            .add_constraint(b, Constraint::NotNull, &domain)
            .unwrap();
        let eq = factory.fresh(ValueKind::Equal);
        factory.computed_from(eq, &[a, b]);

        let truthy =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::Boolean(true))
                .unwrap();
        assert!(truthy.is_empty());
    }

    #[test]
    fn test_and_false_fans_out() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let b = factory.fresh(ValueKind::Plain);
        let and = factory.fresh(ValueKind::And);
        factory.computed_from(and, &[a, b]);

        let falsy =
            set_constraint(&factory, &domain, BUDGET, &state, and, Constraint::Boolean(false))
                .unwrap();
        assert_eq!(falsy.len(), 3);
        let truthy =
            set_constraint(&factory, &domain, BUDGET, &state, and, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(truthy.len(), 1);
        assert_eq!(truthy[0].bool_constraint(a), Some(true));
        assert_eq!(truthy[0].bool_constraint(b), Some(true));
    }

    #[test]
    fn test_fan_out_respects_budget() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let b = factory.fresh(ValueKind::Plain);
        let and = factory.fresh(ValueKind::And);
        factory.computed_from(and, &[a, b]);

        let result =
            set_constraint(&factory, &domain, 2, &state, and, Constraint::Boolean(false));
        assert_eq!(result, Err(NestedStateOverflow));
    }

    #[test]
    fn test_instanceof_true_implies_not_null() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let inst = factory.fresh(ValueKind::InstanceOf);
        factory.computed_from(inst, &[a]);

        let truthy =
            set_constraint(&factory, &domain, BUDGET, &state, inst, Constraint::Boolean(true))
                .unwrap();
        assert_eq!(truthy.len(), 1);
        assert_eq!(
            truthy[0].constraint(a, ConstraintKind::Nullness),
            Some(&Constraint::NotNull)
        );
    }

    #[test]
    fn test_nullness_assertion_on_relational_value_stays_plain() {
        let (mut factory, domain, state) = setup();
        let a = factory.fresh(ValueKind::Plain);
        let eq = factory.fresh(ValueKind::Equal);
        factory.computed_from(eq, &[a, a]);

        let states =
            set_constraint(&factory, &domain, BUDGET, &state, eq, Constraint::NotNull).unwrap();
        assert_eq!(states.len(), 1);
        // the operand picked up nothing
        assert!(states[0].constraints_of(a).is_none());
    }
}
