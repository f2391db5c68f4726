/*
 * Constraint Manager
 *
 * Mints symbolic values for syntax nodes, owns the constraint domain, and
 * implements `assume_dual`: splitting a state by asserting the top-of-
 * stack condition false in one branch and true in the other.
 *
 * Splitting lives here rather than in the walker so the walker's branch
 * handler stays uniform and checker-registered constraint kinds branch
 * through the same primitive.
 */

use crate::config::ExecutionLimits;
use crate::errors::NestedStateOverflow;
use crate::features::program_state::state::ProgramState;
use crate::features::symbolic_values::relations;
use crate::features::symbolic_values::value::{SymbolicValue, ValueFactory, ValueKind};
use crate::shared::models::symbol::TypeId;
use crate::shared::models::tree::{BinaryOperator, TreeArena, TreeId, TreeKind, UnaryOperator};

use super::domain::{Constraint, ConstraintDomain};

pub struct ConstraintManager {
    factory: ValueFactory,
    domain: ConstraintDomain,
    max_nested_boolean_states: usize,
}

impl ConstraintManager {
    pub fn new(limits: &ExecutionLimits) -> Self {
        Self {
            factory: ValueFactory::new(),
            domain: ConstraintDomain::new(),
            max_nested_boolean_states: limits.max_nested_boolean_states,
        }
    }

    pub fn domain(&self) -> &ConstraintDomain {
        &self.domain
    }

    pub fn domain_mut(&mut self) -> &mut ConstraintDomain {
        &mut self.domain
    }

    /// Mutable access to the value factory, for state operations that
    /// mint replacement values (field havocking).
    pub fn factory_mut(&mut self) -> &mut ValueFactory {
        &mut self.factory
    }

    /// Mint the value for a syntax node. Relational node kinds get
    /// pre-wired value kinds so later assertions propagate to operands.
    pub fn create_value(&mut self, arena: &TreeArena, tree: TreeId) -> SymbolicValue {
        let kind = match arena.kind(tree) {
            TreeKind::Binary { op: BinaryOperator::Equal } => ValueKind::Equal,
            TreeKind::Binary { op: BinaryOperator::NotEqual } => ValueKind::NotEqual,
            TreeKind::Binary { op: BinaryOperator::And } => ValueKind::And,
            TreeKind::Binary { op: BinaryOperator::Or } => ValueKind::Or,
            TreeKind::Binary { op: BinaryOperator::Xor } => ValueKind::Xor,
            TreeKind::Unary { op: UnaryOperator::LogicalComplement } => ValueKind::Not,
            TreeKind::Unary { op: UnaryOperator::InstanceOf } => ValueKind::InstanceOf,
            TreeKind::MethodInvocation { .. } => ValueKind::MethodResult,
            _ => ValueKind::Plain,
        };
        self.factory.fresh(kind)
    }

    /// Mint a plain value with no syntactic anchor
    pub fn create_plain_value(&mut self) -> SymbolicValue {
        self.factory.fresh(ValueKind::Plain)
    }

    /// Mint the value standing for a thrown exception of the given type
    pub fn create_exception_value(&mut self, thrown: TypeId) -> SymbolicValue {
        self.factory.fresh(ValueKind::Exception(thrown))
    }

    /// Record operand provenance for a freshly minted value
    pub fn computed_from(&mut self, sv: SymbolicValue, operands: &[SymbolicValue]) {
        self.factory.computed_from(sv, operands);
    }

    pub fn is_exception(&self, sv: SymbolicValue) -> bool {
        self.factory.is_exception(sv)
    }

    pub fn thrown_type(&self, sv: SymbolicValue) -> Option<TypeId> {
        self.factory.thrown_type(sv)
    }

    /// Assert a constraint on a value; see `relations::set_constraint`
    pub fn set_constraint(
        &self,
        state: &ProgramState,
        sv: SymbolicValue,
        constraint: Constraint,
    ) -> Result<Vec<ProgramState>, NestedStateOverflow> {
        relations::set_constraint(
            &self.factory,
            &self.domain,
            self.max_nested_boolean_states,
            state,
            sv,
            constraint,
        )
    }

    /// Pop the condition off the stack and split the state: the first
    /// list asserts it false, the second asserts it true. Either side may
    /// be empty when that branch is infeasible.
    pub fn assume_dual(
        &self,
        state: ProgramState,
    ) -> Result<(Vec<ProgramState>, Vec<ProgramState>), NestedStateOverflow> {
        let (state, values) = state.unstack(1);
        let condition = values[0];
        let false_states = self.set_constraint(&state, condition, Constraint::Boolean(false))?;
        let true_states = self.set_constraint(&state, condition, Constraint::Boolean(true))?;
        Ok((false_states, true_states))
    }
}
