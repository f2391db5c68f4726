/*
 * Invocation Yields
 *
 * A method yield bound to a concrete call site. Replaying one against the
 * caller's state unifies the yield's parameter constraints with the
 * caller's argument values (domain meet; bottom discards the yield),
 * stacks the result value and applies the recorded result constraints.
 */

use smallvec::SmallVec;

use crate::features::constraints::domain::{ConstraintDomain, Constraints};
use crate::features::program_state::state::ProgramState;
use crate::features::symbolic_values::value::SymbolicValue;

#[derive(Debug, Clone)]
pub struct InvocationYield {
    /// Caller-side argument values, in declaration order
    arguments: Vec<SymbolicValue>,
    /// Callee-side constraints required on each argument
    parameter_constraints: Vec<Option<Constraints>>,
    /// Value stacked in the caller: the call result, or a fresh exception
    /// value when the yield ended exceptionally
    result_value: SymbolicValue,
    result_constraints: Option<Constraints>,
    /// Argument indices the callee may dereference unconditionally
    potential_null_arguments: SmallVec<[usize; 2]>,
    method_name: String,
}

impl InvocationYield {
    pub fn new(
        arguments: Vec<SymbolicValue>,
        parameter_constraints: Vec<Option<Constraints>>,
        result_value: SymbolicValue,
        result_constraints: Option<Constraints>,
        potential_null_arguments: SmallVec<[usize; 2]>,
        method_name: String,
    ) -> Self {
        Self {
            arguments,
            parameter_constraints,
            result_value,
            result_constraints,
            potential_null_arguments,
            method_name,
        }
    }

    pub fn result_value(&self) -> SymbolicValue {
        self.result_value
    }

    /// Replay this yield against a caller state. `None` means the yield's
    /// parameter constraints are incompatible with the caller's facts.
    pub fn compatible_state(
        &self,
        state: &ProgramState,
        domain: &ConstraintDomain,
    ) -> Option<ProgramState> {
        let mut current = state.clone();
        for (argument, required) in self.arguments.iter().zip(&self.parameter_constraints) {
            if let Some(required) = required {
                for constraint in required.iter() {
                    current = current.add_constraint(*argument, constraint.clone(), domain)?;
                }
            }
        }
        current = current.stack_value(self.result_value);
        if let Some(result) = &self.result_constraints {
            for constraint in result.iter() {
                current = current.add_constraint(self.result_value, constraint.clone(), domain)?;
            }
        }
        Some(current)
    }

    /// Messages explaining why this yield rejected the caller state:
    /// arguments known to be null that the callee dereferences.
    pub fn no_yield_issues(&self, state: &ProgramState) -> Vec<String> {
        let mut messages = Vec::new();
        for &index in &self.potential_null_arguments {
            if let Some(argument) = self.arguments.get(index) {
                if state.is_null(*argument) {
                    messages.push(format!(
                        "\"NullPointerException\" might be thrown: argument {} can be null and is dereferenced in \"{}\"",
                        index + 1,
                        self.method_name
                    ));
                }
            }
        }
        messages
    }
}
