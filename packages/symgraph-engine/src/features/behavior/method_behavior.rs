/*
 * Method Behavior
 *
 * Per-method summary built while the walker explores: the parameter
 * symbols with the values they were bound to at entry, plus one yield per
 * completed path. Yields are the replayable interface other methods use
 * at call sites.
 *
 * A yield whose result is a symbolic exception value records the thrown
 * type; replaying it re-raises the exception in the caller.
 */

use rustc_hash::FxHashSet;

use crate::features::constraints::domain::Constraints;
use crate::features::constraints::manager::ConstraintManager;
use crate::features::program_state::state::ProgramState;
use crate::features::symbolic_values::value::SymbolicValue;
use crate::shared::models::symbol::{SymbolId, TypeId};
use crate::shared::models::tree::TreeId;

use super::invocation::InvocationYield;

/// One completed exploration path, projected onto the method's interface
#[derive(Debug, Clone, PartialEq)]
pub struct MethodYield {
    /// Constraints observed on each entry parameter value at path end
    pub parameter_constraints: Vec<Option<Constraints>>,
    /// Constraints on the result value; `None` for void yields
    pub result_constraints: Option<Constraints>,
    /// Thrown exception type when the path ended exceptionally
    pub thrown: Option<TypeId>,
    pub is_void: bool,
}

#[derive(Debug)]
pub struct MethodBehavior {
    method: SymbolId,
    is_constructor: bool,
    is_void: bool,
    parameters: Vec<(SymbolId, SymbolicValue)>,
    yields: Vec<MethodYield>,
    /// Parameter indices the method may dereference without a null check
    potential_null_dereferences: FxHashSet<usize>,
    complete: bool,
}

impl MethodBehavior {
    pub fn new(method: SymbolId, is_constructor: bool, is_void: bool) -> Self {
        Self {
            method,
            is_constructor,
            is_void,
            parameters: Vec::new(),
            yields: Vec::new(),
            potential_null_dereferences: FxHashSet::default(),
            complete: false,
        }
    }

    pub fn method(&self) -> SymbolId {
        self.method
    }

    pub fn is_constructor(&self) -> bool {
        self.is_constructor
    }

    pub fn is_void(&self) -> bool {
        self.is_void
    }

    pub fn add_parameter(&mut self, symbol: SymbolId, sv: SymbolicValue) {
        self.parameters.push((symbol, sv));
    }

    pub fn parameters(&self) -> &[(SymbolId, SymbolicValue)] {
        &self.parameters
    }

    /// The symbols cleanup must never drop: the method's interface
    pub fn interface_symbols(&self) -> FxHashSet<SymbolId> {
        self.parameters.iter().map(|(s, _)| *s).collect()
    }

    /// Record a valued (or exceptional) yield from a finished path. The
    /// path's result is the top of the stack. Structurally equal yields
    /// are recorded once.
    pub fn add_yield(&mut self, state: &ProgramState, manager: &ConstraintManager) {
        let result = state.peek();
        let y = MethodYield {
            parameter_constraints: self.project_parameters(state),
            result_constraints: result.map(|sv| {
                state.constraints_of(sv).cloned().unwrap_or_default()
            }),
            thrown: result.and_then(|sv| manager.thrown_type(sv)),
            is_void: false,
        };
        self.push_yield(y);
    }

    /// Record a yield for a path that returns no value
    pub fn add_void_yield(&mut self, state: &ProgramState) {
        let y = MethodYield {
            parameter_constraints: self.project_parameters(state),
            result_constraints: None,
            thrown: None,
            is_void: true,
        };
        self.push_yield(y);
    }

    fn project_parameters(&self, state: &ProgramState) -> Vec<Option<Constraints>> {
        self.parameters
            .iter()
            .map(|(_, sv)| state.constraints_of(*sv).cloned())
            .collect()
    }

    fn push_yield(&mut self, y: MethodYield) {
        if !self.yields.contains(&y) {
            self.yields.push(y);
        }
    }

    pub fn yields(&self) -> &[MethodYield] {
        &self.yields
    }

    /// Called by checkers when `value` is dereferenced without a known
    /// nullness; only parameter values are remembered.
    pub fn notify_potential_null_pointer(&mut self, value: SymbolicValue, _tree: TreeId) {
        if let Some(index) = self.parameters.iter().position(|(_, sv)| *sv == value) {
            self.potential_null_dereferences.insert(index);
        }
    }

    pub fn potential_null_dereferences(&self) -> &FxHashSet<usize> {
        &self.potential_null_dereferences
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Turn the recorded yields into replayable invocation yields bound
    /// to the caller's argument values. `result` is the value the caller
    /// stacks for a normal completion; exceptional yields replace it with
    /// a freshly minted exception value.
    pub fn invocation_yields(
        &self,
        arguments: &[SymbolicValue],
        result: SymbolicValue,
        manager: &mut ConstraintManager,
        method_name: &str,
    ) -> Vec<InvocationYield> {
        self.yields
            .iter()
            .map(|y| {
                let result_value = match y.thrown {
                    Some(thrown) => manager.create_exception_value(thrown),
                    None => result,
                };
                InvocationYield::new(
                    arguments.to_vec(),
                    y.parameter_constraints.clone(),
                    result_value,
                    if y.is_void { None } else { y.result_constraints.clone() },
                    self.potential_null_dereferences.iter().copied().collect(),
                    method_name.to_string(),
                )
            })
            .collect()
    }
}
