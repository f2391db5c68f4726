/*
 * Exploded-Graph Walker
 *
 * Worklist-driven exploration of one method's CFG. Each step pops a node
 * (program point, state, exit-path flag), interprets the element or
 * terminator at that point, notifies the checker pipeline, and enqueues
 * the successor points. Conditional terminators split the state through
 * `assume_dual`; exceptional values route through the exception flow.
 *
 * Termination is enforced by the step budget, the per-point visit bound
 * (which is what tames loops), and the oversize guard on constraint maps.
 *
 * Operand-order conventions the CFG provider must follow:
 * - assignments stack the assigned expression, then the variable
 * - invocations stack the method select, then the arguments in order
 */

use tracing::debug;

use crate::config::ExecutionLimits;
use crate::errors::EngineError;
use crate::features::behavior::invocation::InvocationYield;
use crate::features::behavior::method_behavior::MethodBehavior;
use crate::features::behavior::registry::BehaviorRegistry;
use crate::features::checks::dispatcher::CheckerPipeline;
use crate::features::checks::ports::PathOutcome;
use crate::features::constraints::domain::{CheckId, Constraint};
use crate::features::constraints::manager::ConstraintManager;
use crate::features::program_state::state::ProgramState;
use crate::features::symbolic_values::value::SymbolicValue;
use crate::shared::models::cfg::{Block, BlockId, ProgramPoint, TerminatorKind};
use crate::shared::models::method::MethodContext;
use crate::shared::models::symbol::{
    MethodMatcher, SymbolId, CHECK_FOR_NULL_ANNOTATION, NONNULL_ANNOTATION, NULLABLE_ANNOTATION,
};
use crate::shared::models::tree::{
    BinaryOperator, InvocationReceiver, LiteralKind, TreeId, TreeKind,
};

use super::exception::ExceptionFlow;
use super::exploded_graph::{ExplodedGraph, NodeId};

const SYSTEM_EXIT: MethodMatcher = MethodMatcher::new("java.lang.System", "exit");
const OBJECT_WAIT: MethodMatcher = MethodMatcher::new("java.lang.Object", "wait");

pub struct ExplodedGraphWalker<'a> {
    method: &'a MethodContext<'a>,
    registry: &'a BehaviorRegistry,
    limits: ExecutionLimits,
    cleanup: bool,
    manager: ConstraintManager,
    graph: ExplodedGraph,
    worklist: Vec<NodeId>,
    state: ProgramState,
    position: ProgramPoint,
    on_exit_path: bool,
    behavior: MethodBehavior,
    steps: usize,
}

impl<'a> ExplodedGraphWalker<'a> {
    pub fn new(
        method: &'a MethodContext<'a>,
        registry: &'a BehaviorRegistry,
        limits: ExecutionLimits,
    ) -> Self {
        let behavior = MethodBehavior::new(
            method.method,
            method.is_constructor(),
            method.returns_void(),
        );
        Self {
            method,
            registry,
            limits,
            cleanup: true,
            manager: ConstraintManager::new(&limits),
            graph: ExplodedGraph::new(),
            worklist: Vec::new(),
            state: ProgramState::new(),
            position: ProgramPoint::new(method.cfg.entry(), 0),
            on_exit_path: false,
            behavior,
            steps: 0,
        }
    }

    /// Disable dead-symbol/constraint cleanup; exploration is slower but
    /// observationally identical. Exists for differential testing.
    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn into_behavior(self) -> MethodBehavior {
        self.behavior
    }

    /// Explore the method to completion or to a bound. On a bound the
    /// checkers see `interrupted_execution` and the error is returned;
    /// the behavior's yields are not to be trusted afterwards.
    pub fn execute(&mut self, checks: &mut CheckerPipeline) -> Result<(), EngineError> {
        debug!(method = self.method.name(), "exploring exploded graph");
        checks.init(self.method, &mut self.manager);
        self.steps = 0;
        let outcome = self.run(checks);
        match &outcome {
            Ok(()) => checks.end_of_execution(self.method),
            Err(err) => {
                debug!(method = self.method.name(), error = %err, "analysis interrupted");
                checks.interrupted_execution(self.method);
            }
        }
        self.release();
        outcome
    }

    fn run(&mut self, checks: &mut CheckerPipeline) -> Result<(), EngineError> {
        let entry = ProgramPoint::new(self.method.cfg.entry(), 0);
        for starting in self.starting_states()? {
            self.enqueue(entry, starting, false)?;
        }
        while let Some(node_id) = self.worklist.pop() {
            self.steps += 1;
            if self.steps > self.limits.max_steps {
                return Err(EngineError::MaxStepsReached {
                    method: self.method.name().to_string(),
                    max_steps: self.limits.max_steps,
                });
            }
            let node = self.graph.get(node_id).clone();
            self.position = node.point;
            self.state = node.state;
            self.on_exit_path = node.exit_path;

            let block = self.method.cfg.block(self.position.block);
            if block.successors.is_empty() {
                self.handle_end_of_execution_path(checks);
                debug!("end of potential path reached");
                continue;
            }
            if self.position.index < block.elements.len() {
                self.interpret(checks, block, block.elements[self.position.index])?;
            } else if block.terminator.is_none() {
                self.handle_block_exit(checks, block)?;
            } else if self.position.index == block.elements.len() {
                // terminator post pass; the pre pass and the exit run on
                // the next dequeue of this block
                let terminator = block.terminator.expect("checked above");
                checks.post_statement(
                    &mut self.state,
                    &mut self.manager,
                    &mut self.behavior,
                    self.method,
                    terminator.tree,
                );
                self.advance(block)?;
            } else {
                let terminator = block.terminator.expect("checked above");
                // the sink outcome does not apply to terminators
                let _ = checks.pre_statement(
                    &mut self.state,
                    &mut self.manager,
                    &mut self.behavior,
                    self.method,
                    terminator.tree,
                );
                self.handle_block_exit(checks, block)?;
            }
        }
        Ok(())
    }

    /// One state per parameter-nullness combination. Parameters annotated
    /// non-null start constrained; nullable (or `equals`) parameters
    /// split the start into a null and a non-null world.
    fn starting_states(&mut self) -> Result<Vec<ProgramState>, EngineError> {
        let mut states = vec![ProgramState::new()];
        let split_all = self.method.is_equals_method();
        for parameter in self.method.parameters {
            let sv = self.manager.create_value(self.method.arena, parameter.tree);
            self.behavior.add_parameter(parameter.symbol, sv);
            states = states
                .into_iter()
                .map(|s| s.put(parameter.symbol, sv))
                .collect();

            let symbols = self.method.symbols;
            if symbols.has_annotation(parameter.symbol, NONNULL_ANNOTATION) {
                states = states
                    .into_iter()
                    .map(|s| s.set_single_constraint(sv, Constraint::NotNull))
                    .collect();
            }
            let nullable = symbols.has_annotation(parameter.symbol, NULLABLE_ANNOTATION)
                || symbols.has_annotation(parameter.symbol, CHECK_FOR_NULL_ANNOTATION);
            if split_all || nullable {
                let mut split = Vec::new();
                for s in &states {
                    split.extend(
                        self.manager
                            .set_constraint(
                                s,
                                sv,
                                Constraint::Null {
                                    provenance: Some(parameter.tree),
                                },
                            )
                            .map_err(|_| self.overflow_error())?,
                    );
                    split.extend(
                        self.manager
                            .set_constraint(s, sv, Constraint::NotNull)
                            .map_err(|_| self.overflow_error())?,
                    );
                }
                states = split;
            }
        }
        Ok(states)
    }

    fn handle_end_of_execution_path(&mut self, checks: &mut CheckerPipeline) {
        checks.end_of_execution_path(
            &mut self.state,
            &mut self.manager,
            &mut self.behavior,
            self.method,
        );
        if self.behavior.is_constructor() {
            let sv = self.manager.create_plain_value();
            let state = self
                .state
                .stack_value(sv)
                .set_single_constraint(sv, Constraint::NotNull);
            self.behavior.add_yield(&state, &self.manager);
        } else if self.behavior.is_void() {
            let state = self.state.stack_value(SymbolicValue::NULL);
            self.behavior.add_yield(&state, &self.manager);
        }
    }

    fn cleanup_state(&mut self, block: BlockId) {
        if !self.cleanup {
            return;
        }
        let mut live = self.behavior.interface_symbols();
        live.extend(self.method.live.live_out(block).iter().copied());
        self.state = self.state.cleanup_dead_symbols(&live);
        self.state = self.state.cleanup_constraints();
    }

    fn handle_block_exit(
        &mut self,
        checks: &mut CheckerPipeline,
        block: &Block,
    ) -> Result<(), EngineError> {
        self.cleanup_state(self.position.block);
        if let Some(terminator) = block.terminator {
            match terminator.kind {
                TerminatorKind::If { condition } => {
                    return self.handle_branch(checks, block, self.cleanup_condition(condition), true);
                }
                TerminatorKind::ConditionalAnd { left }
                | TerminatorKind::ConditionalOr { left } => {
                    return self.handle_branch(checks, block, left, true);
                }
                TerminatorKind::ConditionalExpression { condition } => {
                    return self.handle_branch(checks, block, condition, true);
                }
                TerminatorKind::For {
                    condition: Some(condition),
                } => {
                    // feasibility reporting is off for for-loop conditions
                    return self.handle_branch(checks, block, condition, false);
                }
                TerminatorKind::While { condition } | TerminatorKind::DoWhile { condition } => {
                    let check_path = !self.method.arena.is_boolean_literal(condition);
                    return self.handle_branch(
                        checks,
                        block,
                        self.cleanup_condition(condition),
                        check_path,
                    );
                }
                TerminatorKind::Synchronized => {
                    self.reset_field_values();
                }
                TerminatorKind::Return { with_expression } => {
                    let mut state = self.state.clone();
                    if self.behavior.is_constructor() {
                        let sv = self.manager.create_value(self.method.arena, terminator.tree);
                        state = state.stack_value(sv);
                    }
                    if with_expression {
                        self.behavior.add_yield(&state, &self.manager);
                    } else {
                        self.behavior.add_void_yield(&state);
                    }
                }
                TerminatorKind::Throw { exception } => {
                    let (state, _thrown_operand) = self.state.unstack(1);
                    let sv = self.manager.create_exception_value(exception);
                    let state = state.stack_value(sv);
                    self.behavior.add_yield(&state, &self.manager);
                }
                TerminatorKind::For { condition: None }
                | TerminatorKind::ForEach
                | TerminatorKind::Switch
                | TerminatorKind::Break
                | TerminatorKind::Continue => {}
            }
        }

        // unconditional continuation
        if self.on_exit_path {
            if let Some(exit) = block.exit_successor {
                self.enqueue(ProgramPoint::new(exit, 0), self.state.clone(), true)?;
            } else {
                for &successor in &block.successors {
                    self.enqueue(ProgramPoint::new(successor, 0), self.state.clone(), true)?;
                }
            }
        } else {
            for &successor in &block.successors {
                if !block.is_finally || self.is_direct_flow_successor(block, successor) {
                    self.enqueue(
                        ProgramPoint::new(successor, 0),
                        self.state.clone(),
                        Some(successor) == block.exit_successor,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// A finally block conceptually continues several suspended controls;
    /// only the direct-flow route is enqueued on the normal path.
    fn is_direct_flow_successor(&self, block: &Block, successor: BlockId) -> bool {
        Some(successor) != block.exit_successor
            || self.method.cfg.block(successor).is_method_exit
    }

    /// For `a && b` / `a || b` conditions the reportable condition is the
    /// right operand, the one actually deciding this branch.
    fn cleanup_condition(&self, condition: TreeId) -> TreeId {
        match self.method.arena.kind(condition) {
            TreeKind::Binary {
                op: BinaryOperator::ConditionalAnd | BinaryOperator::ConditionalOr,
            } => self
                .method
                .arena
                .children(condition)
                .last()
                .copied()
                .unwrap_or(condition),
            _ => condition,
        }
    }

    fn handle_branch(
        &mut self,
        checks: &mut CheckerPipeline,
        block: &Block,
        condition: TreeId,
        check_path: bool,
    ) -> Result<(), EngineError> {
        let (false_states, true_states) = self
            .manager
            .assume_dual(self.state.clone())
            .map_err(|_| self.overflow_error())?;

        for state in false_states {
            let successor = block
                .false_successor
                .expect("conditional terminator without a false successor");
            let state = state.stack_value(SymbolicValue::FALSE);
            self.enqueue(ProgramPoint::new(successor, 0), state, self.on_exit_path)?;
            if check_path {
                checks.condition_check().evaluated_to_false(condition);
            }
        }
        for state in true_states {
            let successor = block
                .true_successor
                .expect("conditional terminator without a true successor");
            let state = state.stack_value(SymbolicValue::TRUE);
            self.enqueue(ProgramPoint::new(successor, 0), state, self.on_exit_path)?;
            if check_path {
                checks.condition_check().evaluated_to_true(condition);
            }
        }
        Ok(())
    }

    fn interpret(
        &mut self,
        checks: &mut CheckerPipeline,
        block: &Block,
        tree: TreeId,
    ) -> Result<(), EngineError> {
        let outcome = checks.pre_statement(
            &mut self.state,
            &mut self.manager,
            &mut self.behavior,
            self.method,
            tree,
        );
        if outcome == PathOutcome::Sink {
            // a checker ended the path here; model it as a null failure
            let npe = self.method.types.well_known().null_pointer_exception;
            let sv = self.manager.create_exception_value(npe);
            let state = self.state.stack_value(sv);
            self.behavior.add_yield(&state, &self.manager);
            return Ok(());
        }

        match self.method.arena.kind(tree) {
            TreeKind::MethodInvocation {
                method,
                arguments,
                receiver,
                ..
            } => {
                if let Some(m) = method {
                    if SYSTEM_EXIT.matches(*m, self.method.symbols, self.method.types) {
                        // execution sink; the path ends here
                        return Ok(());
                    }
                }
                let results =
                    self.execute_method_invocation(checks, tree, *method, *arguments, *receiver)?;
                for state in results {
                    self.state = state;
                    checks.post_statement(
                        &mut self.state,
                        &mut self.manager,
                        &mut self.behavior,
                        self.method,
                        tree,
                    );
                    self.advance(block)?;
                }
                return Ok(());
            }
            TreeKind::Literal(LiteralKind::Boolean(value)) => {
                let sv = if *value {
                    SymbolicValue::TRUE
                } else {
                    SymbolicValue::FALSE
                };
                self.state = self.state.stack_value(sv);
            }
            TreeKind::Literal(LiteralKind::Null) => {
                self.state = self.state.stack_value(SymbolicValue::NULL);
            }
            TreeKind::Literal(_) => {
                let sv = self.manager.create_value(self.method.arena, tree);
                self.state = self
                    .state
                    .stack_value(sv)
                    .set_single_constraint(sv, Constraint::NotNull);
            }
            TreeKind::Identifier { symbol } => {
                let sv = match self.state.value_of(*symbol) {
                    Some(sv) => sv,
                    None => {
                        let sv = self.manager.create_value(self.method.arena, tree);
                        self.bind(*symbol, sv);
                        sv
                    }
                };
                self.state = self.state.stack_value(sv);
            }
            TreeKind::MemberSelect { class_literal, .. } => {
                if !class_literal {
                    let (state, _receiver) = self.state.unstack(1);
                    self.state = state;
                }
                let sv = self.manager.create_value(self.method.arena, tree);
                self.state = self.state.stack_value(sv);
            }
            TreeKind::ArrayAccess => {
                let (state, _operands) = self.state.unstack(2);
                let sv = self.manager.create_value(self.method.arena, tree);
                self.state = state.stack_value(sv);
            }
            TreeKind::NewArray { initializers } => {
                let (state, _inits) = self.state.unstack(*initializers);
                let sv = self.manager.create_value(self.method.arena, tree);
                self.state = state
                    .stack_value(sv)
                    .set_single_constraint(sv, Constraint::NotNull);
            }
            TreeKind::NewClass { arguments, .. } => {
                let (state, _args) = self.state.unstack(*arguments);
                let sv = self.manager.create_value(self.method.arena, tree);
                self.state = state
                    .stack_value(sv)
                    .set_single_constraint(sv, Constraint::NotNull);
            }
            TreeKind::Binary { .. } => {
                let (state, operands) = self.state.unstack(2);
                let sv = self.manager.create_value(self.method.arena, tree);
                self.manager.computed_from(sv, &operands);
                self.state = state.stack_value(sv);
            }
            TreeKind::Unary { op } => {
                let (state, operands) = self.state.unstack(1);
                let sv = self.manager.create_value(self.method.arena, tree);
                self.manager.computed_from(sv, &operands);
                self.state = state;
                if op.is_increment_or_decrement() {
                    if let Some(&operand_tree) = self.method.arena.children(tree).first() {
                        if let Some(symbol) = self.method.arena.identifier_symbol(operand_tree) {
                            self.bind(symbol, sv);
                        }
                    }
                }
                // postfix produces the original value, prefix the new one
                let produced = if op.is_postfix() { operands[0] } else { sv };
                self.state = self.state.stack_value(produced);
            }
            TreeKind::Assignment { op, target } => {
                let (state, operands) = self.state.unstack(2);
                self.state = state;
                // operands are top-first: the variable, then the value
                let value = if op.is_plain() {
                    operands[1]
                } else {
                    let existing = match self.state.value_of(*target) {
                        Some(sv) => sv,
                        None => self.manager.create_plain_value(),
                    };
                    let sv = self.manager.create_value(self.method.arena, tree);
                    self.manager.computed_from(sv, &[existing, operands[1]]);
                    sv
                };
                self.bind(*target, value);
                self.state = self.state.stack_value(value);
            }
            TreeKind::TypeCast { target_type } => {
                // a primitive cast forgets reference facts; reference
                // casts pass the value through untouched
                if self.method.types.is_primitive(*target_type) {
                    let (state, _operand) = self.state.unstack(1);
                    let sv = self.manager.create_value(self.method.arena, tree);
                    self.state = state.stack_value(sv);
                }
            }
            TreeKind::VariableDeclaration {
                symbol,
                initialized,
            } => {
                if *initialized {
                    let (state, operands) = self.state.unstack(1);
                    self.state = state;
                    self.bind(*symbol, operands[0]);
                } else {
                    let in_for_each = matches!(
                        block.terminator.map(|t| t.kind),
                        Some(TerminatorKind::ForEach)
                    );
                    let declared = self.method.symbols.declared_type(*symbol);
                    let sv = if in_for_each {
                        Some(self.manager.create_value(self.method.arena, tree))
                    } else if declared
                        .map(|t| self.method.types.fqn(t) == "boolean")
                        .unwrap_or(false)
                    {
                        Some(SymbolicValue::FALSE)
                    } else if declared
                        .map(|t| !self.method.types.is_primitive(t))
                        .unwrap_or(false)
                    {
                        Some(SymbolicValue::NULL)
                    } else {
                        None
                    };
                    if let Some(sv) = sv {
                        self.bind(*symbol, sv);
                    }
                }
            }
            TreeKind::Lambda | TreeKind::MethodReference => {
                let sv = self.manager.create_value(self.method.arena, tree);
                self.state = self.state.stack_value(sv);
            }
            other => panic!(
                "tree kind {:?} cannot appear as a CFG element in method '{}'",
                other,
                self.method.name()
            ),
        }

        checks.post_statement(
            &mut self.state,
            &mut self.manager,
            &mut self.behavior,
            self.method,
            tree,
        );
        self.advance(block)
    }

    fn execute_method_invocation(
        &mut self,
        checks: &mut CheckerPipeline,
        tree: TreeId,
        method: Option<SymbolId>,
        arguments: usize,
        receiver: InvocationReceiver,
    ) -> Result<Vec<ProgramState>, EngineError> {
        if receiver.is_local() {
            self.reset_field_values();
        }
        // pop the arguments and the method select
        let (state, popped) = self.state.unstack(arguments + 1);
        self.state = state;

        let result_value = self.manager.create_value(self.method.arena, tree);
        self.manager.computed_from(result_value, &popped);

        let behavior = method.and_then(|m| self.registry.get(m));
        if let Some(behavior) = behavior {
            // popped is top-first: last argument first, method select last
            let mut argument_values: Vec<SymbolicValue> = popped[..arguments].to_vec();
            argument_values.reverse();
            let method_name = method
                .map(|m| self.method.symbols.name(m).to_string())
                .unwrap_or_default();
            let invocation_yields = behavior.invocation_yields(
                &argument_values,
                result_value,
                &mut self.manager,
                &method_name,
            );
            let resulting: Vec<ProgramState> = invocation_yields
                .iter()
                .filter_map(|y| y.compatible_state(&self.state, self.manager.domain()))
                .collect();
            if resulting.is_empty() {
                self.report_no_yield_issues(checks, tree, &invocation_yields);
            }
            return Ok(resulting);
        }

        // unknown callee: fresh result, annotation-driven nullness,
        // heap havoc for the wait sentinel
        let mut state = self.state.stack_value(result_value);
        if let Some(m) = method {
            if self.method.symbols.has_annotation(m, NONNULL_ANNOTATION) {
                state = state.set_single_constraint(result_value, Constraint::NotNull);
            } else if OBJECT_WAIT.matches(m, self.method.symbols, self.method.types) {
                state = state.reset_field_values(self.manager.factory_mut(), self.method.symbols);
            }
        }
        Ok(vec![state])
    }

    fn report_no_yield_issues(
        &mut self,
        checks: &mut CheckerPipeline,
        tree: TreeId,
        invocation_yields: &[InvocationYield],
    ) {
        let mut messages = Vec::new();
        for y in invocation_yields {
            messages.extend(y.no_yield_issues(&self.state));
        }
        if messages.is_empty() {
            checks.report_issue(
                CheckId::ConditionAlwaysTrueOrFalse,
                tree,
                "Incompatible arguments in method call",
            );
        } else {
            for message in messages {
                checks.report_issue(CheckId::NullDereference, tree, message);
            }
        }
    }

    /// Move to the next point of the current block: route exceptional
    /// values first, clear the stack after expression statements, then
    /// enqueue the advanced point.
    fn advance(&mut self, block: &Block) -> Result<(), EngineError> {
        if let Some(top) = self.state.peek() {
            if self.manager.is_exception(top) {
                let location = block
                    .elements
                    .get(self.position.index)
                    .copied()
                    .or_else(|| block.terminator.map(|t| t.tree))
                    .expect("exceptional state outside any program element");
                return self.process_exception(top, location);
            }
        }
        if let Some(&element) = block.elements.get(self.position.index) {
            if matches!(
                self.method.arena.parent_kind(element),
                Some(TreeKind::ExpressionStatement)
            ) {
                self.state = self.state.clear_stack();
            }
        }
        self.enqueue(self.position.next(), self.state.clone(), self.on_exit_path)
    }

    /// Walk enclosing try statements for a handler; uncaught exceptions
    /// become an exceptional yield finalized at the method's last block.
    fn process_exception(
        &mut self,
        exception: SymbolicValue,
        location: TreeId,
    ) -> Result<(), EngineError> {
        let thrown = self
            .manager
            .thrown_type(exception)
            .expect("exception value without a thrown type");
        let flow = ExceptionFlow::new(self.method.cfg, self.method.types);
        let mut ancestor = self.method.arena.parent(location);
        while let Some(tree) = ancestor {
            if matches!(self.method.arena.kind(tree), TreeKind::TryStatement) {
                if let Some(handler) = flow.catch_block(tree, thrown) {
                    return self.enqueue(
                        ProgramPoint::new(handler, 0),
                        self.state.clone(),
                        false,
                    );
                }
                if let Some(finally) = flow.finally_block(tree) {
                    return self.enqueue(
                        ProgramPoint::new(finally, 0),
                        self.state.clone(),
                        true,
                    );
                }
            }
            ancestor = self.method.arena.parent(tree);
        }
        self.behavior.add_yield(&self.state, &self.manager);
        self.enqueue(
            ProgramPoint::new(flow.last_block(), 0),
            self.state.clone(),
            false,
        )
    }

    fn bind(&mut self, symbol: SymbolId, sv: SymbolicValue) {
        if self.method.symbols.is_unknown(symbol) {
            return;
        }
        self.state = self.state.put(symbol, sv);
    }

    fn reset_field_values(&mut self) {
        self.state = self
            .state
            .clone()
            .reset_field_values(self.manager.factory_mut(), self.method.symbols);
    }

    fn enqueue(
        &mut self,
        point: ProgramPoint,
        state: ProgramState,
        exit_path: bool,
    ) -> Result<(), EngineError> {
        let visits = state.times_visited(point);
        if visits >= self.limits.max_program_point_visits {
            debug!(?point, "visit bound reached, dropping state");
            return Ok(());
        }
        self.check_state_size(&state)?;
        let state = state.visited_point(point, visits + 1);
        let (node, is_new) = self.graph.node(point, state);
        if !is_new && self.graph.exit_path(node) == exit_path {
            // enqueued earlier with the same route
            return Ok(());
        }
        self.graph.set_exit_path(node, exit_path);
        self.worklist.push(node);
        Ok(())
    }

    /// Guard against constraint explosion once exploration is deep
    fn check_state_size(&self, state: &ProgramState) -> Result<(), EngineError> {
        if self.steps + self.worklist.len() > self.limits.max_steps / 2
            && state.constraints_size() > self.limits.constraints_size_threshold
        {
            return Err(EngineError::StateTooBig {
                method: self.method.name().to_string(),
            });
        }
        Ok(())
    }

    fn overflow_error(&self) -> EngineError {
        EngineError::TooManyBranchedStates {
            method: self.method.name().to_string(),
            max_states: self.limits.max_nested_boolean_states,
        }
    }

    /// Drop the per-run structures so nothing O(method size) outlives the
    /// analysis of this method.
    fn release(&mut self) {
        self.graph = ExplodedGraph::new();
        self.worklist = Vec::new();
        self.state = ProgramState::new();
    }
}
