/*
 * symgraph-engine - Per-Method Symbolic Execution Core
 *
 * Explores the reachable states of one method body over its control-flow
 * graph and feeds abstract events to a pluggable checker pipeline
 * (null dereference, constant conditions, unclosed resources, ...).
 *
 * Layout:
 * - shared/   : symbol/type oracle, syntax arena, CFG model, liveness
 * - features/ : vertical slices (values -> constraints -> state ->
 *               behaviors -> checks -> walker)
 *
 * The engine is a bug-finder, not a verifier: exploration is bounded and
 * deliberately unsound where soundness would cost termination.
 */

pub mod config;
pub mod errors;
pub mod features;
pub mod shared;

pub use config::ExecutionLimits;
pub use errors::{EngineError, NestedStateOverflow};

pub use features::behavior::{BehaviorRegistry, InvocationYield, MethodBehavior, MethodYield};
pub use features::checks::{
    CheckerContext, CheckerPipeline, ConditionAlwaysTrueOrFalseCheck, FlowStep, Issue, IssueSink,
    LocksNotUnlockedCheck, NoWayOutLoopCheck, NonNullSetToNullCheck, NullDereferenceCheck,
    PathOutcome, SymbolicCheck, UnclosedResourcesCheck,
};
pub use features::constraints::{
    CheckId, Constraint, ConstraintDomain, ConstraintKind, ConstraintManager, Constraints,
};
pub use features::program_state::ProgramState;
pub use features::symbolic_values::{SymbolicValue, ValueFactory, ValueKind};
pub use features::walker::{
    ExceptionFlow, ExplodedGraph, ExplodedGraphWalker, MethodAnalysis, SymbolicExecutor,
};

pub use shared::liveness::LiveVariables;
pub use shared::models::{
    AssignmentOperator, BinaryOperator, Block, BlockId, Cfg, CfgBuilder, InvocationReceiver,
    LiteralKind, MethodContext, ParameterDeclaration, ProgramPoint, SymbolId, SymbolInfo,
    SymbolKind, SymbolTable, Terminator, TerminatorKind, TreeArena, TreeId, TreeKind, TryRegion,
    TypeId, TypeInfo, TypeKind, TypeTable, UnaryOperator, CHECK_FOR_NULL_ANNOTATION,
    NONNULL_ANNOTATION, NULLABLE_ANNOTATION,
};
