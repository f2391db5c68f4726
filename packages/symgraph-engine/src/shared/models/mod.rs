//! Shared models: symbols, types, syntax nodes, CFGs, and the
//! method-under-analysis bundle.

pub mod cfg;
pub mod method;
pub mod symbol;
pub mod tree;

pub use cfg::{Block, BlockId, Cfg, CfgBuilder, ProgramPoint, Terminator, TerminatorKind, TryRegion};
pub use method::{MethodContext, ParameterDeclaration};
pub use symbol::{
    MethodMatcher, SymbolId, SymbolInfo, SymbolKind, SymbolTable, TypeId, TypeInfo, TypeKind,
    TypeTable, WellKnownTypes, CHECK_FOR_NULL_ANNOTATION, NONNULL_ANNOTATION, NULLABLE_ANNOTATION,
};
pub use tree::{
    AssignmentOperator, BinaryOperator, InvocationReceiver, LiteralKind, TreeArena, TreeId,
    TreeKind, TreeNode, UnaryOperator,
};
