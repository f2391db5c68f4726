//! The exploded-graph walker: worklist driver, node interning, exception
//! routing, and the per-method executor.

pub mod engine;
pub mod exception;
pub mod executor;
pub mod exploded_graph;

pub use engine::ExplodedGraphWalker;
pub use exception::ExceptionFlow;
pub use executor::{MethodAnalysis, SymbolicExecutor};
pub use exploded_graph::{ExplodedGraph, Node, NodeId};
