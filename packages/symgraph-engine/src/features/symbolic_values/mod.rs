//! Symbolic values: identity tokens for runtime values, with
//! computed-from provenance and relational constraint propagation.

pub mod relations;
pub mod value;

pub use value::{SymbolicValue, ValueFactory, ValueKind};
