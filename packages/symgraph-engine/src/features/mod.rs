//! Engine features, one vertical slice each:
//! - symbolic_values: value identities and relational propagation
//! - constraints: the fact domain and `assume_dual`
//! - program_state: immutable path snapshots
//! - behavior: method summaries and call-site replay
//! - checks: the checker pipeline and built-in checkers
//! - walker: the exploded-graph exploration itself

pub mod behavior;
pub mod checks;
pub mod constraints;
pub mod program_state;
pub mod symbolic_values;
pub mod walker;
