//! Constraint domain and the constraint manager, home of `assume_dual`.

pub mod domain;
pub mod manager;

pub use domain::{CheckId, Constraint, ConstraintDomain, ConstraintKind, Constraints, MeetFn};
pub use manager::ConstraintManager;
