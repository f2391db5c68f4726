//! Method behaviors: per-method yield summaries and their replay at
//! call sites.

pub mod invocation;
pub mod method_behavior;
pub mod registry;

pub use invocation::InvocationYield;
pub use method_behavior::{MethodBehavior, MethodYield};
pub use registry::BehaviorRegistry;
