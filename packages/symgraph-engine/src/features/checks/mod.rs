//! Checker pipeline: the plug-in ABI, the fixed-order dispatcher, the
//! issue sink and the built-in checkers.

pub mod condition_always;
pub mod dispatcher;
pub mod issue;
pub mod locks_not_unlocked;
pub mod no_way_out_loop;
pub mod non_null_set_to_null;
pub mod null_dereference;
pub mod ports;
pub mod unclosed_resources;

pub use condition_always::ConditionAlwaysTrueOrFalseCheck;
pub use dispatcher::CheckerPipeline;
pub use issue::{FlowStep, Issue, IssueSink};
pub use locks_not_unlocked::LocksNotUnlockedCheck;
pub use no_way_out_loop::NoWayOutLoopCheck;
pub use non_null_set_to_null::NonNullSetToNullCheck;
pub use null_dereference::NullDereferenceCheck;
pub use ports::{CheckerContext, PathOutcome, SymbolicCheck};
pub use unclosed_resources::UnclosedResourcesCheck;
