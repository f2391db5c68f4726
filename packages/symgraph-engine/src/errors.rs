//! Error types for symgraph-engine
//!
//! Bound trips are ordinary values unwound at the method boundary; the
//! driver keeps going with the next method. Invariant violations (popping
//! an empty operand stack, malformed program points) are programming bugs
//! and panic with context instead of being represented here.

use thiserror::Error;

/// Main error type for symbolic execution runs
#[derive(Debug, Error)]
pub enum EngineError {
    /// Interpretation step budget exhausted
    #[error("reached limit of {max_steps} steps for method '{method}'")]
    MaxStepsReached { method: String, max_steps: usize },

    /// A constraint assertion fanned out into too many branched states
    #[error("reached maximum number of {max_states} branched states for method '{method}'")]
    TooManyBranchedStates { method: String, max_states: usize },

    /// Program state constraints grew past the oversize threshold
    #[error("program state constraints are too big: stopping symbolic execution for method '{method}'")]
    StateTooBig { method: String },

    /// Rejected execution limits
    #[error("invalid execution limits: {0}")]
    InvalidLimits(String),
}

/// Raised by the constraint manager when a single assertion produces more
/// states than the nested-boolean budget allows. The walker converts this
/// into [`EngineError::TooManyBranchedStates`] with method context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("too many nested boolean states")]
pub struct NestedStateOverflow;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
