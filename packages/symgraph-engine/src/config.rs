//! Execution limits for the exploded-graph walker
//!
//! The four bounds that guarantee termination and bounded memory. The
//! defaults are the engine's canonical values; embedders may inject their
//! own, validated copies.

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// Termination and memory bounds for one method analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLimits {
    /// Total interpreted elements per method
    pub max_steps: usize,

    /// Distinct visits of a single program point along one path
    pub max_program_point_visits: u32,

    /// States a single constraint assertion may fan out into
    pub max_nested_boolean_states: usize,

    /// Constraint-map size above which the oversize guard may trip
    pub constraints_size_threshold: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_program_point_visits: 2,
            max_nested_boolean_states: 10_000,
            constraints_size_threshold: 75,
        }
    }
}

impl ExecutionLimits {
    /// Check that every bound is usable
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_steps == 0 {
            return Err(EngineError::InvalidLimits("max_steps must be positive".into()));
        }
        if self.max_program_point_visits == 0 {
            return Err(EngineError::InvalidLimits(
                "max_program_point_visits must be positive".into(),
            ));
        }
        if self.max_nested_boolean_states == 0 {
            return Err(EngineError::InvalidLimits(
                "max_nested_boolean_states must be positive".into(),
            ));
        }
        if self.constraints_size_threshold == 0 {
            return Err(EngineError::InvalidLimits(
                "constraints_size_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_valid() {
        let limits = ExecutionLimits::default();
        assert!(limits.validate().is_ok());
        assert_eq!(limits.max_steps, 10_000);
        assert_eq!(limits.max_program_point_visits, 2);
        assert_eq!(limits.max_nested_boolean_states, 10_000);
        assert_eq!(limits.constraints_size_threshold, 75);
    }

    #[test]
    fn test_zero_bound_is_rejected() {
        let mut limits = ExecutionLimits::default();
        limits.max_steps = 0;
        assert!(limits.validate().is_err());
    }
}
