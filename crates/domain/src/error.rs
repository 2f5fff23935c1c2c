//! Unified error types for the domain layer

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., a classifier token that cannot be compiled)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// State transition not allowed.
    ///
    /// Raised when a closed record is asked to change. Callers treat this as a
    /// defect in the caller, not as a feed anomaly.
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Returns true if this error signals a broken lifecycle contract.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvalidStateTransition(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_is_an_invariant_violation() {
        let err = DomainError::invalid_transition("refresh on closed lobby 12");
        assert!(err.is_invariant_violation());
        assert_eq!(
            err.to_string(),
            "Invalid state transition: refresh on closed lobby 12"
        );
    }

    #[test]
    fn validation_is_not_an_invariant_violation() {
        assert!(!DomainError::validation("empty token").is_invariant_violation());
    }
}
