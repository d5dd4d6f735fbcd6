//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Deterministic input failures only. Missing records, storage faults and
/// ledger integrity problems are reported by the collaborator that owns them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. empty item name, negative quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure_kind() {
        assert_eq!(
            DomainError::validation("quantity cannot be negative").to_string(),
            "validation failed: quantity cannot be negative"
        );
        assert_eq!(
            DomainError::invalid_id("ItemId: bad").to_string(),
            "invalid identifier: ItemId: bad"
        );
    }

    #[test]
    fn every_variant_is_reachable_from_a_constructor() {
        for err in [DomainError::validation("x"), DomainError::invalid_id("x")] {
            match err {
                DomainError::Validation(msg) | DomainError::InvalidId(msg) => assert_eq!(msg, "x"),
            }
        }
    }
}
