//! Domain error model.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// preconditions, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more input fields failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// A caller-supplied value violates an operation precondition
    /// (negative quantity, unknown sort field, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation or a delete blocked by dependents.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A decrease would take inventory below zero.
    #[error(
        "Cannot decrease inventory below zero. Current inventory: {current}, Requested decrease: {requested}"
    )]
    InsufficientInventory { current: i64, requested: i64 },
}

impl DomainError {
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn insufficient_inventory(current: i64, requested: i64) -> Self {
        Self::InsufficientInventory { current, requested }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_inventory_message_carries_both_quantities() {
        let err = DomainError::insufficient_inventory(5, 10);
        assert_eq!(
            err.to_string(),
            "Cannot decrease inventory below zero. Current inventory: 5, Requested decrease: 10"
        );
    }

    #[test]
    fn not_found_message_is_passed_through() {
        let err = DomainError::not_found("Product not found with id: 7");
        assert_eq!(err.to_string(), "Product not found with id: 7");
    }
}
