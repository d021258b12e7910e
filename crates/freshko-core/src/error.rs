//! # Error Types
//!
//! Domain-specific error types for freshko-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  freshko-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  freshko-db errors (separate crate)                                     │
//! │  └── StorageError     - Storage tier failures                           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → rendered by the caller             │
//! │        StorageError never escapes the storage facade                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (email, entity, id)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message; nothing here panics

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// These are surfaced to callers as ordinary `Err` values so the caller can
/// render the message directly. They are never thrown as panics.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An entity could not be found by id.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A user with the same case-folded email already exists.
    ///
    /// ## When This Occurs
    /// - Registration with an email that differs only by letter case
    /// - Updating a user's email to collide with another account
    #[error("An account with email '{email}' already exists")]
    DuplicateEmail { email: String },

    /// The target is seed content and cannot be mutated or deleted.
    ///
    /// ## When This Occurs
    /// - Editing or deleting a record whose origin is `Origin::Seed`
    #[error("{entity} {id} is part of the original catalog and cannot be modified")]
    NotEditable { entity: &'static str, id: u64 },

    /// The requested order status transition is not legal.
    ///
    /// ## Legal Graph
    /// ```text
    /// Processing ──► Shipped ──► Completed
    ///      │
    ///      └──────► Cancelled
    /// ```
    #[error("Order cannot move from {from:?} to {to:?}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    /// Email/password pair did not match any account.
    ///
    /// Deliberately vague: does not reveal whether the email exists.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Checkout was attempted with an empty cart.
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// No user is signed in for an operation that requires a session.
    #[error("No user is signed in")]
    NotSignedIn,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Unexpected internal failure (e.g. the password hasher refused its
    /// parameters). Not a business rule; still returned, never thrown.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed email address).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::DuplicateEmail {
            email: "anna@freshko.test".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "An account with email 'anna@freshko.test' already exists"
        );

        let err = CoreError::IllegalTransition {
            from: OrderStatus::Cancelled,
            to: OrderStatus::Shipped,
        };
        assert_eq!(err.to_string(), "Order cannot move from Cancelled to Shipped");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
