//! # Validation Module
//!
//! Input validation utilities for Freshko.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: View forms (external collaborators)                           │
//! │  ├── Basic format checks (empty, length)                                │
//! │  └── Immediate user feedback                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain store actions (Rust)                                   │
//! │  └── THIS MODULE: shape validation before business rules run            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Business rules (duplicate email, seed immutability, ...)      │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewUser;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - Must contain exactly one `@` with a dot somewhere after it
/// - Must be at most 254 characters
///
/// This is deliberately shallow - the authoritative check is whether the
/// external identity provider or mail system accepts the address.
///
/// ## Example
/// ```rust
/// use freshko_core::validation::validate_email;
///
/// assert!(validate_email("anna@freshko.test").is_ok());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();

    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected name@domain.tld".to_string(),
        });
    }

    Ok(())
}

/// Validates a password for local accounts.
///
/// ## Rules
/// - At least 8 characters
/// - At most 128 characters (argon2 input sanity bound)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates a person or product display name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > 200 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 200,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a cart/order quantity.
///
/// ## Rules
/// - Must be positive
/// - Must not exceed `MAX_ITEM_QUANTITY`
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
pub fn validate_price(price_cents: i64) -> ValidationResult<()> {
    if price_cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates everything about a registration input in one call.
pub fn validate_new_user(input: &NewUser) -> ValidationResult<()> {
    validate_name("firstName", &input.first_name)?;
    validate_name("lastName", &input.last_name)?;
    validate_email(&input.email)?;
    validate_password(&input.password)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("anna@freshko.test").is_ok());
        assert!(validate_email("  padded@freshko.test  ").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("missing-at.test").is_err());
        assert!(validate_email("no-dot@domain").is_err());
        assert!(validate_email("two@@freshko.test").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_new_user() {
        let input = NewUser {
            first_name: "Anna".to_string(),
            last_name: "Kovacs".to_string(),
            email: "anna@freshko.test".to_string(),
            phone: None,
            password: "correct horse".to_string(),
            role: Role::User,
        };
        assert!(validate_new_user(&input).is_ok());

        let bad = NewUser {
            email: "broken".to_string(),
            ..input
        };
        assert!(validate_new_user(&bad).is_err());
    }
}
