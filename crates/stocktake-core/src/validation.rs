//! # Validation Module
//!
//! Input validation for the stocktake domain.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Adapter (import / transport)                                 │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Column sniffing, error collection - NEVER leaks into here         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - business rule validation                       │
//! │  ├── Trim, emptiness, length, numeric ranges                           │
//! │  └── Runs before any storage mutation                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints (code, (product, batch)) - authoritative       │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! String validators return the **trimmed** value; the trimmed form is what
//! gets persisted and what uniqueness is judged on.

use crate::error::{ValidationError, ValidationResult};
use crate::{MAX_BATCH_LEN, MAX_CODE_LEN, MAX_EXPIRY_YEAR, MAX_NAME_LEN, MIN_EXPIRY_YEAR};

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 50 characters
///
/// ## Example
/// ```rust
/// use stocktake_core::validation::validate_product_code;
///
/// assert_eq!(validate_product_code("  A-100 ").unwrap(), "A-100");
/// assert!(validate_product_code("   ").is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    Ok(code.to_string())
}

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates a batch identifier and returns it trimmed.
///
/// Batch matching is case- and whitespace-sensitive on the trimmed string;
/// `" L1 "` and `"L1"` are the same batch, `"l1"` is a different one.
pub fn validate_batch(batch: &str) -> ValidationResult<String> {
    let batch = batch.trim();

    if batch.is_empty() {
        return Err(ValidationError::Required {
            field: "batch".to_string(),
        });
    }

    if batch.len() > MAX_BATCH_LEN {
        return Err(ValidationError::TooLong {
            field: "batch".to_string(),
            max: MAX_BATCH_LEN,
        });
    }

    Ok(batch.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an expiry month (1-12).
pub fn validate_expiry_month(month: i64) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "expiry_month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

/// Validates an expiry year (4-digit calendar year).
pub fn validate_expiry_year(year: i64) -> ValidationResult<()> {
    if !(MIN_EXPIRY_YEAR..=MAX_EXPIRY_YEAR).contains(&year) {
        return Err(ValidationError::OutOfRange {
            field: "expiry_year".to_string(),
            min: MIN_EXPIRY_YEAR,
            max: MAX_EXPIRY_YEAR,
        });
    }

    Ok(())
}

/// Validates a counted quantity.
///
/// ## Rules
/// - Must be zero or positive
///
/// Zero is allowed: counting an empty shelf is a legitimate observation.
/// Negative adjustments are not a submit concern; a correction goes through
/// `update` with the intended absolute value.
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// Used for by-id operations (rename, update, delete) so a malformed id
/// fails as a validation error instead of a silent not-found.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_code() {
        assert_eq!(validate_product_code("A-100").unwrap(), "A-100");
        assert_eq!(validate_product_code("  A-100  ").unwrap(), "A-100");

        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("   ").is_err());
        assert!(validate_product_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert_eq!(validate_product_name(" Widget ").unwrap(), "Widget");
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_batch_is_whitespace_sensitive_after_trim() {
        assert_eq!(validate_batch(" L1 ").unwrap(), "L1");
        // interior whitespace is preserved; "L 1" is its own batch
        assert_eq!(validate_batch("L 1").unwrap(), "L 1");
        assert!(validate_batch("  ").is_err());
        assert!(validate_batch(&"B".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_expiry_month() {
        assert!(validate_expiry_month(1).is_ok());
        assert!(validate_expiry_month(12).is_ok());

        assert!(validate_expiry_month(0).is_err());
        assert!(validate_expiry_month(13).is_err());
        assert!(validate_expiry_month(-3).is_err());
    }

    #[test]
    fn test_validate_expiry_year() {
        assert!(validate_expiry_year(2026).is_ok());
        assert!(validate_expiry_year(1000).is_ok());
        assert!(validate_expiry_year(9999).is_ok());

        assert!(validate_expiry_year(999).is_err());
        assert!(validate_expiry_year(10000).is_err());
        assert!(validate_expiry_year(26).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(10).is_ok());

        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
    }
}
