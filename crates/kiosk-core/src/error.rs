//! # Error Types
//!
//! Domain-specific error types for kiosk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kiosk-core errors (this file)                                         │
//! │  ├── CoreError        - Domain rule failures                           │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  kiosk-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, carries CoreError           │
//! │                                                                         │
//! │  kiosk-api errors (in app)                                             │
//! │  └── ApiError         - What clients see (status + JSON body)          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Client       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Client-facing taxonomy
//! | Variant                                  | Category          |
//! |------------------------------------------|-------------------|
//! | `Validation`, `AddonSelectionRejected`   | ValidationError   |
//! | `OrderNotFound`, `OrderExpired`, `UnitNotFound`, `MenuItemNotFound`, `AddonNotFound` | NotFound |
//! | `OrderLocked`                            | Locked            |
//! | `AddonMismatch`, `UnitNotInOrder`        | InvalidReference  |

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Requested meal is not in the menu store.
    #[error("meal not found: {0}")]
    MenuItemNotFound(String),

    /// Requested add-on is not in the menu store.
    #[error("addon not found: {0}")]
    AddonNotFound(String),

    /// Add-on exists but belongs to a different meal than the one it was
    /// attached to in the request.
    #[error("addon {addon_id} does not belong to meal {meal_id}")]
    AddonMismatch { addon_id: String, meal_id: String },

    /// An add-on selection policy refused the selection.
    #[error("invalid addon selection for meal {meal_id}: {reason}")]
    AddonSelectionRejected { meal_id: String, reason: String },

    /// Order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Order passed its expiry deadline and has been removed.
    ///
    /// ## User Workflow
    /// ```text
    /// PATCH /orders/:id   (26h after placement)
    ///      │
    ///      ▼
    /// now > expires_at → DELETE order (+ lines, snapshots, units)
    ///      │
    ///      ▼
    /// OrderExpired → client sees 404, same as an id that never existed
    /// ```
    #[error("Order expired: {0}")]
    OrderExpired(String),

    /// Order is past its lock deadline and is read-only.
    #[error("Order locked (read-only): {0}")]
    OrderLocked(String),

    /// Preparation unit does not exist.
    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    /// Unit exists but its line belongs to another order.
    #[error("Unit {unit_id} does not belong to order {order_id}")]
    UnitNotInOrder { unit_id: String, order_id: String },

    /// Lifecycle thresholds are inconsistent.
    #[error("Invalid lifecycle policy: {reason}")]
    InvalidLifecyclePolicy { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when client input doesn't meet requirements.
/// Used for early validation before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., wrong JSON type for a field).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An amount derived from the input leaves the representable range.
    #[error("{field} is too large")]
    AmountOverflow { field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
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
        let err = CoreError::AddonMismatch {
            addon_id: "A1".to_string(),
            meal_id: "M2".to_string(),
        };
        assert_eq!(err.to_string(), "addon A1 does not belong to meal M2");

        let err = CoreError::MenuItemNotFound("M9".to_string());
        assert_eq!(err.to_string(), "meal not found: M9");
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("items").to_string(), "items required");

        let err = ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: 999,
        };
        assert_eq!(err.to_string(), "quantity must be between 1 and 999");

        let err = ValidationError::AmountOverflow {
            field: "total".to_string(),
        };
        assert_eq!(err.to_string(), "total is too large");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("status").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "status required");
    }
}
