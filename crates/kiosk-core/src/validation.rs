//! # Validation Module
//!
//! Input validation run before any store access.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP boundary (kiosk-api)                                    │
//! │  └── JSON shape → typed request (wrong types = ValidationError)        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── items non-empty, quantities in range, tax ≥ 0                     │
//! │  └── status present and inside its enum                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (quantity > 0), CHECK (total = subtotal + tax)              │
//! │  └── Foreign keys with ON DELETE CASCADE                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;

use crate::error::ValidationError;
use crate::types::{MenuItemPatch, NewMenuAddon, NewMenuItem, OrderRequest};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Orders
// =============================================================================

/// Validates an order placement request.
///
/// ## Rules
/// - `items` must be present and non-empty, at most `MAX_ORDER_LINES`
/// - every `mealId` must be non-empty
/// - every quantity in `1..=MAX_ITEM_QUANTITY` (absent means 1)
/// - `tax`, when given, must not be negative
pub fn validate_order_request(req: &OrderRequest) -> ValidationResult<()> {
    if req.items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if req.items.len() > MAX_ORDER_LINES {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_LINES as i64,
        });
    }

    for item in &req.items {
        if item.meal_id.trim().is_empty() {
            return Err(ValidationError::required("mealId"));
        }
        validate_quantity(item.quantity_or_default())?;
    }

    if req.tax_or_zero() < 0 {
        return Err(ValidationError::OutOfRange {
            field: "tax".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Parses the `status` field of a status update body.
///
/// Missing or blank is `Required`; a value outside `T`'s enum is `NotAllowed`.
///
/// ## Example
/// ```rust
/// use kiosk_core::validation::parse_status;
/// use kiosk_core::UnitStatus;
///
/// let status: UnitStatus = parse_status(Some("ready")).unwrap();
/// assert_eq!(status, UnitStatus::Ready);
/// assert!(parse_status::<UnitStatus>(None).is_err());
/// assert!(parse_status::<UnitStatus>(Some("")).is_err());
/// ```
pub fn parse_status<T>(status: Option<&str>) -> ValidationResult<T>
where
    T: FromStr<Err = ValidationError>,
{
    match status.map(str::trim) {
        None | Some("") => Err(ValidationError::required("status")),
        Some(value) => value.parse(),
    }
}

// =============================================================================
// Menu
// =============================================================================

/// Validates a menu item name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a base price in minor units. Zero is allowed (free items).
pub fn validate_price_minor(price: i64) -> ValidationResult<()> {
    if price < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates an add-on's `max_select`.
pub fn validate_max_select(max_select: i64) -> ValidationResult<()> {
    if max_select < 1 {
        return Err(ValidationError::MustBePositive {
            field: "max_select".to_string(),
        });
    }

    Ok(())
}

fn validate_addons(addons: &[NewMenuAddon]) -> ValidationResult<()> {
    for addon in addons {
        validate_max_select(addon.max_select_or_default())?;
    }
    Ok(())
}

/// Validates a menu item create body.
pub fn validate_new_menu_item(item: &NewMenuItem) -> ValidationResult<()> {
    validate_item_name(&item.name)?;
    validate_price_minor(item.price)?;
    validate_addons(&item.addons)
}

/// Validates the fields present in a menu item patch.
pub fn validate_menu_item_patch(patch: &MenuItemPatch) -> ValidationResult<()> {
    if let Some(name) = &patch.name {
        validate_item_name(name)?;
    }
    if let Some(price) = patch.price {
        validate_price_minor(price)?;
    }
    if let Some(addons) = &patch.addons {
        validate_addons(addons)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
