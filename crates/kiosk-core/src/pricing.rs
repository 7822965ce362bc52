//! # Pricing
//!
//! Authoritative line pricing from the current menu state.
//!
//! ## Price Snapshot Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Request line: { mealId: M1, addons: [A1], quantity: 2 }               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store loads CURRENT rows (client prices are never read):              │
//! │    M1 "Burger" price 500       A1 "Bacon" menu_item_id M1 delta 150    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_line() ← THIS MODULE                                            │
//! │    ├── meal missing / unavailable?  → MenuItemNotFound                 │
//! │    ├── add-on missing?              → AddonNotFound                    │
//! │    ├── add-on owned by other meal?  → AddonMismatch                    │
//! │    └── unit_price = 500 + 150 = 650                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricedLine { name: "Burger", unit_price: 650, addons: [Bacon 150] }   │
//! │  (copied into order_lines / order_line_addons, never recomputed)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{MenuAddon, OrderLineAddon};

/// Current price row of a meal as read from the menu store.
#[derive(Debug, Clone, PartialEq)]
pub struct MealPrice {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub is_available: bool,
}

/// A fully priced line, ready to be persisted as snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub meal_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub addons: Vec<OrderLineAddon>,
}

impl PricedLine {
    /// `unit_price × quantity`, `None` on overflow.
    #[inline]
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply_quantity(self.quantity)
    }
}

fn overflow(field: &str) -> CoreError {
    ValidationError::AmountOverflow {
        field: field.to_string(),
    }
    .into()
}

/// Totals of an order being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

// =============================================================================
// Selection Policy
// =============================================================================

/// Hook for add-on cardinality rules (`is_required`, `max_select`).
///
/// Called with the add-ons exactly as selected, after ownership checks.
pub trait AddonSelectionPolicy: Send + Sync {
    fn check(&self, meal: &MealPrice, selected: &[&MenuAddon]) -> CoreResult<()>;
}

/// Accepts every selection. `is_required` / `max_select` stay metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissivePolicy;

impl AddonSelectionPolicy for PermissivePolicy {
    fn check(&self, _meal: &MealPrice, _selected: &[&MenuAddon]) -> CoreResult<()> {
        Ok(())
    }
}

// =============================================================================
// Line Pricing
// =============================================================================

/// Prices one requested line.
///
/// ## Arguments
/// * `meal_id` - Meal id as requested
/// * `meal` - Current meal row, `None` if the store has no such id
/// * `requested_addons` - Add-on ids in request order
/// * `found_addons` - Add-on rows the store returned for those ids
/// * `quantity` - Already validated line quantity
///
/// ## Rules
/// - The sum covers exactly the requested add-ons; a repeated id counts
///   once per occurrence.
/// - Required add-ons are not implicitly included.
/// - A unit price or line total outside the i64 range is rejected as
///   `Validation(AmountOverflow)`.
pub fn price_line(
    meal_id: &str,
    meal: Option<&MealPrice>,
    requested_addons: &[String],
    found_addons: &[MenuAddon],
    quantity: i64,
    policy: &dyn AddonSelectionPolicy,
) -> CoreResult<PricedLine> {
    let meal = meal
        .filter(|m| m.is_available)
        .ok_or_else(|| CoreError::MenuItemNotFound(meal_id.to_string()))?;

    let by_id: HashMap<&str, &MenuAddon> =
        found_addons.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut selected = Vec::with_capacity(requested_addons.len());
    for addon_id in requested_addons {
        let addon = by_id
            .get(addon_id.as_str())
            .copied()
            .ok_or_else(|| CoreError::AddonNotFound(addon_id.clone()))?;

        if addon.menu_item_id != meal.id {
            return Err(CoreError::AddonMismatch {
                addon_id: addon_id.clone(),
                meal_id: meal.id.clone(),
            });
        }

        selected.push(addon);
    }

    policy.check(meal, &selected)?;

    let unit_price = Money::checked_sum(
        std::iter::once(Money::from_minor(meal.price)).chain(selected.iter().map(|a| a.price_delta())),
    )
    .ok_or_else(|| overflow("unitPrice"))?;

    let line = PricedLine {
        meal_id: meal.id.clone(),
        name: meal.name.clone(),
        unit_price,
        quantity,
        addons: selected
            .into_iter()
            .map(|a| OrderLineAddon {
                addon_id: a.id.clone(),
                name: a.name.clone(),
                price_delta: a.price_delta,
            })
            .collect(),
    };

    if line.line_total().is_none() {
        return Err(overflow("lineTotal"));
    }

    Ok(line)
}

/// Computes `subtotal = Σ unit_price × quantity` and `total = subtotal + tax`.
///
/// Fails with `Validation(AmountOverflow)` when either sum overflows.
pub fn order_totals(lines: &[PricedLine], tax: Money) -> CoreResult<OrderTotals> {
    let line_totals = lines
        .iter()
        .map(PricedLine::line_total)
        .collect::<Option<Vec<Money>>>()
        .ok_or_else(|| overflow("lineTotal"))?;

    let subtotal = Money::checked_sum(line_totals).ok_or_else(|| overflow("subtotal"))?;
    let total = subtotal.checked_add(tax).ok_or_else(|| overflow("total"))?;

    Ok(OrderTotals {
        subtotal,
        tax,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
