//! # Domain Types
//!
//! Core domain types shared by the store and the HTTP surface.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  MENU (live, mutable)              ORDERS (snapshots, immutable lines)  │
//! │  ┌─────────────────┐               ┌─────────────────┐                 │
//! │  │    MenuItem     │               │      Order      │                 │
//! │  │  price          │   priced at   │  status         │                 │
//! │  │  is_available   │ ────────────► │  subtotal/tax   │                 │
//! │  └────────┬────────┘  order time   │  locked/expires │                 │
//! │           │ 1..n                   └────────┬────────┘                 │
//! │  ┌────────▼────────┐                        │ 1..n                     │
//! │  │    MenuAddon    │               ┌────────▼────────┐                 │
//! │  │  price_delta    │ ────copied──► │    OrderLine    │──┬─► OrderLineAddon
//! │  └─────────────────┘               │  unit_price     │  │   (name/price copy)
//! │                                    │  quantity = q   │  └─► Unit × q   │
//! │                                    └─────────────────┘      (status)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire names follow what the ordering and kitchen clients already consume:
//! menu items and orders are camelCase, add-on and unit fields keep their
//! snake_case keys (`price_delta`, `is_required`, `max_select`, `line_id`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Order Status
// =============================================================================

/// The aggregate status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, kitchen has not started.
    #[default]
    Pending,
    /// Kitchen is working on it.
    Preparing,
    /// Every unit is ready for pickup.
    Ready,
    /// Handed over to the customer.
    Completed,
    /// Abandoned before completion.
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Unit Status
// =============================================================================

/// Preparation status of a single physical item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
}

impl UnitStatus {
    pub const ALL: [UnitStatus; 3] = [UnitStatus::Pending, UnitStatus::Preparing, UnitStatus::Ready];

    pub const fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Pending => "pending",
            UnitStatus::Preparing => "preparing",
            UnitStatus::Ready => "ready",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UnitStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: UnitStatus::ALL.iter().map(|s| s.to_string()).collect(),
            })
    }
}

// =============================================================================
// Menu
// =============================================================================

/// An item on the menu.
///
/// Never hard-deleted once orders reference it; `is_available = false`
/// hides it from the menu listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Base price in minor units.
    pub price: i64,
    pub image_url: Option<String>,
    /// Display-only labels, kept in the order they were given.
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub is_available: bool,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub addons: Vec<MenuAddon>,
}

impl MenuItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }
}

/// An add-on owned by exactly one menu item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuAddon {
    pub id: String,
    pub menu_item_id: String,
    pub name: String,
    /// Signed price change in minor units.
    #[serde(rename = "price")]
    pub price_delta: i64,
    /// Stored for clients; not enforced when pricing.
    pub is_required: bool,
    /// Stored for clients; not enforced when pricing.
    pub max_select: i64,
}

impl MenuAddon {
    #[inline]
    pub fn price_delta(&self) -> Money {
        Money::from_minor(self.price_delta)
    }
}

/// Body of `POST /api/menu`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewMenuItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    /// Defaults to available when omitted.
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub addons: Vec<NewMenuAddon>,
}

/// An add-on inside a menu create or update body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewMenuAddon {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price_delta: i64,
    #[serde(default)]
    pub is_required: bool,
    /// Defaults to 1 when omitted.
    #[serde(default)]
    pub max_select: Option<i64>,
}

impl NewMenuAddon {
    pub fn max_select_or_default(&self) -> i64 {
        self.max_select.unwrap_or(1)
    }
}

/// Body of `PATCH /api/menu/:id`. Absent fields keep their stored value.
///
/// When `addons` is present the item's whole add-on set is replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default)]
    pub is_available: Option<bool>,
    #[serde(default)]
    pub addons: Option<Vec<NewMenuAddon>>,
}

// =============================================================================
// Orders
// =============================================================================

/// Full denormalized order view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Mutations are rejected once `now > locked_at`.
    pub locked_at: i64,
    /// The order is deleted on access once `now > expires_at`.
    pub expires_at: i64,
    pub status: OrderStatus,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Iterates over every unit across all lines.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.items.iter().flat_map(|line| line.units.iter())
    }
}

/// Order header as returned by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderSummary {
    pub id: String,
    pub created_at: i64,
    pub locked_at: i64,
    pub expires_at: i64,
    pub status: OrderStatus,
    pub subtotal: i64,
    pub tax: i64,
    pub total: i64,
}

/// A line of an order. Immutable after placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderLine {
    pub id: String,
    /// Menu item this line was priced from. The item may since have changed
    /// price or disappeared.
    pub meal_id: String,
    /// Meal name at time of order (frozen).
    pub name: String,
    /// Base price plus selected add-on deltas at time of order (frozen).
    pub unit_price: i64,
    pub quantity: i64,
    pub addons: Vec<OrderLineAddon>,
    pub units: Vec<Unit>,
}

impl OrderLine {
    /// Returns `unit_price × quantity`.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.unit_price).multiply_quantity(self.quantity)
    }
}

/// Copy of an add-on's name and price at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLineAddon {
    /// Id of the menu add-on this was copied from (value only, no link).
    #[serde(rename = "id")]
    pub addon_id: String,
    pub name: String,
    #[serde(rename = "price")]
    pub price_delta: i64,
}

/// One physical item being prepared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unit {
    pub id: String,
    pub status: UnitStatus,
    pub line_id: String,
}

// =============================================================================
// Requests
// =============================================================================

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    /// Caller-supplied tax in minor units. No tax policy is applied here.
    #[serde(default)]
    pub tax: Option<i64>,
}

impl OrderRequest {
    pub fn tax_or_zero(&self) -> i64 {
        self.tax.unwrap_or(0)
    }
}

/// One requested line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub meal_id: String,
    /// Add-on ids, priced exactly as listed (duplicates count twice).
    #[serde(default)]
    pub addons: Vec<String>,
    /// Defaults to 1 when omitted.
    #[serde(default)]
    pub quantity: Option<i64>,
}

impl OrderItemRequest {
    pub fn quantity_or_default(&self) -> i64 {
        self.quantity.unwrap_or(1)
    }
}

/// Body of the order and unit status endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
