//! # Status Roll-up
//!
//! Derives the order status from its units after a unit changes.
//!
//! Only one transition is automatic: every unit `ready` → order `ready`.
//! Anything else (`preparing`, `completed`, `cancelled`, or moving back from
//! `ready`) is an explicit client update.

use crate::types::{OrderStatus, UnitStatus};

/// True when the order has at least one unit and every unit is ready.
pub fn all_units_ready(units: &[UnitStatus]) -> bool {
    !units.is_empty() && units.iter().all(|s| *s == UnitStatus::Ready)
}

/// Returns the status the order should move to, if any.
///
/// ## Example
/// ```rust
/// use kiosk_core::rollup::rolled_up_status;
/// use kiosk_core::{OrderStatus, UnitStatus};
///
/// let units = [UnitStatus::Ready, UnitStatus::Ready];
/// assert_eq!(rolled_up_status(OrderStatus::Preparing, &units), Some(OrderStatus::Ready));
///
/// let units = [UnitStatus::Ready, UnitStatus::Pending];
/// assert_eq!(rolled_up_status(OrderStatus::Ready, &units), None);
/// ```
pub fn rolled_up_status(current: OrderStatus, units: &[UnitStatus]) -> Option<OrderStatus> {
    if current != OrderStatus::Ready && all_units_ready(units) {
        Some(OrderStatus::Ready)
    } else {
        None
    }
}
