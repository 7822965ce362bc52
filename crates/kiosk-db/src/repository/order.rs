//! # Order Repository
//!
//! Placement, lifecycle-gated reads and writes, and unit tracking.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. PLACE (one transaction)                                            │
//! │     ├── price every line from CURRENT menu rows (same transaction)     │
//! │     ├── INSERT orders       (totals, locked_at, expires_at)            │
//! │     ├── INSERT order_lines  (name + unit price snapshot)               │
//! │     ├── INSERT order_line_addons (name + delta snapshot)               │
//! │     └── INSERT order_units  × quantity, all 'pending'                  │
//! │                                                                         │
//! │  2. GUARD (every access to one order)                                  │
//! │     ├── now > expires_at → DELETE order (cascade) → OrderExpired       │
//! │     └── now > locked_at and write → OrderLocked                        │
//! │                                                                         │
//! │  3. KITCHEN                                                            │
//! │     └── update_unit_status() → all units ready? → order 'ready'        │
//! │                                                                         │
//! │  4. CLIENT                                                             │
//! │     └── update_status() → any status, explicitly                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::menu::{fetch_addons_by_ids, fetch_meal_price};
use kiosk_core::lifecycle::{Access, LifecyclePolicy, OrderPhase};
use kiosk_core::pricing::{order_totals, price_line, AddonSelectionPolicy, PricedLine};
use kiosk_core::rollup::rolled_up_status;
use kiosk_core::validation::validate_order_request;
use kiosk_core::{
    CoreError, Money, Order, OrderLine, OrderLineAddon, OrderRequest, OrderStatus, OrderSummary,
    Unit, UnitStatus,
};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    id: String,
    created_at: i64,
    locked_at: i64,
    expires_at: i64,
    status: OrderStatus,
    subtotal: i64,
    tax: i64,
    total: i64,
}

impl From<OrderRow> for OrderSummary {
    fn from(row: OrderRow) -> Self {
        OrderSummary {
            id: row.id,
            created_at: row.created_at,
            locked_at: row.locked_at,
            expires_at: row.expires_at,
            status: row.status,
            subtotal: row.subtotal,
            tax: row.tax,
            total: row.total,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LineRow {
    id: String,
    meal_id: String,
    name_snapshot: String,
    quantity: i64,
    unit_price_snapshot: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct LineAddonRow {
    line_id: String,
    addon_id: String,
    name_snapshot: String,
    price_delta_snapshot: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UnitRow {
    id: String,
    line_id: String,
    status: UnitStatus,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct UnitOwnerRow {
    order_id: String,
}

const ORDER_COLUMNS: &str =
    "id, created_at, locked_at, expires_at, status, subtotal, tax, total";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Placement
    // -------------------------------------------------------------------------

    /// Places an order priced from the current menu.
    ///
    /// Client-side prices are never read. Either every row of the order is
    /// committed or none is.
    ///
    /// ## Errors
    /// * `Domain(Validation)` - empty items, bad quantity, negative tax
    /// * `Domain(Validation(AmountOverflow))` - a price sum leaves the i64 range
    /// * `Domain(MenuItemNotFound)` - unknown or unavailable meal
    /// * `Domain(AddonNotFound)` / `Domain(AddonMismatch)` - bad add-on id
    ///
    /// ## Returns
    /// The new order id.
    pub async fn place(
        &self,
        request: &OrderRequest,
        lifecycle: &LifecyclePolicy,
        addon_policy: &dyn AddonSelectionPolicy,
        now: i64,
    ) -> DbResult<String> {
        validate_order_request(request)?;

        let mut tx = self.pool.begin_with(BEGIN_IMMEDIATE).await?;

        let mut lines: Vec<PricedLine> = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let meal = fetch_meal_price(&mut tx, &item.meal_id).await?;
            let found = fetch_addons_by_ids(&mut tx, &item.addons).await?;

            let line = price_line(
                &item.meal_id,
                meal.as_ref(),
                &item.addons,
                &found,
                item.quantity_or_default(),
                addon_policy,
            )?;
            lines.push(line);
        }

        let totals = order_totals(&lines, Money::from_minor(request.tax_or_zero()))?;
        let (locked_at, expires_at) = lifecycle.deadlines(now);
        let order_id = Uuid::new_v4().to_string();

        debug!(order_id = %order_id, lines = lines.len(), "Inserting order");

        sqlx::query(
            "INSERT INTO orders (
                id, created_at, locked_at, expires_at, status, subtotal, tax, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&order_id)
        .bind(now)
        .bind(locked_at)
        .bind(expires_at)
        .bind(OrderStatus::Pending)
        .bind(totals.subtotal.minor())
        .bind(totals.tax.minor())
        .bind(totals.total.minor())
        .execute(&mut *tx)
        .await?;

        let mut unit_count = 0i64;
        for (position, line) in lines.iter().enumerate() {
            insert_line(&mut tx, &order_id, position as i64, line).await?;
            unit_count += line.quantity;
        }

        tx.commit().await?;

        info!(
            order_id = %order_id,
            lines = lines.len(),
            units = unit_count,
            total = %totals.total,
            "Order placed"
        );

        Ok(order_id)
    }

    // -------------------------------------------------------------------------
    // Lifecycle Guard
    // -------------------------------------------------------------------------

    /// Loads an order header and enforces its lifecycle phase.
    ///
    /// An expired order is deleted (lines, snapshots and units cascade)
    /// before `OrderExpired` is returned; this deletion is committed even
    /// though the call fails.
    ///
    /// ## Errors
    /// * `Domain(OrderNotFound)` - no such order
    /// * `Domain(OrderExpired)` - `now > expires_at`
    /// * `Domain(OrderLocked)` - `now > locked_at` and `access` is `Write`
    pub async fn guard(&self, id: &str, access: Access, now: i64) -> DbResult<OrderSummary> {
        let mut conn = self.pool.acquire().await?;
        guard_on(&mut conn, id, access, now).await
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Returns the full order with lines, add-on snapshots and units.
    pub async fn get_view(&self, id: &str, now: i64) -> DbResult<Order> {
        let header = self.guard(id, Access::Read, now).await?;

        let line_rows = sqlx::query_as::<_, LineRow>(
            "SELECT id, meal_id, name_snapshot, quantity, unit_price_snapshot
             FROM order_lines
             WHERE order_id = ?1
             ORDER BY position ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let addon_rows = sqlx::query_as::<_, LineAddonRow>(
            "SELECT a.line_id, a.addon_id, a.name_snapshot, a.price_delta_snapshot
             FROM order_line_addons a
             JOIN order_lines l ON l.id = a.line_id
             WHERE l.order_id = ?1
             ORDER BY a.position ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let unit_rows = sqlx::query_as::<_, UnitRow>(
            "SELECT u.id, u.line_id, u.status
             FROM order_units u
             JOIN order_lines l ON l.id = u.line_id
             WHERE l.order_id = ?1
             ORDER BY u.position ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let mut addons_by_line: HashMap<String, Vec<OrderLineAddon>> = HashMap::new();
        for row in addon_rows {
            addons_by_line
                .entry(row.line_id)
                .or_default()
                .push(OrderLineAddon {
                    addon_id: row.addon_id,
                    name: row.name_snapshot,
                    price_delta: row.price_delta_snapshot,
                });
        }

        let mut units_by_line: HashMap<String, Vec<Unit>> = HashMap::new();
        for row in unit_rows {
            units_by_line.entry(row.line_id.clone()).or_default().push(Unit {
                id: row.id,
                status: row.status,
                line_id: row.line_id,
            });
        }

        let items = line_rows
            .into_iter()
            .map(|row| OrderLine {
                addons: addons_by_line.remove(&row.id).unwrap_or_default(),
                units: units_by_line.remove(&row.id).unwrap_or_default(),
                id: row.id,
                meal_id: row.meal_id,
                name: row.name_snapshot,
                unit_price: row.unit_price_snapshot,
                quantity: row.quantity,
            })
            .collect();

        Ok(Order {
            id: header.id,
            created_at: header.created_at,
            locked_at: header.locked_at,
            expires_at: header.expires_at,
            status: header.status,
            subtotal: header.subtotal,
            tax: header.tax,
            total: header.total,
            items,
        })
    }

    /// Purges expired orders, then lists order headers newest first.
    ///
    /// With `active`, completed orders are left out.
    pub async fn list(&self, active: bool, now: i64) -> DbResult<Vec<OrderSummary>> {
        self.purge_expired(now).await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE (?1 = 0 OR status != 'completed')
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(active)
        .fetch_all(&self.pool)
        .await?;

        debug!(active, count = rows.len(), "Listed orders");

        Ok(rows.into_iter().map(OrderSummary::from).collect())
    }

    /// Deletes every order whose `expires_at` has passed.
    ///
    /// ## Returns
    /// Number of orders removed.
    pub async fn purge_expired(&self, now: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM orders WHERE expires_at < ?1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!(purged, "Purged expired orders");
        }

        Ok(purged)
    }

    // -------------------------------------------------------------------------
    // Writes
    // -------------------------------------------------------------------------

    /// Sets the order status explicitly. No transition graph applies.
    pub async fn update_status(&self, id: &str, status: OrderStatus, now: i64) -> DbResult<()> {
        let mut tx = self.pool.begin_with(BEGIN_IMMEDIATE).await?;

        if let Err(e) = guard_on(&mut tx, id, Access::Write, now).await {
            // keeps the delete of an expired order
            tx.commit().await?;
            return Err(e);
        }

        debug!(order_id = %id, status = %status, "Updating order status");

        sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Sets one unit's status and rolls the order up to `ready` when every
    /// unit is ready.
    ///
    /// The lifecycle guard, the ownership check, the write and the roll-up
    /// all run in one immediate transaction. The unit is checked to belong
    /// to `order_id` before anything is written.
    ///
    /// ## Errors
    /// * lifecycle errors from [`guard`](Self::guard)
    /// * `Domain(UnitNotFound)` - no such unit
    /// * `Domain(UnitNotInOrder)` - the unit belongs to another order
    ///
    /// ## Returns
    /// `true` if the order moved to `ready`.
    pub async fn update_unit_status(
        &self,
        order_id: &str,
        unit_id: &str,
        status: UnitStatus,
        now: i64,
    ) -> DbResult<bool> {
        let mut tx = self.pool.begin_with(BEGIN_IMMEDIATE).await?;

        if let Err(e) = guard_on(&mut tx, order_id, Access::Write, now).await {
            // keeps the delete of an expired order
            tx.commit().await?;
            return Err(e);
        }

        let owner = sqlx::query_as::<_, UnitOwnerRow>(
            "SELECT l.order_id
             FROM order_units u
             JOIN order_lines l ON l.id = u.line_id
             WHERE u.id = ?1",
        )
        .bind(unit_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::UnitNotFound(unit_id.to_string()))?;

        if owner.order_id != order_id {
            return Err(CoreError::UnitNotInOrder {
                unit_id: unit_id.to_string(),
                order_id: order_id.to_string(),
            }
            .into());
        }

        debug!(order_id = %order_id, unit_id = %unit_id, status = %status, "Updating unit status");

        sqlx::query("UPDATE order_units SET status = ?2 WHERE id = ?1")
            .bind(unit_id)
            .bind(status)
            .execute(&mut *tx)
            .await?;

        let rolled_up = roll_up(&mut tx, order_id).await?;

        tx.commit().await?;

        if rolled_up {
            info!(order_id = %order_id, "All units ready, order marked ready");
        }

        Ok(rolled_up)
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

/// Takes the write lock up front. A deferred transaction that reads first
/// cannot wait for the lock when it later writes and fails with SQLITE_BUSY.
const BEGIN_IMMEDIATE: &str = "BEGIN IMMEDIATE";

/// Lifecycle guard on a given connection; see [`OrderRepository::guard`].
///
/// On a transaction, the caller commits even when this fails so that the
/// delete of an expired order is not rolled back.
async fn guard_on(
    conn: &mut SqliteConnection,
    id: &str,
    access: Access,
    now: i64,
) -> DbResult<OrderSummary> {
    let row = sqlx::query_as::<_, OrderRow>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| CoreError::OrderNotFound(id.to_string()))?;

    let phase = OrderPhase::at(row.locked_at, row.expires_at, now);

    if phase == OrderPhase::Expired {
        sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        info!(order_id = %id, expires_at = row.expires_at, "Expired order deleted on access");
    }

    phase.check(access, id)?;

    Ok(row.into())
}

async fn insert_line(
    conn: &mut SqliteConnection,
    order_id: &str,
    position: i64,
    line: &PricedLine,
) -> DbResult<()> {
    let line_id = Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO order_lines (
            id, order_id, meal_id, name_snapshot, quantity, unit_price_snapshot, position
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&line_id)
    .bind(order_id)
    .bind(&line.meal_id)
    .bind(&line.name)
    .bind(line.quantity)
    .bind(line.unit_price.minor())
    .bind(position)
    .execute(&mut *conn)
    .await?;

    for (addon_position, addon) in line.addons.iter().enumerate() {
        sqlx::query(
            "INSERT INTO order_line_addons (
                id, line_id, addon_id, name_snapshot, price_delta_snapshot, position
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&line_id)
        .bind(&addon.addon_id)
        .bind(&addon.name)
        .bind(addon.price_delta)
        .bind(addon_position as i64)
        .execute(&mut *conn)
        .await?;
    }

    for unit_position in 0..line.quantity {
        sqlx::query(
            "INSERT INTO order_units (id, line_id, status, position) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&line_id)
        .bind(UnitStatus::Pending)
        .bind(unit_position)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

async fn roll_up(conn: &mut SqliteConnection, order_id: &str) -> DbResult<bool> {
    let current: OrderStatus = sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
        .bind(order_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

    let units: Vec<UnitStatus> = sqlx::query_scalar(
        "SELECT u.status
         FROM order_units u
         JOIN order_lines l ON l.id = u.line_id
         WHERE l.order_id = ?1",
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;

    let Some(next) = rolled_up_status(current, &units) else {
        return Ok(false);
    };

    sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
        .bind(order_id)
        .bind(next)
        .execute(&mut *conn)
        .await?;

    Ok(true)
}

// =============================================================================
// Unit Tests
// =============================================================================
