//! # Menu Repository
//!
//! Database operations for menu items and their add-ons.
//!
//! ## Soft Delete
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Placed orders copy meal_id / addon_id as plain values, so a menu row   │
//! │  can change or vanish without touching history. Items are still only   │
//! │  soft-deleted (is_available = 0): they disappear from the listing and   │
//! │  can no longer be ordered.                                              │
//! │                                                                         │
//! │  Add-ons are owned by their item. Replacing an item's add-on set        │
//! │  deletes and reinserts them in one transaction.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::sqlite::Sqlite;
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use kiosk_core::pricing::MealPrice;
use kiosk_core::validation::{validate_menu_item_patch, validate_new_menu_item};
use kiosk_core::{MenuAddon, MenuItem, MenuItemPatch, NewMenuAddon, NewMenuItem};

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct MenuItemRow {
    id: String,
    name: String,
    description: Option<String>,
    price: i64,
    image_url: Option<String>,
    tags: String,
    is_featured: bool,
    is_available: bool,
    created_at: i64,
}

impl MenuItemRow {
    fn into_item(self, addons: Vec<MenuAddon>) -> DbResult<MenuItem> {
        let tags: Vec<String> = serde_json::from_str(&self.tags)
            .map_err(|e| DbError::CorruptRow(format!("menu_items.tags for {}: {e}", self.id)))?;

        Ok(MenuItem {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            tags,
            is_featured: self.is_featured,
            is_available: self.is_available,
            created_at: self.created_at,
            addons,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MenuAddonRow {
    id: String,
    menu_item_id: String,
    name: String,
    price_delta: i64,
    is_required: bool,
    max_select: i64,
}

impl From<MenuAddonRow> for MenuAddon {
    fn from(row: MenuAddonRow) -> Self {
        MenuAddon {
            id: row.id,
            menu_item_id: row.menu_item_id,
            name: row.name,
            price_delta: row.price_delta,
            is_required: row.is_required,
            max_select: row.max_select,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MealPriceRow {
    id: String,
    name: String,
    price: i64,
    is_available: bool,
}

const ITEM_COLUMNS: &str =
    "id, name, description, price, image_url, tags, is_featured, is_available, created_at";

const ADDON_COLUMNS: &str = "id, menu_item_id, name, price_delta, is_required, max_select";

fn encode_tags(tags: &[String]) -> DbResult<String> {
    serde_json::to_string(tags).map_err(|e| DbError::Internal(e.to_string()))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for menu database operations.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Lists available items with their add-ons, oldest first.
    pub async fn list_available(&self) -> DbResult<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items
             WHERE is_available = 1
             ORDER BY created_at ASC, rowid ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        let addon_rows = sqlx::query_as::<_, MenuAddonRow>(
            "SELECT a.id, a.menu_item_id, a.name, a.price_delta, a.is_required, a.max_select
             FROM menu_addons a
             JOIN menu_items m ON m.id = a.menu_item_id
             WHERE m.is_available = 1
             ORDER BY a.created_at ASC, a.rowid ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_item: HashMap<String, Vec<MenuAddon>> = HashMap::new();
        for row in addon_rows {
            by_item
                .entry(row.menu_item_id.clone())
                .or_default()
                .push(row.into());
        }

        debug!(count = rows.len(), "Listed available menu items");

        rows.into_iter()
            .map(|row| {
                let addons = by_item.remove(&row.id).unwrap_or_default();
                row.into_item(addons)
            })
            .collect()
    }

    /// Gets a menu item by ID, available or not.
    pub async fn get(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM menu_items WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let addons = sqlx::query_as::<_, MenuAddonRow>(&format!(
            "SELECT {ADDON_COLUMNS} FROM menu_addons
             WHERE menu_item_id = ?1
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(MenuAddon::from)
        .collect();

        row.into_item(addons).map(Some)
    }

    /// Creates a menu item and its add-ons in one transaction.
    ///
    /// ## Returns
    /// The stored item with generated ids.
    pub async fn create(&self, item: &NewMenuItem, now: i64) -> DbResult<MenuItem> {
        validate_new_menu_item(item)?;

        let id = Uuid::new_v4().to_string();
        let tags = encode_tags(&item.tags)?;
        let is_available = item.is_available.unwrap_or(true);

        debug!(id = %id, name = %item.name, addons = item.addons.len(), "Creating menu item");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO menu_items (
                id, name, description, price, image_url, tags,
                is_featured, is_available, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&id)
        .bind(item.name.trim())
        .bind(&item.description)
        .bind(item.price)
        .bind(&item.image_url)
        .bind(&tags)
        .bind(item.is_featured)
        .bind(is_available)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let addons = insert_addons(&mut tx, &id, &item.addons, now).await?;

        tx.commit().await?;

        Ok(MenuItem {
            id,
            name: item.name.trim().to_string(),
            description: item.description.clone(),
            price: item.price,
            image_url: item.image_url.clone(),
            tags: item.tags.clone(),
            is_featured: item.is_featured,
            is_available,
            created_at: now,
            addons,
        })
    }

    /// Applies a partial update. Absent fields keep their stored value.
    ///
    /// When `patch.addons` is present the whole add-on set is replaced in the
    /// same transaction.
    ///
    /// ## Errors
    /// `NotFound` if no item has this id.
    pub async fn update(&self, id: &str, patch: &MenuItemPatch, now: i64) -> DbResult<()> {
        validate_menu_item_patch(patch)?;

        let tags = patch.tags.as_deref().map(encode_tags).transpose()?;
        let name = patch.name.as_deref().map(str::trim);

        debug!(id = %id, replace_addons = patch.addons.is_some(), "Updating menu item");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE menu_items SET
                name         = COALESCE(?2, name),
                description  = COALESCE(?3, description),
                price        = COALESCE(?4, price),
                image_url    = COALESCE(?5, image_url),
                tags         = COALESCE(?6, tags),
                is_featured  = COALESCE(?7, is_featured),
                is_available = COALESCE(?8, is_available)
             WHERE id = ?1",
        )
        .bind(id)
        .bind(name)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(&patch.image_url)
        .bind(&tags)
        .bind(patch.is_featured)
        .bind(patch.is_available)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        if let Some(addons) = &patch.addons {
            sqlx::query("DELETE FROM menu_addons WHERE menu_item_id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_addons(&mut tx, id, addons, now).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Hides an item from the menu and from ordering.
    ///
    /// ## Errors
    /// `NotFound` if no item has this id.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting menu item");

        let result = sqlx::query("UPDATE menu_items SET is_available = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("MenuItem", id));
        }

        Ok(())
    }

    /// Counts stored items, available or not.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_addons(
    conn: &mut SqliteConnection,
    menu_item_id: &str,
    addons: &[NewMenuAddon],
    now: i64,
) -> DbResult<Vec<MenuAddon>> {
    let mut stored = Vec::with_capacity(addons.len());

    for addon in addons {
        let id = Uuid::new_v4().to_string();
        let max_select = addon.max_select_or_default();

        sqlx::query(
            "INSERT INTO menu_addons (
                id, menu_item_id, name, price_delta, is_required, max_select, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&id)
        .bind(menu_item_id)
        .bind(&addon.name)
        .bind(addon.price_delta)
        .bind(addon.is_required)
        .bind(max_select)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        stored.push(MenuAddon {
            id,
            menu_item_id: menu_item_id.to_string(),
            name: addon.name.clone(),
            price_delta: addon.price_delta,
            is_required: addon.is_required,
            max_select,
        });
    }

    Ok(stored)
}

// =============================================================================
// Pricing Lookups
// =============================================================================
//
// Used by order placement on its own transaction so the prices read are the
// prices committed with the order.

/// Loads the current price row of a meal.
pub(crate) async fn fetch_meal_price(
    conn: &mut SqliteConnection,
    meal_id: &str,
) -> DbResult<Option<MealPrice>> {
    let row = sqlx::query_as::<_, MealPriceRow>(
        "SELECT id, name, price, is_available FROM menu_items WHERE id = ?1",
    )
    .bind(meal_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(|r| MealPrice {
        id: r.id,
        name: r.name,
        price: r.price,
        is_available: r.is_available,
    }))
}

/// Loads the add-on rows for the given ids, whichever meal owns them.
///
/// Ids with no row are simply absent from the result.
pub(crate) async fn fetch_addons_by_ids(
    conn: &mut SqliteConnection,
    ids: &[String],
) -> DbResult<Vec<MenuAddon>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut unique: Vec<&str> = ids.iter().map(String::as_str).collect();
    unique.sort_unstable();
    unique.dedup();

    let mut qb: QueryBuilder<'_, Sqlite> =
        QueryBuilder::new(format!("SELECT {ADDON_COLUMNS} FROM menu_addons WHERE id IN ("));
    let mut separated = qb.separated(", ");
    for id in &unique {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let rows = qb
        .build_query_as::<MenuAddonRow>()
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(MenuAddon::from).collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn burger() -> NewMenuItem {
        NewMenuItem {
            name: "Burger".to_string(),
            description: Some("Beef patty".to_string()),
            price: 500,
            tags: vec!["beef".to_string(), "grill".to_string()],
            is_featured: true,
            addons: vec![
                NewMenuAddon {
                    name: "Bacon".to_string(),
                    price_delta: 150,
                    ..Default::default()
                },
                NewMenuAddon {
                    name: "Sauce".to_string(),
                    price_delta: 40,
                    is_required: true,
                    max_select: Some(2),
                },
            ],
            ..Default::default()
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = db().await;
        let created = db.menu().create(&burger(), 1_000).await.unwrap();

        assert!(created.is_available);
        assert_eq!(created.addons.len(), 2);
        assert_eq!(created.addons[0].max_select, 1);

        let fetched = db.menu().get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.tags, vec!["beef", "grill"]);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_item() {
        let db = db().await;
        let mut item = burger();
        item.name = "  ".to_string();

        let err = db.menu().create(&item, 0).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(_)));
        assert_eq!(db.menu().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_available_in_creation_order() {
        let db = db().await;
        let first = db.menu().create(&burger(), 1_000).await.unwrap();
        let mut fries = NewMenuItem {
            name: "Fries".to_string(),
            price: 250,
            ..Default::default()
        };
        let second = db.menu().create(&fries, 2_000).await.unwrap();
        fries.name = "Hidden".to_string();
        fries.is_available = Some(false);
        db.menu().create(&fries, 3_000).await.unwrap();

        let items = db.menu().list_available().await.unwrap();
        let ids: Vec<_> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
        assert_eq!(items[0].addons.len(), 2);
        assert!(items[1].addons.is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let db = db().await;
        let created = db.menu().create(&burger(), 1_000).await.unwrap();

        let patch = MenuItemPatch {
            price: Some(650),
            ..Default::default()
        };
        db.menu().update(&created.id, &patch, 2_000).await.unwrap();

        let item = db.menu().get(&created.id).await.unwrap().unwrap();
        assert_eq!(item.price, 650);
        assert_eq!(item.name, "Burger");
        assert_eq!(item.description.as_deref(), Some("Beef patty"));
        // Add-ons untouched when absent from the patch
        assert_eq!(item.addons, created.addons);
    }

    #[tokio::test]
    async fn test_update_replaces_addons() {
        let db = db().await;
        let created = db.menu().create(&burger(), 1_000).await.unwrap();

        let patch = MenuItemPatch {
            addons: Some(vec![NewMenuAddon {
                name: "Cheese".to_string(),
                price_delta: 80,
                ..Default::default()
            }]),
            ..Default::default()
        };
        db.menu().update(&created.id, &patch, 2_000).await.unwrap();

        let item = db.menu().get(&created.id).await.unwrap().unwrap();
        assert_eq!(item.addons.len(), 1);
        assert_eq!(item.addons[0].name, "Cheese");
        assert!(created.addons.iter().all(|a| a.id != item.addons[0].id));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let db = db().await;

        let err = db
            .menu()
            .update("nope", &MenuItemPatch::default(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.menu().soft_delete("nope").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_item() {
        let db = db().await;
        let created = db.menu().create(&burger(), 1_000).await.unwrap();

        db.menu().soft_delete(&created.id).await.unwrap();

        assert!(db.menu().list_available().await.unwrap().is_empty());
        let item = db.menu().get(&created.id).await.unwrap().unwrap();
        assert!(!item.is_available);
    }

    #[tokio::test]
    async fn test_fetch_addons_by_ids_ignores_unknown_and_duplicates() {
        let db = db().await;
        let created = db.menu().create(&burger(), 1_000).await.unwrap();
        let bacon = created.addons[0].id.clone();

        let mut conn = db.pool().acquire().await.unwrap();
        let found = fetch_addons_by_ids(
            &mut conn,
            &[bacon.clone(), bacon.clone(), "missing".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, bacon);
        assert_eq!(found[0].menu_item_id, created.id);
    }
}
