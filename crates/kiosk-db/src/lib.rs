//! # kiosk-db: Database Layer for the Kiosk Backend
//!
//! SQLite storage for the menu and for orders, via sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk Data Flow                                  │
//! │                                                                         │
//! │  HTTP handler (POST /api/orders)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kiosk-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (menu.rs,    │    │  (embedded)  │  │   │
//! │  │   │               │    │   order.rs)   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ MenuRepo      │    │ 001_init.sql │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ pricing / lifecycle / rollup  │   │
//! │  │                                ▼                                │   │
//! │  │                          kiosk-core                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (KIOSK_DATABASE_PATH)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiosk_core::{LifecyclePolicy, PermissivePolicy};
//! use kiosk_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./kiosk.db")).await?;
//!
//! let order_id = db
//!     .orders()
//!     .place(&request, &LifecyclePolicy::default(), &PermissivePolicy, now)
//!     .await?;
//! let order = db.orders().get_view(&order_id, now).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::menu::MenuRepository;
pub use repository::order::OrderRepository;
