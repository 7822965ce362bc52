//! # kiosk-core: Pure Business Logic for the Kiosk Backend
//!
//! This crate holds the order-lifecycle and price-snapshotting rules as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │     Ordering client                 Kitchen display client      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP/JSON (/api)                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kiosk-api (axum routes)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kiosk-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  pricing  │  │ lifecycle │  │  rollup   │  │ validation│  │   │
//! │  │   │ snapshots │  │ lock/exp. │  │ all-ready │  │  requests │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kiosk-db (Database Layer)                    │   │
//! │  │           SQLite queries, migrations, transactions              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (MenuItem, Order, OrderLine, Unit, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`pricing`] - Authoritative line pricing from current menu rows
//! - [`lifecycle`] - Lock and expiry deadlines, phase evaluation
//! - [`rollup`] - Aggregate order status from unit statuses
//! - [`validation`] - Request validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use kiosk_core::lifecycle::{Access, LifecyclePolicy, OrderPhase};
//!
//! let policy = LifecyclePolicy::default();
//! let (locked_at, expires_at) = policy.deadlines(0);
//!
//! // One hour in: still mutable
//! let phase = OrderPhase::at(locked_at, expires_at, 3_600_000);
//! assert!(phase.check(Access::Write, "order-1").is_ok());
//!
//! // Five hours in: read-only
//! let phase = OrderPhase::at(locked_at, expires_at, 5 * 3_600_000);
//! assert!(phase.check(Access::Write, "order-1").is_err());
//! assert!(phase.check(Access::Read, "order-1").is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod rollup;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use lifecycle::{Access, LifecyclePolicy, OrderPhase};
pub use money::Money;
pub use pricing::{AddonSelectionPolicy, PermissivePolicy, PricedLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Hours after creation at which an order becomes read-only.
pub const DEFAULT_LOCK_AFTER_HOURS: i64 = 4;

/// Hours after creation at which an order ceases to exist.
pub const DEFAULT_EXPIRE_AFTER_HOURS: i64 = 24;

/// Maximum lines allowed in a single order.
pub const MAX_ORDER_LINES: usize = 100;

/// Maximum quantity on a single line.
///
/// Each unit of quantity becomes its own kitchen unit row, so this also
/// bounds the rows written per line.
pub const MAX_ITEM_QUANTITY: i64 = 999;
