//! # Repository Module
//!
//! Database repository implementations for the kiosk store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().place(&request, &policy, &PermissivePolicy, now)  │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── place / guard / get_view / list / purge_expired                   │
//! │  └── update_status / update_unit_status                                │
//! │                                                                         │
//! │  MenuRepository                                                        │
//! │  ├── list_available / get                                              │
//! │  └── create / update / soft_delete                                     │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every repository method takes the current instant (`now`, epoch ms) from
//! its caller instead of reading a clock.
//!
//! ## Available Repositories
//!
//! - [`MenuRepository`](menu::MenuRepository) - Menu CRUD
//! - [`OrderRepository`](order::OrderRepository) - Order placement and lifecycle

pub mod menu;
pub mod order;
