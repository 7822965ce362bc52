//! # Kiosk API
//!
//! HTTP/JSON surface for the ordering client and the kitchen display.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kiosk API Server                                 │
//! │                                                                         │
//! │  Ordering client ──┐                                                    │
//! │                    ├──► HTTP (8787) /api ──► routes ──► kiosk-db        │
//! │  Kitchen display ──┘      │                               │             │
//! │                           │ TraceLayer, CORS, OPTIONS→204 ▼             │
//! │                           │                             SQLite          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`build_app`] returns the fully layered router; `main` serves it and
//! the integration tests drive it with `tower::ServiceExt::oneshot`.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use kiosk_core::{AddonSelectionPolicy, LifecyclePolicy, PermissivePolicy};
use kiosk_db::Database;

pub use config::{ConfigError, KioskConfig};
pub use error::{ApiError, ErrorCode};
pub use routes::build_app;

/// Source of the current instant, in epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub lifecycle: LifecyclePolicy,
    pub addon_policy: Arc<dyn AddonSelectionPolicy>,
    clock: Clock,
}

impl AppState {
    /// State with the wall clock and no add-on cardinality rules.
    pub fn new(db: Database, lifecycle: LifecyclePolicy) -> Self {
        AppState {
            db,
            lifecycle,
            addon_policy: Arc::new(PermissivePolicy),
            clock: Arc::new(|| chrono::Utc::now().timestamp_millis()),
        }
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the add-on selection policy.
    pub fn with_addon_policy(mut self, policy: Arc<dyn AddonSelectionPolicy>) -> Self {
        self.addon_policy = policy;
        self
    }

    /// Current instant in epoch milliseconds.
    pub fn now(&self) -> i64 {
        (self.clock)()
    }
}
