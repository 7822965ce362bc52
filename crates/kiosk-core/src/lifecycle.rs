//! # Order Lifecycle
//!
//! Time-gated mutability of orders.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  created_at           locked_at (+4h)              expires_at (+24h)   │
//! │      │                     │                              │            │
//! │      ▼                     ▼                              ▼            │
//! │      ├──── MUTABLE ────────┤──────── LOCKED ──────────────┤── EXPIRED ─►│
//! │      │ reads  ✓            │ reads  ✓                     │ any access │
//! │      │ writes ✓            │ writes ✗ (OrderLocked)       │ deletes the│
//! │      │                     │                              │ order, then│
//! │      │                     │                              │ NotFound   │
//! │                                                                         │
//! │  Boundaries: now == locked_at is still MUTABLE,                         │
//! │              now == expires_at is still LOCKED.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The phase is evaluated on every access; nothing runs on a timer.
//! All instants are Unix epoch milliseconds.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};
use crate::{DEFAULT_EXPIRE_AFTER_HOURS, DEFAULT_LOCK_AFTER_HOURS};

const MS_PER_HOUR: i64 = 60 * 60 * 1000;

// =============================================================================
// Policy
// =============================================================================

/// Lock and expiry offsets applied at order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecyclePolicy {
    lock_after_ms: i64,
    expire_after_ms: i64,
}

impl LifecyclePolicy {
    /// Creates a policy.
    ///
    /// ## Errors
    /// `InvalidLifecyclePolicy` unless `lock_after < expire_after`.
    pub fn new(lock_after: Duration, expire_after: Duration) -> CoreResult<Self> {
        let lock_after_ms = duration_ms(lock_after)?;
        let expire_after_ms = duration_ms(expire_after)?;

        if lock_after_ms >= expire_after_ms {
            return Err(CoreError::InvalidLifecyclePolicy {
                reason: format!(
                    "lock offset ({lock_after_ms}ms) must be before expiry offset ({expire_after_ms}ms)"
                ),
            });
        }

        Ok(LifecyclePolicy {
            lock_after_ms,
            expire_after_ms,
        })
    }

    /// Returns `(locked_at, expires_at)` for an order created at `created_at`.
    ///
    /// ## Example
    /// ```rust
    /// use kiosk_core::lifecycle::LifecyclePolicy;
    ///
    /// let (locked_at, expires_at) = LifecyclePolicy::default().deadlines(0);
    /// assert_eq!(locked_at, 4 * 3_600_000);
    /// assert_eq!(expires_at, 24 * 3_600_000);
    /// ```
    pub fn deadlines(&self, created_at: i64) -> (i64, i64) {
        (
            created_at + self.lock_after_ms,
            created_at + self.expire_after_ms,
        )
    }

    pub fn lock_after_ms(&self) -> i64 {
        self.lock_after_ms
    }

    pub fn expire_after_ms(&self) -> i64 {
        self.expire_after_ms
    }
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        LifecyclePolicy {
            lock_after_ms: DEFAULT_LOCK_AFTER_HOURS * MS_PER_HOUR,
            expire_after_ms: DEFAULT_EXPIRE_AFTER_HOURS * MS_PER_HOUR,
        }
    }
}

fn duration_ms(d: Duration) -> CoreResult<i64> {
    i64::try_from(d.as_millis()).map_err(|_| CoreError::InvalidLifecyclePolicy {
        reason: format!("offset {d:?} out of range"),
    })
}

// =============================================================================
// Phase
// =============================================================================

/// What the caller intends to do with the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Where an order sits on its timeline at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    Mutable,
    Locked,
    Expired,
}

impl OrderPhase {
    /// Evaluates the phase at `now`.
    pub fn at(locked_at: i64, expires_at: i64, now: i64) -> Self {
        if now > expires_at {
            OrderPhase::Expired
        } else if now > locked_at {
            OrderPhase::Locked
        } else {
            OrderPhase::Mutable
        }
    }

    /// Checks whether `access` is permitted in this phase.
    ///
    /// ## Returns
    /// * `Err(OrderExpired)` - for any access once expired
    /// * `Err(OrderLocked)` - for writes while locked
    pub fn check(&self, access: Access, order_id: &str) -> CoreResult<()> {
        match (self, access) {
            (OrderPhase::Expired, _) => Err(CoreError::OrderExpired(order_id.to_string())),
            (OrderPhase::Locked, Access::Write) => {
                Err(CoreError::OrderLocked(order_id.to_string()))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const H: i64 = MS_PER_HOUR;

    #[test]
    fn test_default_deadlines() {
        let (locked_at, expires_at) = LifecyclePolicy::default().deadlines(1_000);
        assert_eq!(locked_at, 1_000 + 4 * H);
        assert_eq!(expires_at, 1_000 + 24 * H);
        assert!(locked_at < expires_at);
    }

    #[test]
    fn test_phase_boundaries() {
        let (locked_at, expires_at) = LifecyclePolicy::default().deadlines(0);

        assert_eq!(OrderPhase::at(locked_at, expires_at, 0), OrderPhase::Mutable);
        assert_eq!(OrderPhase::at(locked_at, expires_at, locked_at), OrderPhase::Mutable);
        assert_eq!(OrderPhase::at(locked_at, expires_at, locked_at + 1), OrderPhase::Locked);
        assert_eq!(OrderPhase::at(locked_at, expires_at, expires_at), OrderPhase::Locked);
        assert_eq!(OrderPhase::at(locked_at, expires_at, expires_at + 1), OrderPhase::Expired);
    }

    #[test]
    fn test_access_rules() {
        assert!(OrderPhase::Mutable.check(Access::Write, "o").is_ok());
        assert!(OrderPhase::Locked.check(Access::Read, "o").is_ok());
        assert!(matches!(
            OrderPhase::Locked.check(Access::Write, "o"),
            Err(CoreError::OrderLocked(_))
        ));
        assert!(matches!(
            OrderPhase::Expired.check(Access::Read, "o"),
            Err(CoreError::OrderExpired(_))
        ));
    }

    #[test]
    fn test_policy_rejects_lock_after_expiry() {
        let err = LifecyclePolicy::new(Duration::from_secs(7200), Duration::from_secs(3600));
        assert!(matches!(err, Err(CoreError::InvalidLifecyclePolicy { .. })));

        let same = LifecyclePolicy::new(Duration::from_secs(60), Duration::from_secs(60));
        assert!(same.is_err());

        let ok = LifecyclePolicy::new(Duration::from_secs(60), Duration::from_secs(120)).unwrap();
        assert_eq!(ok.deadlines(0), (60_000, 120_000));
    }
}
