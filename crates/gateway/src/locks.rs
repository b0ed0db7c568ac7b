//! Per-order concurrency control.
//!
//! At most one pipeline invocation mutates an order's state at a time,
//! and chat turns alternate strictly. Each order id maps to a
//! `Semaphore(1)`; holding the permit means exclusive access.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use uuid::Uuid;

/// Returned when the order already has an in-flight holder and the
/// caller chose not to wait.
#[derive(Debug)]
pub struct OrderBusy;

impl std::fmt::Display for OrderBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order is busy: another operation is in progress")
    }
}

impl std::error::Error for OrderBusy {}

pub struct OrderLockMap {
    locks: Mutex<HashMap<Uuid, Arc<Semaphore>>>,
}

impl Default for OrderLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn semaphore(&self, order_id: &Uuid) -> Arc<Semaphore> {
        let mut locks = self.locks.lock();
        locks
            .entry(*order_id)
            .or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone()
    }

    /// Wait for the order's lock. Used by chat turns (the next user
    /// turn queues until the prior assistant turn resolves) and the
    /// refund path.
    pub async fn acquire(&self, order_id: &Uuid) -> Result<OwnedSemaphorePermit, OrderBusy> {
        self.semaphore(order_id)
            .acquire_owned()
            .await
            .map_err(|_| OrderBusy)
    }

    /// Take the lock only if it is free. Used by pipeline invocations:
    /// a duplicate trigger racing an in-flight run must not interleave,
    /// so it observes the held lock and backs off.
    pub fn try_acquire(&self, order_id: &Uuid) -> Result<OwnedSemaphorePermit, OrderBusy> {
        self.semaphore(order_id)
            .try_acquire_owned()
            .map_err(|_| OrderBusy)
    }

    /// Number of tracked orders (for monitoring).
    pub fn order_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop entries whose locks are not currently held.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}
