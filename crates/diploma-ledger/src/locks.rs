//! Per-serial mutual exclusion.
//!
//! Every lifecycle transition and ledger write holds the lock for its serial
//! number from the status read until the new status is committed or the
//! operation is abandoned. Different serials never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use diploma_ledger_core::SerialNumber;

/// Held while a serial number is being transitioned.
pub type SerialGuard = OwnedMutexGuard<()>;

/// A lock table keyed by serial number.
///
/// Entries are dropped once no guard or waiter refers to them.
#[derive(Default)]
pub struct SerialLocks {
    table: Mutex<HashMap<SerialNumber, Weak<AsyncMutex<()>>>>,
}

impl SerialLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `serial_no`.
    pub async fn acquire(&self, serial_no: &SerialNumber) -> SerialGuard {
        let lock = self.entry(serial_no);
        lock.lock_owned().await
    }

    /// Serials with a live lock.
    pub fn len(&self) -> usize {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.values().filter(|w| w.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entry(&self, serial_no: &SerialNumber) -> Arc<AsyncMutex<()>> {
        // The table only holds weak handles, so a poisoned guard leaves it usable.
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(lock) = table.get(serial_no).and_then(Weak::upgrade) {
            return lock;
        }
        table.retain(|_, w| w.strong_count() > 0);
        let lock = Arc::new(AsyncMutex::new(()));
        table.insert(serial_no.clone(), Arc::downgrade(&lock));
        lock
    }
}
