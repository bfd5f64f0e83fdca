//! Per-key advisory locks serializing check-then-write sequences.
//!
//! A uniqueness or referential check and the write that follows it run under
//! the lock for the key being checked.
//! Lock order: a `Category` key is always taken before a `ProductName` key.

use std::sync::Arc;

use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LockKey {
    /// A category name being claimed by a create or rename.
    CategoryName(String),
    /// A category whose existence or dependents are being checked.
    Category(i32),
    /// A product name inside one category.
    ProductName(i32, String),
}

#[derive(Default)]
struct Slot {
    mutex: Arc<Mutex<()>>,
    /// Holders plus waiters; only changed under the map shard lock.
    users: usize,
}

#[derive(Default)]
pub struct KeyedLocks {
    slots: DashMap<LockKey, Slot>,
}

/// Held (or awaited) lock; dropping it drops the slot once nobody else uses it.
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: LockKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self { Self::default() }

    pub async fn lock(&self, key: LockKey) -> KeyGuard<'_> {
        // The map shard is released before awaiting the mutex.
        let mutex = {
            let mut slot = self.slots.entry(key.clone()).or_default();
            slot.users += 1;
            Arc::clone(&slot.mutex)
        };
        // Registered before awaiting so a cancelled wait still gives up its slot
        let mut held = KeyGuard { locks: self, key, guard: None };
        held.guard = Some(mutex.lock_owned().await);
        held
    }

    /// Number of keys currently held or awaited.
    pub fn len(&self) -> usize { self.slots.len() }

    pub fn is_empty(&self) -> bool { self.slots.is_empty() }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        if let Entry::Occupied(mut slot) = self.locks.slots.entry(self.key.clone()) {
            slot.get_mut().users -= 1;
            if slot.get().users == 0 {
                slot.remove();
            }
        }
    }
}
