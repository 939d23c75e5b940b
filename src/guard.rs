//! Per-key mutual exclusion for asynchronous units of work
//!
//! `KeyedGuard` lets at most one operation per key run at a time while
//! operations on different keys proceed in parallel. It is a gate, not a
//! cache: every call runs its operation.
//!
//! The key table is split into shards, each behind its own short-lived lock.
//! A shard lock is only held to look up, insert or remove a slot, never while
//! an operation runs. A slot is dropped from the table as soon as no caller
//! holds or awaits it.

use parking_lot::Mutex;
use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use tokio::sync::{Mutex as SlotLock, OwnedMutexGuard};

/// Default number of independently locked shards
const DEFAULT_SHARDS: usize = 16;

type Slot = Arc<SlotLock<()>>;
type Shard<K> = Mutex<HashMap<K, Slot>>;

/// Serializes operations that share a key
pub struct KeyedGuard<K> {
    shards: Box<[Shard<K>]>,
    hasher: RandomState,
}

impl<K> KeyedGuard<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    /// Create a guard with the default shard count
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARDS)
    }

    /// Create a guard with a custom shard count (at least one)
    pub fn with_shards(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    /// Run `operation` once no other caller is running one for an equal key
    ///
    /// The key is released when the operation completes, when it panics, and
    /// when the returned future is dropped before completion. Waiters for the
    /// same key are admitted one at a time.
    pub async fn guard_by_key<F, Fut, T>(&self, key: K, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _held = self.acquire(key).await;
        operation().await
    }

    /// Number of keys currently held or awaited
    pub fn in_flight(&self) -> usize {
        self.shards.iter().map(|shard| shard.lock().len()).sum()
    }

    fn shard_for(&self, key: &K) -> &Shard<K> {
        let index = (self.hasher.hash_one(key) as usize) % self.shards.len();
        &self.shards[index]
    }

    async fn acquire(&self, key: K) -> HeldKey<'_, K> {
        let shard = self.shard_for(&key);
        let slot = {
            let mut table = shard.lock();
            Arc::clone(table.entry(key.clone()).or_default())
        };

        // Registered before waiting so that a cancelled wait still cleans up.
        let mut held = HeldKey {
            shard,
            key,
            slot,
            permit: None,
        };
        tracing::trace!(key = ?held.key, "waiting for key");
        held.permit = Some(Arc::clone(&held.slot).lock_owned().await);
        tracing::trace!(key = ?held.key, "acquired key");
        held
    }
}

impl<K> Default for KeyedGuard<K>
where
    K: Eq + Hash + Clone + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for KeyedGuard<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedGuard")
            .field("shards", &self.shards.len())
            .finish()
    }
}

/// A caller's registration for one key, holding the slot once acquired
struct HeldKey<'a, K>
where
    K: Eq + Hash + fmt::Debug,
{
    shard: &'a Shard<K>,
    key: K,
    slot: Slot,
    permit: Option<OwnedMutexGuard<()>>,
}

impl<K> Drop for HeldKey<'_, K>
where
    K: Eq + Hash + fmt::Debug,
{
    fn drop(&mut self) {
        let was_held = self.permit.take().is_some();

        // Clones of a slot are only made under the shard lock, so the count
        // read here is exact: the table's reference plus ours means nobody
        // else holds or awaits this key.
        let mut table = self.shard.lock();
        if Arc::strong_count(&self.slot) == 2 {
            if let Some(existing) = table.get(&self.key) {
                if Arc::ptr_eq(existing, &self.slot) {
                    table.remove(&self.key);
                }
            }
        }
        drop(table);

        if was_held {
            tracing::trace!(key = ?self.key, "released key");
        } else {
            tracing::trace!(key = ?self.key, "abandoned wait for key");
        }
    }
}
