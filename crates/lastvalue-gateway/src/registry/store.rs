use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use lastvalue_core::error::Result;
use lastvalue_core::{AttributeRecord, AttributeValue, Identity, MetricSample, WriteOutcome};

use super::expiry::ExpiryPolicy;

/// What an accepted `upsert` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// This sample created the identity.
    pub created: bool,
    pub write: WriteOutcome,
}

struct EntryState {
    record: AttributeRecord,
    last_touched: Instant,
    /// Set under the lock when the entry leaves the map; writers holding a stale
    /// `Arc` must retry against the map.
    retired: bool,
}

/// One identity's record. Mutations are serialized per identity.
struct IdentityEntry {
    state: Mutex<EntryState>,
}

impl IdentityEntry {
    fn new(record: AttributeRecord, now: Instant) -> Self {
        Self {
            state: Mutex::new(EntryState {
                record,
                last_touched: now,
                retired: false,
            }),
        }
    }

    /// Entry holding only `sample`. Built fully before insert, so readers never
    /// see an empty identity.
    fn first(sample: &MetricSample, now: Instant) -> (Arc<Self>, WriteOutcome) {
        let mut record = AttributeRecord::new();
        let write = record.apply(sample.name(), sample.value(), sample.timestamp());
        (Arc::new(Self::new(record, now)), write)
    }

    // A poisoned lock only means another writer panicked mid-apply; the record
    // itself is always left in a consistent state by `AttributeRecord::apply`.
    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Identity-keyed last-value store:
/// - `Identity -> IdentityEntry` in a sharded map
/// - per-entry mutex for writes, so unrelated identities never contend
///
/// Lock order is always map shard, then entry mutex.
pub struct Registry {
    entries: DashMap<Identity, Arc<IdentityEntry>>,
    expiry: ExpiryPolicy,
    writes: AtomicU64,
    evicted: AtomicU64,
}

impl Registry {
    pub fn new(expiry: ExpiryPolicy) -> Self {
        Self {
            entries: DashMap::new(),
            expiry,
            writes: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    pub fn expiry(&self) -> &ExpiryPolicy {
        &self.expiry
    }

    /// Apply one sample. Fails only when the sample lacks an identity tag, in
    /// which case nothing is stored.
    pub fn upsert(&self, sample: &MetricSample) -> Result<UpsertOutcome> {
        let identity = sample.identity()?;
        let now = Instant::now();

        let outcome = loop {
            let entry = match self.entries.entry(identity.clone()) {
                Entry::Occupied(mut o) => {
                    // An expired identity is replaced, never revived: its old
                    // attributes must not resurface.
                    if self.retire_if_stale(o.get(), now) {
                        let (fresh, write) = IdentityEntry::first(sample, now);
                        o.insert(fresh);
                        self.evicted.fetch_add(1, Ordering::Relaxed);
                        tracing::info!(identity = %identity, "identity expired; replaced by new sample");
                        break UpsertOutcome { created: true, write };
                    }
                    Arc::clone(o.get())
                }
                Entry::Vacant(v) => {
                    let (fresh, write) = IdentityEntry::first(sample, now);
                    v.insert(fresh);
                    tracing::debug!(identity = %identity, metric = sample.name(), "identity registered");
                    break UpsertOutcome { created: true, write };
                }
            };

            let mut state = entry.lock();
            if state.retired {
                continue;
            }
            let write = state
                .record
                .apply(sample.name(), sample.value(), sample.timestamp());
            if write.is_accepted() {
                state.last_touched = state.last_touched.max(now);
            } else {
                tracing::debug!(
                    identity = %identity,
                    metric = sample.name(),
                    timestamp = sample.timestamp(),
                    "out-of-order sample discarded"
                );
            }
            break UpsertOutcome { created: false, write };
        };

        let n = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if self.expiry.sweep_due(n) {
            self.evict_stale();
        }
        Ok(outcome)
    }

    /// Live identities, sorted. Stale ones found along the way are evicted.
    ///
    /// Map entries are copied out shard by shard; expiry is evaluated on the copy
    /// so writers are never blocked for the whole enumeration.
    pub fn list(&self) -> Vec<Identity> {
        let now = Instant::now();
        let mut live = Vec::new();
        for (identity, entry) in self.snapshot() {
            let state = entry.lock();
            if state.retired || state.record.is_empty() {
                continue;
            }
            if self.expiry.is_stale(state.last_touched, now) {
                drop(state);
                self.evict_if_stale(&identity, now);
                continue;
            }
            live.push(identity);
        }
        live.sort();
        live
    }

    pub fn read(&self, identity: &Identity, name: &str) -> Option<AttributeValue> {
        self.with_live(identity, |record| record.get(name)).flatten()
    }

    /// All attributes of a live identity, sorted by name.
    pub fn attributes(&self, identity: &Identity) -> Option<Vec<(String, AttributeValue)>> {
        self.with_live(identity, |record| {
            record.iter().map(|(k, v)| (k.to_string(), v)).collect()
        })
    }

    /// Drop an identity. Returns whether it was present.
    pub fn remove(&self, identity: &Identity) -> bool {
        self.entries
            .remove_if(identity, |_, entry| {
                entry.lock().retired = true;
                true
            })
            .is_some()
    }

    /// Evict every stale identity. Returns how many were removed.
    pub fn evict_stale(&self) -> usize {
        if self.expiry.ttl().is_none() {
            return 0;
        }
        let now = Instant::now();
        self.snapshot()
            .into_iter()
            .filter(|(_, entry)| {
                let state = entry.lock();
                !state.retired && self.expiry.is_stale(state.last_touched, now)
            })
            .filter(|(identity, _)| self.evict_if_stale(identity, now))
            .count()
    }

    /// Teardown: remove every entry. Returns how many were removed.
    pub fn shutdown(&self) -> usize {
        let keys: Vec<Identity> = self.entries.iter().map(|e| e.key().clone()).collect();
        let removed = keys.iter().filter(|k| self.remove(k)).count();
        tracing::info!(removed, "registry cleared");
        removed
    }

    /// Identities a `list()` would return right now, without evicting anything.
    pub fn live_len(&self) -> usize {
        let now = Instant::now();
        self.snapshot()
            .iter()
            .filter(|(_, entry)| {
                let state = entry.lock();
                !state.retired
                    && !state.record.is_empty()
                    && !self.expiry.is_stale(state.last_touched, now)
            })
            .count()
    }

    /// Entries physically present, including stale ones not yet evicted.
    pub fn physical_len(&self) -> usize {
        self.entries.len()
    }

    pub fn evicted_total(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Marks `entry` retired when stale at `now`. Callers hold the shard lock
    /// for the identity, so the entry is still the one mapped to it.
    fn retire_if_stale(&self, entry: &IdentityEntry, now: Instant) -> bool {
        let mut state = entry.lock();
        if self.expiry.is_stale(state.last_touched, now) {
            state.retired = true;
            true
        } else {
            false
        }
    }

    fn snapshot(&self) -> Vec<(Identity, Arc<IdentityEntry>)> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect()
    }

    fn with_live<R>(&self, identity: &Identity, f: impl FnOnce(&AttributeRecord) -> R) -> Option<R> {
        let now = Instant::now();
        let entry = self.entries.get(identity).map(|e| Arc::clone(e.value()))?;
        let state = entry.lock();
        if state.retired || state.record.is_empty() {
            return None;
        }
        if self.expiry.is_stale(state.last_touched, now) {
            drop(state);
            self.evict_if_stale(identity, now);
            return None;
        }
        Some(f(&state.record))
    }

    /// Remove `identity` if the entry currently mapped to it is stale. The check
    /// is repeated under the shard lock so a concurrent write that refreshed the
    /// entry wins over eviction.
    fn evict_if_stale(&self, identity: &Identity, now: Instant) -> bool {
        let removed = self
            .entries
            .remove_if(identity, |_, entry| self.retire_if_stale(entry, now))
            .is_some();
        if removed {
            self.evicted.fetch_add(1, Ordering::Relaxed);
            tracing::info!(identity = %identity, "identity expired");
        }
        removed
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(ExpiryPolicy::never())
    }
}
