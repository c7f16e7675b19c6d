use tokio::time::{Duration, Instant};

/// Staleness rule for registry entries.
///
/// There is no background timer: the registry consults this policy on every
/// `list`/`read`, and runs a sweep once every `sweep_every_writes` upserts.
/// An idle registry keeps expired entries physically present until the next access.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryPolicy {
    ttl: Option<Duration>,
    sweep_every_writes: u64,
}

impl ExpiryPolicy {
    /// `ttl == None` never expires. A zero TTL makes every entry stale on next access.
    pub fn new(ttl: Option<Duration>, sweep_every_writes: u64) -> Self {
        Self {
            ttl,
            sweep_every_writes: sweep_every_writes.max(1),
        }
    }

    pub fn never() -> Self {
        Self::new(None, 1)
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn is_stale(&self, last_touched: Instant, now: Instant) -> bool {
        match self.ttl {
            None => false,
            Some(ttl) if ttl.is_zero() => true,
            Some(ttl) => now.saturating_duration_since(last_touched) > ttl,
        }
    }

    /// Whether the write numbered `writes` (1-based) should trigger a sweep.
    pub fn sweep_due(&self, writes: u64) -> bool {
        self.ttl.is_some() && writes % self.sweep_every_writes == 0
    }
}
