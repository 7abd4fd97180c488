// cooldown.rs - Sliding-window rate limiting per invoking entity
// Each command owns at most one Cooldown. State is a map from entity id to
// the timestamps of that entity's invocations still inside the window.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use log::debug;
use tokio::time::Instant;

use super::error::CooldownError;

/// Once this many entities are tracked, `check` sweeps out idle ones. After a
/// sweep the trigger moves to twice the survivors, so a large active set is
/// not rescanned on every call.
const EVICTION_THRESHOLD: usize = 256;

/// Identifier of the entity a cooldown is tracked for (the message author).
pub type EntityId = u64;

/// Allows at most `rate` invocations per entity in any sliding `per` window.
#[derive(Debug)]
pub struct Cooldown {
    rate: u32,
    per: Duration,
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    buckets: HashMap<EntityId, VecDeque<Instant>>,
    /// Entity count above which the next `check` sweeps.
    sweep_above: usize,
}

impl State {
    fn evict(&mut self, per: Duration, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, stamps| {
            Cooldown::purge(stamps, per, now);
            !stamps.is_empty()
        });
        self.sweep_above = EVICTION_THRESHOLD.max(self.buckets.len() * 2);
        before - self.buckets.len()
    }
}

impl Cooldown {
    pub fn new(rate: u32, per: Duration) -> Self {
        Self {
            rate,
            per,
            state: Mutex::new(State {
                buckets: HashMap::new(),
                sweep_above: EVICTION_THRESHOLD,
            }),
        }
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }

    pub fn per(&self) -> Duration {
        self.per
    }

    /// Checks and records an invocation by `entity` at the current time.
    pub fn check(&self, entity: EntityId) -> Result<(), CooldownError> {
        self.check_at(entity, Instant::now())
    }

    /// Purges timestamps older than the window, then either rejects or records
    /// `now`. The whole sequence runs under one lock with no await inside.
    pub fn check_at(&self, entity: EntityId, now: Instant) -> Result<(), CooldownError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.buckets.len() > state.sweep_above {
            let evicted = state.evict(self.per, now);
            debug!("[COOLDOWN] Evicted {} idle entities, next sweep above {}", evicted, state.sweep_above);
        }

        let stamps = state.buckets.entry(entity).or_default();
        Self::purge(stamps, self.per, now);

        if stamps.len() >= self.rate as usize {
            // rate == 0 leaves the deque empty; such a command can never run
            let retry_after = stamps
                .front()
                .map(|oldest| (*oldest + self.per).saturating_duration_since(now))
                .unwrap_or(self.per);
            return Err(CooldownError { retry_after });
        }

        stamps.push_back(now);
        Ok(())
    }

    /// Drops every entity with no invocation inside the window. Returns the
    /// number of entities removed.
    pub fn evict_stale(&self, now: Instant) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.evict(self.per, now)
    }

    /// Number of entities currently tracked.
    pub fn tracked(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).buckets.len()
    }

    fn purge(stamps: &mut VecDeque<Instant>, per: Duration, now: Instant) {
        while let Some(oldest) = stamps.front() {
            if now.saturating_duration_since(*oldest) >= per {
                stamps.pop_front();
            } else {
                break;
            }
        }
    }
}
