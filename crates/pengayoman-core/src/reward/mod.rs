//! Time-boxed ad-free entitlement earned by watching a rewarded ad.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::events::{Event, EventBus};
use crate::storage::KvStore;

/// Storage key holding the window expiry as decimal epoch milliseconds.
pub const AD_FREE_KEY: &str = "ad_free_until";

/// Default window length granted per reward.
pub const REWARD_DURATION: Duration = Duration::from_secs(30 * 60);

/// Tracks a single expiring ad-free window. `0` means no window.
pub struct RewardTracker {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    duration: Duration,
    expires_at: AtomicU64,
}

impl RewardTracker {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self::with_duration(store, clock, events, REWARD_DURATION)
    }

    pub fn with_duration(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        events: EventBus,
        duration: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            events,
            duration,
            expires_at: AtomicU64::new(0),
        }
    }

    /// Load the persisted expiry. Missing or unparsable values count as 0.
    pub fn initialize(&self) {
        let stored = match self.store.get(AD_FREE_KEY) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "failed to load ad-free status");
                None
            }
        };
        let expires_at = stored
            .as_deref()
            .and_then(|raw| match raw.trim().parse::<u64>() {
                Ok(ms) => Some(ms),
                Err(_) => {
                    warn!(raw, "ignoring unparsable ad-free expiry");
                    None
                }
            })
            .unwrap_or(0);
        self.expires_at.store(expires_at, Ordering::SeqCst);
    }

    /// Start a fresh window from now. An active window is replaced, not
    /// extended.
    pub fn grant_reward(&self) {
        let duration_ms = u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX);
        let expires_at = self.clock.now_ms().saturating_add(duration_ms);
        self.expires_at.store(expires_at, Ordering::SeqCst);
        if let Err(e) = self.store.set(AD_FREE_KEY, &expires_at.to_string()) {
            error!(error = %e, "failed to persist ad-free reward");
        }
        info!(minutes = self.duration.as_secs() / 60, "ad-free reward granted");
        self.events.publish(Event::AdFreeGranted {
            expires_at_ms: expires_at,
            at: Utc::now(),
        });
    }

    pub fn expires_at_ms(&self) -> u64 {
        self.expires_at.load(Ordering::SeqCst)
    }

    pub fn is_ad_free(&self) -> bool {
        self.clock.now_ms() < self.expires_at_ms()
    }

    pub fn time_remaining(&self) -> Duration {
        let remaining = self.expires_at_ms().saturating_sub(self.clock.now_ms());
        Duration::from_millis(remaining)
    }

    /// `M:SS`, or an empty string when no window is active.
    pub fn time_remaining_formatted(&self) -> String {
        if !self.is_ad_free() {
            return String::new();
        }
        format_remaining(self.time_remaining())
    }

    /// Drop the window and its stored entry.
    pub fn clear(&self) {
        self.expires_at.store(0, Ordering::SeqCst);
        if let Err(e) = self.store.remove(AD_FREE_KEY) {
            error!(error = %e, "failed to clear ad-free status");
        }
        self.events.publish(Event::AdFreeCleared { at: Utc::now() });
    }
}

fn format_remaining(remaining: Duration) -> String {
    let ms = remaining.as_millis() as u64;
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    format!("{minutes}:{seconds:02}")
}
