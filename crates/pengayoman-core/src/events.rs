use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::ads::{AdState, AdSurface, Reward};
use crate::consent::ConsentStatus;

/// Every state change in the system produces an Event.
/// UI components subscribe instead of polling service state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    ConsentChanged {
        status: ConsentStatus,
        can_request_ads: bool,
        at: DateTime<Utc>,
    },
    /// Stored consent was deleted; `initialize()` must run again.
    ConsentReset {
        at: DateTime<Utc>,
    },
    AdFreeGranted {
        expires_at_ms: u64,
        at: DateTime<Utc>,
    },
    AdFreeCleared {
        at: DateTime<Utc>,
    },
    AdStateChanged {
        surface: AdSurface,
        state: AdState,
        at: DateTime<Utc>,
    },
    RewardEarned {
        reward: Reward,
        at: DateTime<Utc>,
    },
}

const EVENT_CAPACITY: usize = 64;

/// Fan-out channel for [`Event`]s.
///
/// Publishing never fails; events sent while nobody listens are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn publish(&self, event: Event) {
        // Err only means there are no receivers right now.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
