//! # Pengayoman Core Library
//!
//! Business logic for the Doa Pengayoman prayer app. UI front ends (the
//! mobile shell, or the bundled CLI) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Consent**: persisted ad-consent record deciding whether and how ads
//!   may be requested
//! - **Reward**: a 30-minute ad-free window earned from rewarded ads
//! - **Ads**: interstitial/rewarded lifecycle state machines over a
//!   platform SDK trait
//! - **Prayers**: remote prayer list with static fallback, search and
//!   favorites
//! - **Storage**: SQLite key-value store and TOML configuration
//!
//! ## Key Components
//!
//! - [`AppContext`]: composition root owning the shared services
//! - [`ConsentManager`], [`RewardTracker`], [`AdService`]
//! - [`Event`]: state-change notifications for subscribers

pub mod ads;
pub mod clock;
pub mod consent;
pub mod context;
pub mod error;
pub mod events;
pub mod prayers;
pub mod reward;
pub mod storage;

pub use ads::{AdService, AdState, AdSurface, RewardedOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use consent::{ConsentManager, ConsentRecord, ConsentStatus};
pub use context::AppContext;
pub use error::{AdError, ConfigError, CoreError, PrayerApiError, StorageError};
pub use events::{Event, EventBus};
pub use prayers::{Prayer, PrayerCatalog, PrayerClient};
pub use reward::RewardTracker;
pub use storage::{Config, Database, KvStore, MemoryStore};
