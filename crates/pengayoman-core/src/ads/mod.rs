//! Ad surface lifecycle.
//!
//! The ad SDK itself is an external collaborator behind [`AdSdk`]. This module
//! owns the per-surface state machines for interstitial and rewarded ads:
//!
//! ```text
//! Idle -> Loading -> Loaded -> Showing -> (Closed | Error) -> Loading
//! ```
//!
//! Terminal states reload after a fixed delay with a freshly created ad
//! object. Banner ads are rendered by the UI directly against the SDK; only
//! their unit identifier is resolved here.

mod sdk;
mod service;
mod surface;

pub use sdk::{
    AdHandle, AdId, AdRequest, AdSdk, AdSurface, AdUnitIds, MaxAdContentRating,
    RequestConfiguration, Reward, SdkEvent, SdkEventKind,
};
pub use service::{AdService, RewardedOutcome};
pub use surface::AdState;
