//! Boundary to the third-party mobile ads SDK.
//!
//! Platform bindings implement [`AdSdk`] and deliver every asynchronous SDK
//! callback to [`AdService::handle_sdk_event`](super::AdService::handle_sdk_event).
//! Callbacks must not be delivered re-entrantly from inside `create`, `load`
//! or `show`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::consent::ConsentStatus;
use crate::error::AdError;
use crate::storage::AdsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdSurface {
    Banner,
    Interstitial,
    Rewarded,
}

impl std::fmt::Display for AdSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AdSurface::Banner => "banner",
            AdSurface::Interstitial => "interstitial",
            AdSurface::Rewarded => "rewarded",
        };
        f.write_str(s)
    }
}

/// Identity of one created ad object. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdId(pub u64);

impl std::fmt::Display for AdId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ad#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxAdContentRating {
    G,
    #[serde(rename = "PG")]
    Pg,
    T,
    #[serde(rename = "MA")]
    Ma,
}

/// Global SDK request configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfiguration {
    pub max_ad_content_rating: MaxAdContentRating,
    pub tag_for_child_directed_treatment: bool,
    pub tag_for_under_age_of_consent: bool,
    pub request_non_personalized_ads_only: bool,
}

impl RequestConfiguration {
    /// Personalized ads only with obtained consent; a missing record counts
    /// as no consent.
    pub fn for_consent(status: Option<ConsentStatus>) -> Self {
        let personalized = status.is_some_and(ConsentStatus::allows_personalized_ads);
        Self {
            max_ad_content_rating: MaxAdContentRating::G,
            tag_for_child_directed_treatment: false,
            tag_for_under_age_of_consent: false,
            request_non_personalized_ads_only: !personalized,
        }
    }

    pub fn ad_request(&self) -> AdRequest {
        AdRequest {
            non_personalized_only: self.request_non_personalized_ads_only,
        }
    }
}

/// Per-ad request options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRequest {
    pub non_personalized_only: bool,
}

/// Payload of an earned-reward callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEventKind {
    Loaded,
    Error(String),
    Opened,
    Closed,
    EarnedReward(Reward),
}

/// An SDK callback for one ad object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkEvent {
    pub ad_id: AdId,
    pub kind: SdkEventKind,
}

impl SdkEvent {
    pub fn new(ad_id: AdId, kind: SdkEventKind) -> Self {
        Self { ad_id, kind }
    }
}

/// One SDK ad object. Dropping the handle discards the ad.
pub trait AdHandle: Send + Sync {
    fn id(&self) -> AdId;

    /// Issue the ad request. Completion arrives as `Loaded` or `Error`.
    fn load(&self) -> Result<(), AdError>;

    /// Present the ad. The SDK owns the screen until `Closed`.
    fn show(&self) -> Result<(), AdError>;
}

pub trait AdSdk: Send + Sync {
    fn initialize(&self) -> Result<(), AdError>;

    fn set_request_configuration(&self, config: &RequestConfiguration) -> Result<(), AdError>;

    /// Construct a new ad object for a full-screen surface.
    fn create(
        &self,
        ad_id: AdId,
        surface: AdSurface,
        unit_id: &str,
        request: AdRequest,
    ) -> Result<Arc<dyn AdHandle>, AdError>;
}

/// Resolved ad unit identifiers for the current build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdUnitIds {
    pub interstitial: String,
    pub rewarded: String,
    pub banner: String,
}

impl AdUnitIds {
    pub const TEST_INTERSTITIAL: &'static str = "ca-app-pub-3940256099942544/1033173712";
    pub const TEST_REWARDED: &'static str = "ca-app-pub-3940256099942544/5224354917";
    pub const TEST_BANNER: &'static str = "ca-app-pub-3940256099942544/6300978111";

    /// Public SDK test units.
    pub fn test() -> Self {
        Self {
            interstitial: Self::TEST_INTERSTITIAL.to_string(),
            rewarded: Self::TEST_REWARDED.to_string(),
            banner: Self::TEST_BANNER.to_string(),
        }
    }

    pub fn from_config(config: &AdsConfig) -> Self {
        if config.test_mode {
            return Self::test();
        }
        Self {
            interstitial: config.interstitial_unit_id.clone(),
            rewarded: config.rewarded_unit_id.clone(),
            banner: config.banner_unit_id.clone(),
        }
    }

    pub fn for_surface(&self, surface: AdSurface) -> &str {
        match surface {
            AdSurface::Banner => &self.banner,
            AdSurface::Interstitial => &self.interstitial,
            AdSurface::Rewarded => &self.rewarded,
        }
    }
}
