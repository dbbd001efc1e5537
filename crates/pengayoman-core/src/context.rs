//! Composition root.
//!
//! Constructs the process-wide services once and hands out shared handles,
//! instead of module-level singletons.

use std::sync::Arc;

use tracing::warn;

use crate::ads::{AdSdk, AdService, AdUnitIds};
use crate::clock::{Clock, SystemClock};
use crate::consent::ConsentManager;
use crate::error::AdError;
use crate::events::{Event, EventBus};
use crate::prayers::PrayerClient;
use crate::reward::RewardTracker;
use crate::storage::{Config, Database, KvStore, MemoryStore};

pub struct AppContext {
    config: Config,
    events: EventBus,
    consent: Arc<ConsentManager>,
    reward: Arc<RewardTracker>,
}

impl AppContext {
    pub fn new(config: Config, store: Arc<dyn KvStore>, clock: Arc<dyn Clock>) -> Self {
        let events = EventBus::new();
        let consent = Arc::new(ConsentManager::new(
            store.clone(),
            clock.clone(),
            events.clone(),
        ));
        let reward = Arc::new(RewardTracker::with_duration(
            store,
            clock,
            events.clone(),
            config.reward.duration(),
        ));
        Self {
            config,
            events,
            consent,
            reward,
        }
    }

    /// Open the on-disk store, degrading to a volatile one if it is unusable.
    pub fn open(config: Config) -> Self {
        let store: Arc<dyn KvStore> = match Database::open() {
            Ok(db) => Arc::new(db),
            Err(e) => {
                warn!(error = %e, "storage unavailable, state will not persist");
                Arc::new(MemoryStore::new())
            }
        };
        Self::new(config, store, Arc::new(SystemClock))
    }

    /// Load persisted consent and reward state.
    pub fn initialize(&self) {
        self.consent.initialize();
        self.reward.initialize();
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn consent(&self) -> &Arc<ConsentManager> {
        &self.consent
    }

    pub fn reward(&self) -> &Arc<RewardTracker> {
        &self.reward
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Build the ad service over a platform SDK. Must run inside a tokio
    /// runtime.
    pub fn ad_service(&self, sdk: Arc<dyn AdSdk>) -> Result<AdService, AdError> {
        AdService::new(
            sdk,
            self.consent.clone(),
            AdUnitIds::from_config(&self.config.ads),
            self.config.ads.reload_delay(),
            self.events.clone(),
        )
    }

    pub fn prayer_client(&self) -> PrayerClient {
        PrayerClient::new(self.config.prayer_api.clone())
    }

    pub fn unit_ids(&self) -> AdUnitIds {
        AdUnitIds::from_config(&self.config.ads)
    }

    /// Banners render only when ads may be requested and no ad-free window
    /// is active.
    pub fn should_show_banner(&self) -> bool {
        self.consent.can_request_ads() && !self.reward.is_ad_free()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn context() -> AppContext {
        AppContext::new(
            Config::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(1_760_000_000_000)),
        )
    }

    #[test]
    fn banner_hidden_before_consent_and_while_ad_free() {
        let ctx = context();
        assert!(!ctx.should_show_banner());

        ctx.initialize();
        assert!(ctx.should_show_banner());

        ctx.reward().grant_reward();
        assert!(!ctx.should_show_banner());

        ctx.reward().clear();
        assert!(ctx.should_show_banner());
    }

    #[test]
    fn services_share_one_event_bus() {
        let ctx = context();
        let mut rx = ctx.subscribe();
        ctx.initialize();
        ctx.reward().grant_reward();
        assert!(matches!(rx.try_recv(), Ok(Event::ConsentChanged { .. })));
        assert!(matches!(rx.try_recv(), Ok(Event::AdFreeGranted { .. })));
    }

    #[test]
    fn ad_service_requires_runtime() {
        struct NoSdk;
        impl AdSdk for NoSdk {
            fn initialize(&self) -> Result<(), AdError> {
                Ok(())
            }
            fn set_request_configuration(
                &self,
                _config: &crate::ads::RequestConfiguration,
            ) -> Result<(), AdError> {
                Ok(())
            }
            fn create(
                &self,
                _ad_id: crate::ads::AdId,
                surface: crate::ads::AdSurface,
                _unit_id: &str,
                _request: crate::ads::AdRequest,
            ) -> Result<Arc<dyn crate::ads::AdHandle>, AdError> {
                Err(AdError::LoadFailed {
                    surface: surface.to_string(),
                    message: "unsupported".into(),
                })
            }
        }

        let ctx = context();
        assert!(matches!(
            ctx.ad_service(Arc::new(NoSdk)),
            Err(AdError::NoRuntime)
        ));
    }
}
