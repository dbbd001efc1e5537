use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::sdk::{AdHandle, AdId, AdSdk, AdSurface, AdUnitIds, Reward, SdkEvent, SdkEventKind};
use super::surface::{AdState, SurfaceSlot};
use crate::consent::ConsentManager;
use crate::error::AdError;
use crate::events::{Event, EventBus};

/// Result of a rewarded ad attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardedOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<Reward>,
}

impl RewardedOutcome {
    pub fn earned(reward: Reward) -> Self {
        Self {
            success: true,
            reward: Some(reward),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            reward: None,
        }
    }
}

/// Load/show lifecycle for the interstitial and rewarded surfaces.
///
/// Cheap to clone; all clones share one set of surfaces. SDK callbacks are
/// fed in through [`handle_sdk_event`](Self::handle_sdk_event). Reload timers
/// run on the tokio runtime the service was created on and are aborted when
/// the last clone is dropped.
#[derive(Clone)]
pub struct AdService {
    inner: Arc<Inner>,
}

struct Inner {
    sdk: Arc<dyn AdSdk>,
    consent: Arc<ConsentManager>,
    units: AdUnitIds,
    reload_delay: Duration,
    events: EventBus,
    runtime: Handle,
    next_id: AtomicU64,
    state: Mutex<ServiceState>,
}

struct ServiceState {
    initialized: bool,
    interstitial: SurfaceSlot,
    rewarded: SurfaceSlot,
    /// Resolver for the in-flight rewarded show. Taken on first resolution.
    pending_reward: Option<oneshot::Sender<RewardedOutcome>>,
}

impl ServiceState {
    /// `None` for the banner, which has no load/show lifecycle.
    fn slot_mut(&mut self, surface: AdSurface) -> Option<&mut SurfaceSlot> {
        match surface {
            AdSurface::Interstitial => Some(&mut self.interstitial),
            AdSurface::Rewarded => Some(&mut self.rewarded),
            AdSurface::Banner => None,
        }
    }

    fn slot(&self, surface: AdSurface) -> Option<&SurfaceSlot> {
        match surface {
            AdSurface::Interstitial => Some(&self.interstitial),
            AdSurface::Rewarded => Some(&self.rewarded),
            AdSurface::Banner => None,
        }
    }

    fn set_state(&mut self, surface: AdSurface, state: AdState) {
        if let Some(slot) = self.slot_mut(surface) {
            slot.state = state;
        }
    }

    fn owner_of(&self, ad_id: AdId) -> Option<AdSurface> {
        [&self.interstitial, &self.rewarded]
            .into_iter()
            .find(|slot| slot.owns(ad_id))
            .map(|slot| slot.surface)
    }

    fn resolve_reward(&mut self, outcome: RewardedOutcome) {
        if let Some(tx) = self.pending_reward.take() {
            // Receiver gone means the caller stopped waiting.
            let _ = tx.send(outcome);
        }
    }
}

impl AdService {
    /// Create the service on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`AdError::NoRuntime`] when called outside a runtime.
    pub fn new(
        sdk: Arc<dyn AdSdk>,
        consent: Arc<ConsentManager>,
        units: AdUnitIds,
        reload_delay: Duration,
        events: EventBus,
    ) -> Result<Self, AdError> {
        let runtime = Handle::try_current().map_err(|_| AdError::NoRuntime)?;
        consent.attach_sdk(sdk.clone());
        Ok(Self {
            inner: Arc::new(Inner {
                sdk,
                consent,
                units,
                reload_delay,
                events,
                runtime,
                next_id: AtomicU64::new(1),
                state: Mutex::new(ServiceState {
                    initialized: false,
                    interstitial: SurfaceSlot::new(AdSurface::Interstitial),
                    rewarded: SurfaceSlot::new(AdSurface::Rewarded),
                    pending_reward: None,
                }),
            }),
        })
    }

    /// Initialize consent, then the SDK, then preload both surfaces.
    ///
    /// Does nothing at all when consent forbids ad requests.
    pub fn initialize(&self) {
        if self.is_initialized() {
            return;
        }

        self.inner.consent.initialize();
        if !self.inner.consent.can_request_ads() {
            info!("cannot request ads due to consent status");
            return;
        }

        if let Err(e) = self.inner.sdk.initialize() {
            error!(error = %e, "failed to initialize ad SDK");
            return;
        }
        let config = self.inner.consent.request_configuration();
        if let Err(e) = self.inner.sdk.set_request_configuration(&config) {
            error!(error = %e, "failed to apply ad request configuration");
            return;
        }

        self.lock().initialized = true;
        info!("ad SDK initialized");

        self.load(AdSurface::Interstitial);
        self.load(AdSurface::Rewarded);
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Lifecycle state of a full-screen surface. Banners are always `Idle`.
    pub fn state(&self, surface: AdSurface) -> AdState {
        self.lock().slot(surface).map_or(AdState::Idle, |slot| slot.state)
    }

    pub fn is_interstitial_ready(&self) -> bool {
        self.state(AdSurface::Interstitial) == AdState::Loaded
    }

    pub fn is_rewarded_ready(&self) -> bool {
        self.state(AdSurface::Rewarded) == AdState::Loaded
    }

    pub fn has_pending_reload(&self, surface: AdSurface) -> bool {
        self.lock()
            .slot(surface)
            .is_some_and(SurfaceSlot::has_pending_reload)
    }

    pub fn unit_ids(&self) -> &AdUnitIds {
        &self.inner.units
    }

    /// State transitions and earned rewards as they happen.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.inner.events.subscribe()
    }

    /// Banner ads are rendered by the UI; it only needs the identifier.
    pub fn banner_unit_id(&self) -> &str {
        &self.inner.units.banner
    }

    /// Returns whether a show was attempted. Cleanup happens on `Closed`.
    pub fn show_interstitial_ad(&self) -> bool {
        if !self.is_initialized() {
            self.initialize();
        }

        let Some(handle) = self.begin_show(AdSurface::Interstitial) else {
            info!("interstitial ad not ready");
            return false;
        };
        match handle.show() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to show interstitial ad");
                self.fail(AdSurface::Interstitial, handle.id());
                false
            }
        }
    }

    /// Show the rewarded ad and wait for the reward or the close, whichever
    /// comes first.
    pub async fn show_rewarded_ad(&self) -> RewardedOutcome {
        if !self.is_initialized() {
            self.initialize();
        }

        let (tx, rx) = oneshot::channel();
        let handle = {
            let mut state = self.lock();
            let slot = &mut state.rewarded;
            if slot.state != AdState::Loaded {
                info!("rewarded ad not ready");
                return RewardedOutcome::failed();
            }
            let Some(handle) = slot.handle() else {
                return RewardedOutcome::failed();
            };
            slot.state = AdState::Showing;
            state.pending_reward = Some(tx);
            handle
        };
        self.publish_state(AdSurface::Rewarded, AdState::Showing);

        if let Err(e) = handle.show() {
            error!(error = %e, "failed to show rewarded ad");
            self.fail(AdSurface::Rewarded, handle.id());
        }

        rx.await.unwrap_or_else(|_| RewardedOutcome::failed())
    }

    /// Entry point for SDK callbacks. Events for discarded ad objects are
    /// ignored.
    pub fn handle_sdk_event(&self, event: SdkEvent) {
        let SdkEvent { ad_id, kind } = event;
        let mut state = self.lock();
        let Some(surface) = state.owner_of(ad_id) else {
            debug!(%ad_id, ?kind, "ignoring event for discarded ad");
            return;
        };

        match kind {
            SdkEventKind::Loaded => {
                let current = state.slot(surface).map(|slot| slot.state);
                if current != Some(AdState::Loading) {
                    warn!(%surface, state = ?current, "unexpected load callback");
                    return;
                }
                state.set_state(surface, AdState::Loaded);
                drop(state);
                info!(%surface, "ad loaded");
                self.publish_state(surface, AdState::Loaded);
            }
            SdkEventKind::Error(message) => {
                error!(%surface, %message, "ad error");
                state.set_state(surface, AdState::Error);
                if surface == AdSurface::Rewarded {
                    state.resolve_reward(RewardedOutcome::failed());
                }
                self.schedule_reload(&mut state, surface);
                drop(state);
                self.publish_state(surface, AdState::Error);
            }
            SdkEventKind::Opened => {
                debug!(%surface, "ad opened");
            }
            SdkEventKind::Closed => {
                info!(%surface, "ad closed");
                state.set_state(surface, AdState::Closed);
                if surface == AdSurface::Rewarded {
                    state.resolve_reward(RewardedOutcome::failed());
                }
                self.schedule_reload(&mut state, surface);
                drop(state);
                self.publish_state(surface, AdState::Closed);
            }
            SdkEventKind::EarnedReward(reward) => {
                if surface != AdSurface::Rewarded {
                    warn!(%surface, "reward callback on non-rewarded surface");
                    return;
                }
                // Only a reward earned while the ad is on screen counts.
                if state.rewarded.state != AdState::Showing {
                    warn!(state = ?state.rewarded.state, "ignoring reward outside of a show");
                    return;
                }
                info!(kind = %reward.kind, amount = reward.amount, "user earned reward");
                state.resolve_reward(RewardedOutcome::earned(reward.clone()));
                drop(state);
                self.inner.events.publish(Event::RewardEarned {
                    reward,
                    at: Utc::now(),
                });
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        lock(&self.inner.state)
    }

    /// Request a fresh ad object for `surface` if none is loaded or in flight.
    fn load(&self, surface: AdSurface) {
        match self.lock().slot(surface) {
            Some(slot) if slot.state.can_load() => {}
            Some(_) => {
                debug!(%surface, "load skipped, ad already loaded or in flight");
                return;
            }
            None => return,
        }

        let ad_id = AdId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let request = self.inner.consent.request_configuration().ad_request();
        let unit_id = self.inner.units.for_surface(surface);

        let handle = match self.inner.sdk.create(ad_id, surface, unit_id, request) {
            Ok(handle) => handle,
            Err(e) => {
                error!(%surface, error = %e, "failed to create ad");
                let mut state = self.lock();
                state.set_state(surface, AdState::Error);
                self.schedule_reload(&mut state, surface);
                drop(state);
                self.publish_state(surface, AdState::Error);
                return;
            }
        };

        if let Some(slot) = self.lock().slot_mut(surface) {
            slot.begin_loading(handle.clone());
        }
        self.publish_state(surface, AdState::Loading);
        debug!(%surface, %ad_id, non_personalized = request.non_personalized_only, "loading ad");

        if let Err(e) = handle.load() {
            error!(%surface, error = %e, "failed to load ad");
            self.fail(surface, ad_id);
        }
    }

    fn begin_show(&self, surface: AdSurface) -> Option<Arc<dyn AdHandle>> {
        let handle = {
            let mut state = self.lock();
            let slot = state.slot_mut(surface)?;
            if slot.state != AdState::Loaded {
                return None;
            }
            let handle = slot.handle()?;
            slot.state = AdState::Showing;
            handle
        };
        self.publish_state(surface, AdState::Showing);
        Some(handle)
    }

    /// Synchronous SDK failure for the current ad of `surface`.
    fn fail(&self, surface: AdSurface, ad_id: AdId) {
        self.handle_sdk_event(SdkEvent::new(
            ad_id,
            SdkEventKind::Error(format!("{surface} call rejected")),
        ));
    }

    /// At most one reload is pending per surface; a newer terminal event
    /// replaces the older timer.
    fn schedule_reload(&self, state: &mut ServiceState, surface: AdSurface) {
        let Some(slot) = state.slot_mut(surface) else {
            return;
        };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let delay = self.inner.reload_delay;
        let task = self.inner.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                AdService { inner }.load(surface);
            }
        });
        if slot.replace_reload(task) {
            debug!(%surface, "replaced pending ad reload");
        }
    }

    fn publish_state(&self, surface: AdSurface, state: AdState) {
        self.inner.events.publish(Event::AdStateChanged {
            surface,
            state,
            at: Utc::now(),
        });
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let state = self
            .state
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.interstitial.cancel_reload();
        state.rewarded.cancel_reload();
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
