use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::record::{ConsentRecord, CONSENT_VERSION};
use super::{CONSENT_KEY, CONSENT_VERSION_KEY};
use crate::ads::{AdSdk, RequestConfiguration};
use crate::clock::Clock;
use crate::error::StorageError;
use crate::events::{Event, EventBus};
use crate::storage::KvStore;

/// Authoritative source of whether ads may be requested.
///
/// Writes are best effort: a failed persist is logged and the in-memory
/// record stays authoritative for the rest of the session.
pub struct ConsentManager {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    events: EventBus,
    sdk: Mutex<Option<Arc<dyn AdSdk>>>,
    record: Mutex<Option<ConsentRecord>>,
}

impl ConsentManager {
    pub fn new(store: Arc<dyn KvStore>, clock: Arc<dyn Clock>, events: EventBus) -> Self {
        Self {
            store,
            clock,
            events,
            sdk: Mutex::new(None),
            record: Mutex::new(None),
        }
    }

    /// Route request-configuration updates to an ad SDK.
    pub fn attach_sdk(&self, sdk: Arc<dyn AdSdk>) {
        *lock(&self.sdk) = Some(sdk);
    }

    /// Load the stored record, regenerating it when absent or stale.
    ///
    /// With nothing usable in storage the in-memory record of this session is
    /// kept, so a grant whose write failed survives re-initialization.
    ///
    /// Never fails: if storage cannot be read the result is the fail-closed
    /// record (`Unknown`, no ad requests).
    pub fn initialize(&self) -> ConsentRecord {
        let now = self.clock.now_ms();
        let stored = match self.load_stored() {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "failed to read consent, ads disabled for this session");
                let fallback = ConsentRecord::fail_closed(now);
                self.replace(fallback.clone());
                return fallback;
            }
        };

        let record = match stored.or_else(|| self.consent_info()) {
            Some(current) if !current.is_stale(now) => {
                debug!(status = %current.status, "loaded consent");
                current
            }
            current => {
                if current.is_some() {
                    info!("consent is stale, regenerating");
                }
                let fresh = ConsentRecord::not_required(now);
                self.persist(&fresh);
                fresh
            }
        };

        self.replace(record.clone());
        self.configure_ads(&record);
        record
    }

    pub fn grant_consent(&self) {
        self.write(ConsentRecord::obtained(self.clock.now_ms()));
    }

    /// Withdraw consent. Non-personalized ads can still be requested.
    pub fn revoke_consent(&self) {
        self.write(ConsentRecord::required(self.clock.now_ms()));
    }

    /// Delete the stored record. `initialize()` must run again before use.
    pub fn reset_consent(&self) {
        for key in [CONSENT_KEY, CONSENT_VERSION_KEY] {
            if let Err(e) = self.store.remove(key) {
                warn!(error = %e, key, "failed to delete consent entry");
            }
        }
        *lock(&self.record) = None;
        self.events.publish(Event::ConsentReset { at: Utc::now() });
    }

    pub fn consent_info(&self) -> Option<ConsentRecord> {
        lock(&self.record).clone()
    }

    pub fn can_request_ads(&self) -> bool {
        lock(&self.record)
            .as_ref()
            .map(|r| r.can_request_ads)
            .unwrap_or(false)
    }

    pub fn is_privacy_options_required(&self) -> bool {
        lock(&self.record)
            .as_ref()
            .map(|r| r.privacy_options_required)
            .unwrap_or(true)
    }

    /// SDK request configuration for the current record.
    pub fn request_configuration(&self) -> RequestConfiguration {
        let status = lock(&self.record).as_ref().map(|r| r.status);
        RequestConfiguration::for_consent(status)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_stored(&self) -> Result<Option<ConsentRecord>, StorageError> {
        let raw = self.store.get(CONSENT_KEY)?;
        let version = self.store.get(CONSENT_VERSION_KEY)?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        if version.as_deref() != Some(CONSENT_VERSION) {
            return Ok(None);
        }
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!(error = %e, "discarding unparsable consent record");
                Ok(None)
            }
        }
    }

    fn write(&self, record: ConsentRecord) {
        self.persist(&record);
        self.replace(record.clone());
        self.configure_ads(&record);
    }

    fn replace(&self, record: ConsentRecord) {
        let event = Event::ConsentChanged {
            status: record.status,
            can_request_ads: record.can_request_ads,
            at: Utc::now(),
        };
        *lock(&self.record) = Some(record);
        self.events.publish(event);
    }

    fn persist(&self, record: &ConsentRecord) {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(e) => {
                error!(error = %e, "failed to encode consent record");
                return;
            }
        };
        let result = self
            .store
            .set(CONSENT_KEY, &json)
            .and_then(|()| self.store.set(CONSENT_VERSION_KEY, CONSENT_VERSION));
        if let Err(e) = result {
            error!(error = %e, "failed to save consent record");
        }
    }

    fn configure_ads(&self, record: &ConsentRecord) {
        let Some(sdk) = lock(&self.sdk).clone() else {
            return;
        };
        let config = RequestConfiguration::for_consent(Some(record.status));
        if let Err(e) = sdk.set_request_configuration(&config) {
            error!(error = %e, "failed to configure ads based on consent");
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
