//! Shared fixtures for core integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use pengayoman_core::ads::{
    AdHandle, AdId, AdRequest, AdSdk, AdSurface, RequestConfiguration,
};
use pengayoman_core::{AdError, KvStore, StorageError};

pub const NOW: u64 = 1_760_000_000_000;

/// Everything the scripted SDK was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    Initialize,
    Configure(RequestConfiguration),
    Create {
        ad_id: AdId,
        surface: AdSurface,
        unit_id: String,
        request: AdRequest,
    },
    Load(AdId),
    Show(AdId),
}

/// Scripted ad SDK. Callbacks are delivered by the test itself.
#[derive(Default)]
pub struct MockSdk {
    calls: Arc<Mutex<Vec<SdkCall>>>,
    pub fail_init: AtomicBool,
    pub fail_show: Arc<AtomicBool>,
}

impl MockSdk {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<SdkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self, surface: AdSurface) -> Vec<(AdId, AdRequest)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SdkCall::Create {
                    ad_id,
                    surface: s,
                    request,
                    ..
                } if s == surface => Some((ad_id, request)),
                _ => None,
            })
            .collect()
    }

    /// Id of the most recently created ad for a surface.
    pub fn latest(&self, surface: AdSurface) -> AdId {
        self.created(surface)
            .last()
            .map(|(id, _)| *id)
            .expect("no ad created for surface")
    }

    pub fn configurations(&self) -> Vec<RequestConfiguration> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SdkCall::Configure(cfg) => Some(cfg),
                _ => None,
            })
            .collect()
    }
}

struct MockHandle {
    id: AdId,
    calls: Arc<Mutex<Vec<SdkCall>>>,
    fail_show: Arc<AtomicBool>,
}

impl AdHandle for MockHandle {
    fn id(&self) -> AdId {
        self.id
    }

    fn load(&self) -> Result<(), AdError> {
        self.calls.lock().unwrap().push(SdkCall::Load(self.id));
        Ok(())
    }

    fn show(&self) -> Result<(), AdError> {
        self.calls.lock().unwrap().push(SdkCall::Show(self.id));
        if self.fail_show.load(Ordering::SeqCst) {
            return Err(AdError::ShowFailed {
                surface: "mock".into(),
                message: "activity gone".into(),
            });
        }
        Ok(())
    }
}

impl AdSdk for MockSdk {
    fn initialize(&self) -> Result<(), AdError> {
        self.calls.lock().unwrap().push(SdkCall::Initialize);
        if self.fail_init.load(Ordering::SeqCst) {
            return Err(AdError::InitFailed("no network".into()));
        }
        Ok(())
    }

    fn set_request_configuration(&self, config: &RequestConfiguration) -> Result<(), AdError> {
        self.calls
            .lock()
            .unwrap()
            .push(SdkCall::Configure(config.clone()));
        Ok(())
    }

    fn create(
        &self,
        ad_id: AdId,
        surface: AdSurface,
        unit_id: &str,
        request: AdRequest,
    ) -> Result<Arc<dyn AdHandle>, AdError> {
        self.calls.lock().unwrap().push(SdkCall::Create {
            ad_id,
            surface,
            unit_id: unit_id.to_string(),
            request,
        });
        Ok(Arc::new(MockHandle {
            id: ad_id,
            calls: self.calls.clone(),
            fail_show: self.fail_show.clone(),
        }))
    }
}

/// Store whose reads and/or writes always fail.
#[derive(Default)]
pub struct BrokenStore {
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl KvStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads {
            return Err(StorageError::Unavailable("read refused".into()));
        }
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("write refused".into()));
        }
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Unavailable("write refused".into()));
        }
        Ok(())
    }
}
