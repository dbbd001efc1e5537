use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use super::sdk::{AdHandle, AdId, AdSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdState {
    Idle,
    Loading,
    Loaded,
    Showing,
    Closed,
    Error,
}

impl AdState {
    /// A new ad object may only be requested from these states.
    pub fn can_load(self) -> bool {
        matches!(self, AdState::Idle | AdState::Closed | AdState::Error)
    }
}

/// State of one full-screen surface. Owns the live SDK handle.
pub(super) struct SurfaceSlot {
    pub surface: AdSurface,
    pub state: AdState,
    handle: Option<Arc<dyn AdHandle>>,
    reload: Option<JoinHandle<()>>,
}

impl SurfaceSlot {
    pub fn new(surface: AdSurface) -> Self {
        Self {
            surface,
            state: AdState::Idle,
            handle: None,
            reload: None,
        }
    }

    pub fn current_id(&self) -> Option<AdId> {
        self.handle.as_ref().map(|h| h.id())
    }

    pub fn owns(&self, ad_id: AdId) -> bool {
        self.current_id() == Some(ad_id)
    }

    pub fn handle(&self) -> Option<Arc<dyn AdHandle>> {
        self.handle.clone()
    }

    /// Replace the ad object. The previous one is discarded.
    pub fn begin_loading(&mut self, handle: Arc<dyn AdHandle>) {
        self.handle = Some(handle);
        self.state = AdState::Loading;
    }

    /// Track a pending reload, cancelling any earlier one.
    pub fn replace_reload(&mut self, task: JoinHandle<()>) -> bool {
        let replaced = self.cancel_reload();
        self.reload = Some(task);
        replaced
    }

    /// Returns whether a still-pending reload was aborted.
    pub fn cancel_reload(&mut self) -> bool {
        match self.reload.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                true
            }
            _ => false,
        }
    }

    pub fn has_pending_reload(&self) -> bool {
        self.reload.as_ref().is_some_and(|t| !t.is_finished())
    }
}
