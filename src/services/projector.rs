//! Current-view projection.
//!
//! The dashboard surfaces one "current" record at a time. The projector
//! caches it, republishes it through a watch channel, and registers as
//! a store observer so any write that touches the displayed record
//! refreshes the view before the write returns. A deleted or cleared
//! current record empties the view rather than showing stale state.

use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::models::PredictionRecord;
use crate::domain::ports::{StoreChange, StoreObserver};

pub struct CurrentViewProjector {
    current: RwLock<Option<PredictionRecord>>,
    view: watch::Sender<Option<PredictionRecord>>,
}

impl CurrentViewProjector {
    pub fn new() -> Self {
        let (view, _) = watch::channel(None);
        Self {
            current: RwLock::new(None),
            view,
        }
    }

    /// Make a record the current view.
    pub fn set_current(&self, record: PredictionRecord) {
        if let Ok(mut current) = self.current.write() {
            *current = Some(record.clone());
        }
        let _ = self.view.send(Some(record));
    }

    /// Empty the view.
    pub fn clear_current(&self) {
        if let Ok(mut current) = self.current.write() {
            *current = None;
        }
        let _ = self.view.send(None);
    }

    /// The record currently on display, if any.
    pub fn current(&self) -> Option<PredictionRecord> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    /// Watch handle that yields every view change.
    pub fn subscribe(&self) -> watch::Receiver<Option<PredictionRecord>> {
        self.view.subscribe()
    }

    fn current_id(&self) -> Option<Uuid> {
        self.current
            .read()
            .ok()
            .and_then(|current| current.as_ref().map(|record| record.id))
    }
}

impl Default for CurrentViewProjector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreObserver for CurrentViewProjector {
    async fn on_change(&self, change: &StoreChange) {
        match change {
            StoreChange::Put(record) => {
                if self.current_id() == Some(record.id) {
                    tracing::debug!(id = %record.id, "refreshing current view");
                    self.set_current(record.clone());
                }
            }
            StoreChange::Deleted(id) => {
                if self.current_id() == Some(*id) {
                    tracing::debug!(id = %id, "current record deleted, clearing view");
                    self.clear_current();
                }
            }
            StoreChange::Cleared => {
                if self.current_id().is_some() {
                    tracing::debug!("store cleared, clearing current view");
                    self.clear_current();
                }
            }
        }
    }
}
