//! Bounded crisis event and emergency action logs.
//!
//! Each log is a JSON array under its own key, trimmed FIFO to a fixed cap
//! on every append. Appends through one `EventLog` are serialized; separate
//! instances or processes sharing a store can still overwrite each other.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::storage::{read_json, write_json, KeyValueStore};
use crate::types::{
    ActionType, CrisisEvent, EmergencyAction, RiskAssessment, StorageError, UserProfile,
};

/// Append-only, capped audit logs.
pub struct EventLog {
    store: Arc<dyn KeyValueStore>,
    events_key: String,
    actions_key: String,
    max_events: usize,
    max_actions: usize,
    append_lock: Mutex<()>,
}

impl EventLog {
    /// Create an event log over a store.
    pub fn new(store: Arc<dyn KeyValueStore>, config: &StorageConfig) -> Self {
        Self {
            store,
            events_key: config.crisis_events_key.clone(),
            actions_key: config.emergency_actions_key.clone(),
            max_events: config.max_crisis_events,
            max_actions: config.max_emergency_actions,
            append_lock: Mutex::new(()),
        }
    }

    /// Log an assessment. Failures are logged and yield `None`.
    pub async fn log_crisis_event(
        &self,
        assessment: &RiskAssessment,
        profile: &UserProfile,
    ) -> Option<CrisisEvent> {
        let event = CrisisEvent::from_assessment(assessment, profile);
        self.log_event(event).await
    }

    /// Append a prepared event. Failures are logged and yield `None`.
    pub async fn log_event(&self, event: CrisisEvent) -> Option<CrisisEvent> {
        match self.try_log_event(event.clone()).await {
            Ok(()) => Some(event),
            Err(e) => {
                warn!(error = %e, tier = %event.tier, "Failed to log crisis event");
                None
            }
        }
    }

    /// Append a prepared event.
    pub async fn try_log_event(&self, event: CrisisEvent) -> Result<(), StorageError> {
        self.append(&self.events_key, self.max_events, event).await
    }

    /// Log an emergency action. Failures are logged and yield `None`.
    pub async fn log_emergency_action(
        &self,
        action_type: ActionType,
        target: &str,
        successful: bool,
    ) -> Option<EmergencyAction> {
        let action = EmergencyAction::new(action_type, target, successful);
        self.log_action(action).await
    }

    /// Append a prepared action. Failures are logged and yield `None`.
    pub async fn log_action(&self, action: EmergencyAction) -> Option<EmergencyAction> {
        match self.try_log_action(action.clone()).await {
            Ok(()) => Some(action),
            Err(e) => {
                warn!(error = %e, target = %action.target, "Failed to log emergency action");
                None
            }
        }
    }

    /// Append a prepared action.
    pub async fn try_log_action(&self, action: EmergencyAction) -> Result<(), StorageError> {
        self.append(&self.actions_key, self.max_actions, action).await
    }

    /// Read the crisis event log, oldest first.
    pub async fn try_crisis_events(&self) -> Result<Vec<CrisisEvent>, StorageError> {
        Ok(read_json(self.store.as_ref(), &self.events_key)
            .await?
            .unwrap_or_default())
    }

    /// Read the crisis event log; failures yield an empty log.
    pub async fn crisis_events(&self) -> Vec<CrisisEvent> {
        self.try_crisis_events().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read crisis events");
            vec![]
        })
    }

    /// Read the emergency action log, oldest first.
    pub async fn try_emergency_actions(&self) -> Result<Vec<EmergencyAction>, StorageError> {
        Ok(read_json(self.store.as_ref(), &self.actions_key)
            .await?
            .unwrap_or_default())
    }

    /// Read the emergency action log; failures yield an empty log.
    pub async fn emergency_actions(&self) -> Vec<EmergencyAction> {
        self.try_emergency_actions().await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read emergency actions");
            vec![]
        })
    }

    async fn append<T>(&self, key: &str, cap: usize, entry: T) -> Result<(), StorageError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _guard = self.append_lock.lock().await;

        let mut entries: Vec<T> = match read_json(self.store.as_ref(), key).await {
            Ok(existing) => existing.unwrap_or_default(),
            // An unreadable log would block logging forever; start over.
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(key = %key, error = %e, "Discarding corrupt log");
                vec![]
            }
            Err(e) => return Err(e),
        };

        entries.push(entry);
        if entries.len() > cap {
            let excess = entries.len() - cap;
            entries.drain(..excess);
        }

        write_json(self.store.as_ref(), key, &entries).await?;
        debug!(key = %key, len = entries.len(), "Log appended");
        Ok(())
    }
}
