//! Versioned safety plan persistence.
//!
//! One plan per store, kept as a single JSON record. Every update bumps the
//! version by exactly one. There is no delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{InterventionConfig, StorageConfig};
use crate::storage::{read_json, write_json, KeyValueStore};
use crate::types::StorageError;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// A person or service on the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Contact {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

impl Contact {
    /// Create a contact.
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            relationship: None,
        }
    }
}

/// A user-authored safety plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct SafetyPlan {
    /// Thoughts, moods or situations that signal a crisis is building
    pub warning_signs: Vec<String>,
    /// Things the user can do alone to feel better
    pub coping_strategies: Vec<String>,
    /// People and places that provide distraction
    pub social_contacts: Vec<Contact>,
    /// People the user can ask for help
    pub support_contacts: Vec<Contact>,
    /// Clinicians and agencies
    pub professional_contacts: Vec<Contact>,
    /// Crisis lines; seeded with defaults when empty at creation
    pub emergency_contacts: Vec<Contact>,
    /// Steps to make the environment safer
    pub environment_safety: Vec<String>,
    /// What the user lives for
    pub reasons_for_living: Vec<String>,
    /// Starts at 1, +1 per update
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Partial plan; `Some` fields replace the stored section wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct SafetyPlanUpdate {
    pub warning_signs: Option<Vec<String>>,
    pub coping_strategies: Option<Vec<String>>,
    pub social_contacts: Option<Vec<Contact>>,
    pub support_contacts: Option<Vec<Contact>>,
    pub professional_contacts: Option<Vec<Contact>>,
    pub emergency_contacts: Option<Vec<Contact>>,
    pub environment_safety: Option<Vec<String>>,
    pub reasons_for_living: Option<Vec<String>>,
}

impl SafetyPlanUpdate {
    /// Shallow merge over `plan`.
    fn apply_to(self, plan: &mut SafetyPlan) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    plan.$field = value;
                })*
            };
        }
        merge!(
            warning_signs,
            coping_strategies,
            social_contacts,
            support_contacts,
            professional_contacts,
            emergency_contacts,
            environment_safety,
            reasons_for_living
        );
    }
}

/// CRUD over the persisted safety plan.
pub struct SafetyPlanStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    default_contacts: Vec<Contact>,
}

impl SafetyPlanStore {
    /// Create a plan store.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        storage: &StorageConfig,
        intervention: &InterventionConfig,
    ) -> Self {
        Self {
            store,
            key: storage.safety_plan_key.clone(),
            default_contacts: vec![
                Contact::new(&intervention.primary_name, &intervention.primary_number),
                Contact::new("Emergency Services", &intervention.emergency_number),
            ],
        }
    }

    /// Load the plan, distinguishing "absent" from storage failures.
    pub async fn load(&self) -> Result<Option<SafetyPlan>, StorageError> {
        read_json(self.store.as_ref(), &self.key).await
    }

    /// Load the plan; absent, unreadable or corrupt all yield `None`.
    pub async fn get(&self) -> Option<SafetyPlan> {
        match self.load().await {
            Ok(plan) => plan,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to load safety plan");
                None
            }
        }
    }

    /// Create and persist a new plan at version 1.
    pub async fn try_create(&self, inputs: SafetyPlanUpdate) -> Result<SafetyPlan, StorageError> {
        let plan = self.build(inputs);
        self.persist(&plan).await?;
        Ok(plan)
    }

    /// Create a new plan. A persistence failure is logged and the
    /// unsaved plan is still returned.
    pub async fn create(&self, inputs: SafetyPlanUpdate) -> SafetyPlan {
        let plan = self.build(inputs);
        if let Err(e) = self.persist(&plan).await {
            warn!(key = %self.key, error = %e, "Failed to persist new safety plan");
        }
        plan
    }

    /// Merge `updates` into the stored plan, or create one if none exists.
    pub async fn try_update(&self, updates: SafetyPlanUpdate) -> Result<SafetyPlan, StorageError> {
        match self.load().await? {
            Some(existing) => {
                let plan = Self::merged(existing, updates);
                self.persist(&plan).await?;
                Ok(plan)
            }
            None => self.try_create(updates).await,
        }
    }

    /// Merge `updates` into the stored plan, or create one if none exists.
    ///
    /// A corrupt record is replaced by a fresh plan. When the stored plan
    /// cannot be read at all, nothing is written and the unsaved result is
    /// returned. Persistence failures are logged, never returned.
    pub async fn update(&self, updates: SafetyPlanUpdate) -> SafetyPlan {
        let existing = match self.load().await {
            Ok(existing) => existing,
            Err(e @ StorageError::Corrupt { .. }) => {
                warn!(key = %self.key, error = %e, "Replacing corrupt safety plan");
                None
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Safety plan unreadable, update not saved");
                return self.build(updates);
            }
        };

        let Some(existing) = existing else {
            return self.create(updates).await;
        };

        let plan = Self::merged(existing, updates);
        if let Err(e) = self.persist(&plan).await {
            warn!(key = %self.key, error = %e, "Failed to persist safety plan update");
        }
        plan
    }

    fn build(&self, inputs: SafetyPlanUpdate) -> SafetyPlan {
        let now = Utc::now();
        let mut plan = SafetyPlan {
            warning_signs: vec![],
            coping_strategies: vec![],
            social_contacts: vec![],
            support_contacts: vec![],
            professional_contacts: vec![],
            emergency_contacts: vec![],
            environment_safety: vec![],
            reasons_for_living: vec![],
            version: 1,
            created_at: now,
            last_updated: now,
        };
        inputs.apply_to(&mut plan);

        if plan.emergency_contacts.is_empty() {
            plan.emergency_contacts = self.default_contacts.clone();
        }
        plan
    }

    fn merged(existing: SafetyPlan, updates: SafetyPlanUpdate) -> SafetyPlan {
        let mut plan = existing;
        updates.apply_to(&mut plan);
        plan.version += 1;
        plan.last_updated = Utc::now();
        plan
    }

    async fn persist(&self, plan: &SafetyPlan) -> Result<(), StorageError> {
        write_json(self.store.as_ref(), &self.key, plan).await?;
        info!(key = %self.key, version = plan.version, "Safety plan saved");
        Ok(())
    }
}
