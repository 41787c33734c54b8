//! Crisis and support resource catalog.

use std::collections::HashSet;

use crate::config::ResourceConfig;
use crate::types::{CrisisResource, Demographics, Specialty, UserProfile};

/// Age below which LGBTQ+ users are routed to youth LGBTQ+ lines.
const LGBTQ_YOUTH_MAX_AGE: u32 = 25;

/// Age below which teen lines are promoted.
const TEEN_MAX_AGE: u32 = 18;

/// Static, ordered resource catalog with profile-aware ranking.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    /// Emergency catalog, pre-sorted by ascending priority
    emergency: Vec<CrisisResource>,
    support: Vec<CrisisResource>,
    emergency_limit: usize,
}

impl ResourceDirectory {
    /// Create a directory with the built-in catalog.
    pub fn new() -> Self {
        Self::from_config(ResourceConfig::default())
    }

    /// Create from a resource configuration.
    pub fn from_config(config: ResourceConfig) -> Self {
        let mut emergency = config.emergency;
        // Vec::sort_by_key is stable, so equal priorities keep catalog order.
        emergency.sort_by_key(|r| r.priority);

        Self {
            emergency,
            support: config.support,
            emergency_limit: config.emergency_limit,
        }
    }

    /// Emergency resources ranked for a profile.
    ///
    /// Resources whose specialty matches the profile move to the front;
    /// otherwise priority order is preserved. At most `emergency_limit`
    /// entries are returned.
    pub fn emergency_resources(&self, profile: &UserProfile) -> Vec<CrisisResource> {
        let specialties = matching_specialties(&profile.demographics);

        let (mut ranked, rest): (Vec<_>, Vec<_>) = self
            .emergency
            .iter()
            .cloned()
            .partition(|r| r.specialty.map_or(false, |s| specialties.contains(&s)));

        ranked.extend(rest);
        ranked.truncate(self.emergency_limit);
        ranked
    }

    /// Non-emergency helplines, warm lines and chat.
    pub fn support_resources(&self) -> Vec<CrisisResource> {
        self.support.clone()
    }

    /// Find a resource by id in either list.
    pub fn find(&self, id: &str) -> Option<&CrisisResource> {
        self.emergency
            .iter()
            .chain(self.support.iter())
            .find(|r| r.id == id)
    }
}

impl Default for ResourceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Specialties a profile qualifies for.
fn matching_specialties(demographics: &Demographics) -> HashSet<Specialty> {
    let mut matched = HashSet::new();
    let age = demographics.age;

    if demographics.lgbtq && age.map_or(false, |a| a < LGBTQ_YOUTH_MAX_AGE) {
        matched.insert(Specialty::Lgbtq);
    }
    if demographics.veteran {
        matched.insert(Specialty::Veterans);
    }
    if age.map_or(false, |a| a < TEEN_MAX_AGE) {
        matched.insert(Specialty::Youth);
    }

    matched
}
