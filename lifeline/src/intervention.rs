//! Intervention selection.
//!
//! Maps an assessment onto a message, a ranked resource list and a fixed
//! action catalog. The mapping is keyed by tier alone; the profile only
//! changes resource order.

use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::config::InterventionConfig;
use crate::resources::ResourceDirectory;
use crate::types::{
    ActionType, CrisisResource, InterventionAction, InterventionResponse, RiskAssessment,
    RiskTier, UserProfile,
};

/// Build a `tel:` URI.
pub fn tel_uri(number: &str) -> String {
    format!("tel:{}", number)
}

/// Build an `sms:` URI with a prefilled body.
pub fn sms_uri(number: &str, keyword: &str) -> String {
    format!("sms:{}?body={}", number, keyword)
}

/// Selects an [`InterventionResponse`] for an assessment.
#[derive(Debug, Clone)]
pub struct InterventionSelector {
    config: InterventionConfig,
    directory: Arc<ResourceDirectory>,
}

impl InterventionSelector {
    /// Create a selector over a resource directory.
    pub fn new(config: InterventionConfig, directory: Arc<ResourceDirectory>) -> Self {
        Self { config, directory }
    }

    /// Select an intervention. Returns `None` for the `none` tier.
    pub fn select(
        &self,
        assessment: &RiskAssessment,
        profile: &UserProfile,
    ) -> Option<InterventionResponse> {
        let tier = assessment.tier;
        let messages = &self.config.messages;

        let (message, resources) = match tier {
            RiskTier::None => return None,
            RiskTier::Critical => (
                messages.critical.clone(),
                self.directory.emergency_resources(profile),
            ),
            RiskTier::High => (
                messages.high.clone(),
                self.directory.emergency_resources(profile),
            ),
            RiskTier::Moderate => (
                messages.moderate.clone(),
                merge_resources(
                    self.directory.emergency_resources(profile),
                    self.directory.support_resources(),
                ),
            ),
            RiskTier::Low => (messages.low.clone(), self.directory.support_resources()),
        };

        let actions = self.actions_for(tier);

        info!(
            tier = %tier,
            resources = resources.len(),
            actions = actions.len(),
            "Intervention selected"
        );

        Some(InterventionResponse {
            tier,
            message,
            resources,
            actions,
        })
    }

    /// Action catalog for a tier.
    pub fn actions_for(&self, tier: RiskTier) -> Vec<InterventionAction> {
        match tier {
            RiskTier::None => vec![],
            RiskTier::Critical | RiskTier::High => {
                let mut actions = vec![self.call_primary(), self.text_crisis_line()];
                if tier == RiskTier::Critical {
                    actions.push(self.call_emergency_services());
                }
                actions
            }
            RiskTier::Moderate => vec![
                in_app("continue", ActionType::ContinueConversation, "chat", "Keep talking"),
                in_app("view_resources", ActionType::ViewResources, "resources", "View resources"),
                in_app(
                    "view_coping",
                    ActionType::ViewCopingStrategies,
                    "safety-plan/coping",
                    "View my coping strategies",
                ),
            ],
            RiskTier::Low => vec![
                in_app("continue", ActionType::ContinueConversation, "chat", "Keep talking"),
                in_app(
                    "calming_exercise",
                    ActionType::CalmingExercise,
                    "exercises/breathing",
                    "Try a calming exercise",
                ),
                in_app("view_resources", ActionType::ViewResources, "resources", "View resources"),
            ],
        }
    }

    fn call_primary(&self) -> InterventionAction {
        InterventionAction {
            id: format!("call_{}", self.config.primary_number),
            action_type: ActionType::Call,
            target: tel_uri(&self.config.primary_number),
            label: format!("Call {}", self.config.primary_name),
            urgent: true,
        }
    }

    fn text_crisis_line(&self) -> InterventionAction {
        InterventionAction {
            id: "text_crisis".to_string(),
            action_type: ActionType::Text,
            target: sms_uri(&self.config.text_number, &self.config.text_keyword),
            label: format!(
                "Text {} to {}",
                self.config.text_keyword, self.config.text_number
            ),
            urgent: true,
        }
    }

    fn call_emergency_services(&self) -> InterventionAction {
        InterventionAction {
            id: format!("call_{}", self.config.emergency_number),
            action_type: ActionType::Call,
            target: tel_uri(&self.config.emergency_number),
            label: format!("Call {}", self.config.emergency_number),
            urgent: true,
        }
    }
}

fn in_app(id: &str, action_type: ActionType, destination: &str, label: &str) -> InterventionAction {
    InterventionAction {
        id: id.to_string(),
        action_type,
        target: format!("app://{}", destination),
        label: label.to_string(),
        urgent: false,
    }
}

/// Concatenate, dropping later duplicates by id.
fn merge_resources(
    first: Vec<CrisisResource>,
    second: Vec<CrisisResource>,
) -> Vec<CrisisResource> {
    let mut seen = HashSet::new();
    first
        .into_iter()
        .chain(second)
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}
