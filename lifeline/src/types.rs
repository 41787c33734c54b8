//! Core types shared across the lifeline engine.
//!
//! With the `typescript` feature enabled, the data types that cross the UI
//! boundary can be exported to TypeScript using ts-rs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Discrete risk classification produced by the analyzer.
///
/// Ordering follows severity, so `RiskTier::High > RiskTier::Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// No indicators matched
    None,
    /// Mild concern
    Low,
    /// Concerning language, not immediate
    Moderate,
    /// Self-harm or hopelessness language
    High,
    /// Suicidal intent or imminent danger
    Critical,
}

impl RiskTier {
    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::None => "none",
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }

    /// All tiers in ascending severity.
    pub fn all() -> [RiskTier; 5] {
        [
            RiskTier::None,
            RiskTier::Low,
            RiskTier::Moderate,
            RiskTier::High,
            RiskTier::Critical,
        ]
    }

    /// Whether this tier calls for immediate emergency resources.
    pub fn requires_immediate(&self) -> bool {
        matches!(self, RiskTier::High | RiskTier::Critical)
    }
}

impl Default for RiskTier {
    fn default() -> Self {
        Self::None
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of scoring a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct RiskAssessment {
    /// Classified tier
    pub tier: RiskTier,
    /// Total lexicon score
    pub score: u32,
    /// Confidence (0.0 - 1.0), two decimals
    pub confidence: f64,
    /// Matched phrases in match order, plus synthetic co-occurrence entries
    pub indicators: Vec<String>,
    /// True for high and critical tiers
    pub requires_immediate: bool,
}

impl RiskAssessment {
    /// Assessment for text with no risk signal.
    pub fn none() -> Self {
        Self {
            tier: RiskTier::None,
            score: 0,
            confidence: 0.0,
            indicators: vec![],
            requires_immediate: false,
        }
    }
}

/// How a crisis resource is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Phone call
    Voice,
    /// SMS
    Text,
    /// Emergency services
    Emergency,
    /// Web chat
    Chat,
    /// Informational resource
    Resource,
}

/// Population a resource is tailored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    /// LGBTQ+ young people
    Lgbtq,
    /// Veterans and service members
    Veterans,
    /// Teens
    Youth,
}

/// A crisis or support resource from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CrisisResource {
    /// Stable identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Phone number, short code or URL
    pub contact: String,
    /// SMS body keyword for text lines
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    /// Contact channel
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Lower sorts first
    pub priority: u32,
    /// Target population, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
    /// Short description shown under the name
    #[serde(default)]
    pub description: String,
}

/// Kind of action offered with an intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Place a phone call
    Call,
    /// Send an SMS
    Text,
    /// Keep talking in-app
    ContinueConversation,
    /// Open the resource list
    ViewResources,
    /// Open the safety plan coping strategies
    ViewCopingStrategies,
    /// Start a breathing/grounding exercise
    CalmingExercise,
}

impl ActionType {
    /// Whether the action leaves the app through the platform invoker.
    pub fn is_platform(&self) -> bool {
        matches!(self, ActionType::Call | ActionType::Text)
    }
}

/// An action the user can take from an intervention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct InterventionAction {
    /// Token returned by the alert when this action is chosen
    pub id: String,
    /// Action kind
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// `tel:`, `sms:` or `app://` URI
    pub target: String,
    /// Button label
    pub label: String,
    /// Render as urgent
    pub urgent: bool,
}

/// Message, resources and actions for a non-`none` tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct InterventionResponse {
    /// Tier that produced this response
    pub tier: RiskTier,
    /// Message shown to the user
    pub message: String,
    /// Resources in display order
    pub resources: Vec<CrisisResource>,
    /// Actions in display order
    pub actions: Vec<InterventionAction>,
}

impl InterventionResponse {
    /// Look up an action by its token.
    pub fn action(&self, id: &str) -> Option<&InterventionAction> {
        self.actions.iter().find(|a| a.id == id)
    }
}

/// Demographic hints used only to reorder specialty resources.
///
/// Every field is optional: a missing age never counts as youth and the
/// flags default to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct Demographics {
    /// Age in years
    pub age: Option<u32>,
    /// Identifies as LGBTQ+
    pub lgbtq: bool,
    /// Veteran or service member
    pub veteran: bool,
}

/// Caller-supplied profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(default)]
pub struct UserProfile {
    /// User identifier, logged as `anonymous` when missing
    pub user_id: Option<String>,
    /// Current session
    pub session_id: Option<String>,
    /// Demographic hints
    pub demographics: Demographics,
}

impl UserProfile {
    /// Profile for a known user.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    /// Builder: set session ID.
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Builder: set demographics.
    pub fn with_demographics(mut self, demographics: Demographics) -> Self {
        self.demographics = demographics;
        self
    }

    /// User ID as written to the event log.
    pub fn user_id_or_anonymous(&self) -> &str {
        self.user_id.as_deref().unwrap_or("anonymous")
    }
}

/// Summary of one assessment, kept in the crisis event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct CrisisEvent {
    /// Unique event ID
    pub id: String,
    /// When the assessment was logged
    pub timestamp: DateTime<Utc>,
    /// Assessed tier
    pub tier: RiskTier,
    /// Assessment confidence
    pub confidence: f64,
    /// Matched indicators
    pub indicators: Vec<String>,
    /// User the text came from
    pub user_id: String,
    /// Session, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Whether an intervention was shown
    pub responded: bool,
}

impl CrisisEvent {
    /// Build an event from an assessment.
    pub fn from_assessment(assessment: &RiskAssessment, profile: &UserProfile) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            tier: assessment.tier,
            confidence: assessment.confidence,
            indicators: assessment.indicators.clone(),
            user_id: profile.user_id_or_anonymous().to_string(),
            session_id: profile.session_id.clone(),
            responded: false,
        }
    }

    /// Mark whether an intervention was shown for this event.
    pub fn with_responded(mut self, responded: bool) -> Self {
        self.responded = responded;
        self
    }
}

/// A platform action the user took, as reported back by the invoker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct EmergencyAction {
    /// Unique action ID
    pub id: String,
    /// When the action was taken
    pub timestamp: DateTime<Utc>,
    /// Action kind
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// URI that was opened
    pub target: String,
    /// Whether the platform reported success
    pub successful: bool,
}

impl EmergencyAction {
    /// Create a new action record timestamped now.
    pub fn new(action_type: ActionType, target: impl Into<String>, successful: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action_type,
            target: target.into(),
            successful,
        }
    }
}

/// Failure reading or writing the key-value store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Backend I/O failed
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Stored value could not be parsed
    #[error("Corrupt record under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure opening a dialer or SMS composer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlatformActionError {
    /// No handler for the URI scheme on this device
    #[error("Platform action unavailable: {0}")]
    Unavailable(String),

    /// Handler was found but the invocation failed
    #[error("Platform action failed: {0}")]
    Failed(String),
}

/// Invalid or unreadable engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// YAML parse error
    #[error("Config parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File could not be read
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Semantic validation failed
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Umbrella error for lifeline.
#[derive(Debug, thiserror::Error)]
pub enum LifelineError {
    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Platform error
    #[error(transparent)]
    Platform(#[from] PlatformActionError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, LifelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(RiskTier::Critical > RiskTier::High);
        assert!(RiskTier::Low > RiskTier::None);
        assert!(RiskTier::High.requires_immediate());
        assert!(!RiskTier::Moderate.requires_immediate());
    }

    #[test]
    fn test_tier_serializes_snake_case() {
        let json = serde_json::to_string(&RiskTier::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }

    #[test]
    fn test_profile_defaults_from_empty_json() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.user_id_or_anonymous(), "anonymous");
        assert_eq!(profile.demographics.age, None);
        assert!(!profile.demographics.lgbtq);
    }

    #[test]
    fn test_resource_type_field_name() {
        let json = serde_json::json!({
            "id": "x",
            "name": "X",
            "contact": "123",
            "type": "voice",
            "priority": 1
        });
        let resource: CrisisResource = serde_json::from_value(json).unwrap();
        assert_eq!(resource.resource_type, ResourceType::Voice);
        assert!(resource.specialty.is_none());
    }
}
