//! Configuration for the lifeline engine.
//!
//! Lexicon weights, phrase lists, the resource catalog and intervention
//! copy are all data. Defaults are compiled in; a YAML file can replace
//! any section without recompiling.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::types::{ConfigError, CrisisResource, ResourceType, Specialty};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Risk lexicon and scoring curve
    pub lexicon: LexiconConfig,
    /// Resource catalog
    pub resources: ResourceConfig,
    /// Intervention copy and contact numbers
    pub intervention: InterventionConfig,
    /// Persistence keys and log caps
    pub storage: StorageConfig,
    /// Statistics windows
    pub statistics: StatisticsConfig,
}

impl EngineConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check semantic constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lexicon.validate()?;
        self.resources.validate()?;
        self.intervention.validate()?;
        self.storage.validate()?;
        self.statistics.validate()?;
        Ok(())
    }
}

/// Weighted phrase lexicon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconConfig {
    /// Severity buckets, scanned in order
    pub buckets: Vec<SeverityBucket>,
    /// Phrase pairs that earn a bonus when both appear
    pub co_occurrence: Vec<[String; 2]>,
    /// Bonus per matched pair
    pub co_occurrence_bonus: u32,
    /// Score cut-offs per tier
    pub thresholds: TierThresholds,
    /// Confidence curve per tier
    pub confidence: ConfidenceCurve,
}

/// A group of phrases sharing one weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityBucket {
    /// Bucket name, for logs
    pub name: String,
    /// Score added per matched phrase
    pub weight: u32,
    /// Score floor applied when any phrase in this bucket matches
    #[serde(default)]
    pub min_score: Option<u32>,
    /// Lowercase phrases
    pub phrases: Vec<String>,
}

impl SeverityBucket {
    fn new(name: &str, weight: u32, min_score: Option<u32>, phrases: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight,
            min_score,
            phrases: phrases.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Minimum score for each non-`none` tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub low: u32,
    pub moderate: u32,
    pub high: u32,
    pub critical: u32,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            low: 1,
            moderate: 4,
            high: 8,
            critical: 15,
        }
    }
}

/// `min(score / denominator, cap)` for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub denominator: f64,
    pub cap: f64,
}

/// Confidence curve for each non-`none` tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCurve {
    pub low: CurvePoint,
    pub moderate: CurvePoint,
    pub high: CurvePoint,
    pub critical: CurvePoint,
}

impl Default for ConfidenceCurve {
    fn default() -> Self {
        Self {
            low: CurvePoint { denominator: 5.0, cap: 0.5 },
            moderate: CurvePoint { denominator: 10.0, cap: 0.7 },
            high: CurvePoint { denominator: 15.0, cap: 0.9 },
            critical: CurvePoint { denominator: 20.0, cap: 1.0 },
        }
    }
}

impl Default for LexiconConfig {
    fn default() -> Self {
        let thresholds = TierThresholds::default();
        Self {
            buckets: vec![
                SeverityBucket::new(
                    "critical",
                    10,
                    Some(thresholds.critical),
                    &[
                        "kill myself",
                        "suicide",
                        "suicidal",
                        "end my life",
                        "want to die",
                        "better off dead",
                        "take my own life",
                        "end it all",
                        "no reason to live",
                    ],
                ),
                SeverityBucket::new(
                    "high",
                    7,
                    None,
                    &[
                        "hurt myself",
                        "harm myself",
                        "self harm",
                        "self-harm",
                        "cut myself",
                        "hopeless",
                        "can't go on",
                        "no way out",
                        "worthless",
                        "burden to everyone",
                    ],
                ),
                SeverityBucket::new(
                    "urgency",
                    5,
                    None,
                    &[
                        "tonight",
                        "right now",
                        "immediately",
                        "before morning",
                        "won't be here tomorrow",
                        "last goodbye",
                    ],
                ),
                SeverityBucket::new(
                    "concerning",
                    3,
                    None,
                    &[
                        "depressed",
                        "lonely",
                        "alone",
                        "empty inside",
                        "numb",
                        "trapped",
                        "overwhelmed",
                        "exhausted",
                        "can't sleep",
                        "panic",
                        "anxious",
                        "crying",
                        "give up",
                        "no one cares",
                        "hate myself",
                        "falling apart",
                    ],
                ),
            ],
            co_occurrence: [
                ("plan", "suicide"),
                ("plan", "kill myself"),
                ("plan", "end my life"),
                ("give up", "life"),
                ("tonight", "end my life"),
                ("tonight", "kill myself"),
                ("goodbye", "forever"),
                ("pills", "die"),
            ]
            .iter()
            .map(|(a, b)| [a.to_string(), b.to_string()])
            .collect(),
            co_occurrence_bonus: 8,
            thresholds,
            confidence: ConfidenceCurve::default(),
        }
    }
}

impl LexiconConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !(0 < t.low && t.low < t.moderate && t.moderate < t.high && t.high < t.critical) {
            return Err(ConfigError::Invalid(format!(
                "tier thresholds must be strictly increasing and above zero, got {}/{}/{}/{}",
                t.low, t.moderate, t.high, t.critical
            )));
        }

        for bucket in &self.buckets {
            if bucket.weight == 0 {
                return Err(ConfigError::Invalid(format!(
                    "bucket '{}' has zero weight",
                    bucket.name
                )));
            }
            for phrase in &bucket.phrases {
                check_phrase(phrase)?;
            }
        }

        for pair in &self.co_occurrence {
            for phrase in pair {
                check_phrase(phrase)?;
            }
        }

        let c = &self.confidence;
        for point in [c.low, c.moderate, c.high, c.critical] {
            if point.denominator <= 0.0 || !(0.0..=1.0).contains(&point.cap) {
                return Err(ConfigError::Invalid(format!(
                    "confidence curve point {:?} out of range",
                    point
                )));
            }
        }

        Ok(())
    }
}

fn check_phrase(phrase: &str) -> Result<(), ConfigError> {
    if phrase.trim().is_empty() {
        return Err(ConfigError::Invalid("empty lexicon phrase".to_string()));
    }
    if phrase != phrase.to_lowercase() {
        return Err(ConfigError::Invalid(format!(
            "lexicon phrase '{}' must be lowercase",
            phrase
        )));
    }
    Ok(())
}

/// Resource catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Crisis lines, ranked per profile
    pub emergency: Vec<CrisisResource>,
    /// Non-emergency helplines, warm lines and chat
    pub support: Vec<CrisisResource>,
    /// How many emergency resources to return
    pub emergency_limit: usize,
}

fn resource(
    id: &str,
    name: &str,
    contact: &str,
    resource_type: ResourceType,
    priority: u32,
    description: &str,
) -> CrisisResource {
    CrisisResource {
        id: id.to_string(),
        name: name.to_string(),
        contact: contact.to_string(),
        keyword: None,
        resource_type,
        priority,
        specialty: None,
        description: description.to_string(),
    }
}

impl Default for ResourceConfig {
    fn default() -> Self {
        let mut crisis_text = resource(
            "crisis_text_line",
            "Crisis Text Line",
            "741741",
            ResourceType::Text,
            2,
            "Text HOME to 741741",
        );
        crisis_text.keyword = Some("HOME".to_string());

        let mut trevor = resource(
            "trevor_project",
            "The Trevor Project",
            "1-866-488-7386",
            ResourceType::Voice,
            4,
            "Crisis support for LGBTQ+ young people",
        );
        trevor.specialty = Some(Specialty::Lgbtq);

        let mut veterans = resource(
            "veterans_crisis_line",
            "Veterans Crisis Line",
            "988",
            ResourceType::Voice,
            5,
            "Dial 988, then press 1",
        );
        veterans.specialty = Some(Specialty::Veterans);

        let mut teen_line = resource(
            "teen_line",
            "Teen Line",
            "1-800-852-8336",
            ResourceType::Voice,
            7,
            "Teens helping teens, evenings",
        );
        teen_line.specialty = Some(Specialty::Youth);

        Self {
            emergency: vec![
                resource(
                    "988_lifeline",
                    "988 Suicide & Crisis Lifeline",
                    "988",
                    ResourceType::Voice,
                    1,
                    "24/7 free and confidential support",
                ),
                crisis_text,
                resource(
                    "emergency_services",
                    "Emergency Services",
                    "911",
                    ResourceType::Emergency,
                    3,
                    "For immediate danger",
                ),
                trevor,
                veterans,
                resource(
                    "988_chat",
                    "988 Lifeline Chat",
                    "https://988lifeline.org/chat",
                    ResourceType::Chat,
                    6,
                    "Chat online with a trained counselor",
                ),
                teen_line,
            ],
            support: vec![
                resource(
                    "nami_helpline",
                    "NAMI HelpLine",
                    "1-800-950-6264",
                    ResourceType::Voice,
                    1,
                    "Information and peer support, weekdays",
                ),
                resource(
                    "samhsa_helpline",
                    "SAMHSA National Helpline",
                    "1-800-662-4357",
                    ResourceType::Voice,
                    2,
                    "Free, confidential treatment referral",
                ),
                resource(
                    "warmline_directory",
                    "Peer Warmlines",
                    "https://warmline.org",
                    ResourceType::Resource,
                    3,
                    "Talk to a peer before things become a crisis",
                ),
                resource(
                    "7cups_chat",
                    "7 Cups",
                    "https://www.7cups.com",
                    ResourceType::Chat,
                    4,
                    "Free emotional support chat",
                ),
            ],
            emergency_limit: 5,
        }
    }
}

impl ResourceConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.emergency.is_empty() {
            return Err(ConfigError::Invalid(
                "emergency resource catalog is empty".to_string(),
            ));
        }
        if self.emergency_limit == 0 {
            return Err(ConfigError::Invalid("emergency_limit must be > 0".to_string()));
        }

        let mut seen = HashSet::new();
        for r in self.emergency.iter().chain(self.support.iter()) {
            if !seen.insert(r.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate resource id '{}'",
                    r.id
                )));
            }
        }
        Ok(())
    }
}

/// Intervention copy and the numbers actions dial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionConfig {
    /// Primary crisis line
    pub primary_number: String,
    /// Display name of the primary line
    pub primary_name: String,
    /// Crisis text line short code
    pub text_number: String,
    /// Keyword sent to the text line
    pub text_keyword: String,
    /// Emergency services
    pub emergency_number: String,
    /// Message per tier
    pub messages: TierMessages,
}

/// User-facing message per tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierMessages {
    pub critical: String,
    pub high: String,
    pub moderate: String,
    pub low: String,
}

impl Default for TierMessages {
    fn default() -> Self {
        Self {
            critical: "I'm really concerned about your safety right now. You don't have to \
                       go through this alone. Please reach out to someone who can help \
                       immediately."
                .to_string(),
            high: "It sounds like you're in a lot of pain, and what you're feeling matters. \
                   Talking to someone right now can help."
                .to_string(),
            moderate: "Thank you for sharing how you're feeling. It takes courage. Support \
                       is available whenever you want it."
                .to_string(),
            low: "It sounds like things have been hard lately. I'm here to listen, and \
                  there are people you can talk to as well."
                .to_string(),
        }
    }
}

impl InterventionConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        // Call actions are keyed by number, so the two lines must differ.
        if self.primary_number == self.emergency_number {
            return Err(ConfigError::Invalid(format!(
                "primary_number and emergency_number are both '{}'",
                self.primary_number
            )));
        }
        Ok(())
    }
}

impl Default for InterventionConfig {
    fn default() -> Self {
        Self {
            primary_number: "988".to_string(),
            primary_name: "988 Lifeline".to_string(),
            text_number: "741741".to_string(),
            text_keyword: "HOME".to_string(),
            emergency_number: "911".to_string(),
            messages: TierMessages::default(),
        }
    }
}

/// Persistence keys and log caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Key holding the safety plan
    pub safety_plan_key: String,
    /// Key holding the crisis event list
    pub crisis_events_key: String,
    /// Key holding the emergency action list
    pub emergency_actions_key: String,
    /// Maximum crisis events retained
    pub max_crisis_events: usize,
    /// Maximum emergency actions retained
    pub max_emergency_actions: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            safety_plan_key: "user_safety_plan".to_string(),
            crisis_events_key: "crisis_events".to_string(),
            emergency_actions_key: "emergency_actions".to_string(),
            max_crisis_events: 100,
            max_emergency_actions: 50,
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_crisis_events == 0 || self.max_emergency_actions == 0 {
            return Err(ConfigError::Invalid("log caps must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Longest accepted "recent" window (ten years).
pub const MAX_RECENT_WINDOW_DAYS: i64 = 3650;

/// Longest accepted response window (thirty days).
pub const MAX_RESPONSE_WINDOW_HOURS: i64 = 720;

/// Windows used when aggregating the logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// "Recent" window (days)
    pub recent_window_days: i64,
    /// Max delay between event and action to count as a response (hours)
    pub response_window_hours: i64,
    /// How many indicators to report
    pub top_indicators: usize,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 30,
            response_window_hours: 24,
            top_indicators: 10,
        }
    }
}

impl StatisticsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.recent_window_days <= 0 || self.response_window_hours <= 0 {
            return Err(ConfigError::Invalid(
                "statistics windows must be positive".to_string(),
            ));
        }
        if self.recent_window_days > MAX_RECENT_WINDOW_DAYS {
            return Err(ConfigError::Invalid(format!(
                "recent_window_days must be at most {}",
                MAX_RECENT_WINDOW_DAYS
            )));
        }
        if self.response_window_hours > MAX_RESPONSE_WINDOW_HOURS {
            return Err(ConfigError::Invalid(format!(
                "response_window_hours must be at most {}",
                MAX_RESPONSE_WINDOW_HOURS
            )));
        }
        Ok(())
    }
}
