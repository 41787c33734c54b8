//! Lexicon-based risk analysis.
//!
//! Scores free-form text against weighted severity buckets and a table of
//! co-occurring phrase pairs, then maps the score onto a [`RiskTier`].
//!
//! Matching is raw substring containment on the lowercased, trimmed text.
//! There is no word-boundary anchoring, so `"plan"` also matches inside
//! `"planet"`. Existing scoring depends on this, so it is kept as-is.

use std::collections::HashSet;
use tracing::debug;

use crate::config::{CurvePoint, LexiconConfig};
use crate::types::{RiskAssessment, RiskTier};

/// Scores text into a [`RiskAssessment`].
///
/// Stateless after construction; share it freely behind an `Arc`.
#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
    lexicon: LexiconConfig,
}

impl RiskAnalyzer {
    /// Create an analyzer with the built-in lexicon.
    pub fn new() -> Self {
        Self::with_lexicon(LexiconConfig::default())
    }

    /// Create with a custom lexicon.
    pub fn with_lexicon(lexicon: LexiconConfig) -> Self {
        Self { lexicon }
    }

    /// The lexicon in use.
    pub fn lexicon(&self) -> &LexiconConfig {
        &self.lexicon
    }

    /// Analyze an arbitrary JSON value.
    ///
    /// Anything other than a non-empty string yields [`RiskAssessment::none`].
    pub fn analyze_value(&self, value: &serde_json::Value) -> RiskAssessment {
        match value.as_str() {
            Some(text) => self.analyze(text),
            None => RiskAssessment::none(),
        }
    }

    /// Analyze a piece of text.
    pub fn analyze(&self, text: &str) -> RiskAssessment {
        let normalized = text.trim().to_lowercase();
        if normalized.is_empty() {
            return RiskAssessment::none();
        }

        let mut score: u32 = 0;
        let mut floor: u32 = 0;
        let mut indicators = Vec::new();
        let mut seen = HashSet::new();

        for bucket in &self.lexicon.buckets {
            for phrase in &bucket.phrases {
                if normalized.contains(phrase.as_str()) && seen.insert(phrase.as_str()) {
                    score = score.saturating_add(bucket.weight);
                    indicators.push(phrase.clone());
                    if let Some(min) = bucket.min_score {
                        floor = floor.max(min);
                    }
                }
            }
        }

        for [first, second] in &self.lexicon.co_occurrence {
            if normalized.contains(first.as_str()) && normalized.contains(second.as_str()) {
                score = score.saturating_add(self.lexicon.co_occurrence_bonus);
                indicators.push(format!("{} + {}", first, second));
            }
        }

        let score = score.max(floor);
        let tier = self.tier_for_score(score);
        let confidence = self.confidence(tier, score);

        debug!(
            tier = %tier,
            score = score,
            indicators = indicators.len(),
            "Text analyzed"
        );

        RiskAssessment {
            tier,
            score,
            confidence,
            indicators,
            requires_immediate: tier.requires_immediate(),
        }
    }

    /// Map a score onto a tier. Monotonic in `score`.
    pub fn tier_for_score(&self, score: u32) -> RiskTier {
        let t = &self.lexicon.thresholds;
        if score >= t.critical {
            RiskTier::Critical
        } else if score >= t.high {
            RiskTier::High
        } else if score >= t.moderate {
            RiskTier::Moderate
        } else if score >= t.low {
            RiskTier::Low
        } else {
            RiskTier::None
        }
    }

    fn confidence(&self, tier: RiskTier, score: u32) -> f64 {
        let curve = &self.lexicon.confidence;
        let point: CurvePoint = match tier {
            RiskTier::None => return 0.0,
            RiskTier::Low => curve.low,
            RiskTier::Moderate => curve.moderate,
            RiskTier::High => curve.high,
            RiskTier::Critical => curve.critical,
        };

        let raw = (score as f64 / point.denominator).min(point.cap);
        (raw * 100.0).round() / 100.0
    }
}

impl Default for RiskAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
