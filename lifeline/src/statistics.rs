//! Aggregate metrics over the crisis logs.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::StatisticsConfig;
use crate::types::{CrisisEvent, EmergencyAction, RiskTier};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// How often an indicator appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct IndicatorCount {
    pub indicator: String,
    pub count: usize,
}

/// Statistics derived from the event and action logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Statistics {
    /// Events in the (capped) log
    pub total_events: usize,
    /// Events inside the recent window
    pub recent_events: usize,
    /// Actions in the (capped) log
    pub total_actions: usize,
    /// Actions inside the recent window
    pub recent_actions: usize,
    /// Recent events per tier; every tier is present
    pub risk_level_distribution: BTreeMap<RiskTier, usize>,
    /// Most frequent recent indicators, descending
    pub top_indicators: Vec<IndicatorCount>,
    /// Share of recent high/critical events followed by an emergency action
    pub response_rate: f64,
}

/// Computes [`Statistics`] from log contents. Pure.
#[derive(Debug, Clone, Default)]
pub struct StatisticsEngine {
    config: StatisticsConfig,
}

impl StatisticsEngine {
    /// Create with custom windows.
    pub fn new(config: StatisticsConfig) -> Self {
        Self { config }
    }

    /// Compute statistics as of now.
    pub fn compute_statistics(
        &self,
        events: &[CrisisEvent],
        actions: &[EmergencyAction],
    ) -> Statistics {
        self.compute_statistics_at(events, actions, Utc::now())
    }

    /// Compute statistics as of `now`.
    pub fn compute_statistics_at(
        &self,
        events: &[CrisisEvent],
        actions: &[EmergencyAction],
        now: DateTime<Utc>,
    ) -> Statistics {
        let cutoff = Duration::try_days(self.config.recent_window_days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let recent_events: Vec<&CrisisEvent> =
            events.iter().filter(|e| e.timestamp >= cutoff).collect();
        let recent_actions = actions.iter().filter(|a| a.timestamp >= cutoff).count();

        let mut distribution: BTreeMap<RiskTier, usize> =
            RiskTier::all().into_iter().map(|t| (t, 0)).collect();
        for event in &recent_events {
            *distribution.entry(event.tier).or_default() += 1;
        }

        Statistics {
            total_events: events.len(),
            recent_events: recent_events.len(),
            total_actions: actions.len(),
            recent_actions,
            risk_level_distribution: distribution,
            top_indicators: self.top_indicators(&recent_events),
            response_rate: self.response_rate(&recent_events, actions),
        }
    }

    fn top_indicators(&self, events: &[&CrisisEvent]) -> Vec<IndicatorCount> {
        // Count, remembering first-seen order for a stable tie-break.
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for indicator in events.iter().flat_map(|e| e.indicators.iter()) {
            let next = counts.len();
            counts.entry(indicator.as_str()).or_insert((0, next)).0 += 1;
        }

        let mut ranked: Vec<_> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));

        ranked
            .into_iter()
            .take(self.config.top_indicators)
            .map(|(indicator, (count, _))| IndicatorCount {
                indicator: indicator.to_string(),
                count,
            })
            .collect()
    }

    fn response_rate(&self, events: &[&CrisisEvent], actions: &[EmergencyAction]) -> f64 {
        let window = Duration::try_hours(self.config.response_window_hours);

        let urgent: Vec<_> = events
            .iter()
            .filter(|e| e.tier.requires_immediate())
            .collect();
        if urgent.is_empty() {
            return 1.0;
        }

        let responded = urgent
            .iter()
            .filter(|e| {
                // Unrepresentable window ends are treated as open-ended.
                let until = window.and_then(|w| e.timestamp.checked_add_signed(w));
                actions.iter().any(|a| {
                    a.timestamp >= e.timestamp && until.map_or(true, |end| a.timestamp <= end)
                })
            })
            .count();

        responded as f64 / urgent.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionType;

    fn event(tier: RiskTier, indicators: &[&str], at: DateTime<Utc>) -> CrisisEvent {
        CrisisEvent {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: at,
            tier,
            confidence: 0.5,
            indicators: indicators.iter().map(|s| s.to_string()).collect(),
            user_id: "user-1".to_string(),
            session_id: None,
            responded: false,
        }
    }

    fn action(at: DateTime<Utc>) -> EmergencyAction {
        EmergencyAction {
            timestamp: at,
            ..EmergencyAction::new(ActionType::Call, "tel:988", true)
        }
    }

    #[test]
    fn test_empty_logs() {
        let stats = StatisticsEngine::default().compute_statistics(&[], &[]);

        assert_eq!(stats.response_rate, 1.0);
        assert_eq!(stats.risk_level_distribution.len(), 5);
        assert!(stats.risk_level_distribution.values().all(|&c| c == 0));
        assert!(stats.top_indicators.is_empty());
        assert_eq!(stats.total_events, 0);
    }

    #[test]
    fn test_distribution_and_recent_window() {
        let now = Utc::now();
        let old = now - Duration::days(45);
        let events = vec![
            event(RiskTier::Low, &["numb"], now),
            event(RiskTier::Low, &["numb"], now),
            event(RiskTier::Moderate, &["anxious"], now),
            event(RiskTier::Critical, &["suicide"], old),
        ];

        let stats = StatisticsEngine::default().compute_statistics_at(&events, &[], now);

        assert_eq!(stats.total_events, 4);
        assert_eq!(stats.recent_events, 3);
        assert_eq!(stats.risk_level_distribution[&RiskTier::Low], 2);
        assert_eq!(stats.risk_level_distribution[&RiskTier::Moderate], 1);
        assert_eq!(stats.risk_level_distribution[&RiskTier::Critical], 0);
    }

    #[test]
    fn test_top_indicators_ranked() {
        let now = Utc::now();
        let mut events = vec![
            event(RiskTier::Low, &["numb", "alone"], now),
            event(RiskTier::Low, &["alone"], now),
            event(RiskTier::Low, &["alone", "panic"], now),
        ];
        for i in 0..12 {
            let name = format!("rare-{}", i);
            events.push(event(RiskTier::Low, &[name.as_str()], now));
        }

        let stats = StatisticsEngine::default().compute_statistics_at(&events, &[], now);

        assert_eq!(stats.top_indicators.len(), 10);
        assert_eq!(
            stats.top_indicators[0],
            IndicatorCount {
                indicator: "alone".to_string(),
                count: 3
            }
        );
        // Ties keep first-seen order.
        assert_eq!(stats.top_indicators[1].indicator, "numb");
        assert_eq!(stats.top_indicators[2].indicator, "panic");
        assert_eq!(stats.top_indicators[3].indicator, "rare-0");
    }

    #[test]
    fn test_response_rate() {
        let now = Utc::now();
        let t0 = now - Duration::days(3);
        let t1 = now - Duration::days(2);
        let events = vec![
            event(RiskTier::Critical, &["suicide"], t0),
            event(RiskTier::High, &["hopeless"], t1),
            // Low-tier events never count against the rate.
            event(RiskTier::Low, &["numb"], t1),
        ];
        // Follows the critical event within 24h; precedes the high one.
        let actions = vec![action(t0 + Duration::hours(2))];

        let stats = StatisticsEngine::default().compute_statistics_at(&events, &actions, now);
        assert_eq!(stats.response_rate, 0.5);
        assert_eq!(stats.recent_actions, 1);
    }

    #[test]
    fn test_huge_windows_do_not_panic() {
        let now = Utc::now();
        let engine = StatisticsEngine::new(StatisticsConfig {
            recent_window_days: 9_000_000_000_000,
            response_window_hours: i64::MAX,
            top_indicators: 10,
        });
        let events = vec![event(RiskTier::High, &["hopeless"], now - Duration::days(400))];
        let actions = vec![action(now)];

        let stats = engine.compute_statistics_at(&events, &actions, now);
        assert_eq!(stats.recent_events, 1);
        assert_eq!(stats.response_rate, 1.0);
    }

    #[test]
    fn test_action_before_event_does_not_count() {
        let now = Utc::now();
        let t = now - Duration::hours(5);
        let events = vec![event(RiskTier::High, &["hopeless"], t)];
        let actions = vec![
            action(t - Duration::minutes(1)),
            action(t + Duration::hours(25)),
        ];

        let stats = StatisticsEngine::default().compute_statistics_at(&events, &actions, now);
        assert_eq!(stats.response_rate, 0.0);
    }
}
