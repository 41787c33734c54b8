//! CrisisService - main entry point for callers.
//!
//! Owns every engine component and wires them to the host's storage and
//! platform collaborators. Construct one per application and pass it
//! around; there is no global instance.

use std::sync::Arc;
use tracing::{info, warn};

use crate::analyzer::RiskAnalyzer;
use crate::config::{EngineConfig, InterventionConfig};
use crate::event_log::EventLog;
use crate::intervention::InterventionSelector;
use crate::platform::{ActionInvoker, ActionOutcome, AlertPresenter, DISMISS_TOKEN};
use crate::resources::ResourceDirectory;
use crate::safety_plan::SafetyPlanStore;
use crate::statistics::{Statistics, StatisticsEngine};
use crate::storage::KeyValueStore;
use crate::types::{
    ActionType, CrisisEvent, InterventionAction, InterventionResponse, Result, RiskAssessment,
    UserProfile,
};

/// Crisis detection and intervention service.
pub struct CrisisService {
    analyzer: RiskAnalyzer,
    directory: Arc<ResourceDirectory>,
    selector: InterventionSelector,
    plans: SafetyPlanStore,
    events: Arc<EventLog>,
    statistics: StatisticsEngine,
    invoker: Arc<dyn ActionInvoker>,
    presenter: Option<Arc<dyn AlertPresenter>>,
    intervention: InterventionConfig,
}

impl CrisisService {
    /// Create a service from a validated configuration.
    pub fn new(
        config: EngineConfig,
        store: Arc<dyn KeyValueStore>,
        invoker: Arc<dyn ActionInvoker>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, store, invoker))
    }

    /// Create with the built-in configuration.
    pub fn with_defaults(store: Arc<dyn KeyValueStore>, invoker: Arc<dyn ActionInvoker>) -> Self {
        Self::build(EngineConfig::default(), store, invoker)
    }

    fn build(
        config: EngineConfig,
        store: Arc<dyn KeyValueStore>,
        invoker: Arc<dyn ActionInvoker>,
    ) -> Self {
        let directory = Arc::new(ResourceDirectory::from_config(config.resources));
        let selector = InterventionSelector::new(config.intervention.clone(), directory.clone());

        info!(
            buckets = config.lexicon.buckets.len(),
            pairs = config.lexicon.co_occurrence.len(),
            "CrisisService initialized"
        );

        Self {
            analyzer: RiskAnalyzer::with_lexicon(config.lexicon),
            directory,
            selector,
            plans: SafetyPlanStore::new(store.clone(), &config.storage, &config.intervention),
            events: Arc::new(EventLog::new(store, &config.storage)),
            statistics: StatisticsEngine::new(config.statistics),
            invoker,
            presenter: None,
            intervention: config.intervention,
        }
    }

    /// Builder: set the alert presenter.
    pub fn with_presenter(mut self, presenter: Arc<dyn AlertPresenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Score text. Pure and synchronous.
    pub fn analyze(&self, text: &str) -> RiskAssessment {
        self.analyzer.analyze(text)
    }

    /// Score an arbitrary JSON value; non-strings are `none`.
    pub fn analyze_value(&self, value: &serde_json::Value) -> RiskAssessment {
        self.analyzer.analyze_value(value)
    }

    /// Select an intervention and log the assessment in the background.
    ///
    /// Logging is spawned on the current tokio runtime. Without one the
    /// event is dropped with a warning; the response is returned either way.
    pub fn handle_crisis(
        &self,
        assessment: &RiskAssessment,
        profile: &UserProfile,
    ) -> Option<InterventionResponse> {
        let response = self.selector.select(assessment, profile);
        let event = CrisisEvent::from_assessment(assessment, profile)
            .with_responded(response.is_some());

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let events = self.events.clone();
                handle.spawn(async move {
                    events.log_event(event).await;
                });
            }
            Err(_) => {
                warn!(tier = %assessment.tier, "No async runtime, crisis event not logged");
            }
        }

        response
    }

    /// Like [`handle_crisis`](Self::handle_crisis) but waits for the log write.
    pub async fn handle_crisis_logged(
        &self,
        assessment: &RiskAssessment,
        profile: &UserProfile,
    ) -> Option<InterventionResponse> {
        let response = self.selector.select(assessment, profile);
        let event = CrisisEvent::from_assessment(assessment, profile)
            .with_responded(response.is_some());
        self.events.log_event(event).await;
        response
    }

    /// Present an intervention and return the chosen action token.
    pub async fn show_crisis_alert(&self, response: &InterventionResponse) -> String {
        match &self.presenter {
            Some(presenter) => presenter.present(response).await,
            None => {
                warn!(tier = %response.tier, "No alert presenter configured");
                DISMISS_TOKEN.to_string()
            }
        }
    }

    /// Carry out the action a token refers to.
    ///
    /// Platform actions are opened through the invoker and logged with
    /// their outcome. A failed invocation returns the literal number or
    /// keyword for the UI to show.
    pub async fn dispatch_action(
        &self,
        response: &InterventionResponse,
        token: &str,
    ) -> ActionOutcome {
        if token == DISMISS_TOKEN {
            return ActionOutcome::Dismissed;
        }

        let Some(action) = response.action(token) else {
            warn!(token = %token, "Unknown action token");
            return ActionOutcome::Unknown {
                token: token.to_string(),
            };
        };

        if !action.action_type.is_platform() {
            return ActionOutcome::InApp {
                target: action.target.clone(),
            };
        }

        let result = self.invoker.open(&action.target).await;
        self.events
            .log_emergency_action(action.action_type, &action.target, result.is_ok())
            .await;

        match result {
            Ok(()) => {
                info!(action = %action.id, "Emergency action opened");
                ActionOutcome::Opened {
                    target: action.target.clone(),
                }
            }
            Err(e) => {
                warn!(action = %action.id, error = %e, "Emergency action failed");
                ActionOutcome::Failed {
                    target: action.target.clone(),
                    manual: self.manual_fallback(action),
                    error: e.to_string(),
                }
            }
        }
    }

    /// Show the alert, then dispatch whatever the user picked.
    pub async fn respond(&self, response: &InterventionResponse) -> ActionOutcome {
        let token = self.show_crisis_alert(response).await;
        self.dispatch_action(response, &token).await
    }

    /// Aggregate statistics over both logs.
    pub async fn crisis_statistics(&self) -> Statistics {
        let events = self.events.crisis_events().await;
        let actions = self.events.emergency_actions().await;
        self.statistics.compute_statistics(&events, &actions)
    }

    /// Safety plan store.
    pub fn safety_plans(&self) -> &SafetyPlanStore {
        &self.plans
    }

    /// Event log.
    pub fn event_log(&self) -> &EventLog {
        &self.events
    }

    /// Resource directory.
    pub fn resources(&self) -> &ResourceDirectory {
        &self.directory
    }

    fn manual_fallback(&self, action: &InterventionAction) -> String {
        let target = action.target.as_str();
        match action.action_type {
            ActionType::Text => {
                let rest = target.strip_prefix("sms:").unwrap_or(target);
                let (number, keyword) = match rest.split_once("?body=") {
                    Some((number, keyword)) => (number, keyword),
                    None => (rest, self.intervention.text_keyword.as_str()),
                };
                format!("Text {} to {}", keyword, number)
            }
            _ => {
                let number = target.strip_prefix("tel:").unwrap_or(target);
                format!("Call {}", number)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DryRunInvoker;
    use crate::storage::MemoryStore;
    use crate::types::RiskTier;

    fn service(invoker: Arc<DryRunInvoker>) -> CrisisService {
        CrisisService::with_defaults(Arc::new(MemoryStore::new()), invoker)
    }

    #[tokio::test]
    async fn test_handle_crisis_logs_in_background() {
        let service = service(Arc::new(DryRunInvoker::new()));
        let assessment = service.analyze("I feel so alone");
        let response = service
            .handle_crisis(&assessment, &UserProfile::for_user("u1"))
            .unwrap();
        assert_eq!(response.tier, RiskTier::Low);

        let mut events = vec![];
        for _ in 0..20 {
            tokio::task::yield_now().await;
            events = service.event_log().crisis_events().await;
            if !events.is_empty() {
                break;
            }
        }
        assert_eq!(events.len(), 1);
        assert!(events[0].responded);
    }

    #[test]
    fn test_handle_crisis_without_runtime() {
        let service = service(Arc::new(DryRunInvoker::new()));
        let assessment = service.analyze("I want to die");
        let response = service.handle_crisis(&assessment, &UserProfile::default());
        assert_eq!(response.unwrap().tier, RiskTier::Critical);

        let events = tokio_test::block_on(service.event_log().crisis_events());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_failure_gives_manual_fallback() {
        let invoker = Arc::new(DryRunInvoker::new().with_failure(true));
        let service = service(invoker);
        let assessment = service.analyze("I want to die");
        let response = service
            .handle_crisis_logged(&assessment, &UserProfile::default())
            .await
            .unwrap();

        let outcome = service.dispatch_action(&response, "text_crisis").await;
        match outcome {
            ActionOutcome::Failed { manual, .. } => assert_eq!(manual, "Text HOME to 741741"),
            other => panic!("unexpected outcome {:?}", other),
        }

        let outcome = service.dispatch_action(&response, "call_911").await;
        assert!(matches!(outcome, ActionOutcome::Failed { ref manual, .. } if manual == "Call 911"));

        let actions = service.event_log().emergency_actions().await;
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().all(|a| !a.successful));
    }

    #[tokio::test]
    async fn test_no_presenter_dismisses() {
        let service = service(Arc::new(DryRunInvoker::new()));
        let assessment = service.analyze("hopeless");
        let response = service
            .handle_crisis_logged(&assessment, &UserProfile::default())
            .await
            .unwrap();

        assert_eq!(service.show_crisis_alert(&response).await, DISMISS_TOKEN);
        assert_eq!(service.respond(&response).await, ActionOutcome::Dismissed);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = EngineConfig::default();
        config.storage.max_crisis_events = 0;
        let result = CrisisService::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(DryRunInvoker::new()),
        );
        assert!(result.is_err());
    }
}
