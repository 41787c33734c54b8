//! End-to-end crisis flow through `CrisisService`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lifeline::{
    ActionOutcome, ActionType, AlertPresenter, CrisisService, Demographics, DryRunInvoker,
    InterventionResponse, MemoryStore, RiskTier, SafetyPlanUpdate, UserProfile,
};

/// Presenter that always picks the same token and counts how often it ran.
struct ScriptedPresenter {
    token: String,
    shown: AtomicUsize,
}

impl ScriptedPresenter {
    fn choosing(token: &str) -> Self {
        Self {
            token: token.to_string(),
            shown: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AlertPresenter for ScriptedPresenter {
    async fn present(&self, _response: &InterventionResponse) -> String {
        self.shown.fetch_add(1, Ordering::SeqCst);
        self.token.clone()
    }
}

fn service() -> (CrisisService, Arc<DryRunInvoker>) {
    let invoker = Arc::new(DryRunInvoker::new());
    let service = CrisisService::with_defaults(Arc::new(MemoryStore::new()), invoker.clone());
    (service, invoker)
}

#[tokio::test]
async fn test_end_my_life_tonight_flow() {
    let (service, _) = service();
    let assessment = service.analyze("I want to end my life tonight");

    assert_eq!(assessment.tier, RiskTier::Critical);
    assert!(assessment.requires_immediate);
    assert!(assessment
        .indicators
        .contains(&"tonight + end my life".to_string()));

    let response = service
        .handle_crisis_logged(&assessment, &UserProfile::for_user("user-1"))
        .await
        .unwrap();

    let call = &response.actions[0];
    assert_eq!(call.action_type, ActionType::Call);
    assert_eq!(call.target, "tel:988");
    assert!(call.urgent);

    let events = service.event_log().crisis_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tier, RiskTier::Critical);
    assert!(events[0].responded);
}

#[tokio::test]
async fn test_positive_text_has_no_intervention() {
    let (service, _) = service();
    let assessment = service.analyze("I had a good therapy session today");

    assert_eq!(assessment.tier, RiskTier::None);
    let response = service
        .handle_crisis_logged(&assessment, &UserProfile::default())
        .await;
    assert!(response.is_none());

    let events = service.event_log().crisis_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, "anonymous");
    assert!(!events[0].responded);
}

#[tokio::test]
async fn test_lgbtq_youth_sees_trevor_project_first() {
    let (service, _) = service();
    let profile = UserProfile::for_user("user-2").with_demographics(Demographics {
        age: Some(20),
        lgbtq: true,
        veteran: false,
    });

    let assessment = service.analyze("I feel hopeless and worthless");
    let response = service
        .handle_crisis_logged(&assessment, &profile)
        .await
        .unwrap();

    assert_eq!(response.resources[0].id, "trevor_project");
    assert_eq!(
        service.resources().find("trevor_project"),
        Some(&response.resources[0])
    );
}

#[tokio::test]
async fn test_presenter_choice_is_dispatched_and_counted() {
    let (service, invoker) = service();
    let presenter = Arc::new(ScriptedPresenter::choosing("call_988"));
    let service = service.with_presenter(presenter.clone());

    let assessment = service.analyze("I am suicidal");
    let response = service
        .handle_crisis_logged(&assessment, &UserProfile::for_user("user-3"))
        .await
        .unwrap();

    let outcome = service.respond(&response).await;
    assert_eq!(
        outcome,
        ActionOutcome::Opened {
            target: "tel:988".to_string()
        }
    );
    assert_eq!(presenter.shown.load(Ordering::SeqCst), 1);
    assert_eq!(invoker.opened(), vec!["tel:988".to_string()]);

    let stats = service.crisis_statistics().await;
    assert_eq!(stats.total_events, 1);
    assert_eq!(stats.total_actions, 1);
    assert_eq!(stats.risk_level_distribution[&RiskTier::Critical], 1);
    assert_eq!(stats.response_rate, 1.0);
}

#[tokio::test]
async fn test_in_app_action_not_logged() {
    let (service, invoker) = service();
    let assessment = service.analyze("so anxious and overwhelmed");
    let response = service
        .handle_crisis_logged(&assessment, &UserProfile::default())
        .await
        .unwrap();
    assert_eq!(response.tier, RiskTier::Moderate);

    let outcome = service.dispatch_action(&response, "view_coping").await;
    assert!(matches!(outcome, ActionOutcome::InApp { .. }));
    assert!(matches!(
        service.dispatch_action(&response, "call_988").await,
        ActionOutcome::Unknown { .. }
    ));

    assert!(invoker.opened().is_empty());
    assert!(service.event_log().emergency_actions().await.is_empty());

    // No high or critical events yet.
    let stats = service.crisis_statistics().await;
    assert_eq!(stats.response_rate, 1.0);
}

#[tokio::test]
async fn test_event_log_capped_through_service() {
    let (service, _) = service();
    let assessment = service.analyze("lonely");

    for _ in 0..150 {
        service
            .handle_crisis_logged(&assessment, &UserProfile::default())
            .await;
    }

    assert_eq!(service.event_log().crisis_events().await.len(), 100);
    assert_eq!(service.crisis_statistics().await.total_events, 100);
}

#[tokio::test]
async fn test_safety_plan_roundtrip() {
    let store = Arc::new(MemoryStore::new());
    let service = CrisisService::with_defaults(store.clone(), Arc::new(DryRunInvoker::new()));
    let plans = service.safety_plans();

    let created = plans
        .create(SafetyPlanUpdate {
            reasons_for_living: Some(vec!["my sister".to_string()]),
            ..Default::default()
        })
        .await;
    assert_eq!(plans.get().await, Some(created.clone()));

    let raw = lifeline::KeyValueStore::get(store.as_ref(), "user_safety_plan")
        .await
        .unwrap()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for field in ["created_at", "last_updated"] {
        let stamp = json[field].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok(), "{}", stamp);
    }

    assert_eq!(plans.update(SafetyPlanUpdate::default()).await.version, 2);
    assert_eq!(plans.update(SafetyPlanUpdate::default()).await.version, 3);
}
