//! Lifeline - crisis-risk detection and intervention engine
//!
//! Turns free-form user text into a risk assessment and, when warranted,
//! an intervention the host UI can render:
//!
//! - **Risk analysis**: weighted phrase lexicon with co-occurrence bonuses
//! - **Intervention selection**: tier-keyed messages, resources and actions
//! - **Resource ranking**: specialty lines promoted per profile
//! - **Safety plans**: versioned, persisted user plans
//! - **Audit logs**: capped crisis event and emergency action logs
//! - **Statistics**: risk distribution, top indicators, response rate
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     CrisisService                        │
//! │                                                          │
//! │  ┌──────────────┐   ┌────────────────────┐               │
//! │  │ RiskAnalyzer │──▶│InterventionSelector│◀─ Resource-   │
//! │  └──────┬───────┘   └────────────────────┘   Directory   │
//! │         │                                                │
//! │  ┌──────▼───┐   ┌────────────────┐   ┌────────────────┐  │
//! │  │ EventLog │──▶│StatisticsEngine│   │SafetyPlanStore │  │
//! │  └──────┬───┘   └────────────────┘   └───────┬────────┘  │
//! └─────────┼────────────────────────────────────┼───────────┘
//!           ▼                                    ▼
//!     KeyValueStore (host)            ActionInvoker / AlertPresenter (host)
//! ```

pub mod analyzer;
pub mod config;
pub mod event_log;
pub mod intervention;
pub mod platform;
pub mod resources;
pub mod safety_plan;
pub mod service;
pub mod statistics;
pub mod storage;
pub mod types;

// Re-export main types
pub use analyzer::RiskAnalyzer;
pub use config::EngineConfig;
pub use event_log::EventLog;
pub use intervention::InterventionSelector;
pub use platform::{ActionInvoker, ActionOutcome, AlertPresenter, DryRunInvoker};
pub use resources::ResourceDirectory;
pub use safety_plan::{Contact, SafetyPlan, SafetyPlanStore, SafetyPlanUpdate};
pub use service::CrisisService;
pub use statistics::{Statistics, StatisticsEngine};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use types::*;
