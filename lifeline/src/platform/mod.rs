//! Platform collaborators.
//!
//! The engine never dials or texts itself. It builds URIs and hands them to
//! an [`ActionInvoker`]; alerts are rendered by an [`AlertPresenter`].

pub mod dry_run;
pub mod traits;

pub use dry_run::DryRunInvoker;
pub use traits::{ActionInvoker, ActionOutcome, AlertPresenter, DISMISS_TOKEN};
