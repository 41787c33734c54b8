//! Traits implemented by the host platform.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{InterventionResponse, PlatformActionError};

/// Token an alert resolves to when the user closes it.
pub const DISMISS_TOKEN: &str = "dismiss";

/// Opens `tel:` and `sms:` URIs on the device.
#[async_trait]
pub trait ActionInvoker: Send + Sync {
    /// Open the URI, reporting whether the platform accepted it.
    async fn open(&self, uri: &str) -> Result<(), PlatformActionError>;
}

/// Presents an intervention and reports which action the user chose.
#[async_trait]
pub trait AlertPresenter: Send + Sync {
    /// Show the alert; resolve to an action id or [`DISMISS_TOKEN`].
    async fn present(&self, response: &InterventionResponse) -> String;
}

/// What happened when an alert token was dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// The platform opened the dialer or composer
    Opened { target: String },
    /// The platform failed; show `manual` so the user can act by hand
    Failed { target: String, manual: String, error: String },
    /// In-app navigation for the UI to handle
    InApp { target: String },
    /// User dismissed the alert
    Dismissed,
    /// Token did not match any offered action
    Unknown { token: String },
}
