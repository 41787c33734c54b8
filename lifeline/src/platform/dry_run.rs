//! Invoker that records URIs instead of opening them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::info;

use super::traits::ActionInvoker;
use crate::types::PlatformActionError;

/// Records every URI it is asked to open.
///
/// Used by the CLI and by hosts without a dialer. Can be switched to fail
/// to exercise the manual-fallback path.
pub struct DryRunInvoker {
    opened: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl DryRunInvoker {
    /// Create an invoker that always succeeds.
    pub fn new() -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Set whether `open` fails.
    pub fn with_failure(self, fail: bool) -> Self {
        self.fail.store(fail, Ordering::SeqCst);
        self
    }

    /// URIs opened so far, including failed attempts.
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .map(|uris| uris.clone())
            .unwrap_or_default()
    }
}

impl Default for DryRunInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionInvoker for DryRunInvoker {
    async fn open(&self, uri: &str) -> Result<(), PlatformActionError> {
        if let Ok(mut uris) = self.opened.lock() {
            uris.push(uri.to_string());
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(PlatformActionError::Unavailable(format!(
                "no handler for {}",
                uri
            )));
        }

        info!(uri = %uri, "Platform action (dry run)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_records() {
        let invoker = DryRunInvoker::new();
        invoker.open("tel:988").await.unwrap();
        assert_eq!(invoker.opened(), vec!["tel:988".to_string()]);
    }

    #[tokio::test]
    async fn test_dry_run_failure() {
        let invoker = DryRunInvoker::new().with_failure(true);
        let result = invoker.open("sms:741741?body=HOME").await;
        assert!(matches!(result, Err(PlatformActionError::Unavailable(_))));
        assert_eq!(invoker.opened().len(), 1);
    }
}
