//! Logging guard for transition observation.

use navgate_core::{GuardOutcome, GuardResult, NavigationGuard, Route};

/// A guard that logs every transition it sees and always proceeds.
///
/// Register it with `before_each` to trace navigation.
pub struct LoggingGuard;

impl NavigationGuard for LoggingGuard {
    async fn guard(&self, to: &Route, from: &Route) -> GuardResult {
        #[cfg(feature = "tracing")]
        {
            tracing::info!(
                from = %from.full_path(),
                to = %to.full_path(),
                name = ?to.name(),
                "Navigating"
            );
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = (to, from); // Suppress unused warning
        }
        Ok(GuardOutcome::Proceed)
    }
}
