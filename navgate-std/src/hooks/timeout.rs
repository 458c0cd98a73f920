//! Timeout guard for time-limited guards.

use navgate_core::{GuardOutcome, GuardResult, NavigationGuard, Route};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Error carried by [`GuardOutcome::Error`] when a guard runs out of time.
#[derive(Error, Debug, Clone)]
#[error("navigation guard timed out after {0:?}")]
pub struct TimeoutError(pub Duration);

/// A guard that wraps another guard with a deadline.
///
/// The engine never times guards out on its own; wrap the ones that call
/// slow services. An expired deadline aborts the transition with a
/// [`TimeoutError`].
pub struct TimeoutGuard<G> {
    inner: G,
    duration: Duration,
}

impl<G> TimeoutGuard<G> {
    /// Create a new timeout guard.
    pub fn new(inner: G, duration: Duration) -> Self {
        Self { inner, duration }
    }
}

impl<G: NavigationGuard> NavigationGuard for TimeoutGuard<G> {
    async fn guard(&self, to: &Route, from: &Route) -> GuardResult {
        match timeout(self.duration, self.inner.guard(to, from)).await {
            Ok(result) => result,
            Err(_) => Ok(GuardOutcome::error(TimeoutError(self.duration))),
        }
    }
}
