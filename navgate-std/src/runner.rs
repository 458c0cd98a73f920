//! Sequential guard execution.
//!
//! The runner awaits guards strictly one at a time, in queue order, and stops at
//! the first outcome that is not a proceed. Before each present guard it asks
//! whether the transition is still the pending one; a superseded transition
//! stops without invoking the guard. The same question is asked again once the
//! guard settles, so a late outcome is dropped instead of applied.

use futures::FutureExt;
use navgate_core::{BoxError, DynGuard, GuardError, GuardOutcome, Location, Route};
use std::{any::Any, panic::AssertUnwindSafe, sync::Arc};

/// An ordered guard queue. `None` entries are skipped.
pub type GuardQueue = Vec<Option<Arc<dyn DynGuard>>>;

/// Why a queue run stopped before the end.
#[derive(Debug)]
pub enum Interrupt {
    /// A newer transition replaced this one.
    Superseded,
    /// A guard returned [`GuardOutcome::Abort`].
    Aborted,
    /// A guard returned [`GuardOutcome::Error`].
    Rejected(BoxError),
    /// A guard returned `Err` or panicked.
    Failed(BoxError),
    /// A guard returned [`GuardOutcome::Redirect`].
    Redirect(Location),
}

/// Runs a [`GuardQueue`] for one transition.
pub struct QueueRunner<'a> {
    to: &'a Route,
    from: &'a Route,
    phase: &'static str,
}

impl<'a> QueueRunner<'a> {
    /// Create a runner for the transition `from` → `to`.
    pub fn new(to: &'a Route, from: &'a Route) -> Self {
        Self {
            to,
            from,
            phase: "guards",
        }
    }

    /// Name the phase in log output.
    pub fn phase(mut self, phase: &'static str) -> Self {
        self.phase = phase;
        self
    }

    /// Run `queue`, checking `is_current` before and after each present guard.
    ///
    /// An empty queue succeeds immediately.
    pub async fn run<F>(&self, queue: &[Option<Arc<dyn DynGuard>>], mut is_current: F) -> Result<(), Interrupt>
    where
        F: FnMut() -> bool + Send,
    {
        for (index, guard) in queue.iter().enumerate() {
            let Some(guard) = guard else {
                continue;
            };
            if !is_current() {
                crate::log_event!(debug, phase = self.phase, index, "transition superseded");
                return Err(Interrupt::Superseded);
            }

            crate::log_event!(trace, phase = self.phase, index, to = %self.to.full_path(), "running guard");
            let outcome = AssertUnwindSafe(guard.guard_dyn(self.to, self.from))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(Box::new(GuardError::Panicked(panic_message(payload))) as BoxError));

            // A guard that settles after its transition lost `pending` has no say.
            if !is_current() {
                crate::log_event!(debug, phase = self.phase, index, "guard settled after transition was superseded");
                return Err(Interrupt::Superseded);
            }

            match outcome {
                Ok(GuardOutcome::Proceed | GuardOutcome::Enter(_)) => continue,
                Ok(GuardOutcome::Abort) => return Err(Interrupt::Aborted),
                Ok(GuardOutcome::Error(err)) => return Err(Interrupt::Rejected(err)),
                Ok(GuardOutcome::Redirect(location)) => return Err(Interrupt::Redirect(location)),
                Err(err) => return Err(Interrupt::Failed(err)),
            }
        }
        Ok(())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
