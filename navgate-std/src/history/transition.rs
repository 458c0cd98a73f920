//! The transition pipeline: matching, confirmation, commit and abort.

use super::{Commit, Inner};
use crate::{
    queue::{
        EnteredCallbacks, extract_before_enter, extract_enter_guards, extract_leave_guards,
        extract_update_guards, resolve_queue,
    },
    resolve::LazyResolver,
    runner::{GuardQueue, Interrupt, QueueRunner},
};
use navgate_core::{
    FailureKind, Location, MatchError, NavigationError, NavigationFailure, Route, RouteRecord,
};
use std::{
    error::Error,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

/// An in-flight transition.
///
/// Matching already happened and the candidate is already `pending` when this
/// value exists; the guard pipeline runs as the future is polled. Resolves to
/// the committed route, or to the reason nothing was committed.
#[must_use = "a transition runs its guards only when awaited or spawned"]
pub struct Transition {
    inner: Pin<Box<dyn Future<Output = Result<Route, NavigationError>> + Send + 'static>>,
}

impl Transition {
    pub(crate) fn new<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Route, NavigationError>> + Send + 'static,
    {
        Self {
            inner: Box::pin(fut),
        }
    }

    pub(crate) fn settled(result: Result<Route, NavigationError>) -> Self {
        Self::new(futures::future::ready(result))
    }
}

impl Future for Transition {
    type Output = Result<Route, NavigationError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition").finish_non_exhaustive()
    }
}

// Innermost records are the identical instance, or both chains are empty.
fn same_leaf(a: &[Arc<RouteRecord>], b: &[Arc<RouteRecord>]) -> bool {
    a.len() == b.len()
        && match (a.last(), b.last()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
}

impl Inner {
    /// Match `location` and start confirming the result.
    ///
    /// Everything up to the first guard happens before this returns.
    pub(super) fn transition(
        self: &Arc<Self>,
        location: Location,
        commit: Commit,
    ) -> Result<Transition, MatchError> {
        let from = self.state.lock().current.clone();
        let route = match self.matcher.match_location(&location, &from) {
            Ok(route) => route,
            Err(err) => {
                crate::log_event!(debug, error = %err, "location did not match");
                self.notify_error(&err);
                return Err(err);
            }
        };

        crate::log_event!(debug, from = %from.full_path(), to = %route.full_path(), "transition started");
        self.state.lock().pending = Some(route.clone());

        if route.is_same(&from) && same_leaf(route.matched(), from.matched()) {
            self.ensure_url(false);
            if !route.hash().is_empty() {
                self.scroll(&route, &from, false);
            }
            let failure = NavigationFailure::new(FailureKind::Duplicated, from.clone(), route.clone());
            let err = self.abort(failure.into(), &route, &from);
            return Ok(Transition::settled(Err(err)));
        }

        let diff = resolve_queue(from.matched(), route.matched());
        let mut queue = GuardQueue::new();
        queue.extend(extract_leave_guards(&diff.deactivated));
        queue.extend(self.hooks.read().before_guards().into_iter().map(Some));
        queue.extend(extract_update_guards(&diff.updated));
        queue.extend(extract_before_enter(&diff.activated));
        queue.push(Some(Arc::new(LazyResolver::new(diff.activated.clone()))));

        let inner = self.clone();
        Ok(Transition::new(async move {
            inner
                .confirm(route, from, queue, diff.activated, commit)
                .await
        }))
    }

    async fn confirm(
        self: Arc<Self>,
        route: Route,
        from: Route,
        queue: GuardQueue,
        activated: Vec<Arc<RouteRecord>>,
        commit: Commit,
    ) -> Result<Route, NavigationError> {
        let runner = QueueRunner::new(&route, &from);

        let before = runner
            .phase("before")
            .run(&queue, || self.is_pending(&route))
            .await;
        if let Err(interrupt) = before {
            return Err(self.interrupted(interrupt, &route, &from).await);
        }

        // Lazy slots are resolved now, so enter guards can be extracted.
        let entered = Arc::new(EnteredCallbacks::new());
        let mut queue = extract_enter_guards(&activated, &entered);
        queue.extend(self.hooks.read().resolve_guards().into_iter().map(Some));

        let resolve = QueueRunner::new(&route, &from)
            .phase("resolve")
            .run(&queue, || self.is_pending(&route))
            .await;
        if let Err(interrupt) = resolve {
            return Err(self.interrupted(interrupt, &route, &from).await);
        }

        let still_pending = {
            let mut state = self.state.lock();
            let still_pending = state.is_pending(&route);
            if still_pending {
                state.pending = None;
            }
            still_pending
        };
        if !still_pending {
            return Err(self.interrupted(Interrupt::Superseded, &route, &from).await);
        }

        self.complete(&route, &from, commit);
        self.schedule_entered(entered);
        Ok(route)
    }

    /// Translate a stopped run into its side effects and error.
    async fn interrupted(
        self: &Arc<Self>,
        interrupt: Interrupt,
        route: &Route,
        from: &Route,
    ) -> NavigationError {
        let failure = |kind| NavigationError::from(NavigationFailure::new(kind, from.clone(), route.clone()));
        match interrupt {
            Interrupt::Superseded => self.abort(failure(FailureKind::Cancelled), route, from),
            Interrupt::Aborted => {
                self.ensure_url(true);
                self.abort(failure(FailureKind::Aborted), route, from)
            }
            Interrupt::Rejected(err) => {
                self.ensure_url(true);
                self.abort(NavigationError::Guard(err), route, from)
            }
            Interrupt::Failed(err) => self.abort(NavigationError::Guard(err), route, from),
            Interrupt::Redirect(location) => {
                let err = self.abort(failure(FailureKind::Redirected), route, from);
                let commit = if location.replace {
                    Commit::Replace
                } else {
                    Commit::Push
                };
                crate::log_event!(debug, from = %route.full_path(), replace = location.replace, "following redirect");
                // Matcher errors already reached the error callbacks.
                let Ok(next) = self.transition(location, commit) else {
                    return err;
                };
                let follow = async move {
                    if let Err(_err) = next.await {
                        crate::log_event!(debug, error = %_err, "redirect target did not commit");
                    }
                };
                match self.app.get() {
                    Some(app) => app.spawn(Box::pin(follow)),
                    None => follow.await,
                }
                err
            }
        }
    }

    /// The single abort path: report, settle readiness, hand back the error.
    fn abort(&self, err: NavigationError, route: &Route, from: &Route) -> NavigationError {
        match &err {
            NavigationError::Guard(source) => {
                crate::log_event!(debug, to = %route.full_path(), error = %source, "transition errored");
                self.broadcast_error(source.as_ref());
            }
            NavigationError::Failure(failure) => {
                crate::log_event!(debug, kind = %failure.kind(), to = %route.full_path(), "transition not committed");
            }
        }

        let ready_error_cbs = {
            let mut state = self.state.lock();
            if state.is_pending(route) {
                state.pending = None;
            }
            let suppressed = err.is_failure(FailureKind::Redirected) && from.is_start();
            if suppressed {
                Vec::new()
            } else {
                state.take_ready_error()
            }
        };
        for cb in ready_error_cbs {
            cb(&err);
        }
        err
    }

    fn complete(&self, route: &Route, from: &Route, commit: Commit) {
        self.update_route(route.clone());
        match commit {
            Commit::None => {}
            Commit::Push => {
                self.backend.push(route.full_path());
                self.scroll(route, from, false);
            }
            Commit::Replace => {
                self.backend.replace(route.full_path());
                self.scroll(route, from, false);
            }
            Commit::Pop => self.scroll(route, from, true),
        }
        self.ensure_url(false);

        let after = self.hooks.read().after_hooks();
        for hook in after {
            hook(route, from);
        }

        let ready_cbs = self.state.lock().take_ready();
        for cb in ready_cbs {
            cb(route);
        }
    }

    /// The only place `current` changes outside teardown.
    fn update_route(&self, route: Route) {
        crate::log_event!(debug, to = %route.full_path(), "route committed");
        let listen = {
            let mut state = self.state.lock();
            state.current = route.clone();
            state.listen.clone()
        };
        if let Some(listen) = listen {
            listen(&route);
        }
    }

    fn schedule_entered(self: &Arc<Self>, entered: Arc<EnteredCallbacks>) {
        if entered.is_empty() {
            return;
        }
        match self.app.get() {
            Some(app) => {
                let inner = self.clone();
                app.next_tick(Box::new(move || {
                    inner.entered.absorb(&entered);
                    inner.entered.deliver();
                }));
            }
            None => self.entered.absorb(&entered),
        }
    }

    /// Hand `err` to every error callback. Returns `false` if there are none.
    fn notify_error(&self, err: &(dyn Error + 'static)) -> bool {
        let error_cbs = self.state.lock().error_cbs.clone();
        for cb in &error_cbs {
            cb(err);
        }
        !error_cbs.is_empty()
    }

    // Guard errors must never go unreported.
    fn broadcast_error(&self, err: &(dyn Error + 'static)) {
        if self.notify_error(err) {
            return;
        }
        #[cfg(feature = "tracing")]
        {
            tracing::error!(error = %err, "uncaught error during route navigation");
        }
        #[cfg(not(feature = "tracing"))]
        {
            eprintln!("uncaught error during route navigation: {err}");
        }
    }
}
