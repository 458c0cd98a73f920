//! # Navigation Orchestrator
//!
//! [`Navigator`] owns the navigation state: the committed `current` route,
//! the in-flight `pending` candidate, readiness, and the callback registries.
//! Every URL change passes through [`Navigator::transition_to`] (or one of
//! its wrappers) and the two-phase guard pipeline before anything commits.
//!
//! # Example
//!
//! ```rust
//! use navgate_core::{Route, RouteRecord};
//! use navgate_std::{backend::MemoryBackend, history::Navigator, testing::TableMatcher};
//!
//! # futures::executor::block_on(async {
//! let matcher = TableMatcher::new().route("/", RouteRecord::builder("/").build());
//! let navigator = Navigator::builder(matcher, MemoryBackend::new(None)).build();
//!
//! navigator.before_each(|to: Route, _from: Route| async move {
//!     to.path() != "/forbidden"
//! });
//!
//! let route = navigator.push("/").unwrap().await.unwrap();
//! assert_eq!(route.full_path(), "/");
//! # });
//! ```

mod state;
mod transition;

pub use state::{ErrorCallback, HookId, ListenCallback, ReadyCallback, ReadyErrorCallback};
pub use transition::Transition;

use crate::queue::EnteredCallbacks;
use navgate_core::{
    AfterHook, DynGuard, HostApp, Location, LocationBackend, MatchError, NavigationError,
    NavigationGuard, PopHandler, Route, RouteMatcher, RouterError, ScrollBehavior,
};
use parking_lot::{Mutex, RwLock};
use state::{HistoryState, Hooks};
use std::{
    error::Error,
    sync::{Arc, OnceLock, Weak},
};

/// What the initiating operation does once its route commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Commit {
    /// Plain transition: only re-assert the URL.
    None,
    /// Write a new history entry and scroll.
    Push,
    /// Replace the history entry and scroll.
    Replace,
    /// The URL already changed (back/forward); only scroll.
    Pop,
}

struct Inner {
    matcher: Arc<dyn RouteMatcher>,
    backend: Arc<dyn LocationBackend>,
    scroll: Option<Arc<dyn ScrollBehavior>>,
    hooks: RwLock<Hooks>,
    state: Mutex<HistoryState>,
    entered: EnteredCallbacks,
    app: OnceLock<Arc<dyn HostApp>>,
    start_location: String,
}

impl Inner {
    fn is_pending(&self, route: &Route) -> bool {
        self.state.lock().is_pending(route)
    }

    fn ensure_url(&self, push: bool) {
        let current = self.state.lock().current.clone();
        self.backend.ensure_url(current.full_path(), push);
    }

    fn scroll(&self, to: &Route, from: &Route, is_pop: bool) {
        if let Some(scroll) = &self.scroll {
            scroll.handle_scroll(to, from, is_pop);
        }
    }

    fn on_pop(self: &Arc<Self>, location: String) {
        crate::log_event!(trace, location = %location, "pop event");
        if self.state.lock().current.is_start() && location == self.start_location {
            return;
        }
        let Ok(transition) = self.transition(Location::path(location), Commit::Pop) else {
            return;
        };
        match self.app.get() {
            Some(app) => app.spawn(Box::pin(async move {
                let _ = transition.await;
            })),
            None => {
                crate::log_event!(warn, "pop event before a host app was attached; transition dropped");
            }
        }
    }
}

/// Builder for [`Navigator`].
pub struct NavigatorBuilder {
    matcher: Arc<dyn RouteMatcher>,
    backend: Arc<dyn LocationBackend>,
    scroll: Option<Arc<dyn ScrollBehavior>>,
}

impl NavigatorBuilder {
    /// Install a scroll handler, invoked after URL changes.
    pub fn scroll_behavior<S: ScrollBehavior>(mut self, scroll: S) -> Self {
        self.scroll = Some(Arc::new(scroll));
        self
    }

    /// Build the navigator. The backend's location at this point is the start location.
    pub fn build(self) -> Navigator {
        let start_location = self.backend.current_location();
        Navigator {
            inner: Arc::new(Inner {
                matcher: self.matcher,
                backend: self.backend,
                scroll: self.scroll,
                hooks: RwLock::new(Hooks::default()),
                state: Mutex::new(HistoryState::new()),
                entered: EnteredCallbacks::new(),
                app: OnceLock::new(),
                start_location,
            }),
        }
    }
}

/// The navigation state holder.
///
/// Cloning is cheap; clones share state.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

impl Navigator {
    /// Start building a navigator over `matcher` and `backend`.
    pub fn builder<M, B>(matcher: M, backend: B) -> NavigatorBuilder
    where
        M: RouteMatcher,
        B: LocationBackend,
    {
        NavigatorBuilder {
            matcher: Arc::new(matcher),
            backend: Arc::new(backend),
            scroll: None,
        }
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// The committed route.
    pub fn current(&self) -> Route {
        self.inner.state.lock().current.clone()
    }

    /// The in-flight candidate, if any.
    pub fn pending(&self) -> Option<Route> {
        self.inner.state.lock().pending.clone()
    }

    /// Whether the first navigation has settled.
    pub fn is_ready(&self) -> bool {
        self.inner.state.lock().ready
    }

    /// The attached host application.
    pub fn app(&self) -> Option<&Arc<dyn HostApp>> {
        self.inner.app.get()
    }

    /// The visible location as reported by the backend.
    pub fn current_location(&self) -> String {
        self.inner.backend.current_location()
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// Set the callback invoked with every committed route, replacing any previous one.
    pub fn listen<F>(&self, cb: F)
    where
        F: Fn(&Route) + Send + Sync + 'static,
    {
        self.inner.state.lock().listen = Some(Arc::new(cb));
    }

    /// Run `cb` once the first navigation commits.
    ///
    /// If the navigator is already ready, `cb` runs immediately with the
    /// current route.
    pub fn on_ready<F>(&self, cb: F)
    where
        F: FnOnce(&Route) + Send + 'static,
    {
        self.register_ready(Box::new(cb), None);
    }

    /// Like [`on_ready`](Self::on_ready), with `error_cb` run instead if the
    /// first navigation fails.
    ///
    /// An initial navigation that redirects does not settle readiness; the
    /// redirect target does.
    pub fn on_ready_or_error<F, E>(&self, cb: F, error_cb: E)
    where
        F: FnOnce(&Route) + Send + 'static,
        E: FnOnce(&NavigationError) + Send + 'static,
    {
        self.register_ready(Box::new(cb), Some(Box::new(error_cb)));
    }

    fn register_ready(&self, cb: ReadyCallback, error_cb: Option<ReadyErrorCallback>) {
        let current = {
            let mut state = self.inner.state.lock();
            if !state.ready {
                state.ready_cbs.push(cb);
                state.ready_error_cbs.extend(error_cb);
                return;
            }
            state.current.clone()
        };
        cb(&current);
    }

    /// Register a callback for unclassified errors (matcher and guard errors).
    pub fn on_error<F>(&self, cb: F)
    where
        F: Fn(&(dyn Error + 'static)) + Send + Sync + 'static,
    {
        self.inner.state.lock().error_cbs.push(Arc::new(cb));
    }

    // ------------------------------------------------------------------
    // Global hooks
    // ------------------------------------------------------------------

    /// Register a global guard run before in-route guards.
    pub fn before_each<G: NavigationGuard>(&self, guard: G) -> HookId {
        let id = HookId::next();
        self.inner
            .hooks
            .write()
            .before
            .push((id, Arc::new(guard) as Arc<dyn DynGuard>));
        id
    }

    /// Register a global guard run after enter guards and lazy resolution.
    pub fn before_resolve<G: NavigationGuard>(&self, guard: G) -> HookId {
        let id = HookId::next();
        self.inner
            .hooks
            .write()
            .resolve
            .push((id, Arc::new(guard) as Arc<dyn DynGuard>));
        id
    }

    /// Register a hook run with `(to, from)` after every commit.
    pub fn after_each<F>(&self, hook: F) -> HookId
    where
        F: Fn(&Route, &Route) + Send + Sync + 'static,
    {
        let id = HookId::next();
        self.inner
            .hooks
            .write()
            .after
            .push((id, Arc::new(hook) as AfterHook));
        id
    }

    /// Unregister a global hook. Returns `false` if it was not registered.
    pub fn remove_hook(&self, id: HookId) -> bool {
        self.inner.hooks.write().remove(id)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Match `location` and run the guard pipeline; commit on success.
    ///
    /// Matcher errors are returned here, after reaching the error callbacks.
    pub fn transition_to(&self, location: impl Into<Location>) -> Result<Transition, MatchError> {
        self.inner.transition(location.into(), Commit::None)
    }

    /// Navigate to `location`, adding a history entry on commit.
    pub fn push(&self, location: impl Into<Location>) -> Result<Transition, MatchError> {
        self.inner.transition(location.into(), Commit::Push)
    }

    /// Navigate to `location`, replacing the current history entry on commit.
    pub fn replace(&self, location: impl Into<Location>) -> Result<Transition, MatchError> {
        self.inner.transition(location.into(), Commit::Replace)
    }

    /// Move `delta` entries through history. The backend reports the result as a pop event.
    pub fn go(&self, delta: isize) {
        self.inner.backend.go(delta);
    }

    /// Go back one entry.
    pub fn back(&self) {
        self.go(-1);
    }

    /// Go forward one entry.
    pub fn forward(&self) {
        self.go(1);
    }

    /// Make the visible location match the current route.
    pub fn ensure_url(&self, push: bool) {
        self.inner.ensure_url(push);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Attach the host application and start the initial navigation.
    ///
    /// Backend listeners are set up once the initial navigation settles,
    /// whether it committed or not, or right away if the start location
    /// fails to match.
    pub fn init(&self, app: Arc<dyn HostApp>) -> Result<Transition, RouterError> {
        self.inner
            .app
            .set(app)
            .map_err(|_| RouterError::AlreadyInitialized)?;

        let location = self.inner.backend.current_location();
        crate::log_event!(debug, location = %location, "initial navigation");
        let initial = match self.inner.transition(Location::path(location), Commit::None) {
            Ok(initial) => initial,
            Err(err) => {
                self.setup_listeners();
                return Err(err.into());
            }
        };
        let navigator = self.clone();
        Ok(Transition::new(async move {
            let result = initial.await;
            navigator.setup_listeners();
            result
        }))
    }

    /// Subscribe to backend pop events. Does nothing if already subscribed.
    pub fn setup_listeners(&self) {
        {
            let mut state = self.inner.state.lock();
            if state.listening {
                return;
            }
            state.listening = true;
        }

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let on_pop: PopHandler = Arc::new(move |location: String| {
            if let Some(inner) = weak.upgrade() {
                inner.on_pop(location);
            }
        });
        let handles = self.inner.backend.setup_listeners(on_pop);
        self.inner.state.lock().listeners.extend(handles);
    }

    /// Remove backend listeners and reset to the start route.
    pub fn teardown(&self) {
        let listeners = {
            let mut state = self.inner.state.lock();
            state.listening = false;
            state.current = Route::start();
            state.pending = None;
            std::mem::take(&mut state.listeners)
        };
        for cleanup in listeners {
            cleanup();
        }
    }

    /// Deliver enter callbacks whose instance has been mounted since commit.
    ///
    /// Hosts call this after registering instances on their records. Returns
    /// how many callbacks ran.
    pub fn handle_route_entered(&self) -> usize {
        self.inner.entered.deliver()
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Navigator")
            .field("current", &state.current)
            .field("pending", &state.pending)
            .field("ready", &state.ready)
            .finish_non_exhaustive()
    }
}
