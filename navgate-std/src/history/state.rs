//! Mutable navigator state and hook registries.

use navgate_core::{AfterHook, DynGuard, ListenerHandle, NavigationError, Route};
use std::{
    error::Error,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// Called once with the first committed route.
pub type ReadyCallback = Box<dyn FnOnce(&Route) + Send + 'static>;

/// Called once with the error of the first failed navigation.
pub type ReadyErrorCallback = Box<dyn FnOnce(&NavigationError) + Send + 'static>;

/// Receives unclassified errors: matcher errors and guard errors.
pub type ErrorCallback = Arc<dyn Fn(&(dyn Error + 'static)) + Send + Sync + 'static>;

/// Called with every committed route.
pub type ListenCallback = Arc<dyn Fn(&Route) + Send + Sync + 'static>;

/// Identifies a registered global hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

impl HookId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HookId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Global hooks in registration order.
#[derive(Default)]
pub(crate) struct Hooks {
    pub before: Vec<(HookId, Arc<dyn DynGuard>)>,
    pub resolve: Vec<(HookId, Arc<dyn DynGuard>)>,
    pub after: Vec<(HookId, AfterHook)>,
}

impl Hooks {
    pub fn remove(&mut self, id: HookId) -> bool {
        let before = self.before.len() + self.resolve.len() + self.after.len();
        self.before.retain(|(hook, _)| *hook != id);
        self.resolve.retain(|(hook, _)| *hook != id);
        self.after.retain(|(hook, _)| *hook != id);
        before != self.before.len() + self.resolve.len() + self.after.len()
    }

    pub fn before_guards(&self) -> Vec<Arc<dyn DynGuard>> {
        self.before.iter().map(|(_, guard)| guard.clone()).collect()
    }

    pub fn resolve_guards(&self) -> Vec<Arc<dyn DynGuard>> {
        self.resolve.iter().map(|(_, guard)| guard.clone()).collect()
    }

    pub fn after_hooks(&self) -> Vec<AfterHook> {
        self.after.iter().map(|(_, hook)| hook.clone()).collect()
    }
}

/// State guarded by the navigator's mutex.
///
/// `current` only changes through the commit path and teardown. `ready` flips
/// at most once; both ready lists are drained when it does.
pub(crate) struct HistoryState {
    pub current: Route,
    pub pending: Option<Route>,
    pub ready: bool,
    pub ready_cbs: Vec<ReadyCallback>,
    pub ready_error_cbs: Vec<ReadyErrorCallback>,
    pub error_cbs: Vec<ErrorCallback>,
    pub listen: Option<ListenCallback>,
    pub listening: bool,
    pub listeners: Vec<ListenerHandle>,
}

impl HistoryState {
    pub fn new() -> Self {
        Self {
            current: Route::start(),
            pending: None,
            ready: false,
            ready_cbs: Vec::new(),
            ready_error_cbs: Vec::new(),
            error_cbs: Vec::new(),
            listen: None,
            listening: false,
            listeners: Vec::new(),
        }
    }

    pub fn is_pending(&self, route: &Route) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| Route::ptr_eq(pending, route))
    }

    /// Mark ready and take the success callbacks, if not ready yet.
    pub fn take_ready(&mut self) -> Vec<ReadyCallback> {
        if self.ready {
            return Vec::new();
        }
        self.ready = true;
        self.ready_error_cbs.clear();
        std::mem::take(&mut self.ready_cbs)
    }

    /// Mark ready and take the error callbacks, if not ready yet.
    pub fn take_ready_error(&mut self) -> Vec<ReadyErrorCallback> {
        if self.ready {
            return Vec::new();
        }
        self.ready = true;
        self.ready_cbs.clear();
        std::mem::take(&mut self.ready_error_cbs)
    }
}
