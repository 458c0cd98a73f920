//! # External Collaborators
//!
//! The navigation engine decides *whether* and *when* a route becomes current.
//! Matching locations, mutating the visible URL, and driving asynchronous work
//! are delegated to the traits in this module.

use crate::{
    error::MatchError,
    route::{Location, Route},
};
use std::{future::Future, pin::Pin, sync::Arc};

/// Maps a raw location to a [`Route`].
pub trait RouteMatcher: Send + Sync + 'static {
    /// Resolve `location` relative to `current`.
    fn match_location(&self, location: &Location, current: &Route) -> Result<Route, MatchError>;
}

impl<T: RouteMatcher + ?Sized> RouteMatcher for Arc<T> {
    fn match_location(&self, location: &Location, current: &Route) -> Result<Route, MatchError> {
        (**self).match_location(location, current)
    }
}

/// Callback a backend invokes when the location changes outside the engine
/// (back/forward navigation). Receives the new app-relative location.
pub type PopHandler = Arc<dyn Fn(String) + Send + Sync + 'static>;

/// Cleanup for a subscription made by [`LocationBackend::setup_listeners`].
pub type ListenerHandle = Box<dyn FnOnce() + Send + 'static>;

/// Performs the actual URL mutations.
///
/// All locations are app-relative full paths (`/path?query#hash`); a backend
/// that serves the app under a base path applies it internally.
pub trait LocationBackend: Send + Sync + 'static {
    /// Add a new history entry.
    fn push(&self, url: &str);

    /// Replace the current history entry.
    fn replace(&self, url: &str);

    /// Move `delta` entries through history.
    fn go(&self, delta: isize);

    /// The visible app-relative location.
    fn current_location(&self) -> String;

    /// Subscribe to external navigation events.
    fn setup_listeners(&self, on_pop: PopHandler) -> Vec<ListenerHandle>;

    /// Make the visible location match `full_path`.
    ///
    /// Mutates only when the two diverge, so repeated calls are idempotent.
    fn ensure_url(&self, full_path: &str, push: bool) {
        if self.current_location() != full_path {
            if push {
                self.push(full_path);
            } else {
                self.replace(full_path);
            }
        }
    }
}

impl<T: LocationBackend + ?Sized> LocationBackend for Arc<T> {
    fn push(&self, url: &str) {
        (**self).push(url)
    }

    fn replace(&self, url: &str) {
        (**self).replace(url)
    }

    fn go(&self, delta: isize) {
        (**self).go(delta)
    }

    fn current_location(&self) -> String {
        (**self).current_location()
    }

    fn setup_listeners(&self, on_pop: PopHandler) -> Vec<ListenerHandle> {
        (**self).setup_listeners(on_pop)
    }

    fn ensure_url(&self, full_path: &str, push: bool) {
        (**self).ensure_url(full_path, push)
    }
}

/// A boxed task handed to the host.
pub type HostTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// The host application the navigator is attached to.
///
/// The host drives asynchronous work the navigator starts on its own
/// (transitions triggered by back/forward events) and provides the "next
/// tick" on which enter callbacks are delivered.
pub trait HostApp: Send + Sync + 'static {
    /// Run `task` to completion in the background.
    fn spawn(&self, task: HostTask);

    /// Run `f` after the current turn, once the view has had a chance to update.
    fn next_tick(&self, f: Box<dyn FnOnce() + Send + 'static>) {
        self.spawn(Box::pin(async move { f() }));
    }
}

/// Scroll handling invoked after URL changes.
pub trait ScrollBehavior: Send + Sync + 'static {
    /// Called after the URL changed to `to`; `is_pop` marks back/forward navigation.
    fn handle_scroll(&self, to: &Route, from: &Route, is_pop: bool);
}

impl<F> ScrollBehavior for F
where
    F: Fn(&Route, &Route, bool) + Send + Sync + 'static,
{
    fn handle_scroll(&self, to: &Route, from: &Route, is_pop: bool) {
        (self)(to, from, is_pop)
    }
}
