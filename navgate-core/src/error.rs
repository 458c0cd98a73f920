//! Error types for navgate.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`RouterError`] - Top-level error type for navigator operations
//! - [`NavigationError`] - Why a transition did not commit
//! - [`NavigationFailure`] - Expected, classified non-commits (duplicate, cancel, ...)
//! - [`MatchError`] - Errors raised by the route matcher
//! - [`GuardError`] / [`ResolveError`] - Errors produced while running guards

use crate::route::Route;
use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for navigator operations.
#[derive(Error, Debug)]
pub enum RouterError {
    /// The matcher rejected the location.
    #[error("match error: {0}")]
    Match(#[from] MatchError),

    /// The transition did not commit.
    #[error("navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// The navigator was already attached to a host application.
    #[error("navigator is already initialized")]
    AlreadyInitialized,
}

/// The classification of a [`NavigationFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The target resolves to the route that is already current.
    Duplicated,
    /// A newer transition superseded this one.
    Cancelled,
    /// A guard aborted the transition.
    Aborted,
    /// A guard redirected to another location.
    Redirected,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Duplicated => write!(f, "duplicated"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Aborted => write!(f, "aborted"),
            Self::Redirected => write!(f, "redirected"),
        }
    }
}

/// An expected, non-exceptional reason a transition did not commit.
#[derive(Error, Debug, Clone)]
#[error("{}", describe(.kind, .from, .to))]
pub struct NavigationFailure {
    kind: FailureKind,
    from: Route,
    to: Route,
}

fn describe(kind: &FailureKind, from: &Route, to: &Route) -> String {
    match kind {
        FailureKind::Duplicated => {
            format!("avoided redundant navigation to current location: \"{}\"", to.full_path())
        }
        FailureKind::Cancelled => format!(
            "navigation cancelled from \"{}\" to \"{}\" with a new navigation",
            from.full_path(),
            to.full_path()
        ),
        FailureKind::Aborted => format!(
            "navigation aborted from \"{}\" to \"{}\" via a navigation guard",
            from.full_path(),
            to.full_path()
        ),
        FailureKind::Redirected => format!(
            "redirected when going from \"{}\" to \"{}\" via a navigation guard",
            from.full_path(),
            to.full_path()
        ),
    }
}

impl NavigationFailure {
    /// Create a failure of the given kind for the transition `from` → `to`.
    pub fn new(kind: FailureKind, from: Route, to: Route) -> Self {
        Self { kind, from, to }
    }

    /// The failure classification.
    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    /// The route that was current when the transition started.
    pub fn from(&self) -> &Route {
        &self.from
    }

    /// The candidate route that did not commit.
    pub fn to(&self) -> &Route {
        &self.to
    }
}

/// The reason a transition did not commit.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// A classified navigation failure (not reported to error callbacks).
    #[error(transparent)]
    Failure(#[from] NavigationFailure),

    /// A guard errored, threw, or panicked; or a lazy component failed to load.
    #[error("navigation guard error: {0}")]
    Guard(#[source] BoxError),
}

impl NavigationError {
    /// Returns `true` if this is a navigation failure of the given kind.
    pub fn is_failure(&self, kind: FailureKind) -> bool {
        matches!(self, Self::Failure(failure) if failure.kind() == kind)
    }

    /// The failure, if this is a classified failure.
    pub fn failure(&self) -> Option<&NavigationFailure> {
        match self {
            Self::Failure(failure) => Some(failure),
            Self::Guard(_) => None,
        }
    }

    /// The underlying error, if this is an unclassified error.
    pub fn guard_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Failure(_) => None,
            Self::Guard(err) => Some(err.as_ref()),
        }
    }
}

/// Errors raised by a [`RouteMatcher`](crate::RouteMatcher).
#[derive(Error, Debug)]
pub enum MatchError {
    /// A named location referenced a route that does not exist.
    #[error("no route named \"{0}\"")]
    NotFound(String),

    /// Configured redirects formed a cycle.
    #[error("circular redirect detected at \"{0}\"")]
    RedirectLoop(String),

    /// A matcher-specific error.
    #[error(transparent)]
    Custom(BoxError),
}

impl From<BoxError> for MatchError {
    fn from(err: BoxError) -> Self {
        MatchError::Custom(err)
    }
}

/// Errors produced by the guard machinery itself.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The guard panicked while running.
    #[error("guard panicked: {0}")]
    Panicked(String),
}

/// A lazy component definition failed to load.
#[derive(Error, Debug)]
#[error("failed to resolve async component {slot}: {source}")]
pub struct ResolveError {
    /// The view slot whose component failed to load.
    pub slot: String,
    /// The loader's error.
    #[source]
    pub source: BoxError,
}
