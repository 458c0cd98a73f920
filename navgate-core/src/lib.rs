//! # navgate-core
//!
//! Core types and traits for the navgate navigation engine.
//!
//! This crate has minimal dependencies and is meant to be imported by code that
//! declares routes and guards without needing the orchestrator in `navgate-std`.
//!
//! # Building Blocks
//!
//! ## Routes ([`Route`], [`RouteRecord`])
//!
//! A [`Route`] is an immutable snapshot of where the application is (or is about
//! to be). Its `matched` chain lists the nested [`RouteRecord`]s from outermost
//! to innermost. Both are shared by reference and compared by identity.
//!
//! ## Guards ([`NavigationGuard`])
//!
//! Guards approve, abort, error, or redirect a transition with a single
//! [`GuardOutcome`]. Global hooks, per-route `before_enter` guards and
//! component `before_route_enter` guards are all plain navigation guards.
//!
//! ## Components ([`HookSource`], [`Component`])
//!
//! Components declare in-component guards. Leave and update guards run bound
//! to the live instance ([`ComponentGuard`]); enter guards run before any
//! instance exists and may defer work with [`GuardOutcome::Enter`].
//!
//! ## Collaborators ([`RouteMatcher`], [`LocationBackend`], [`HostApp`])
//!
//! Matching, URL mutation, and task scheduling stay outside the engine.
//!
//! # Error Types
//!
//! - [`RouterError`] - Top-level error type
//! - [`NavigationError`] - Why a transition did not commit
//! - [`NavigationFailure`] - Classified, expected non-commits
//! - [`MatchError`] - Matcher errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod collaborator;
mod component;
mod error;
mod guard;
mod route;

// Re-exports
pub use collaborator::{
    HostApp, HostTask, ListenerHandle, LocationBackend, PopHandler, RouteMatcher, ScrollBehavior,
};
pub use component::{
    Component, ComponentBuilder, ComponentDef, ComponentGuard, ComponentInstance,
    DynComponentGuard, HookSource, LazyComponent, LazyFn, lazy,
};
pub use error::{
    BoxError, FailureKind, GuardError, MatchError, NavigationError, NavigationFailure,
    ResolveError, RouterError,
};
pub use guard::{
    AfterHook, DynGuard, EnterCallback, GuardOutcome, GuardResult, IntoGuardResult,
    NavigationGuard, guard_fn,
};
pub use route::{
    DEFAULT_VIEW, Location, Params, Query, Route, RouteBuilder, RouteData, RouteRecord,
    RouteRecordBuilder,
};
