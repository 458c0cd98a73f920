//! # navgate - Guarded Client-Side Navigation
//!
//! `navgate` decides which route becomes current, and when. Every location
//! change is matched to a [`Route`], then passes through an ordered pipeline
//! of guards that may approve, abort, error or redirect it. Only a transition
//! that survives the whole pipeline, and is still the latest one, commits.
//!
//! ## Quick Start
//!
//! ```rust
//! use navgate::prelude::*;
//! use navgate::{backend::MemoryBackend, testing::TableMatcher};
//!
//! # futures::executor::block_on(async {
//! let admin = RouteRecord::builder("/admin").name("admin").build();
//! let login = RouteRecord::builder("/login").name("login").build();
//! let matcher = TableMatcher::new().route("/admin", admin).route("/login", login);
//!
//! let navigator = Navigator::builder(matcher, MemoryBackend::new(None)).build();
//! navigator.before_each(|to: Route, _from: Route| async move {
//!     if to.path() == "/admin" {
//!         GuardOutcome::redirect("/login")
//!     } else {
//!         GuardOutcome::Proceed
//!     }
//! });
//!
//! let result = navigator.push("/admin").unwrap().await;
//! assert!(result.unwrap_err().is_failure(FailureKind::Redirected));
//! assert_eq!(navigator.current().path(), "/login");
//! # });
//! ```
//!
//! ## Pipeline
//!
//! 1. Leave guards of deactivated components, innermost first
//! 2. Global `before_each` guards
//! 3. Update guards of reused components, outermost first
//! 4. Per-route `before_enter` guards
//! 5. Lazy component resolution
//! 6. Enter guards of activated components, then global `before_resolve` guards
//! 7. Commit, then `after_each` hooks

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use navgate_core::{
    // Hooks
    AfterHook,
    // Error types
    BoxError,
    // Components
    Component,
    ComponentBuilder,
    ComponentDef,
    ComponentGuard,
    ComponentInstance,
    DEFAULT_VIEW,
    DynComponentGuard,
    // Guards
    DynGuard,
    EnterCallback,
    FailureKind,
    GuardError,
    GuardOutcome,
    GuardResult,
    // Collaborators
    HookSource,
    HostApp,
    HostTask,
    IntoGuardResult,
    LazyComponent,
    LazyFn,
    ListenerHandle,
    // Routes
    Location,
    LocationBackend,
    MatchError,
    NavigationError,
    NavigationFailure,
    NavigationGuard,
    Params,
    PopHandler,
    Query,
    ResolveError,
    Route,
    RouteBuilder,
    RouteData,
    RouteMatcher,
    RouteRecord,
    RouteRecordBuilder,
    RouterError,
    ScrollBehavior,
    guard_fn,
    lazy,
};

// Orchestration
pub use navgate_std::history::{HookId, Navigator, NavigatorBuilder, Transition};

/// Location backends.
pub mod backend {
    pub use navgate_std::backend::MemoryBackend;
}

/// Navigator state and callback types.
pub mod history {
    pub use navgate_std::history::{
        ErrorCallback, HookId, ListenCallback, Navigator, NavigatorBuilder, ReadyCallback,
        ReadyErrorCallback, Transition,
    };
}

/// Standard guard implementations.
pub mod hooks {
    #![allow(clippy::wildcard_imports)]
    pub use navgate_std::hooks::*;
}

/// Host application integrations.
#[cfg(feature = "tokio")]
pub mod host {
    pub use navgate_std::host::TokioHost;
}

/// URL helpers.
pub mod url {
    pub use navgate_std::url::{
        clean_path, normalize_base, parse_query, split_path, strip_base, stringify_query,
    };
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use navgate_std::testing::*;
}

/// Prelude module - common imports for navgate.
///
/// # Usage
///
/// ```rust
/// use navgate::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Components
        Component,
        ComponentInstance,
        FailureKind,
        // Guards
        GuardOutcome,
        GuardResult,
        HookSource,
        Location,
        NavigationError,
        NavigationGuard,
        // Orchestration
        Navigator,
        Route,
        RouteRecord,
        RouterError,
        guard_fn,
        lazy,
    };
}
