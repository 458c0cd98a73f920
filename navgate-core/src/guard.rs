//! # Navigation Guards
//!
//! A guard inspects an in-flight transition and decides its fate with exactly
//! one [`GuardOutcome`]. Guards are asynchronous: the transition waits until
//! the guard's future resolves, however long that takes. A future that never
//! resolves stalls its transition; the engine imposes no timeout.
//!
//! Returning `Err(_)` models a guard that threw: the transition aborts with
//! that error, exactly like [`GuardOutcome::Error`] except that the visible
//! URL is left alone.

use crate::{component::ComponentInstance, error::BoxError, route::{Location, Route}};
use std::{fmt, future::Future, pin::Pin};

/// A callback deferred until the entering component instance is mounted.
pub type EnterCallback = Box<dyn FnOnce(&ComponentInstance) + Send + 'static>;

/// The decision of a single guard.
pub enum GuardOutcome {
    /// Approve; continue with the next guard.
    Proceed,
    /// Abort the transition without an error.
    Abort,
    /// Abort the transition with an error.
    Error(BoxError),
    /// Abort the transition and navigate to another location instead.
    Redirect(Location),
    /// Approve, and run the callback with the entering instance once mounted.
    ///
    /// Only enter guards store the callback; elsewhere this is `Proceed`.
    Enter(EnterCallback),
}

impl GuardOutcome {
    /// Redirect with push semantics.
    pub fn redirect(location: impl Into<Location>) -> Self {
        Self::Redirect(location.into())
    }

    /// Redirect with replace semantics.
    pub fn replace(location: impl Into<Location>) -> Self {
        Self::Redirect(location.into().replacing())
    }

    /// Abort with `err`.
    pub fn error(err: impl Into<BoxError>) -> Self {
        Self::Error(err.into())
    }

    /// Approve and defer `callback` until the entering instance is mounted.
    pub fn enter<F>(callback: F) -> Self
    where
        F: FnOnce(&ComponentInstance) + Send + 'static,
    {
        Self::Enter(Box::new(callback))
    }

    /// Returns `true` for outcomes that let the transition continue.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed | Self::Enter(_))
    }
}

impl fmt::Debug for GuardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proceed => write!(f, "Proceed"),
            Self::Abort => write!(f, "Abort"),
            Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Self::Redirect(location) => f.debug_tuple("Redirect").field(location).finish(),
            Self::Enter(_) => write!(f, "Enter(..)"),
        }
    }
}

/// What a guard returns. `Err` means the guard itself failed.
pub type GuardResult = Result<GuardOutcome, BoxError>;

/// Conversion of a guard body's output into a [`GuardResult`].
///
/// # Default Implementations
///
/// - `GuardOutcome` → As is
/// - `()` → `Proceed`
/// - `bool` → `true` = `Proceed`, `false` = `Abort`
/// - `Result<T, E>` → Delegates to inner `T` or propagates error
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a navigation guard",
    label = "missing `IntoGuardResult` implementation",
    note = "Return a `GuardOutcome`, `()`, `bool`, or a `Result` of one of these."
)]
pub trait IntoGuardResult {
    /// Convert into a guard result.
    fn into_guard_result(self) -> GuardResult;
}

impl IntoGuardResult for GuardOutcome {
    fn into_guard_result(self) -> GuardResult {
        Ok(self)
    }
}

impl IntoGuardResult for () {
    fn into_guard_result(self) -> GuardResult {
        Ok(GuardOutcome::Proceed)
    }
}

impl IntoGuardResult for bool {
    fn into_guard_result(self) -> GuardResult {
        Ok(if self {
            GuardOutcome::Proceed
        } else {
            GuardOutcome::Abort
        })
    }
}

impl<T, E> IntoGuardResult for Result<T, E>
where
    T: IntoGuardResult,
    E: Into<BoxError>,
{
    fn into_guard_result(self) -> GuardResult {
        match self {
            Ok(t) => t.into_guard_result(),
            Err(e) => Err(e.into()),
        }
    }
}

/// A navigation guard.
///
/// Closures of the shape `Fn(Route, Route) -> impl Future` implement this
/// trait; their output may be anything implementing [`IntoGuardResult`].
///
/// # Example
///
/// ```rust
/// use navgate_core::{GuardOutcome, NavigationGuard, GuardResult, Route};
///
/// struct RequireLogin {
///     logged_in: bool,
/// }
///
/// impl NavigationGuard for RequireLogin {
///     async fn guard(&self, to: &Route, _from: &Route) -> GuardResult {
///         if self.logged_in || to.path() == "/login" {
///             Ok(GuardOutcome::Proceed)
///         } else {
///             Ok(GuardOutcome::redirect("/login"))
///         }
///     }
/// }
/// ```
///
/// This trait uses native `async fn` for static dispatch.
/// For dynamic dispatch (hook lists, route records), use [`DynGuard`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a navigation guard",
    label = "missing `NavigationGuard` implementation",
    note = "Guards must implement `guard(to, from)`; closures need typed `Route` arguments."
)]
pub trait NavigationGuard: Send + Sync + 'static {
    /// Decide the transition from `from` to `to`.
    fn guard(&self, to: &Route, from: &Route) -> impl Future<Output = GuardResult> + Send;
}

/// Dynamic object-safe version of [`NavigationGuard`].
pub trait DynGuard: Send + Sync + 'static {
    /// Decide the transition (dynamic dispatch version).
    fn guard_dyn<'a>(
        &'a self,
        to: &'a Route,
        from: &'a Route,
    ) -> Pin<Box<dyn Future<Output = GuardResult> + Send + 'a>>;
}

// Blanket implementation: Any type implementing NavigationGuard implements DynGuard automatically.
impl<T: NavigationGuard> DynGuard for T {
    fn guard_dyn<'a>(
        &'a self,
        to: &'a Route,
        from: &'a Route,
    ) -> Pin<Box<dyn Future<Output = GuardResult> + Send + 'a>> {
        Box::pin(self.guard(to, from))
    }
}

// Blanket impl for closures
impl<F, Fut> NavigationGuard for F
where
    F: Fn(Route, Route) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoGuardResult,
{
    async fn guard(&self, to: &Route, from: &Route) -> GuardResult {
        (self)(to.clone(), from.clone()).await.into_guard_result()
    }
}

/// Identity helper that pins a closure to the guard signature.
///
/// Lets the compiler infer closure argument types:
///
/// ```rust
/// use navgate_core::{GuardOutcome, guard_fn};
///
/// let guard = guard_fn(|to, _from| async move {
///     if to.path().starts_with("/admin") {
///         GuardOutcome::Abort
///     } else {
///         GuardOutcome::Proceed
///     }
/// });
/// ```
pub fn guard_fn<F, Fut>(f: F) -> F
where
    F: Fn(Route, Route) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoGuardResult,
{
    f
}

/// A hook run after every committed transition with `(to, from)`.
pub type AfterHook = std::sync::Arc<dyn Fn(&Route, &Route) + Send + Sync + 'static>;
