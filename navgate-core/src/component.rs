//! # Component Definitions
//!
//! Route records hold component definitions per view slot. The transition
//! pipeline never renders anything; it only asks a definition which in-component
//! guards it declares. That capability is the [`HookSource`] trait.
//!
//! [`Component`] is the canonical, normalized definition: mixins are merged
//! once at build time, ahead of the component's own hooks, so extraction is a
//! plain read during every transition.

use crate::{
    error::BoxError,
    guard::{DynGuard, GuardResult, IntoGuardResult, NavigationGuard},
    route::Route,
};
use std::{any::Any, future::Future, pin::Pin, sync::Arc};

/// A live, mounted component instance, owned by the host framework.
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

/// A guard declared inside a component; it runs bound to the live instance.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid component guard",
    label = "missing `ComponentGuard` implementation",
    note = "Component guards receive the mounted instance followed by `to` and `from`."
)]
pub trait ComponentGuard: Send + Sync + 'static {
    /// Decide the transition on behalf of `instance`.
    fn guard(
        &self,
        instance: &ComponentInstance,
        to: &Route,
        from: &Route,
    ) -> impl Future<Output = GuardResult> + Send;
}

/// Object-safe version of [`ComponentGuard`].
pub trait DynComponentGuard: Send + Sync + 'static {
    /// Decide the transition on behalf of `instance` (dynamic dispatch version).
    fn guard_dyn<'a>(
        &'a self,
        instance: &'a ComponentInstance,
        to: &'a Route,
        from: &'a Route,
    ) -> Pin<Box<dyn Future<Output = GuardResult> + Send + 'a>>;
}

impl<T: ComponentGuard> DynComponentGuard for T {
    fn guard_dyn<'a>(
        &'a self,
        instance: &'a ComponentInstance,
        to: &'a Route,
        from: &'a Route,
    ) -> Pin<Box<dyn Future<Output = GuardResult> + Send + 'a>> {
        Box::pin(self.guard(instance, to, from))
    }
}

// Blanket impl for closures
impl<F, Fut> ComponentGuard for F
where
    F: Fn(ComponentInstance, Route, Route) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoGuardResult,
{
    async fn guard(&self, instance: &ComponentInstance, to: &Route, from: &Route) -> GuardResult {
        (self)(instance.clone(), to.clone(), from.clone())
            .await
            .into_guard_result()
    }
}

/// The capability to declare in-component navigation guards.
///
/// Each method returns the guards in declaration order; an empty list means
/// the definition declares no hook of that kind.
pub trait HookSource: Send + Sync + 'static {
    /// Guards consulted when the component's route is being left.
    fn leave_guards(&self) -> Vec<Arc<dyn DynComponentGuard>> {
        Vec::new()
    }

    /// Guards consulted when the component is reused for a new route.
    fn update_guards(&self) -> Vec<Arc<dyn DynComponentGuard>> {
        Vec::new()
    }

    /// Guards consulted before the component is created.
    fn enter_guards(&self) -> Vec<Arc<dyn DynGuard>> {
        Vec::new()
    }
}

/// A component definition that is loaded on first use.
pub trait LazyComponent: Send + Sync + 'static {
    /// Load the concrete definition.
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Arc<dyn HookSource>, BoxError>> + Send>>;
}

/// Adapter turning an async closure into a [`LazyComponent`].
///
/// # Example
///
/// ```rust
/// use navgate_core::{BoxError, Component, lazy};
///
/// let loader = lazy(|| async { Ok::<_, BoxError>(Component::builder().build()) });
/// ```
pub fn lazy<F, Fut, C>(loader: F) -> LazyFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, BoxError>> + Send + 'static,
    C: HookSource,
{
    LazyFn(loader)
}

/// See [`lazy`].
pub struct LazyFn<F>(F);

impl<F, Fut, C> LazyComponent for LazyFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, BoxError>> + Send + 'static,
    C: HookSource,
{
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Arc<dyn HookSource>, BoxError>> + Send>> {
        let fut = (self.0)();
        Box::pin(async move {
            let component = fut.await?;
            Ok(Arc::new(component) as Arc<dyn HookSource>)
        })
    }
}

/// A component definition held by a route record slot.
#[derive(Clone)]
pub enum ComponentDef {
    /// A concrete definition.
    Resolved(Arc<dyn HookSource>),
    /// A definition that still has to be loaded.
    Lazy(Arc<dyn LazyComponent>),
}

impl ComponentDef {
    /// The concrete definition, if already resolved.
    pub fn resolved(&self) -> Option<&Arc<dyn HookSource>> {
        match self {
            Self::Resolved(source) => Some(source),
            Self::Lazy(_) => None,
        }
    }
}

/// The canonical, normalized component definition.
///
/// # Example
///
/// ```rust
/// use navgate_core::{Component, ComponentInstance, GuardOutcome, Route};
///
/// let auditing = Component::builder()
///     .before_route_leave(|_vm: ComponentInstance, _to: Route, _from: Route| async {
///         GuardOutcome::Proceed
///     })
///     .build();
///
/// let page = Component::builder().mixin(&auditing).build();
/// ```
#[derive(Clone, Default)]
pub struct Component {
    leave: Vec<Arc<dyn DynComponentGuard>>,
    update: Vec<Arc<dyn DynComponentGuard>>,
    enter: Vec<Arc<dyn DynGuard>>,
}

impl Component {
    /// Start building a component.
    pub fn builder() -> ComponentBuilder {
        ComponentBuilder::default()
    }
}

impl HookSource for Component {
    fn leave_guards(&self) -> Vec<Arc<dyn DynComponentGuard>> {
        self.leave.clone()
    }

    fn update_guards(&self) -> Vec<Arc<dyn DynComponentGuard>> {
        self.update.clone()
    }

    fn enter_guards(&self) -> Vec<Arc<dyn DynGuard>> {
        self.enter.clone()
    }
}

/// Builder for [`Component`].
#[derive(Default)]
pub struct ComponentBuilder {
    mixins: Vec<Component>,
    own: Component,
}

impl ComponentBuilder {
    /// Merge another definition; its hooks run before this component's own.
    pub fn mixin(mut self, mixin: &Component) -> Self {
        self.mixins.push(mixin.clone());
        self
    }

    /// Add a `beforeRouteLeave` guard.
    pub fn before_route_leave<G: ComponentGuard>(mut self, guard: G) -> Self {
        self.own.leave.push(Arc::new(guard));
        self
    }

    /// Add a `beforeRouteUpdate` guard.
    pub fn before_route_update<G: ComponentGuard>(mut self, guard: G) -> Self {
        self.own.update.push(Arc::new(guard));
        self
    }

    /// Add a `beforeRouteEnter` guard. No instance exists yet when it runs.
    pub fn before_route_enter<G: NavigationGuard>(mut self, guard: G) -> Self {
        self.own.enter.push(Arc::new(guard));
        self
    }

    /// Normalize into the canonical definition.
    pub fn build(self) -> Component {
        let mut merged = Component::default();
        for mixin in self.mixins.into_iter().chain(std::iter::once(self.own)) {
            merged.leave.extend(mixin.leave);
            merged.update.extend(mixin.update);
            merged.enter.extend(mixin.enter);
        }
        merged
    }
}
