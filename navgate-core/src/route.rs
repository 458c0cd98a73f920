//! # Routes and Route Records
//!
//! A [`Route`] is an immutable snapshot of navigation state. It is a cheap,
//! reference-counted handle: cloning only bumps a counter, and two handles can
//! be compared by identity with [`Route::ptr_eq`]. The transition pipeline
//! relies on that identity to recognize stale continuations.
//!
//! A [`RouteRecord`] is one level of a nested route configuration. Records are
//! shared as `Arc<RouteRecord>` and compared by pointer identity when the
//! orchestrator diffs two matched chains.

use crate::{
    component::{ComponentDef, ComponentInstance, HookSource, LazyComponent},
    guard::{DynGuard, NavigationGuard},
};
use parking_lot::RwLock;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    ops::Deref,
    sync::{Arc, LazyLock},
};

/// Query string mapping. Values are kept exactly as supplied.
pub type Query = BTreeMap<String, String>;

/// Route parameters extracted by the matcher.
pub type Params = BTreeMap<String, String>;

/// The view slot used when a record declares a single component.
pub const DEFAULT_VIEW: &str = "default";

static START: LazyLock<Route> = LazyLock::new(|| Route::builder("/").build());

/// The data behind a [`Route`] handle.
pub struct RouteData {
    name: Option<String>,
    path: String,
    hash: String,
    query: Query,
    params: Params,
    full_path: String,
    matched: Vec<Arc<RouteRecord>>,
    redirected_from: Option<String>,
}

impl RouteData {
    /// The route name, if the innermost record is named.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The semantic path, without query or hash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The hash fragment including the leading `#`, or an empty string.
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// The query mapping.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// The matched parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Path + query + hash.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// Matched records from outermost to innermost.
    pub fn matched(&self) -> &[Arc<RouteRecord>] {
        &self.matched
    }

    /// The full path this route was redirected from by the matcher, if any.
    pub fn redirected_from(&self) -> Option<&str> {
        self.redirected_from.as_deref()
    }
}

/// An immutable, shared snapshot of a resolved location.
///
/// # Example
///
/// ```rust
/// use navgate_core::Route;
///
/// let route = Route::builder("/users").query("page", "2").hash("#top").build();
/// assert_eq!(route.full_path(), "/users?page=2#top");
///
/// let copy = route.clone(); // O(1)
/// assert!(Route::ptr_eq(&route, &copy));
/// ```
#[derive(Clone)]
pub struct Route(Arc<RouteData>);

impl Route {
    /// The sentinel route that stands for "nowhere".
    ///
    /// Every call returns a handle to the same allocation.
    pub fn start() -> Route {
        START.clone()
    }

    /// Start building a route for `path`.
    pub fn builder(path: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(path)
    }

    /// Returns `true` if this handle is the [`Route::start`] sentinel.
    pub fn is_start(&self) -> bool {
        Route::ptr_eq(self, &START)
    }

    /// Identity comparison of two handles.
    pub fn ptr_eq(a: &Route, b: &Route) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Route equality as used for duplicate detection.
    ///
    /// Two routes with paths are equal when their paths match ignoring a
    /// trailing slash and their hash and query match. Two named routes without
    /// paths additionally compare params. The start route is only equal to
    /// itself.
    pub fn is_same(&self, other: &Route) -> bool {
        if other.is_start() {
            return Route::ptr_eq(self, other);
        }
        if !self.path.is_empty() && !other.path.is_empty() {
            return trim_trailing_slash(&self.path) == trim_trailing_slash(&other.path)
                && self.hash == other.hash
                && self.query == other.query;
        }
        match (&self.name, &other.name) {
            (Some(a), Some(b)) => {
                a == b
                    && self.hash == other.hash
                    && self.query == other.query
                    && self.params == other.params
            }
            _ => false,
        }
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}

impl Deref for Route {
    type Target = RouteData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<RouteData> for Route {
    fn as_ref(&self) -> &RouteData {
        &self.0
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("full_path", &self.full_path)
            .field("params", &self.params)
            .field(
                "matched",
                &self.matched.iter().map(|r| r.path()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`Route`] snapshots, normally used by matchers.
pub struct RouteBuilder {
    name: Option<String>,
    path: String,
    hash: String,
    query: Query,
    params: Params,
    matched: Vec<Arc<RouteRecord>>,
    redirected_from: Option<String>,
}

impl RouteBuilder {
    fn new(path: impl Into<String>) -> Self {
        Self {
            name: None,
            path: path.into(),
            hash: String::new(),
            query: Query::new(),
            params: Params::new(),
            matched: Vec::new(),
            redirected_from: None,
        }
    }

    /// Set the route name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the hash fragment. A missing leading `#` is added.
    pub fn hash(mut self, hash: impl Into<String>) -> Self {
        let hash = hash.into();
        self.hash = if hash.is_empty() || hash.starts_with('#') {
            hash
        } else {
            format!("#{hash}")
        };
        self
    }

    /// Add a query entry.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Replace the whole query mapping.
    pub fn query_map(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Add a route parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace the whole parameter mapping.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Set the matched record chain, outermost first.
    pub fn matched(mut self, matched: Vec<Arc<RouteRecord>>) -> Self {
        self.matched = matched;
        self
    }

    /// Mark the route as the result of a matcher redirect.
    pub fn redirected_from(mut self, full_path: impl Into<String>) -> Self {
        self.redirected_from = Some(full_path.into());
        self
    }

    /// Finalize the route, computing its full path.
    pub fn build(self) -> Route {
        let path = self.path;
        let mut full_path = if path.is_empty() {
            "/".to_string()
        } else {
            path.clone()
        };
        if !self.query.is_empty() {
            full_path.push('?');
            let pairs: Vec<String> = self
                .query
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{k}={v}")
                    }
                })
                .collect();
            full_path.push_str(&pairs.join("&"));
        }
        full_path.push_str(&self.hash);

        Route(Arc::new(RouteData {
            name: self.name,
            path,
            hash: self.hash,
            query: self.query,
            params: self.params,
            full_path,
            matched: self.matched,
            redirected_from: self.redirected_from,
        }))
    }
}

/// A raw location descriptor: what a caller asks to navigate to.
///
/// Strings convert into a path location; the path may carry `?query` and
/// `#hash` parts, which the matcher is expected to split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Target path (may include query and hash).
    pub path: Option<String>,
    /// Target route name.
    pub name: Option<String>,
    /// Parameters for a named location.
    pub params: Params,
    /// Extra query entries.
    pub query: Query,
    /// Hash fragment.
    pub hash: Option<String>,
    /// Use replace semantics when this location is the target of a redirect.
    pub replace: bool,
}

impl Location {
    /// A location targeting `path`.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// A location targeting the route named `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a query entry.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Set the hash fragment.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Request replace semantics.
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Location::path(path)
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Location::path(path)
    }
}

impl From<&Route> for Location {
    fn from(route: &Route) -> Self {
        Location::path(route.full_path())
    }
}

/// One level of a nested route configuration.
pub struct RouteRecord {
    path: String,
    name: Option<String>,
    components: RwLock<Vec<(String, ComponentDef)>>,
    instances: RwLock<HashMap<String, ComponentInstance>>,
    before_enter: Option<Arc<dyn DynGuard>>,
}

impl RouteRecord {
    /// Start building a record for `path`.
    pub fn builder(path: impl Into<String>) -> RouteRecordBuilder {
        RouteRecordBuilder {
            path: path.into(),
            name: None,
            components: Vec::new(),
            before_enter: None,
        }
    }

    /// The record's path pattern.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The record's name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The per-route enter guard.
    pub fn before_enter(&self) -> Option<Arc<dyn DynGuard>> {
        self.before_enter.clone()
    }

    /// Snapshot of the component definitions, in declaration order.
    pub fn components(&self) -> Vec<(String, ComponentDef)> {
        self.components.read().clone()
    }

    /// The component definition for `slot`.
    pub fn component(&self, slot: &str) -> Option<ComponentDef> {
        self.components
            .read()
            .iter()
            .find(|(key, _)| key == slot)
            .map(|(_, def)| def.clone())
    }

    /// Replace the definition held by `slot`. Used by lazy resolution.
    pub fn set_component(&self, slot: &str, def: ComponentDef) {
        let mut components = self.components.write();
        match components.iter_mut().find(|(key, _)| key == slot) {
            Some(entry) => entry.1 = def,
            None => components.push((slot.to_string(), def)),
        }
    }

    /// Returns `true` if any slot still holds an unresolved lazy definition.
    pub fn has_lazy_components(&self) -> bool {
        self.components
            .read()
            .iter()
            .any(|(_, def)| matches!(def, ComponentDef::Lazy(_)))
    }

    /// The live instance mounted in `slot`, if any.
    pub fn instance(&self, slot: &str) -> Option<ComponentInstance> {
        self.instances.read().get(slot).cloned()
    }

    /// Register the instance mounted in `slot`. Called by the host framework.
    pub fn register_instance(&self, slot: impl Into<String>, instance: ComponentInstance) {
        self.instances.write().insert(slot.into(), instance);
    }

    /// Forget the instance mounted in `slot`. Called by the host framework.
    pub fn unregister_instance(&self, slot: &str) -> Option<ComponentInstance> {
        self.instances.write().remove(slot)
    }
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRecord")
            .field("path", &self.path)
            .field("name", &self.name)
            .field(
                "components",
                &self
                    .components
                    .read()
                    .iter()
                    .map(|(key, _)| key.clone())
                    .collect::<Vec<_>>(),
            )
            .field("before_enter", &self.before_enter.is_some())
            .finish()
    }
}

/// Builder for [`RouteRecord`].
pub struct RouteRecordBuilder {
    path: String,
    name: Option<String>,
    components: Vec<(String, ComponentDef)>,
    before_enter: Option<Arc<dyn DynGuard>>,
}

impl RouteRecordBuilder {
    /// Set the record name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the component of the default view slot.
    pub fn component<C: HookSource>(self, component: C) -> Self {
        self.view(DEFAULT_VIEW, component)
    }

    /// Set the component of a named view slot.
    pub fn view<C: HookSource>(mut self, slot: impl Into<String>, component: C) -> Self {
        self.components
            .push((slot.into(), ComponentDef::Resolved(Arc::new(component))));
        self
    }

    /// Set a lazily loaded component for the default view slot.
    pub fn lazy_component<L: LazyComponent>(self, loader: L) -> Self {
        self.lazy_view(DEFAULT_VIEW, loader)
    }

    /// Set a lazily loaded component for a named view slot.
    pub fn lazy_view<L: LazyComponent>(mut self, slot: impl Into<String>, loader: L) -> Self {
        self.components
            .push((slot.into(), ComponentDef::Lazy(Arc::new(loader))));
        self
    }

    /// Set the per-route enter guard.
    pub fn before_enter<G: NavigationGuard>(mut self, guard: G) -> Self {
        self.before_enter = Some(Arc::new(guard));
        self
    }

    /// Finalize the record.
    pub fn build(self) -> Arc<RouteRecord> {
        Arc::new(RouteRecord {
            path: self.path,
            name: self.name,
            components: RwLock::new(self.components),
            instances: RwLock::new(HashMap::new()),
            before_enter: self.before_enter,
        })
    }
}
