//! Testing utilities for navgate.
//!
//! This module provides utilities to make testing guards and navigators easier.
//!
//! # Features
//!
//! - [`RecordingGuard`]: A guard that records every invocation in a shared log
//! - [`HeldGuard`]: A guard that suspends until the test releases it
//! - [`TableMatcher`]: An exact-path route matcher with names and redirects
//! - [`QueueHost`]: A deterministic host that runs spawned tasks on demand

use crate::url::{parse_query, split_path};
use futures::channel::oneshot;
use navgate_core::{
    ComponentGuard, ComponentInstance, GuardOutcome, GuardResult, HostApp, HostTask, Location,
    MatchError, NavigationGuard, Route, RouteMatcher, RouteRecord,
};
use parking_lot::Mutex;
use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Arc,
};

/// A shared, ordered log of labels.
pub type CallLog = Arc<Mutex<Vec<String>>>;

// ============================================================================
// Recording Guard
// ============================================================================

/// A guard that appends its label to a shared log each time it runs.
///
/// Works both as a [`NavigationGuard`] and as a [`ComponentGuard`], so one log
/// can capture the order of global, per-route and in-component guards.
///
/// # Example
///
/// ```rust
/// use navgate_core::GuardOutcome;
/// use navgate_std::testing::RecordingGuard;
///
/// let log = RecordingGuard::log();
/// let first = RecordingGuard::new("first", &log);
/// let blocker = RecordingGuard::new("blocker", &log).then(|| GuardOutcome::Abort);
/// ```
#[derive(Clone)]
pub struct RecordingGuard {
    label: String,
    log: CallLog,
    outcome: Arc<dyn Fn() -> GuardOutcome + Send + Sync>,
}

impl RecordingGuard {
    /// Create an empty log to share between guards.
    pub fn log() -> CallLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    /// Create a guard that records `label` into `log` and proceeds.
    pub fn new(label: impl Into<String>, log: &CallLog) -> Self {
        Self {
            label: label.into(),
            log: log.clone(),
            outcome: Arc::new(|| GuardOutcome::Proceed),
        }
    }

    /// Return the outcome produced by `outcome` instead of proceeding.
    pub fn then<F>(mut self, outcome: F) -> Self
    where
        F: Fn() -> GuardOutcome + Send + Sync + 'static,
    {
        self.outcome = Arc::new(outcome);
        self
    }

    fn record(&self) -> GuardResult {
        self.log.lock().push(self.label.clone());
        Ok((self.outcome)())
    }
}

impl NavigationGuard for RecordingGuard {
    async fn guard(&self, _to: &Route, _from: &Route) -> GuardResult {
        self.record()
    }
}

impl ComponentGuard for RecordingGuard {
    async fn guard(&self, _instance: &ComponentInstance, _to: &Route, _from: &Route) -> GuardResult {
        self.record()
    }
}

// ============================================================================
// Held Guard
// ============================================================================

/// A guard that suspends its first invocation until released.
///
/// Works as a [`NavigationGuard`] and as a [`ComponentGuard`].
///
/// Later invocations proceed immediately. Dropping the [`GuardHandle`] without
/// releasing aborts the held invocation.
pub struct HeldGuard {
    release: Mutex<Option<oneshot::Receiver<GuardOutcome>>>,
    entered: Mutex<Option<oneshot::Sender<()>>>,
}

/// Controls a [`HeldGuard`].
pub struct GuardHandle {
    release: oneshot::Sender<GuardOutcome>,
    entered: Option<oneshot::Receiver<()>>,
}

impl HeldGuard {
    /// Create a held guard and the handle that releases it.
    pub fn new() -> (Self, GuardHandle) {
        let (release_tx, release_rx) = oneshot::channel();
        let (entered_tx, entered_rx) = oneshot::channel();
        let guard = Self {
            release: Mutex::new(Some(release_rx)),
            entered: Mutex::new(Some(entered_tx)),
        };
        let handle = GuardHandle {
            release: release_tx,
            entered: Some(entered_rx),
        };
        (guard, handle)
    }
}

impl HeldGuard {
    async fn hold(&self) -> GuardResult {
        let Some(release) = self.release.lock().take() else {
            return Ok(GuardOutcome::Proceed);
        };
        if let Some(entered) = self.entered.lock().take() {
            let _ = entered.send(());
        }
        Ok(release.await.unwrap_or(GuardOutcome::Abort))
    }
}

impl NavigationGuard for HeldGuard {
    async fn guard(&self, _to: &Route, _from: &Route) -> GuardResult {
        self.hold().await
    }
}

impl ComponentGuard for HeldGuard {
    async fn guard(&self, _instance: &ComponentInstance, _to: &Route, _from: &Route) -> GuardResult {
        self.hold().await
    }
}

impl GuardHandle {
    /// Wait until the guard has started running.
    pub async fn entered(&mut self) {
        if let Some(entered) = self.entered.take() {
            let _ = entered.await;
        }
    }

    /// Let the held invocation finish with `outcome`.
    pub fn release(self, outcome: GuardOutcome) {
        let _ = self.release.send(outcome);
    }

    /// Let the held invocation proceed.
    pub fn proceed(self) {
        self.release(GuardOutcome::Proceed);
    }
}

// ============================================================================
// Table Matcher
// ============================================================================

struct Entry {
    path: String,
    chain: Vec<Arc<RouteRecord>>,
}

/// A route matcher over a fixed table of exact paths.
///
/// Paths are compared ignoring a trailing slash. Named locations resolve
/// through the innermost record's name. Configured redirects are followed
/// before matching; a redirect cycle is a [`MatchError::RedirectLoop`]. Paths
/// not in the table produce a route with nothing matched.
///
/// # Example
///
/// ```rust
/// use navgate_core::{Location, Route, RouteMatcher, RouteRecord};
/// use navgate_std::testing::TableMatcher;
///
/// let matcher = TableMatcher::new()
///     .route("/home", RouteRecord::builder("/home").name("home").build())
///     .redirect("/", "/home");
///
/// let route = matcher.match_location(&Location::path("/?tab=1"), &Route::start()).unwrap();
/// assert_eq!(route.full_path(), "/home?tab=1");
/// assert_eq!(route.redirected_from(), Some("/?tab=1"));
/// ```
#[derive(Default)]
pub struct TableMatcher {
    entries: Vec<Entry>,
    redirects: HashMap<String, String>,
}

impl TableMatcher {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `path` to a single record.
    pub fn route(self, path: impl Into<String>, record: Arc<RouteRecord>) -> Self {
        self.nested(path, vec![record])
    }

    /// Map `path` to a chain of records, outermost first.
    pub fn nested(mut self, path: impl Into<String>, chain: Vec<Arc<RouteRecord>>) -> Self {
        self.entries.push(Entry {
            path: path.into(),
            chain,
        });
        self
    }

    /// Redirect `from` to `to` before matching.
    pub fn redirect(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.redirects
            .insert(normalize(&from.into()).to_string(), to.into());
        self
    }

    fn find_path(&self, path: &str) -> Option<&Entry> {
        let path = normalize(path);
        self.entries.iter().find(|entry| normalize(&entry.path) == path)
    }

    fn find_name(&self, name: &str) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.chain.last().and_then(|record| record.name()) == Some(name))
    }
}

fn normalize(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some("") | None => path,
        Some(trimmed) => trimmed,
    }
}

impl RouteMatcher for TableMatcher {
    fn match_location(&self, location: &Location, current: &Route) -> Result<Route, MatchError> {
        let (raw_path, raw_query, raw_hash) = match (&location.path, &location.name) {
            (Some(path), _) => split_path(path),
            (None, Some(name)) => {
                let entry = self
                    .find_name(name)
                    .ok_or_else(|| MatchError::NotFound(name.clone()))?;
                (entry.path.as_str(), "", "")
            }
            (None, None) => (current.path(), "", ""),
        };

        let mut query = parse_query(raw_query);
        query.extend(location.query.clone());
        let hash = location.hash.clone().unwrap_or_else(|| raw_hash.to_string());

        let mut path = raw_path.to_string();
        let mut seen = HashSet::new();
        let mut redirected = false;
        while let Some(target) = self.redirects.get(normalize(&path)) {
            if !seen.insert(normalize(&path).to_string()) {
                return Err(MatchError::RedirectLoop(path));
            }
            path = target.clone();
            redirected = true;
        }

        let mut builder = Route::builder(path.clone())
            .query_map(query.clone())
            .hash(hash.clone())
            .params(location.params.clone());
        if let Some(entry) = self.find_path(&path) {
            builder = builder.matched(entry.chain.clone());
            if let Some(name) = entry.chain.last().and_then(|record| record.name()) {
                builder = builder.name(name);
            }
        }
        if redirected {
            let original = Route::builder(raw_path).query_map(query).hash(hash).build();
            builder = builder.redirected_from(original.full_path());
        }
        Ok(builder.build())
    }
}

// ============================================================================
// Queue Host
// ============================================================================

/// A host that queues spawned tasks until the test runs them.
///
/// Clones share the queue.
#[derive(Clone, Default)]
pub struct QueueHost {
    tasks: Arc<Mutex<VecDeque<HostTask>>>,
}

impl QueueHost {
    /// Create a host with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn queued(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Run queued tasks one after another, including tasks they queue,
    /// until the queue is empty. Returns how many tasks ran.
    pub async fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(task) = self.tasks.lock().pop_front() else {
                return ran;
            };
            task.await;
            ran += 1;
        }
    }
}

impl HostApp for QueueHost {
    fn spawn(&self, task: HostTask) {
        self.tasks.lock().push_back(task);
    }
}
