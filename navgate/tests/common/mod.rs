#![allow(dead_code)]

use navgate::{
    Component, DEFAULT_VIEW, Navigator, RouteRecord,
    backend::MemoryBackend,
    testing::{CallLog, RecordingGuard, TableMatcher},
};
use std::sync::Arc;

// ============================================================================
// Components
// ============================================================================

/// A component whose leave, update and enter guards log `<label>:<kind>`.
pub fn logged_component(label: &str, log: &CallLog) -> Component {
    Component::builder()
        .before_route_leave(RecordingGuard::new(format!("{label}:leave"), log))
        .before_route_update(RecordingGuard::new(format!("{label}:update"), log))
        .before_route_enter(RecordingGuard::new(format!("{label}:enter"), log))
        .build()
}

/// Register a placeholder instance in the default view of `record`.
pub fn mounted(record: Arc<RouteRecord>) -> Arc<RouteRecord> {
    record.register_instance(DEFAULT_VIEW, Arc::new(record.path().to_string()));
    record
}

pub fn plain(path: &str) -> Arc<RouteRecord> {
    RouteRecord::builder(path).build()
}

// ============================================================================
// Navigators
// ============================================================================

pub fn navigator(matcher: TableMatcher) -> (Navigator, MemoryBackend) {
    let backend = MemoryBackend::new(None);
    let navigator = Navigator::builder(matcher, backend.clone()).build();
    (navigator, backend)
}

/// Matcher with plain records for `/`, `/a`, `/b` and `/login`.
pub fn basic_matcher() -> TableMatcher {
    TableMatcher::new()
        .route("/", plain("/"))
        .route("/a", plain("/a"))
        .route("/b", plain("/b"))
        .route("/login", plain("/login"))
}

pub fn entries(backend: &MemoryBackend) -> Vec<String> {
    backend.entries()
}
