use navgate::{
    Component, FailureKind, GuardOutcome, LocationBackend, MatchError, NavigationError, Route,
    RouteRecord, guard_fn,
    hooks::LoggingGuard,
    testing::{HeldGuard, QueueHost, RecordingGuard, TableMatcher},
};
use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

mod common;
use common::{basic_matcher, mounted, navigator, plain};

#[tokio::test]
async fn test_push_commits_and_writes_url() {
    let (nav, backend) = navigator(basic_matcher());
    nav.before_each(LoggingGuard);

    let route = nav.push("/a?tab=2").unwrap().await.unwrap();
    assert_eq!(route.full_path(), "/a?tab=2");
    assert!(Route::ptr_eq(&nav.current(), &route));
    assert!(nav.pending().is_none());
    assert_eq!(backend.current_location(), "/a?tab=2");
    assert_eq!(backend.entries(), vec!["/", "/a?tab=2"]);
}

#[tokio::test]
async fn test_transition_to_does_not_add_entries() {
    let (nav, backend) = navigator(basic_matcher());

    nav.transition_to("/a").unwrap().await.unwrap();
    // Only the URL re-assertion touches the backend, replacing in place.
    assert_eq!(backend.entries(), vec!["/a"]);

    nav.replace("/b").unwrap().await.unwrap();
    assert_eq!(backend.entries(), vec!["/b"]);
}

#[tokio::test]
async fn test_duplicate_navigation_runs_no_guards() {
    let (nav, backend) = navigator(basic_matcher());
    nav.push("/a").unwrap().await.unwrap();

    let log = RecordingGuard::log();
    nav.before_each(RecordingGuard::new("before", &log));
    let mutations = backend.mutations();

    let err = nav.push("/a").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Duplicated));

    // Trailing slash is the same location.
    let err = nav.push("/a/").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Duplicated));

    assert!(log.lock().is_empty());
    assert_eq!(backend.mutations(), mutations);
    assert!(nav.pending().is_none());
}

#[tokio::test]
async fn test_same_path_with_new_query_is_not_duplicate() {
    let (nav, _backend) = navigator(basic_matcher());
    nav.push("/a?x=1").unwrap().await.unwrap();

    let route = nav.push("/a?x=2").unwrap().await.unwrap();
    assert_eq!(route.query().get("x").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn test_duplicate_with_hash_scrolls() {
    let scrolls = Arc::new(AtomicUsize::new(0));
    let counter = scrolls.clone();
    let backend = navgate::backend::MemoryBackend::new(None);
    let nav = navgate::Navigator::builder(basic_matcher(), backend)
        .scroll_behavior(move |_to: &Route, _from: &Route, is_pop: bool| {
            assert!(!is_pop);
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .build();

    nav.push("/a#top").unwrap().await.unwrap();
    assert_eq!(scrolls.load(Ordering::SeqCst), 1);

    let err = nav.push("/a#top").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Duplicated));
    assert_eq!(scrolls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_stale_transition_is_cancelled() {
    let (held, mut handle) = HeldGuard::new();
    let slow = RouteRecord::builder("/slow").before_enter(held).build();
    let matcher = basic_matcher().route("/slow", slow);
    let (nav, backend) = navigator(matcher);

    let first = tokio::spawn(nav.push("/slow").unwrap());
    handle.entered().await;
    assert_eq!(nav.pending().map(|r| r.path().to_string()), Some("/slow".into()));

    let second = nav.push("/b").unwrap().await.unwrap();
    assert_eq!(second.path(), "/b");

    handle.proceed();
    let err = first.await.unwrap().unwrap_err();
    assert!(err.is_failure(FailureKind::Cancelled));
    let failure = err.failure().unwrap();
    assert_eq!(failure.to().path(), "/slow");

    assert_eq!(nav.current().path(), "/b");
    assert_eq!(backend.current_location(), "/b");
}

#[tokio::test]
async fn test_stale_leave_guard_is_cancelled() {
    let (held, mut handle) = HeldGuard::new();
    let editor = mounted(
        RouteRecord::builder("/editor")
            .component(Component::builder().before_route_leave(held).build())
            .build(),
    );
    let (nav, backend) = navigator(basic_matcher().route("/editor", editor));
    nav.push("/editor").unwrap().await.unwrap();

    let first = tokio::spawn(nav.push("/a").unwrap());
    handle.entered().await;

    // The leave guard holds only its first invocation.
    let second = nav.push("/b").unwrap().await.unwrap();
    assert_eq!(second.path(), "/b");

    handle.proceed();
    let err = first.await.unwrap().unwrap_err();
    assert!(err.is_failure(FailureKind::Cancelled));
    assert_eq!(nav.current().path(), "/b");
    assert_eq!(backend.entries(), vec!["/", "/editor", "/b"]);
}

#[tokio::test]
async fn test_late_redirect_from_stale_transition_is_dropped() {
    let (held, mut handle) = HeldGuard::new();
    let slow = RouteRecord::builder("/slow").before_enter(held).build();
    let (nav, backend) = navigator(basic_matcher().route("/slow", slow));

    let first = tokio::spawn(nav.push("/slow").unwrap());
    handle.entered().await;
    nav.push("/b").unwrap().await.unwrap();

    handle.release(GuardOutcome::redirect("/login"));
    let err = first.await.unwrap().unwrap_err();
    assert!(err.is_failure(FailureKind::Cancelled));
    assert_eq!(nav.current().path(), "/b");
    assert!(nav.pending().is_none());
    assert_eq!(backend.entries(), vec!["/", "/b"]);
}

#[tokio::test]
async fn test_late_error_from_stale_transition_is_not_reported() {
    let (held, mut handle) = HeldGuard::new();
    let slow = RouteRecord::builder("/slow").before_enter(held).build();
    let (nav, backend) = navigator(basic_matcher().route("/slow", slow));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    nav.on_error(move |err| sink.lock().push(err.to_string()));

    let first = tokio::spawn(nav.push("/slow").unwrap());
    handle.entered().await;
    nav.push("/b").unwrap().await.unwrap();
    let mutations = backend.mutations();

    handle.release(GuardOutcome::error("late"));
    let err = first.await.unwrap().unwrap_err();
    assert!(err.is_failure(FailureKind::Cancelled));
    assert!(seen.lock().is_empty());
    assert_eq!(backend.mutations(), mutations);
}

#[tokio::test]
async fn test_redirect_returns_before_target_settles_with_host() {
    let private = RouteRecord::builder("/private")
        .before_enter(guard_fn(|_to, _from| async { GuardOutcome::redirect("/slow") }))
        .build();
    let (held, handle) = HeldGuard::new();
    let slow = RouteRecord::builder("/slow").before_enter(held).build();
    let (nav, _backend) = navigator(
        basic_matcher()
            .route("/private", private)
            .route("/slow", slow),
    );
    let host = QueueHost::new();
    nav.init(Arc::new(host.clone())).unwrap().await.unwrap();

    let result = tokio::time::timeout(Duration::from_secs(1), nav.push("/private").unwrap())
        .await
        .expect("redirected caller should not wait for the target");
    assert!(result.unwrap_err().is_failure(FailureKind::Redirected));
    assert_eq!(nav.pending().map(|r| r.path().to_string()), Some("/slow".into()));
    assert_eq!(host.queued(), 1);

    handle.proceed();
    host.run_pending().await;
    assert_eq!(nav.current().path(), "/slow");
}

#[tokio::test]
async fn test_redirect_pushes_target() {
    let private = RouteRecord::builder("/private")
        .before_enter(guard_fn(|_to, _from| async { GuardOutcome::redirect("/login") }))
        .build();
    let (nav, backend) = navigator(basic_matcher().route("/private", private));
    nav.push("/a").unwrap().await.unwrap();

    let err = nav.push("/private").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Redirected));
    assert_eq!(err.failure().unwrap().to().path(), "/private");
    assert_eq!(nav.current().path(), "/login");
    assert_eq!(backend.entries(), vec!["/", "/a", "/login"]);
}

#[tokio::test]
async fn test_redirect_honours_replace() {
    let private = RouteRecord::builder("/private")
        .before_enter(guard_fn(|_to, _from| async { GuardOutcome::replace("/login") }))
        .build();
    let (nav, backend) = navigator(basic_matcher().route("/private", private));
    nav.push("/a").unwrap().await.unwrap();

    let err = nav.push("/private").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Redirected));
    assert_eq!(nav.current().path(), "/login");
    assert_eq!(backend.entries(), vec!["/", "/login"]);
}

#[tokio::test]
async fn test_abort_reasserts_url_with_push() {
    let (nav, backend) = navigator(basic_matcher());
    nav.push("/a").unwrap().await.unwrap();
    backend.replace("/elsewhere");

    nav.before_each(guard_fn(|to, _from| async move { to.path() != "/b" }));
    let err = nav.push("/b").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Aborted));

    assert_eq!(nav.current().path(), "/a");
    assert_eq!(backend.current_location(), "/a");
    assert_eq!(backend.entries(), vec!["/", "/elsewhere", "/a"]);
}

#[tokio::test]
async fn test_guard_error_reaches_callbacks_and_reasserts_url() {
    let (nav, backend) = navigator(basic_matcher());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    nav.on_error(move |err| sink.lock().push(err.to_string()));
    nav.push("/a").unwrap().await.unwrap();
    backend.replace("/elsewhere");

    nav.before_each(guard_fn(|_to, _from| async { GuardOutcome::error("denied") }));
    let err = nav.push("/b").unwrap().await.unwrap_err();

    assert!(matches!(err, NavigationError::Guard(_)));
    assert_eq!(err.guard_error().unwrap().to_string(), "denied");
    assert_eq!(*seen.lock(), vec!["denied"]);
    assert_eq!(backend.current_location(), "/a");
}

#[tokio::test]
async fn test_thrown_error_leaves_url_alone() {
    let (nav, backend) = navigator(basic_matcher());
    let errors = Arc::new(AtomicUsize::new(0));
    let counter = errors.clone();
    nav.on_error(move |_err| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    nav.push("/a").unwrap().await.unwrap();
    backend.replace("/elsewhere");

    nav.before_each(guard_fn(|_to, _from| async {
        Err::<GuardOutcome, _>(std::io::Error::other("network down"))
    }));
    let err = nav.push("/b").unwrap().await.unwrap_err();

    assert_eq!(err.guard_error().unwrap().to_string(), "network down");
    assert_eq!(errors.load(Ordering::SeqCst), 1);
    assert_eq!(backend.current_location(), "/elsewhere");
}

#[tokio::test]
async fn test_failures_are_not_broadcast() {
    let (nav, _backend) = navigator(basic_matcher());
    let errors = Arc::new(AtomicUsize::new(0));
    let counter = errors.clone();
    nav.on_error(move |_err| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    nav.before_each(guard_fn(|_to, _from| async { false }));
    let err = nav.push("/a").unwrap().await.unwrap_err();
    assert!(err.is_failure(FailureKind::Aborted));
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_matcher_error_skips_pipeline() {
    let matcher = TableMatcher::new()
        .route("/", plain("/"))
        .redirect("/loop-a", "/loop-b")
        .redirect("/loop-b", "/loop-a");
    let (nav, _backend) = navigator(matcher);
    let log = RecordingGuard::log();
    nav.before_each(RecordingGuard::new("before", &log));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    nav.on_error(move |err| sink.lock().push(err.to_string()));

    let err = nav.push("/loop-a").unwrap_err();
    assert!(matches!(err, MatchError::RedirectLoop(_)));
    assert_eq!(seen.lock().len(), 1);
    assert!(log.lock().is_empty());
    assert!(nav.pending().is_none());
}

#[tokio::test]
async fn test_after_hooks_listen_and_remove_hook() {
    let (nav, _backend) = navigator(basic_matcher());
    let log = RecordingGuard::log();

    let after_log = log.clone();
    let id = nav.after_each(move |to: &Route, from: &Route| {
        after_log.lock().push(format!("after {} <- {}", to.path(), from.path()));
    });
    let listen_log = log.clone();
    nav.listen(move |route: &Route| listen_log.lock().push(format!("listen {}", route.path())));

    nav.push("/a").unwrap().await.unwrap();
    assert_eq!(*log.lock(), vec!["listen /a", "after /a <- /"]);

    assert!(nav.remove_hook(id));
    assert!(!nav.remove_hook(id));
    nav.push("/b").unwrap().await.unwrap();
    assert_eq!(log.lock().last().map(String::as_str), Some("listen /b"));
}

#[tokio::test]
async fn test_before_each_order_and_removal() {
    let (nav, _backend) = navigator(basic_matcher());
    let log = RecordingGuard::log();
    let first = nav.before_each(RecordingGuard::new("first", &log));
    nav.before_each(RecordingGuard::new("second", &log));
    nav.before_resolve(RecordingGuard::new("resolve", &log));

    nav.push("/a").unwrap().await.unwrap();
    assert_eq!(*log.lock(), vec!["first", "second", "resolve"]);

    nav.remove_hook(first);
    log.lock().clear();
    nav.push("/b").unwrap().await.unwrap();
    assert_eq!(*log.lock(), vec!["second", "resolve"]);
}
