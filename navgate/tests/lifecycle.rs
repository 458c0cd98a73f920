use navgate::{
    Component, FailureKind, GuardOutcome, HostApp, LocationBackend, MatchError, Navigator, Route,
    RouteRecord, RouterError,
    backend::MemoryBackend,
    guard_fn,
    testing::{QueueHost, RecordingGuard},
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

mod common;
use common::{basic_matcher, mounted, navigator, plain};

fn counters() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    (Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
}

#[tokio::test]
async fn test_ready_fires_once() {
    let (nav, _backend) = navigator(basic_matcher());
    let (ready, errors) = counters();
    let (r, e) = (ready.clone(), errors.clone());
    nav.on_ready_or_error(
        move |_route| {
            r.fetch_add(1, Ordering::SeqCst);
        },
        move |_err| {
            e.fetch_add(1, Ordering::SeqCst);
        },
    );
    assert!(!nav.is_ready());

    nav.push("/a").unwrap().await.unwrap();
    nav.push("/b").unwrap().await.unwrap();
    assert!(nav.is_ready());
    assert_eq!(ready.load(Ordering::SeqCst), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);

    // Late registration runs immediately.
    let r = ready.clone();
    nav.on_ready(move |route: &Route| {
        assert_eq!(route.path(), "/b");
        r.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(ready.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_ready_error_on_first_failure_only() {
    let (nav, _backend) = navigator(basic_matcher());
    let (ready, errors) = counters();
    let (r, e) = (ready.clone(), errors.clone());
    nav.on_ready_or_error(
        move |_route| {
            r.fetch_add(1, Ordering::SeqCst);
        },
        move |err| {
            assert!(err.is_failure(FailureKind::Aborted));
            e.fetch_add(1, Ordering::SeqCst);
        },
    );
    let blocking = nav.before_each(guard_fn(|_to, _from| async { GuardOutcome::Abort }));

    nav.push("/a").unwrap().await.unwrap_err();
    nav.push("/b").unwrap().await.unwrap_err();
    assert!(nav.is_ready());
    assert_eq!(errors.load(Ordering::SeqCst), 1);

    nav.remove_hook(blocking);
    nav.push("/a").unwrap().await.unwrap();
    assert_eq!(ready.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_initial_redirect_defers_readiness() {
    let (nav, _backend) = navigator(basic_matcher());
    let settled = Arc::new(Mutex::new(Vec::new()));
    let (ok, err) = (settled.clone(), settled.clone());
    nav.on_ready_or_error(
        move |route| ok.lock().push(format!("ready {}", route.path())),
        move |failure| err.lock().push(format!("error {failure}")),
    );
    nav.before_each(guard_fn(|to, _from| async move {
        if to.path() == "/a" {
            GuardOutcome::redirect("/login")
        } else {
            GuardOutcome::Proceed
        }
    }));

    let result = nav.push("/a").unwrap().await;
    assert!(result.unwrap_err().is_failure(FailureKind::Redirected));
    assert_eq!(*settled.lock(), vec!["ready /login"]);
}

#[tokio::test]
async fn test_init_navigates_and_listens() {
    let backend = MemoryBackend::new(None).starting_at("/a");
    let nav = Navigator::builder(basic_matcher(), backend.clone()).build();
    let host = QueueHost::new();

    let route = nav.init(Arc::new(host.clone())).unwrap().await.unwrap();
    assert_eq!(route.path(), "/a");
    assert!(nav.is_ready());
    assert!(nav.app().is_some());

    nav.push("/b").unwrap().await.unwrap();
    nav.back();
    assert_eq!(host.queued(), 1);
    assert_eq!(host.run_pending().await, 1);
    assert_eq!(nav.current().path(), "/a");

    nav.forward();
    host.run_pending().await;
    assert_eq!(nav.current().path(), "/b");
}

#[tokio::test]
async fn test_init_twice_fails() {
    let (nav, _backend) = navigator(basic_matcher());
    let host: Arc<dyn HostApp> = Arc::new(QueueHost::new());

    nav.init(host.clone()).unwrap().await.unwrap();
    let err = nav.init(host).unwrap_err();
    assert!(matches!(err, RouterError::AlreadyInitialized));
}

#[tokio::test]
async fn test_init_listens_even_if_start_fails_to_match() {
    let matcher = basic_matcher()
        .redirect("/loop-a", "/loop-b")
        .redirect("/loop-b", "/loop-a");
    let backend = MemoryBackend::new(None).starting_at("/loop-a");
    let nav = Navigator::builder(matcher, backend.clone()).build();
    let host = QueueHost::new();

    let err = nav.init(Arc::new(host.clone())).unwrap_err();
    assert!(matches!(err, RouterError::Match(MatchError::RedirectLoop(_))));
    assert!(nav.app().is_some());

    backend.push("/a");
    backend.go(-1);
    backend.go(1);
    assert_eq!(host.queued(), 1);
    host.run_pending().await;
    assert_eq!(nav.current().path(), "/a");
}

#[tokio::test]
async fn test_pop_scrolls_with_pop_flag() {
    let pops = Arc::new(Mutex::new(Vec::new()));
    let sink = pops.clone();
    let backend = MemoryBackend::new(None);
    let nav = Navigator::builder(basic_matcher(), backend.clone())
        .scroll_behavior(move |to: &Route, _from: &Route, is_pop: bool| {
            sink.lock().push((to.path().to_string(), is_pop));
        })
        .build();
    let host = QueueHost::new();
    nav.init(Arc::new(host.clone())).unwrap().await.unwrap();

    nav.push("/a").unwrap().await.unwrap();
    nav.back();
    host.run_pending().await;

    assert_eq!(
        *pops.lock(),
        vec![("/a".to_string(), false), ("/".to_string(), true)]
    );
}

#[tokio::test]
async fn test_aborted_pop_restores_url() {
    let log = RecordingGuard::log();
    let editor = mounted(
        RouteRecord::builder("/editor")
            .component(
                Component::builder()
                    .before_route_leave(RecordingGuard::new("leave", &log).then(|| GuardOutcome::Abort))
                    .build(),
            )
            .build(),
    );
    let (nav, backend) = navigator(basic_matcher().route("/editor", editor));
    let host = QueueHost::new();
    nav.init(Arc::new(host.clone())).unwrap().await.unwrap();
    nav.push("/editor").unwrap().await.unwrap();

    nav.back();
    assert_eq!(backend.current_location(), "/");
    host.run_pending().await;

    assert_eq!(*log.lock(), vec!["leave"]);
    assert_eq!(nav.current().path(), "/editor");
    assert_eq!(backend.current_location(), "/editor");
}

#[tokio::test]
async fn test_first_pop_to_start_location_is_ignored() {
    let (nav, backend) = navigator(basic_matcher().route("/x", plain("/x")));
    let host = QueueHost::new();
    let initial = nav.init(Arc::new(host.clone())).unwrap();
    nav.setup_listeners();

    backend.push("/x");
    backend.go(-1);
    assert_eq!(host.queued(), 0);

    backend.go(1);
    assert_eq!(host.queued(), 1);
    host.run_pending().await;
    assert_eq!(nav.current().path(), "/x");

    let err = initial.await.unwrap_err();
    assert!(err.is_failure(FailureKind::Cancelled));
}

#[tokio::test]
async fn test_teardown_resets_and_unsubscribes() {
    let (nav, backend) = navigator(basic_matcher());
    let host = QueueHost::new();
    nav.init(Arc::new(host.clone())).unwrap().await.unwrap();
    nav.push("/a").unwrap().await.unwrap();

    nav.teardown();
    assert!(nav.current().is_start());
    assert!(nav.pending().is_none());

    backend.go(-1);
    assert_eq!(host.queued(), 0);

    // Listening can be set up again.
    nav.setup_listeners();
    backend.go(1);
    assert_eq!(host.queued(), 1);
}
