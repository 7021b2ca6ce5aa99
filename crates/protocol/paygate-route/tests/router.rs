//! Terminal router behaviour against a call-counting gateway.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use paygate_gateway::GatewayError;
use paygate_route::{
    FileRouteCache, MemoryRouteCache, RouteCache, RouteError, TerminalRouter,
};
use paygate_test_utils::{relayed_route, test_route, ManualClock, MockGateway};

const HOUR: Duration = Duration::from_secs(3600);

fn setup(gateway: &MockGateway) -> (TerminalRouter, Arc<MemoryRouteCache>, ManualClock) {
    let clock = ManualClock::new();
    let cache = Arc::new(MemoryRouteCache::with_clock(Arc::new(clock.clone())));
    let router = TerminalRouter::new(Arc::new(gateway.clone()), cache.clone());
    (router, cache, clock)
}

#[tokio::test]
async fn cache_hit_avoids_network() {
    let gateway = MockGateway::new();
    let (router, cache, _) = setup(&gateway);

    cache.put("T1", test_route("T1", "10.0.0.2"), HOUR).unwrap();

    let route = router.resolve_route("T1").await.unwrap();
    assert_eq!(route.ip_address, "10.0.0.2");
    assert_eq!(gateway.call_count(), 0);
}

#[tokio::test]
async fn miss_fetches_and_caches() {
    let gateway = MockGateway::new().with_route("T1", test_route("T1", "10.0.0.2"));
    let (router, cache, _) = setup(&gateway);

    let first = router.resolve_route("T1").await.unwrap();
    let second = router.resolve_route("T1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(gateway.route_lookups_for("T1"), 1);
    assert!(cache.get("T1").unwrap().is_some());

    // Route lookups always use the live gateway.
    assert!(!gateway.calls()[0].test);
}

#[tokio::test]
async fn cache_expiry_triggers_refetch() {
    let gateway = MockGateway::new().with_route("T1", test_route("T1", "10.0.0.2"));
    let (router, cache, clock) = setup(&gateway);
    let router = router.with_ttl(HOUR);

    router.resolve_route("T1").await.unwrap();

    clock.advance(HOUR - Duration::from_secs(1));
    assert!(cache.get("T1").unwrap().is_some());

    clock.advance(Duration::from_secs(1));
    assert!(cache.get("T1").unwrap().is_none());

    // Terminal moved while the entry was cached.
    gateway.set_route("T1", test_route("T1", "10.0.0.7"));
    let route = router.resolve_route("T1").await.unwrap();
    assert_eq!(route.ip_address, "10.0.0.7");
    assert_eq!(gateway.route_lookups_for("T1"), 2);
}

#[tokio::test]
async fn negative_results_are_not_cached() {
    let gateway = MockGateway::new().with_rejected_route("T1", "Unknown Terminal");
    let (router, cache, _) = setup(&gateway);

    let err = router.resolve_route("T1").await.unwrap_err();
    match err {
        RouteError::Gateway(GatewayError::Rejected { reason, .. }) => {
            assert_eq!(reason, "Unknown Terminal")
        }
        other => panic!("expected rejected lookup, got {:?}", other),
    }
    assert!(cache.get("T1").unwrap().is_none());

    // Terminal comes online; the next lookup goes back to the network.
    gateway.set_route("T1", test_route("T1", "10.0.0.2"));
    let route = router.resolve_route("T1").await.unwrap();
    assert_eq!(route.ip_address, "10.0.0.2");
    assert_eq!(gateway.route_lookups_for("T1"), 2);
}

#[tokio::test]
async fn network_failure_is_not_cached() {
    let gateway = MockGateway::new()
        .with_route("T1", test_route("T1", "10.0.0.2"))
        .with_failure(GatewayError::network("connection refused"));
    let (router, cache, _) = setup(&gateway);

    let err = router.resolve_route("T1").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(cache.get("T1").unwrap().is_none());

    gateway.set_failure(None);
    router.resolve_route("T1").await.unwrap();
}

#[tokio::test]
async fn expire_forces_rediscovery() {
    let gateway = MockGateway::new()
        .with_route("T1", test_route("T1", "10.0.0.2"))
        .with_route("T2", test_route("T2", "10.0.0.3"));
    let (router, _, _) = setup(&gateway);

    router.resolve_route("T1").await.unwrap();
    router.resolve_route("T2").await.unwrap();

    router.expire("T1").unwrap();
    router.resolve_route("T1").await.unwrap();
    router.resolve_route("T2").await.unwrap();
    assert_eq!(gateway.route_lookups_for("T1"), 2);
    assert_eq!(gateway.route_lookups_for("T2"), 1);

    router.expire_all().unwrap();
    router.resolve_route("T2").await.unwrap();
    assert_eq!(gateway.route_lookups_for("T2"), 2);
}

#[tokio::test]
async fn terminal_name_is_query_encoded() {
    let gateway = MockGateway::new().with_route("Bar & Grill #2", relayed_route("Bar & Grill #2"));
    let (router, _, _) = setup(&gateway);

    let route = router.resolve_route("Bar & Grill #2").await.unwrap();
    assert!(route.cloud_relay_enabled);
    assert!(route.transient_credentials.is_some());
    assert_eq!(
        gateway.calls()[0].path,
        "/terminal-route?terminal=Bar+%26+Grill+%232"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_misses_share_one_lookup() {
    let gateway = MockGateway::new()
        .with_route("T1", test_route("T1", "10.0.0.2"))
        .with_delay(Duration::from_millis(50));
    let (router, _, _) = setup(&gateway);
    let router = Arc::new(router);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let router = router.clone();
            tokio::spawn(async move { router.resolve_route("T1").await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().ip_address, "10.0.0.2");
    }
    assert_eq!(gateway.route_lookups_for("T1"), 1);
}

#[tokio::test]
async fn cancellation_aborts_lookup() {
    let gateway = MockGateway::new()
        .with_route("T1", test_route("T1", "10.0.0.2"))
        .with_delay(Duration::from_secs(30));
    let (router, cache, _) = setup(&gateway);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let err = router
        .resolve_route_cancellable("T1", &token)
        .await
        .unwrap_err();
    assert!(matches!(err, RouteError::Cancelled));
    assert!(cache.get("T1").unwrap().is_none());
}

#[tokio::test]
async fn file_cache_expiry_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("routes.json");
    let clock = ManualClock::new();

    let gateway = MockGateway::new().with_route("T1", test_route("T1", "10.0.0.2"));
    let cache = Arc::new(FileRouteCache::open_with_clock(&path, Arc::new(clock.clone())));
    let router = TerminalRouter::new(Arc::new(gateway.clone()), cache).with_ttl(HOUR);
    router.resolve_route("T1").await.unwrap();

    // A new process finds the route on disk.
    let reopened = FileRouteCache::open_with_clock(&path, Arc::new(clock.clone()));
    assert!(reopened.get("T1").unwrap().is_some());

    // Expired entries are dropped on load.
    clock.advance(HOUR);
    let stale = FileRouteCache::open_with_clock(&path, Arc::new(clock.clone()));
    assert!(stale.get("T1").unwrap().is_none());
}

#[tokio::test]
async fn unwritable_file_cache_does_not_serve_unsaved_route() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();

    let gateway = MockGateway::new().with_route("T1", test_route("T1", "10.0.0.2"));
    let cache = Arc::new(FileRouteCache::open(blocker.join("routes.json")));
    let router = TerminalRouter::new(Arc::new(gateway.clone()), cache.clone());

    let err = router.resolve_route("T1").await.unwrap_err();
    assert!(matches!(err, RouteError::Io(_)));
    assert!(cache.get("T1").unwrap().is_none());

    // Nothing was cached, so the next call goes back to the gateway.
    assert!(router.resolve_route("T1").await.is_err());
    assert_eq!(gateway.route_lookups_for("T1"), 2);
}
