use wf_adapters::fake::{docked_state, FakeShipPort};
use wf_core::{Container, ContainerKind, FakeClock, MaxIterations, PlayerId, ShipSymbol};
use wf_storage::WalStore;
use yare::parameterized;

use super::*;

fn harness(
    config: HealthMonitorConfig,
) -> (Arc<WalStore>, Arc<AssignmentManager>, Arc<Registry<FakeClock>>, Arc<LogSink>, Arc<FakeShipPort>, HealthMonitor<FakeClock>, tempfile::TempDir)
{
    let dir = tempfile::tempdir().expect("tmpdir");
    let store = Arc::new(
        WalStore::open(dir.path().join("wal.log"), dir.path().join("snapshot.json"))
            .expect("open store"),
    );
    let assignments = Arc::new(AssignmentManager::new(store.clone()));
    let logs = Arc::new(LogSink::new(store.clone(), crate::log_sink::DEFAULT_DEDUP_WINDOW_MS));
    let registry = Arc::new(Registry::new(store.clone(), assignments.clone(), logs.clone(), FakeClock::new()));
    let ship_port = Arc::new(FakeShipPort::default());
    let monitor = HealthMonitor::new(
        store.clone(),
        assignments.clone(),
        registry.clone(),
        ship_port.clone(),
        logs.clone(),
        config,
    );
    (store, assignments, registry, logs, ship_port, monitor, dir)
}

#[parameterized(
    well_within_rate = { 5, 1_000, false, false },
    exactly_at_watermark_with_progress = { 10_001, 1_000_000, true, false },
    past_watermark_without_progress = { 10_001, 1_000_000, false, true },
    above_absolute_rate = { 1_000, 1_000, true, true },
)]
fn is_suspicious_matches_rate_and_watermark_rules(
    iteration: u64,
    elapsed_ms: u64,
    has_progress_marker: bool,
    expect_suspicious: bool,
) {
    assert_eq!(is_suspicious(iteration, elapsed_ms, has_progress_marker), expect_suspicious);
}

#[tokio::test]
async fn tick_skips_when_called_before_the_check_interval_elapses() {
    let (_store, _assignments, _registry, _logs, _ship_port, monitor, _dir) =
        harness(HealthMonitorConfig { check_interval_ms: 1_000, ..Default::default() });

    let (first, _) = monitor.tick(0).await;
    assert_eq!(first, TickOutcome::Ran);
    let (second, _) = monitor.tick(500).await;
    assert_eq!(second, TickOutcome::Skipped);
    let (third, _) = monitor.tick(1_500).await;
    assert_eq!(third, TickOutcome::Ran);
}

#[tokio::test]
async fn orphan_cleanup_releases_assignments_with_no_matching_container() {
    let (_store, assignments, _registry, _logs, _ship_port, monitor, _dir) =
        harness(HealthMonitorConfig::default());
    let ship = ShipSymbol::from("SHIP-A");
    assignments
        .assign(ship.clone(), PlayerId::from("p1"), ContainerId::new(), "navigate", 0)
        .await
        .unwrap();

    let (_outcome, report) = monitor.tick(0).await;
    assert_eq!(report.orphans_released, 1);
    assert!(!assignments.find(&ship).await.unwrap().unwrap().active);
}

#[tokio::test]
async fn stuck_ship_with_successful_recovery_clears_the_watch_list() {
    let (store, assignments, _registry, _logs, ship_port, monitor, _dir) =
        harness(HealthMonitorConfig { recovery_timeout_ms: 1_000, ..Default::default() });

    let ship = ShipSymbol::from("SHIP-A");
    let player = PlayerId::from("p1");
    let mut container =
        Container::new(ContainerKind::Navigate, player.clone(), Default::default(), MaxIterations::Infinite, 0, 0);
    container.start(0).unwrap();
    let container_id = container.id;
    store.add(Ctx::default(), &container, "navigate").await.unwrap();
    assignments.assign(ship.clone(), player, container_id, "navigate", 0).await.unwrap();
    *ship_port.states.lock() = vec![docked_state(&ship, 0)];
    ship_port.set_recovery_should_succeed(true);

    let (_outcome, report) = monitor.tick(5_000).await;
    assert_eq!(report.stuck_ships, vec![ship.clone()]);
    assert_eq!(report.recovered, vec![ship]);
    assert_eq!(monitor.metrics().successful_recoveries, 1);
}

#[tokio::test]
async fn repeated_failed_recovery_abandons_the_ship_and_releases_it() {
    let (store, assignments, _registry, _logs, ship_port, monitor, _dir) = harness(
        HealthMonitorConfig { check_interval_ms: 0, recovery_timeout_ms: 1_000, max_recovery_attempts: 2 },
    );

    let ship = ShipSymbol::from("SHIP-A");
    let player = PlayerId::from("p1");
    let mut container =
        Container::new(ContainerKind::Navigate, player.clone(), Default::default(), MaxIterations::Infinite, 0, 0);
    container.start(0).unwrap();
    let container_id = container.id;
    store.add(Ctx::default(), &container, "navigate").await.unwrap();
    assignments.assign(ship.clone(), player, container_id, "navigate", 0).await.unwrap();
    *ship_port.states.lock() = vec![docked_state(&ship, 0)];
    ship_port.set_recovery_should_succeed(false);

    let (_, first_report) = monitor.tick(5_000).await;
    assert!(first_report.abandoned.is_empty(), "first failure alone should not abandon yet");

    let (_outcome, second_report) = monitor.tick(10_000).await;
    assert_eq!(second_report.abandoned, vec![ship.clone()]);
    assert_eq!(monitor.metrics().abandoned_ships, 1);
    assert!(!assignments.find(&ship).await.unwrap().unwrap().active);
}
