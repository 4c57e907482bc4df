use integration_tests::harness::{TestFleet, route, start_upstream};
use std::time::{Duration, Instant};
use waypost_core::probe::annotate_health;

#[test]
fn listing_with_probe_marks_reachable_backends() {
    // Arrange
    let fleet = TestFleet::new();
    let port = start_upstream();
    let backend = format!("http://127.0.0.1:{port}");
    fleet
        .manager
        .add(&route("upstream", "upstream.example.com", &backend))
        .unwrap();
    // TEST-NET-1; connects run into the timeout.
    fleet
        .manager
        .add(&route("down", "down.example.com", "http://192.0.2.1:81"))
        .unwrap();
    let mut routes = fleet.manager.list_descriptions().unwrap();

    // Act
    let started = Instant::now();
    annotate_health(&mut routes, Duration::from_millis(300));
    let elapsed = started.elapsed();

    // Assert
    let health: Vec<(String, bool)> = routes
        .iter()
        .map(|r| (r.name.clone(), r.backend.healthy))
        .collect();
    assert_eq!(
        health,
        vec![("down".to_string(), false), ("upstream".to_string(), true)]
    );
    assert!(elapsed < Duration::from_secs(2), "probing took {elapsed:?}");
}
