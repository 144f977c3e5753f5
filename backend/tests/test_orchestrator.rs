//! Orchestrator Integration Tests
//!
//! Full runs through the scheduler: hand-over between waiting entities,
//! drop-outs, skips, partial runs and fatal errors.

use queueing_simulator_core_rs::{
    EntityId, Event, EventError, MonitorSample, Orchestrator, Resource, SimulationError,
    SimulationState,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn visit(resource: &str, amount: f64, service: f64) -> Vec<Event> {
    vec![
        Event::seize(resource, amount),
        Event::timeout(service),
        Event::release(resource, amount),
    ]
}

fn orchestrator(resources: Vec<Resource>) -> Orchestrator {
    Orchestrator::new(SimulationState::new(resources))
}

fn end_times(orch: &Orchestrator) -> Vec<Option<f64>> {
    orch.arrivals().iter().map(|a| a.end_time).collect()
}

fn sample(time: f64, level: f64) -> MonitorSample {
    MonitorSample { time, level }
}

fn max_level(samples: &[MonitorSample]) -> f64 {
    samples.iter().map(|s| s.level).fold(0.0, f64::max)
}

// ============================================================================
// Single server
// ============================================================================

#[test]
fn test_single_server_serves_in_arrival_order() {
    let mut orch = orchestrator(vec![Resource::new("desk", 1.0, -1)]);
    let steps = visit("desk", 1.0, 3.0);
    for (i, arrival) in [0.0, 1.0, 2.0].iter().enumerate() {
        orch.spawn(format!("c{}", i), &steps, *arrival).unwrap();
    }

    let summary = orch.run(f64::INFINITY).unwrap();

    assert_eq!(summary.departures, 3);
    assert_eq!(summary.dropouts, 0);
    assert_eq!(summary.end_time, 9.0);
    assert_eq!(end_times(&orch), vec![Some(3.0), Some(6.0), Some(9.0)]);

    let desk = orch.state().get_resource("desk").unwrap();
    assert!(max_level(desk.server_monitor().samples()) <= 1.0, "capacity oversold");
    assert_eq!(max_level(desk.queue_monitor().samples()), 2.0);
    assert_eq!(desk.server_count(), 0.0);
    assert_eq!(desk.queue_count(), 0.0);
    assert_eq!(desk.last_release(), 9.0);
}

#[test]
fn test_entity_activity_monitor_tracks_timeouts() {
    let mut orch = orchestrator(vec![Resource::new("desk", 1.0, -1)]);
    let steps = visit("desk", 1.0, 3.0);
    orch.spawn("c0", &steps, 0.0).unwrap();
    orch.spawn("c1", &steps, 1.0).unwrap();

    orch.run(f64::INFINITY).unwrap();

    let arrivals = orch.arrivals();
    assert_eq!(
        arrivals[1].activity,
        vec![
            sample(3.0, 1.0),
            sample(6.0, 0.0),
        ]
    );
    assert!(arrivals.iter().all(|a| a.finished));
}

// ============================================================================
// Fairness
// ============================================================================

#[test]
fn test_queued_request_takes_free_capacity_at_once() {
    let mut orch = orchestrator(vec![Resource::new("pool", 2.0, -1)]);
    orch.spawn("a", &visit("pool", 1.0, 10.0), 0.0).unwrap();
    orch.spawn("b", &visit("pool", 2.0, 1.0), 1.0).unwrap();
    orch.spawn("c", &visit("pool", 1.0, 1.0), 2.0).unwrap();

    orch.run(2.0).unwrap();
    // c queued behind b, then fit into the free unit at the same instant
    assert_eq!(orch.waiting_on("pool"), vec![EntityId(1)]);
    let pool = orch.state().get_resource("pool").unwrap();
    assert_eq!(pool.server_count(), 2.0);
    assert_eq!(pool.queue_count(), 2.0, "only b is still queued");

    orch.run(f64::INFINITY).unwrap();
    assert_eq!(end_times(&orch), vec![Some(10.0), Some(11.0), Some(3.0)]);

    let pool = orch.state().get_resource("pool").unwrap();
    assert_eq!(
        pool.server_monitor().samples(),
        &[
            sample(0.0, 1.0),
            sample(2.0, 2.0),
            sample(3.0, 1.0),
            sample(10.0, 0.0),
            sample(10.0, 2.0),
            sample(11.0, 0.0),
        ]
    );
}

#[test]
fn test_large_waiting_request_is_served_when_it_fits() {
    let mut orch = orchestrator(vec![Resource::new("pool", 2.0, -1)]);
    orch.spawn("a", &visit("pool", 1.0, 5.0), 0.0).unwrap();
    orch.spawn("b", &visit("pool", 2.0, 5.0), 1.0).unwrap();
    orch.spawn("c", &visit("pool", 1.0, 5.0), 2.0).unwrap();

    orch.run(f64::INFINITY).unwrap();

    // c is served on joining the queue; b waits until both units are free
    assert_eq!(end_times(&orch), vec![Some(5.0), Some(12.0), Some(7.0)]);
    let pool = orch.state().get_resource("pool").unwrap();
    assert!(max_level(pool.server_monitor().samples()) <= 2.0, "capacity oversold");
}

// ============================================================================
// Drop-outs
// ============================================================================

#[test]
fn test_no_queue_entity_drops_out() {
    let mut orch = orchestrator(vec![Resource::new("booth", 1.0, 0)]);
    let steps = visit("booth", 1.0, 4.0);
    orch.spawn("first", &steps, 0.0).unwrap();
    orch.spawn("second", &steps, 0.0).unwrap();

    let summary = orch.run(f64::INFINITY).unwrap();

    assert_eq!(summary.departures, 1);
    assert_eq!(summary.dropouts, 1);

    let arrivals = orch.arrivals();
    assert!(arrivals[0].finished);
    assert_eq!(arrivals[0].end_time, Some(4.0));
    assert!(!arrivals[1].finished, "second entity left");
    assert_eq!(arrivals[1].end_time, Some(0.0));
    assert!(arrivals[1].activity.is_empty());

    let second = orch.state().get_entity(EntityId(1)).unwrap();
    assert!(second.leave());
    assert_eq!(second.pending_len(), 0, "remaining steps dropped");
}

#[test]
fn test_bounded_queue_overflow() {
    let mut orch = orchestrator(vec![Resource::new("line", 1.0, 1)]);
    let steps = visit("line", 1.0, 2.0);
    for i in 0..4 {
        orch.spawn(format!("p{}", i), &steps, 0.0).unwrap();
    }

    let summary = orch.run(f64::INFINITY).unwrap();

    // One served, one waits, two turned away
    assert_eq!(summary.departures, 2);
    assert_eq!(summary.dropouts, 2);
    assert_eq!(end_times(&orch), vec![Some(2.0), Some(4.0), Some(0.0), Some(0.0)]);
}

// ============================================================================
// Skip
// ============================================================================

#[test]
fn test_skip_step_bypasses_following_steps() {
    let mut orch = orchestrator(vec![]);
    orch.spawn(
        "skipper",
        &[Event::skip(1), Event::timeout(100.0), Event::timeout(2.0)],
        1.0,
    )
    .unwrap();

    orch.run(f64::INFINITY).unwrap();
    assert_eq!(end_times(&orch), vec![Some(3.0)]);
}

// ============================================================================
// Partial runs
// ============================================================================

#[test]
fn test_run_stops_at_horizon_and_resumes() {
    let mut orch = orchestrator(vec![Resource::new("desk", 1.0, -1)]);
    let steps = visit("desk", 1.0, 3.0);
    for (i, arrival) in [0.0, 1.0, 2.0].iter().enumerate() {
        orch.spawn(format!("c{}", i), &steps, *arrival).unwrap();
    }

    orch.run(4.0).unwrap();
    assert_eq!(orch.now(), 3.0);
    assert_eq!(end_times(&orch), vec![Some(3.0), None, None]);
    assert_eq!(orch.peek_next_time(), Some(6.0));

    let summary = orch.run(f64::INFINITY).unwrap();
    assert_eq!(summary.departures, 2);
    assert_eq!(end_times(&orch), vec![Some(3.0), Some(6.0), Some(9.0)]);
}

#[test]
fn test_empty_trajectory_departs_on_arrival() {
    let mut orch = orchestrator(vec![]);
    orch.spawn("ghost", &[], 2.5).unwrap();

    orch.run(f64::INFINITY).unwrap();
    assert_eq!(end_times(&orch), vec![Some(2.5)]);
}

// ============================================================================
// Fatal errors
// ============================================================================

#[test]
fn test_unbalanced_release_aborts_run() {
    let mut orch = orchestrator(vec![Resource::new("desk", 1.0, -1)]);
    orch.spawn("bad", &[Event::release("desk", 1.0)], 0.0).unwrap();

    let err = orch.run(f64::INFINITY).unwrap_err();

    match err {
        SimulationError::Event(EventError::ReleaseExceedsUsage {
            resource, entity, ..
        }) => {
            assert_eq!(resource, "desk");
            assert_eq!(entity, "bad");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unknown_resource_aborts_run() {
    let mut orch = orchestrator(vec![]);
    orch.spawn("lost", &[Event::seize("nowhere", 1.0)], 0.0).unwrap();

    assert!(matches!(
        orch.run(f64::INFINITY),
        Err(SimulationError::Event(EventError::ResourceNotFound(_)))
    ));
}

// ============================================================================
// Report
// ============================================================================

#[test]
fn test_report_lists_resources_sorted() {
    let mut orch = orchestrator(vec![
        Resource::new("zeta", 1.0, -1),
        Resource::new("alpha", 1.0, -1),
    ]);
    orch.spawn("c", &visit("zeta", 1.0, 1.0), 0.0).unwrap();
    orch.run(f64::INFINITY).unwrap();

    let report = orch.report();
    let names: Vec<&str> = report.resources.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(report.config_hash, None);
    assert_eq!(report.end_time, 1.0);
    assert_eq!(report.resources[1].server.len(), 2);

    let json = report.to_json(false).unwrap();
    assert!(json.contains("\"arrivals\""));
}
