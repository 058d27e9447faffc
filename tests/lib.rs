// Integration tests test your crate's public API. They only have access to items
// in your crate that are marked pub. See the Cargo Targets page of the Cargo Book
// for more information.
//
//   https://doc.rust-lang.org/cargo/reference/cargo-targets.html#integration-tests
//

use queue_kpi_simulator::*;

// Include scenario and report modules
mod discipline_scenario_tests;

#[test]
fn test_core_id_types() {
    let id = EntityId::new();
    assert_ne!(id, EntityId::new());
    assert!(id.to_string().starts_with("ENT_"));

    let json = serde_json::to_string(&id).unwrap();
    let parsed: EntityId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn test_root_reexports_cover_a_full_run() {
    let config = ModelConfig {
        discipline: DisciplineKind::FiniteCapacity,
        capacity: 1,
        queue_capacity: Some(2),
        ..Default::default()
    };
    let mut queue: Discipline<Customer> = Discipline::from_config(&config).unwrap();
    let customers: Vec<Customer> = (0..4).map(|i| Customer::new(format!("c{}", i))).collect();

    let results: Vec<RequestResult> =
        customers.iter().map(|c| queue.request(c.clone(), 1.0).unwrap()).collect();
    assert_eq!(
        results,
        vec![
            RequestResult::ServedImmediately,
            RequestResult::Queued,
            RequestResult::Queued,
            RequestResult::RejectedQueueFull,
        ]
    );
    assert_eq!(customers[3].state(), EntityState::Idle);

    let report: KpiReport = queue.get_final_kpis(2.0);
    let snapshot: &KpiSnapshot = report.snapshot().unwrap();
    assert_eq!(snapshot.arrivals_and_throughput.rejection.map(|r| r.total_rejections), Some(1));
    assert_eq!(snapshot.simulation_summary.total_duration, 2.0);
}

#[test]
fn test_default_confidence_level_is_95_percent() {
    let summary = ObservationSummary::from_samples(&[1.0, 3.0], ModelConfig::default().confidence_level);
    assert_eq!(summary.confidence_level, 0.95);
    assert!(summary.confidence_interval.0 < summary.mean);
}
