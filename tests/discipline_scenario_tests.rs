//! Scenario tests for the queue disciplines
//!
//! Each test drives a discipline by hand through a short sequence of
//! arrivals and service completions and checks ordering, entity states and
//! the resulting KPIs.

use queue_kpi_simulator::discipline::*;
use queue_kpi_simulator::entity::{Customer, Entity};
use queue_kpi_simulator::simulation::QueueError;
use queue_kpi_simulator::types::{DisciplineKind, EntityState, ModelConfig, RequestResult};

/// Single-server FIFO hand-off from the first to the second customer
#[test]
fn test_fifo_single_server_hand_off() {
    let mut queue = FifoQueue::new(1, 0.0).unwrap();
    let e1 = Customer::new("e1");
    let e2 = Customer::new("e2");

    assert_eq!(queue.request(e1.clone(), 10.0).unwrap(), RequestResult::ServedImmediately);
    assert_eq!(e1.state(), EntityState::InService);

    assert_eq!(queue.request(e2.clone(), 11.0).unwrap(), RequestResult::Queued);
    assert_eq!(e2.state(), EntityState::WaitingForResource);

    let next = queue.release(&e1, 15.0).unwrap();
    assert_eq!(next, Some(e2.clone()));
    assert_eq!(e1.state(), EntityState::Idle);
    assert_eq!(e2.state(), EntityState::InService);

    assert_eq!(queue.measure().wait_times(), &[0.0, 4.0]);
    assert_eq!(queue.measure().service_times(), &[5.0]);
    assert_eq!(queue.measure().system_times(), &[5.0]);
}

/// Customers queued earlier are served earlier
#[test]
fn test_fifo_serves_in_arrival_order() {
    let mut queue = FifoQueue::new(1, 0.0).unwrap();
    let server = Customer::new("server");
    let waiting: Vec<Customer> = (0..4).map(|i| Customer::new(format!("w{}", i))).collect();

    queue.request(server.clone(), 0.0).unwrap();
    for (i, customer) in waiting.iter().enumerate() {
        assert_eq!(queue.request(customer.clone(), 1.0 + i as f64).unwrap(), RequestResult::Queued);
    }

    let mut current = server;
    let mut served = Vec::new();
    let mut time = 10.0;
    while let Some(next) = queue.release(&current, time).unwrap() {
        served.push(next.label().to_string());
        current = next;
        time += 1.0;
    }

    assert_eq!(served, vec!["w0", "w1", "w2", "w3"]);
    assert_eq!(queue.busy_servers(), 0);
    assert_eq!(queue.queue_len(), 0);
}

/// Lower priority values jump ahead, equal values stay FIFO
#[test]
fn test_priority_ordering() {
    let mut queue = PriorityQueue::new(1, 0.0).unwrap();
    let blocker = Customer::with_priority("blocker", 5.0);
    let low = Customer::with_priority("low", 3.0);
    let high_first = Customer::with_priority("high-first", 1.0);
    let high_second = Customer::with_priority("high-second", 1.0);

    queue.request(blocker.clone(), 0.0).unwrap();
    queue.request(low.clone(), 1.0).unwrap();
    queue.request(high_first.clone(), 2.0).unwrap();
    queue.request(high_second.clone(), 3.0).unwrap();

    let first = queue.release(&blocker, 4.0).unwrap().unwrap();
    assert_eq!(first, high_first);
    let second = queue.release(&first, 5.0).unwrap().unwrap();
    assert_eq!(second, high_second);
    let third = queue.release(&second, 6.0).unwrap().unwrap();
    assert_eq!(third, low);
    assert_eq!(queue.release(&third, 7.0).unwrap(), None);
}

/// Priority reports carry one nested report per class seen
#[test]
fn test_priority_breakdown_keys() {
    let mut queue = PriorityQueue::new(2, 0.0).unwrap();
    let a = Customer::with_priority("a", 2.0);
    let b = Customer::with_priority("b", 7.0);

    queue.request(a.clone(), 0.0).unwrap();
    queue.request(b.clone(), 1.0).unwrap();
    queue.release(&a, 3.0).unwrap();
    queue.release(&b, 4.0).unwrap();

    let json = queue.get_final_kpis(10.0).to_value().unwrap();
    let breakdown = json["priority_breakdown"].as_object().unwrap();
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown["2"]["arrivals_and_throughput"]["total_arrivals"], 1);
    assert_eq!(breakdown["7"]["service_time"]["mean"], 3.0);
}

/// Priority discipline refuses entities without a priority
#[test]
fn test_priority_requires_priority_attribute() {
    let mut queue = PriorityQueue::new(1, 0.0).unwrap();
    let plain = Customer::new("plain");

    let err = queue.request(plain.clone(), 0.0).unwrap_err();
    assert!(matches!(err, QueueError::MissingPriority { .. }));
    assert_eq!(plain.state(), EntityState::Idle);
    assert_eq!(queue.measure().total_arrivals(), 0);
}

/// Full finite-capacity system rejects without side effects
#[test]
fn test_finite_capacity_rejection_leaves_system_unchanged() {
    let mut queue = FiniteCapacityQueue::new(1, 1, 0.0).unwrap();
    let e1 = Customer::new("e1");
    let e2 = Customer::new("e2");
    let e3 = Customer::new("e3");

    queue.request(e1.clone(), 0.0).unwrap();
    queue.request(e2.clone(), 1.0).unwrap();
    let before = (queue.busy_servers(), queue.queue_len());

    assert_eq!(queue.request(e3.clone(), 2.0).unwrap(), RequestResult::RejectedQueueFull);
    assert_eq!((queue.busy_servers(), queue.queue_len()), before);
    assert_eq!(e3.state(), EntityState::Idle);
    assert!(queue.is_in_service(e1.id()));
    assert!(queue.is_waiting(e2.id()));
    assert_eq!(queue.total_rejections(), 1);

    let json = queue.get_final_kpis(4.0).to_value().unwrap();
    assert_eq!(json["arrivals_and_throughput"]["total_rejections"], 1);
    assert!((json["arrivals_and_throughput"]["probability_of_rejection"].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-12);
}

/// Releasing anything but a server occupant is a contract violation
#[test]
fn test_invalid_release_for_each_discipline() {
    let configs = [
        ModelConfig::default(),
        ModelConfig { discipline: DisciplineKind::Priority, ..Default::default() },
        ModelConfig {
            discipline: DisciplineKind::FiniteCapacity,
            queue_capacity: Some(3),
            ..Default::default()
        },
    ];

    for config in configs {
        let mut queue: Discipline<Customer> = Discipline::from_config(&config).unwrap();
        let stranger = Customer::with_priority("stranger", 1.0);
        let err = queue.release(&stranger, 1.0).unwrap_err();
        assert!(matches!(err, QueueError::InvalidRelease { .. }), "{}", config.discipline);
    }
}

/// Construction fails for a zero or negative size
#[test]
fn test_construction_validation() {
    assert!(matches!(FifoQueue::<Customer>::new(0, 0.0), Err(QueueError::InvalidCapacity(0))));
    assert!(matches!(PriorityQueue::<Customer>::new(0, 0.0), Err(QueueError::InvalidCapacity(0))));
    assert!(matches!(
        FiniteCapacityQueue::<Customer>::from_signed(2, -1, 0.0),
        Err(QueueError::InvalidQueueCapacity(-1))
    ));
    assert!(matches!(
        FiniteCapacityQueue::<Customer>::from_signed(-3, 1, 0.0),
        Err(QueueError::InvalidCapacity(-3))
    ));
}

/// Multi-server FIFO KPIs over a fixed schedule
#[test]
fn test_two_server_kpis() {
    let mut queue = FifoQueue::new(2, 0.0).unwrap();
    let a = Customer::new("a");
    let b = Customer::new("b");
    let c = Customer::new("c");

    queue.request(a.clone(), 0.0).unwrap();
    queue.request(b.clone(), 0.0).unwrap();
    queue.request(c.clone(), 2.0).unwrap();
    let next = queue.release(&a, 4.0).unwrap();
    assert_eq!(next, Some(c.clone()));
    queue.release(&b, 6.0).unwrap();
    queue.release(&c, 8.0).unwrap();

    let report = queue.get_final_kpis(10.0);
    let snapshot = report.snapshot().unwrap();

    assert_eq!(snapshot.arrivals_and_throughput.total_arrivals, 3);
    assert_eq!(snapshot.arrivals_and_throughput.total_waited, 1);
    assert!((snapshot.arrivals_and_throughput.probability_of_waiting - 1.0 / 3.0).abs() < 1e-12);
    assert!((snapshot.arrivals_and_throughput.throughput_rate - 0.3).abs() < 1e-12);
    // One waiting from 2 to 4
    assert!((snapshot.queue_length.time_weighted_average - 0.2).abs() < 1e-12);
    assert_eq!(snapshot.queue_length.max_observed, 1);
    // Busy: 2 on [0,6), 1 on [6,8), 0 on [8,10)
    assert!((snapshot.server_utilization.average_busy_servers - 1.4).abs() < 1e-12);
    assert!((snapshot.server_utilization.utilization - 0.7).abs() < 1e-12);
    assert_eq!(snapshot.wait_time.mean, 2.0 / 3.0);
}
