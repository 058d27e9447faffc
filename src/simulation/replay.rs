//! Trace replay driver
//!
//! The queue disciplines are purely reactive: something else has to decide
//! when arrivals and service completions happen. [`TraceReplay`] plays that
//! role for a pre-recorded trace of arrival times and service durations. No
//! random variates are generated here.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::discipline::{Discipline, QueueDiscipline};
use crate::entity::{Customer, Entity};
use crate::measure::KpiReport;
use crate::perf_span;
use crate::simulation::{QueueError, QueueResult};
use crate::transient::{estimate_warmup, WarmupEstimate};
use crate::types::{ConfigFile, DisciplineKind, EntityId, ModelConfig, RequestResult};

/// One arrival of the trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrivalRecord {
    /// Time the entity arrives
    pub arrival_time: f64,
    /// Time the entity holds a server once admitted
    pub service_time: f64,
    /// Priority class (required by the priority discipline)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    /// Optional label used in logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ArrivalRecord {
    /// Create a record without priority or label
    pub fn new(arrival_time: f64, service_time: f64) -> Self {
        Self { arrival_time, service_time, priority: None, label: None }
    }

    /// Attach a priority class
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Scenario file: an optional model configuration and the arrival trace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// Partial configuration, merged over the defaults
    #[serde(default)]
    pub config: ConfigFile,
    /// Arrivals in any order
    pub arrivals: Vec<ArrivalRecord>,
}

impl Scenario {
    /// Load a scenario from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> QueueResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a scenario from a JSON string
    pub fn from_json(content: &str) -> QueueResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Embedded configuration merged over the defaults
    pub fn base_config(&self) -> ModelConfig {
        ModelConfig::from_config_file(self.config.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    // Declared first so completions at time t free servers before arrivals at t
    Departure,
    Arrival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct ScheduledEvent {
    time: OrderedFloat<f64>,
    kind: EventKind,
    sequence: u64,
    index: usize,
}

/// Result of replaying a trace
#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutcome {
    /// Wall-clock time the replay finished
    pub generated_at: DateTime<Utc>,
    /// Discipline the trace was replayed through
    pub discipline: DisciplineKind,
    /// Time the KPIs were reduced at
    pub end_time: f64,
    /// Number of arrival and departure events processed
    pub events_processed: u64,
    /// Arrivals turned away by a full waiting line
    pub rejected: u64,
    /// Final KPI report
    pub kpis: KpiReport,
    /// Warm-up estimate over the recorded wait times
    pub warmup: WarmupEstimate,
}

impl ReplayOutcome {
    /// Pretty-printed JSON form
    pub fn to_json_pretty(&self) -> QueueResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Drives a discipline through a recorded arrival trace
#[derive(Debug, Clone)]
pub struct TraceReplay {
    config: ModelConfig,
}

impl TraceReplay {
    /// Create a driver for a validated configuration
    pub fn new(config: ModelConfig) -> QueueResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the driver builds disciplines from
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    fn check_trace(&self, arrivals: &[ArrivalRecord]) -> QueueResult<()> {
        for (index, record) in arrivals.iter().enumerate() {
            if !record.arrival_time.is_finite() || !record.service_time.is_finite() {
                return Err(QueueError::invalid_trace(index, "times must be finite"));
            }
            if record.arrival_time < self.config.start_time {
                return Err(QueueError::invalid_trace(
                    index,
                    format!(
                        "arrival at {} precedes start time {}",
                        record.arrival_time, self.config.start_time
                    ),
                ));
            }
            if record.service_time < 0.0 {
                return Err(QueueError::invalid_trace(index, "service time must be non-negative"));
            }
            if record.priority.is_some_and(|priority| !priority.is_finite()) {
                return Err(QueueError::invalid_trace(index, "priority must be finite"));
            }
        }
        Ok(())
    }

    /// Replay `arrivals` and reduce the KPIs
    ///
    /// Events after the configured end time are not processed. Without an
    /// end time, the KPIs are reduced at the last processed event.
    #[instrument(skip(self, arrivals), fields(discipline = %self.config.discipline, arrivals = arrivals.len()))]
    pub fn run(&self, arrivals: &[ArrivalRecord]) -> QueueResult<ReplayOutcome> {
        self.check_trace(arrivals)?;
        let span = perf_span!("trace_replay", arrivals = arrivals.len());
        let _entered = span.enter();

        let mut discipline: Discipline<Customer> = Discipline::from_config(&self.config)?;

        let customers: Vec<Customer> = arrivals
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let label = record.label.clone().unwrap_or_else(|| format!("arrival-{}", index));
                match record.priority {
                    Some(priority) => Customer::with_priority(label, priority),
                    None => Customer::new(label),
                }
            })
            .collect();
        let positions: HashMap<EntityId, usize> =
            customers.iter().enumerate().map(|(index, customer)| (customer.id(), index)).collect();

        let mut sequence = 0u64;
        let mut events = BinaryHeap::new();
        let mut schedule = |events: &mut BinaryHeap<Reverse<ScheduledEvent>>,
                            time: f64,
                            kind: EventKind,
                            index: usize| {
            events.push(Reverse(ScheduledEvent { time: OrderedFloat(time), kind, sequence, index }));
            sequence += 1;
        };

        for (index, record) in arrivals.iter().enumerate() {
            schedule(&mut events, record.arrival_time, EventKind::Arrival, index);
        }

        let mut last_event_time = self.config.start_time;
        let mut events_processed = 0u64;
        let mut rejected = 0u64;

        while let Some(Reverse(event)) = events.pop() {
            let time = event.time.into_inner();
            if self.config.end_time.is_some_and(|end| time > end) {
                debug!(time, pending = events.len() + 1, "Stopping at end time");
                break;
            }
            last_event_time = time;
            events_processed += 1;

            let customer = &customers[event.index];
            match event.kind {
                EventKind::Arrival => match discipline.request(customer.clone(), time)? {
                    RequestResult::ServedImmediately => {
                        let done = time + arrivals[event.index].service_time;
                        schedule(&mut events, done, EventKind::Departure, event.index);
                    }
                    RequestResult::Queued => {}
                    RequestResult::RejectedQueueFull => rejected += 1,
                },
                EventKind::Departure => {
                    if let Some(next) = discipline.release(customer, time)? {
                        let next_index = positions
                            .get(&next.id())
                            .copied()
                            .ok_or_else(|| QueueError::invalid_release(next.id()))?;
                        let done = time + arrivals[next_index].service_time;
                        schedule(&mut events, done, EventKind::Departure, next_index);
                    }
                }
            }
        }

        let end_time = self.config.end_time.unwrap_or(last_event_time);
        let kpis = discipline.get_final_kpis(end_time);
        let warmup = estimate_warmup(discipline.measure().wait_times(), &self.config.transient)?;

        info!(
            events_processed,
            rejected,
            end_time,
            in_service = discipline.busy_servers(),
            waiting = discipline.queue_len(),
            "Trace replay finished"
        );

        Ok(ReplayOutcome {
            generated_at: Utc::now(),
            discipline: discipline.kind(),
            end_time,
            events_processed,
            rejected,
            kpis,
            warmup,
        })
    }
}
