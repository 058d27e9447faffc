//! Non-preemptive priority discipline
//!
//! The waiting line is ordered by priority value (lower first), then by
//! enqueue time, then by insertion order. Every observation is recorded twice:
//! once in the aggregate measure and once in the measure of the entity's
//! priority class. Both receive the aggregate queue length and busy-server
//! count.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ordered_float::OrderedFloat;
use tracing::instrument;

use super::{assign_state_best_effort, QueueDiscipline, ServerPool};
use crate::entity::Entity;
use crate::measure::{KpiReport, Measure};
use crate::queue_event;
use crate::simulation::{QueueError, QueueResult};
use crate::types::{defaults, EntityId, EntityState, RequestResult};

#[derive(Debug, Clone)]
struct WaitingEntry<E> {
    priority: OrderedFloat<f64>,
    enqueue_time: OrderedFloat<f64>,
    sequence: u64,
    entity: E,
}

impl<E> WaitingEntry<E> {
    fn key(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>, u64) {
        (self.priority, self.enqueue_time, self.sequence)
    }
}

impl<E> PartialEq for WaitingEntry<E> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<E> Eq for WaitingEntry<E> {}

impl<E> PartialOrd for WaitingEntry<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed so the max-heap pops the smallest key first
impl<E> Ord for WaitingEntry<E> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// Multi-server queue served in priority order
#[derive(Debug, Clone)]
pub struct PriorityQueue<E> {
    servers: ServerPool<E>,
    waiting: BinaryHeap<WaitingEntry<E>>,
    next_sequence: u64,
    start_time: f64,
    measure: Measure,
    priority_measures: BTreeMap<OrderedFloat<f64>, Measure>,
    confidence_level: f64,
}

impl<E: Entity> PriorityQueue<E> {
    /// Create a priority queue with `capacity` servers
    pub fn new(capacity: usize, start_time: f64) -> QueueResult<Self> {
        Ok(Self {
            servers: ServerPool::new(capacity)?,
            waiting: BinaryHeap::new(),
            next_sequence: 0,
            start_time,
            measure: Measure::new(capacity, start_time),
            priority_measures: BTreeMap::new(),
            confidence_level: defaults::CONFIDENCE_LEVEL,
        })
    }

    /// Summarize observations at `level` instead of 95%
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Measure of one priority class, if that class has been seen
    pub fn priority_measure(&self, priority: f64) -> Option<&Measure> {
        self.priority_measures.get(&OrderedFloat(priority))
    }

    /// Priority classes seen so far, ascending
    pub fn priorities(&self) -> impl Iterator<Item = f64> + '_ {
        self.priority_measures.keys().map(|priority| priority.into_inner())
    }

    fn class_measure(&mut self, priority: OrderedFloat<f64>) -> &mut Measure {
        let (capacity, start_time) = (self.servers.capacity(), self.start_time);
        self.priority_measures
            .entry(priority)
            .or_insert_with(|| Measure::new(capacity, start_time))
    }

    fn start_service(&mut self, entity: E, priority: OrderedFloat<f64>, arrival_time: f64, time: f64) {
        let wait_time = time - arrival_time;
        assign_state_best_effort(&entity, EntityState::InService);
        self.servers.admit(entity, arrival_time, time, Some(priority.into_inner()));

        let (queue_length, busy) = (self.waiting.len(), self.servers.busy());
        self.measure.log_service_start(time, wait_time, queue_length, busy);
        self.class_measure(priority).log_service_start(time, wait_time, queue_length, busy);
    }
}

impl<E: Entity> QueueDiscipline<E> for PriorityQueue<E> {
    #[instrument(level = "trace", skip(self, entity), fields(entity = %entity.id()))]
    fn request(&mut self, entity: E, time: f64) -> QueueResult<RequestResult> {
        let priority = entity
            .priority()
            .map(OrderedFloat)
            .ok_or_else(|| QueueError::missing_priority(entity.id()))?;

        self.measure.log_arrival(time);
        self.class_measure(priority).log_arrival(time);

        if self.servers.has_free_server() {
            self.start_service(entity, priority, time, time);
            queue_event!(debug, "Entity served immediately", time = time, priority = priority.into_inner());
            return Ok(RequestResult::ServedImmediately);
        }

        assign_state_best_effort(&entity, EntityState::WaitingForResource);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.waiting.push(WaitingEntry {
            priority,
            enqueue_time: OrderedFloat(time),
            sequence,
            entity,
        });

        let queue_length = self.waiting.len();
        self.measure.log_queue_entry(time, queue_length);
        self.class_measure(priority).log_queue_entry(time, queue_length);
        queue_event!(
            debug,
            "Entity queued",
            time = time,
            priority = priority.into_inner(),
            queue_length = queue_length
        );
        Ok(RequestResult::Queued)
    }

    #[instrument(level = "trace", skip(self, entity), fields(entity = %entity.id()))]
    fn release(&mut self, entity: &E, time: f64) -> QueueResult<Option<E>> {
        let record = self.servers.vacate(entity.id())?;
        assign_state_best_effort(&record.entity, EntityState::Idle);

        let service_time = time - record.service_start_time;
        let system_time = time - record.arrival_time;
        let busy = self.servers.busy();
        self.measure.log_service_end(time, service_time, system_time, busy);
        if let Some(priority) = record.priority {
            self.class_measure(OrderedFloat(priority)).log_service_end(time, service_time, system_time, busy);
        }

        let Some(next) = self.waiting.pop() else {
            return Ok(None);
        };
        let enqueue_time = next.enqueue_time.into_inner();
        self.start_service(next.entity.clone(), next.priority, enqueue_time, time);
        queue_event!(
            debug,
            "Next entity admitted from queue",
            time = time,
            priority = next.priority.into_inner(),
            wait = time - enqueue_time
        );
        Ok(Some(next.entity))
    }

    fn get_final_kpis(&self, end_time: f64) -> KpiReport {
        let mut report = self.measure.get_final_kpis_at(end_time, self.confidence_level);
        if let Some(snapshot) = report.snapshot_mut() {
            let breakdown = self
                .priority_measures
                .iter()
                .map(|(&priority, measure)| {
                    (priority, measure.get_final_kpis_at(end_time, self.confidence_level))
                })
                .collect();
            snapshot.priority_breakdown = Some(breakdown);
        }
        report
    }

    fn capacity(&self) -> usize {
        self.servers.capacity()
    }

    fn busy_servers(&self) -> usize {
        self.servers.busy()
    }

    fn queue_len(&self) -> usize {
        self.waiting.len()
    }

    fn is_in_service(&self, id: EntityId) -> bool {
        self.servers.contains(id)
    }

    fn is_waiting(&self, id: EntityId) -> bool {
        self.waiting.iter().any(|entry| entry.entity.id() == id)
    }

    fn measure(&self) -> &Measure {
        &self.measure
    }
}
