//! First-come, first-served discipline
//!
//! Waiting entities are served strictly in the order they joined the line.

use std::collections::VecDeque;

use tracing::instrument;

use super::{assign_state_best_effort, QueueDiscipline, ServerPool};
use crate::entity::Entity;
use crate::measure::{KpiReport, Measure};
use crate::queue_event;
use crate::simulation::QueueResult;
use crate::types::{defaults, EntityId, EntityState, RequestResult};

/// Multi-server queue with an unbounded FIFO waiting line
#[derive(Debug, Clone)]
pub struct FifoQueue<E> {
    servers: ServerPool<E>,
    waiting: VecDeque<(E, f64)>,
    measure: Measure,
    confidence_level: f64,
}

impl<E: Entity> FifoQueue<E> {
    /// Create a FIFO queue with `capacity` servers
    pub fn new(capacity: usize, start_time: f64) -> QueueResult<Self> {
        Ok(Self {
            servers: ServerPool::new(capacity)?,
            waiting: VecDeque::new(),
            measure: Measure::new(capacity, start_time),
            confidence_level: defaults::CONFIDENCE_LEVEL,
        })
    }

    /// Summarize observations at `level` instead of 95%
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    /// Whether a free server exists
    pub fn has_free_server(&self) -> bool {
        self.servers.has_free_server()
    }

    /// Record an arrival that never reaches the servers or the line
    pub(crate) fn log_balk(&mut self, time: f64) {
        self.measure.log_arrival(time);
    }

    fn start_service(&mut self, entity: E, arrival_time: f64, time: f64) {
        let wait_time = time - arrival_time;
        assign_state_best_effort(&entity, EntityState::InService);
        self.servers.admit(entity, arrival_time, time, None);
        self.measure.log_service_start(time, wait_time, self.waiting.len(), self.servers.busy());
    }
}

impl<E: Entity> QueueDiscipline<E> for FifoQueue<E> {
    #[instrument(level = "trace", skip(self, entity), fields(entity = %entity.id()))]
    fn request(&mut self, entity: E, time: f64) -> QueueResult<RequestResult> {
        self.measure.log_arrival(time);

        if self.servers.has_free_server() {
            self.start_service(entity, time, time);
            queue_event!(debug, "Entity served immediately", time = time, busy = self.servers.busy());
            return Ok(RequestResult::ServedImmediately);
        }

        assign_state_best_effort(&entity, EntityState::WaitingForResource);
        self.waiting.push_back((entity, time));
        self.measure.log_queue_entry(time, self.waiting.len());
        queue_event!(debug, "Entity queued", time = time, queue_length = self.waiting.len());
        Ok(RequestResult::Queued)
    }

    #[instrument(level = "trace", skip(self, entity), fields(entity = %entity.id()))]
    fn release(&mut self, entity: &E, time: f64) -> QueueResult<Option<E>> {
        let record = self.servers.vacate(entity.id())?;
        assign_state_best_effort(&record.entity, EntityState::Idle);
        self.measure.log_service_end(
            time,
            time - record.service_start_time,
            time - record.arrival_time,
            self.servers.busy(),
        );

        let Some((next, enqueue_time)) = self.waiting.pop_front() else {
            return Ok(None);
        };
        self.start_service(next.clone(), enqueue_time, time);
        queue_event!(debug, "Next entity admitted from queue", time = time, wait = time - enqueue_time);
        Ok(Some(next))
    }

    fn get_final_kpis(&self, end_time: f64) -> KpiReport {
        self.measure.get_final_kpis_at(end_time, self.confidence_level)
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
        self.waiting.iter().any(|(entity, _)| entity.id() == id)
    }

    fn measure(&self) -> &Measure {
        &self.measure
    }
}
