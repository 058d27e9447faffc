//! FIFO discipline with a bounded waiting line
//!
//! When every server is busy and the line already holds `queue_capacity`
//! entities, an arrival balks: it is counted as an arrival and a rejection
//! and leaves without any change to the entity or to the queue.

use tracing::instrument;

use super::{FifoQueue, QueueDiscipline};
use crate::entity::Entity;
use crate::measure::{KpiReport, Measure, RejectionKpis};
use crate::queue_event;
use crate::simulation::{QueueError, QueueResult};
use crate::types::{EntityId, RequestResult};

/// Multi-server FIFO queue that rejects arrivals once its line is full
#[derive(Debug, Clone)]
pub struct FiniteCapacityQueue<E> {
    inner: FifoQueue<E>,
    queue_capacity: usize,
    total_rejections: u64,
}

impl<E: Entity> FiniteCapacityQueue<E> {
    /// Create a queue with `capacity` servers and room for `queue_capacity` waiting
    pub fn new(capacity: usize, queue_capacity: usize, start_time: f64) -> QueueResult<Self> {
        Ok(Self { inner: FifoQueue::new(capacity, start_time)?, queue_capacity, total_rejections: 0 })
    }

    /// Create a queue from signed sizes, as read from loosely typed input
    pub fn from_signed(capacity: i64, queue_capacity: i64, start_time: f64) -> QueueResult<Self> {
        let capacity = usize::try_from(capacity)
            .ok()
            .filter(|&c| c > 0)
            .ok_or(QueueError::InvalidCapacity(capacity))?;
        let bound = usize::try_from(queue_capacity)
            .map_err(|_| QueueError::InvalidQueueCapacity(queue_capacity))?;
        Self::new(capacity, bound, start_time)
    }

    /// Summarize observations at `level` instead of 95%
    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.inner = self.inner.with_confidence_level(level);
        self
    }

    /// Maximum number of waiting entities
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Number of arrivals turned away so far
    pub fn total_rejections(&self) -> u64 {
        self.total_rejections
    }
}

impl<E: Entity> QueueDiscipline<E> for FiniteCapacityQueue<E> {
    #[instrument(level = "trace", skip(self, entity), fields(entity = %entity.id()))]
    fn request(&mut self, entity: E, time: f64) -> QueueResult<RequestResult> {
        if self.inner.has_free_server() || self.inner.queue_len() < self.queue_capacity {
            return self.inner.request(entity, time);
        }

        self.inner.log_balk(time);
        self.total_rejections += 1;
        queue_event!(
            debug,
            "Entity rejected, queue full",
            time = time,
            rejections = self.total_rejections
        );
        Ok(RequestResult::RejectedQueueFull)
    }

    fn release(&mut self, entity: &E, time: f64) -> QueueResult<Option<E>> {
        self.inner.release(entity, time)
    }

    fn get_final_kpis(&self, end_time: f64) -> KpiReport {
        let mut report = self.inner.get_final_kpis(end_time);
        if let Some(snapshot) = report.snapshot_mut() {
            snapshot.arrivals_and_throughput.rejection = Some(RejectionKpis::new(
                self.total_rejections,
                self.inner.measure().total_arrivals(),
            ));
        }
        report
    }

    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn busy_servers(&self) -> usize {
        self.inner.busy_servers()
    }

    fn queue_len(&self) -> usize {
        self.inner.queue_len()
    }

    fn is_in_service(&self, id: EntityId) -> bool {
        self.inner.is_in_service(id)
    }

    fn is_waiting(&self, id: EntityId) -> bool {
        self.inner.is_waiting(id)
    }

    fn measure(&self) -> &Measure {
        self.inner.measure()
    }
}
