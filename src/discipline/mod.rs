//! Queue discipline state machines
//!
//! Every discipline owns a fixed pool of servers, a waiting structure and
//! the measure(s) its observations go to. The external driver calls
//! [`QueueDiscipline::request`] on arrivals and [`QueueDiscipline::release`]
//! on service completions, in non-decreasing time order.
//!
//! | Discipline | Waiting order | When all servers are busy |
//! |---|---|---|
//! | [`FifoQueue`] | insertion order | always enqueue |
//! | [`PriorityQueue`] | priority, then enqueue time | always enqueue |
//! | [`FiniteCapacityQueue`] | insertion order | enqueue while room, else reject |
//!
//! # Usage Example
//!
//! ```rust
//! use queue_kpi_simulator::discipline::*;
//! use queue_kpi_simulator::entity::Customer;
//! use queue_kpi_simulator::types::{EntityState, RequestResult};
//!
//! let mut queue = FifoQueue::new(1, 0.0)?;
//! let e1 = Customer::new("e1");
//! let e2 = Customer::new("e2");
//!
//! assert_eq!(queue.request(e1.clone(), 10.0)?, RequestResult::ServedImmediately);
//! assert_eq!(queue.request(e2.clone(), 11.0)?, RequestResult::Queued);
//! assert_eq!(queue.release(&e1, 15.0)?, Some(e2.clone()));
//! assert_eq!(e2.state(), EntityState::InService);
//! # Ok::<(), queue_kpi_simulator::simulation::QueueError>(())
//! ```

pub mod fifo;
pub mod finite_capacity;
pub mod priority;
pub mod server_pool;

pub use fifo::FifoQueue;
pub use finite_capacity::FiniteCapacityQueue;
pub use priority::PriorityQueue;
pub use server_pool::{ServerPool, ServiceRecord};

use tracing::{info, warn};

use crate::entity::Entity;
use crate::measure::{KpiReport, Measure};
use crate::simulation::{QueueError, QueueResult};
use crate::types::{DisciplineKind, EntityId, EntityState, ModelConfig, RequestResult};

/// Contract shared by all queue disciplines
pub trait QueueDiscipline<E: Entity> {
    /// Handle an arrival of `entity` at `time`
    fn request(&mut self, entity: E, time: f64) -> QueueResult<RequestResult>;

    /// Handle the service completion of `entity` at `time`
    ///
    /// Returns the entity admitted to the freed server, if any. Fails with
    /// [`QueueError::InvalidRelease`] when `entity` is not in service.
    fn release(&mut self, entity: &E, time: f64) -> QueueResult<Option<E>>;

    /// Reduce the recorded observations at `end_time`
    fn get_final_kpis(&self, end_time: f64) -> KpiReport;

    /// Number of parallel servers
    fn capacity(&self) -> usize;

    /// Number of occupied servers
    fn busy_servers(&self) -> usize;

    /// Number of waiting entities
    fn queue_len(&self) -> usize;

    /// Whether `id` occupies a server
    fn is_in_service(&self, id: EntityId) -> bool;

    /// Whether `id` sits in the waiting structure
    fn is_waiting(&self, id: EntityId) -> bool;

    /// Aggregate measure of this discipline
    fn measure(&self) -> &Measure;
}

/// Write `state` onto `entity`, logging instead of failing if it refuses
pub(crate) fn assign_state_best_effort<E: Entity>(entity: &E, state: EntityState) {
    if let Err(err) = entity.assign_state(state) {
        warn!(entity = %entity.id(), %state, error = %err, "Could not set entity state; continuing");
    }
}

/// Closed set of supported disciplines behind one interface
#[derive(Debug, Clone)]
pub enum Discipline<E> {
    /// First come, first served
    Fifo(FifoQueue<E>),
    /// Lowest priority value first
    Priority(PriorityQueue<E>),
    /// FIFO with a bounded waiting line
    FiniteCapacity(FiniteCapacityQueue<E>),
}

impl<E: Entity> Discipline<E> {
    /// Build the discipline described by a validated configuration
    pub fn from_config(config: &ModelConfig) -> QueueResult<Self> {
        config.validate()?;
        info!(
            discipline = %config.discipline,
            capacity = config.capacity,
            queue_capacity = ?config.queue_capacity,
            "Building queue discipline"
        );

        let level = config.confidence_level;
        let discipline = match config.discipline {
            DisciplineKind::Fifo => Discipline::Fifo(
                FifoQueue::new(config.capacity, config.start_time)?.with_confidence_level(level),
            ),
            DisciplineKind::Priority => Discipline::Priority(
                PriorityQueue::new(config.capacity, config.start_time)?
                    .with_confidence_level(level),
            ),
            DisciplineKind::FiniteCapacity => {
                let queue_capacity = config
                    .queue_capacity
                    .ok_or(QueueError::InvalidQueueCapacity(-1))?;
                Discipline::FiniteCapacity(
                    FiniteCapacityQueue::new(config.capacity, queue_capacity, config.start_time)?
                        .with_confidence_level(level),
                )
            }
        };
        Ok(discipline)
    }

    /// Which variant this is
    pub fn kind(&self) -> DisciplineKind {
        match self {
            Discipline::Fifo(_) => DisciplineKind::Fifo,
            Discipline::Priority(_) => DisciplineKind::Priority,
            Discipline::FiniteCapacity(_) => DisciplineKind::FiniteCapacity,
        }
    }

    fn as_dyn(&self) -> &dyn QueueDiscipline<E> {
        match self {
            Discipline::Fifo(queue) => queue,
            Discipline::Priority(queue) => queue,
            Discipline::FiniteCapacity(queue) => queue,
        }
    }

    fn as_dyn_mut(&mut self) -> &mut dyn QueueDiscipline<E> {
        match self {
            Discipline::Fifo(queue) => queue,
            Discipline::Priority(queue) => queue,
            Discipline::FiniteCapacity(queue) => queue,
        }
    }
}

impl<E: Entity> QueueDiscipline<E> for Discipline<E> {
    fn request(&mut self, entity: E, time: f64) -> QueueResult<RequestResult> {
        self.as_dyn_mut().request(entity, time)
    }

    fn release(&mut self, entity: &E, time: f64) -> QueueResult<Option<E>> {
        self.as_dyn_mut().release(entity, time)
    }

    fn get_final_kpis(&self, end_time: f64) -> KpiReport {
        self.as_dyn().get_final_kpis(end_time)
    }

    fn capacity(&self) -> usize {
        self.as_dyn().capacity()
    }

    fn busy_servers(&self) -> usize {
        self.as_dyn().busy_servers()
    }

    fn queue_len(&self) -> usize {
        self.as_dyn().queue_len()
    }

    fn is_in_service(&self, id: EntityId) -> bool {
        self.as_dyn().is_in_service(id)
    }

    fn is_waiting(&self, id: EntityId) -> bool {
        self.as_dyn().is_waiting(id)
    }

    fn measure(&self) -> &Measure {
        self.as_dyn().measure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Customer, EntityError};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Entity without a usable state slot
    #[derive(Clone)]
    struct ReadOnlyEntity {
        id: EntityId,
        refusals: Rc<Cell<usize>>,
    }

    impl Entity for ReadOnlyEntity {
        fn id(&self) -> EntityId {
            self.id
        }

        fn assign_state(&self, state: EntityState) -> Result<(), EntityError> {
            self.refusals.set(self.refusals.get() + 1);
            Err(EntityError::StateNotSettable {
                entity: self.id,
                state,
                reason: "read-only".to_string(),
            })
        }
    }

    #[test]
    fn test_from_config_builds_each_variant() {
        let fifo: Discipline<Customer> = Discipline::from_config(&ModelConfig::default()).unwrap();
        assert_eq!(fifo.kind(), DisciplineKind::Fifo);

        let config = ModelConfig { discipline: DisciplineKind::Priority, capacity: 3, ..Default::default() };
        let priority: Discipline<Customer> = Discipline::from_config(&config).unwrap();
        assert_eq!(priority.kind(), DisciplineKind::Priority);
        assert_eq!(priority.capacity(), 3);

        let config = ModelConfig {
            discipline: DisciplineKind::FiniteCapacity,
            queue_capacity: Some(2),
            ..Default::default()
        };
        let finite: Discipline<Customer> = Discipline::from_config(&config).unwrap();
        assert_eq!(finite.kind(), DisciplineKind::FiniteCapacity);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = ModelConfig { capacity: 0, ..Default::default() };
        let result: QueueResult<Discipline<Customer>> = Discipline::from_config(&config);
        assert!(matches!(result, Err(QueueError::Validation(_))));
    }

    #[test]
    fn test_state_assignment_failure_is_not_fatal() {
        let refusals = Rc::new(Cell::new(0));
        let e1 = ReadOnlyEntity { id: EntityId::new(), refusals: refusals.clone() };
        let e2 = ReadOnlyEntity { id: EntityId::new(), refusals: refusals.clone() };
        let mut queue = FifoQueue::new(1, 0.0).unwrap();

        assert_eq!(queue.request(e1.clone(), 0.0).unwrap(), RequestResult::ServedImmediately);
        assert_eq!(queue.request(e2.clone(), 1.0).unwrap(), RequestResult::Queued);
        let next = queue.release(&e1, 2.0).unwrap();

        assert_eq!(next.map(|e| e.id), Some(e2.id));
        assert!(queue.is_in_service(e2.id));
        // InService, WaitingForResource, Idle, InService
        assert_eq!(refusals.get(), 4);
    }

    #[test]
    fn test_enum_dispatch_matches_variant() {
        let config = ModelConfig {
            discipline: DisciplineKind::FiniteCapacity,
            queue_capacity: Some(0),
            ..Default::default()
        };
        let mut queue: Discipline<Customer> = Discipline::from_config(&config).unwrap();
        let e1 = Customer::new("e1");

        assert_eq!(queue.request(e1.clone(), 0.0).unwrap(), RequestResult::ServedImmediately);
        assert_eq!(
            queue.request(Customer::new("e2"), 1.0).unwrap(),
            RequestResult::RejectedQueueFull
        );
        assert_eq!(queue.busy_servers(), 1);
        assert_eq!(queue.release(&e1, 2.0).unwrap(), None);
        assert_eq!(queue.measure().total_arrivals(), 2);
    }
}
