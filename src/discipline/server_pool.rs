//! Server occupancy shared by every discipline
//!
//! The occupant set and the per-entity service record live in one map keyed
//! by entity id, so an entity can never be "in service" without a record or
//! the other way round.

use std::collections::HashMap;

use crate::entity::Entity;
use crate::simulation::{QueueError, QueueResult};
use crate::types::EntityId;

/// Bookkeeping for an entity occupying a server
#[derive(Debug, Clone)]
pub struct ServiceRecord<E> {
    /// Handle to the occupant
    pub entity: E,
    /// Time the entity arrived at the discipline
    pub arrival_time: f64,
    /// Time the entity entered service
    pub service_start_time: f64,
    /// Priority class the entity was served under, if any
    pub priority: Option<f64>,
}

impl<E> ServiceRecord<E> {
    /// Time spent waiting before service
    pub fn wait_time(&self) -> f64 {
        self.service_start_time - self.arrival_time
    }
}

/// Fixed set of parallel servers and their occupants
#[derive(Debug, Clone)]
pub struct ServerPool<E> {
    capacity: usize,
    in_service: HashMap<EntityId, ServiceRecord<E>>,
}

impl<E: Entity> ServerPool<E> {
    /// Create a pool of `capacity` servers; zero servers is rejected
    pub fn new(capacity: usize) -> QueueResult<Self> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity(0));
        }
        Ok(Self { capacity, in_service: HashMap::with_capacity(capacity) })
    }

    /// Number of parallel servers
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of occupied servers
    pub fn busy(&self) -> usize {
        self.in_service.len()
    }

    /// Whether at least one server is free
    pub fn has_free_server(&self) -> bool {
        self.in_service.len() < self.capacity
    }

    /// Whether `id` currently occupies a server
    pub fn contains(&self, id: EntityId) -> bool {
        self.in_service.contains_key(&id)
    }

    /// Service record of an occupant
    pub fn record(&self, id: EntityId) -> Option<&ServiceRecord<E>> {
        self.in_service.get(&id)
    }

    /// Place `entity` on a free server
    ///
    /// Callers check [`ServerPool::has_free_server`] first.
    pub fn admit(&mut self, entity: E, arrival_time: f64, start_time: f64, priority: Option<f64>) {
        debug_assert!(self.has_free_server(), "admit called with all servers busy");
        let record = ServiceRecord { entity, arrival_time, service_start_time: start_time, priority };
        self.in_service.insert(record.entity.id(), record);
    }

    /// Free the server held by `id` and hand back its record
    pub fn vacate(&mut self, id: EntityId) -> QueueResult<ServiceRecord<E>> {
        self.in_service.remove(&id).ok_or_else(|| QueueError::invalid_release(id))
    }

    /// Iterate over current occupants
    pub fn occupants(&self) -> impl Iterator<Item = &E> {
        self.in_service.values().map(|record| &record.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Customer;

    #[test]
    fn test_zero_capacity_rejected() {
        let pool: QueueResult<ServerPool<Customer>> = ServerPool::new(0);
        assert!(matches!(pool, Err(QueueError::InvalidCapacity(0))));
    }

    #[test]
    fn test_admit_and_vacate() {
        let mut pool = ServerPool::new(2).unwrap();
        let customer = Customer::new("c1");

        pool.admit(customer.clone(), 1.0, 3.0, None);
        assert_eq!(pool.busy(), 1);
        assert!(pool.has_free_server());
        assert!(pool.contains(customer.id()));
        assert_eq!(pool.record(customer.id()).unwrap().wait_time(), 2.0);

        let record = pool.vacate(customer.id()).unwrap();
        assert_eq!(record.arrival_time, 1.0);
        assert_eq!(record.service_start_time, 3.0);
        assert_eq!(pool.busy(), 0);
    }

    #[test]
    fn test_vacate_unknown_entity() {
        let mut pool: ServerPool<Customer> = ServerPool::new(1).unwrap();
        let stranger = Customer::new("stranger");
        assert!(matches!(pool.vacate(stranger.id()), Err(QueueError::InvalidRelease { .. })));
    }
}
