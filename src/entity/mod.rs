//! Entities that flow through a queue discipline
//!
//! The disciplines never own the objects they schedule. They hold cheap
//! handles to them and only need three capabilities:
//!
//! - a stable identity ([`Entity::id`]) used as the bookkeeping key
//! - a settable lifecycle state ([`Entity::assign_state`]), written best-effort
//! - an optional numeric priority ([`Entity::priority`]), required only by the
//!   priority discipline
//!
//! # Usage Example
//!
//! ```rust
//! use queue_kpi_simulator::entity::*;
//! use queue_kpi_simulator::types::EntityState;
//!
//! let customer = Customer::with_priority("vip-call", 1.5);
//! let handle = customer.clone();
//!
//! customer.assign_state(EntityState::InService).unwrap();
//! assert_eq!(handle.state(), EntityState::InService);
//! assert_eq!(handle.priority(), Some(1.5));
//! ```

pub mod customer;

pub use customer::Customer;

use crate::types::{EntityId, EntityState};
use thiserror::Error;

/// Failure to store a state value on an entity
///
/// Disciplines log this and carry on; it never fails a request or release.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EntityError {
    /// The entity has no mutable state slot
    #[error("Entity {entity} does not accept state {state}: {reason}")]
    StateNotSettable {
        /// Entity that refused the assignment
        entity: EntityId,
        /// State that was being assigned
        state: EntityState,
        /// Why the assignment failed
        reason: String,
    },
}

/// Capability required from anything placed in a queue discipline
pub trait Entity: Clone {
    /// Stable identity of this entity
    fn id(&self) -> EntityId;

    /// Store the lifecycle state the discipline has moved this entity into
    fn assign_state(&self, state: EntityState) -> Result<(), EntityError>;

    /// Numeric priority, lower values are served first
    fn priority(&self) -> Option<f64> {
        None
    }
}
