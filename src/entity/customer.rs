//! Ready-made entity handle
//!
//! This module contains the `Customer` handle used by the replay driver and
//! the tests. Clones share the same state cell, so the driver keeps observing
//! state changes made by the discipline.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::{Entity, EntityError};
use crate::types::{EntityId, EntityState};

/// A customer, call, job or vehicle waiting for a server
#[derive(Clone)]
pub struct Customer {
    /// Unique identifier for the customer
    id: EntityId,
    /// Human-readable label used in logs
    label: Rc<str>,
    /// Numeric priority (lower is more urgent)
    priority: Option<f64>,
    /// Lifecycle state shared between all clones of this handle
    state: Rc<Cell<EntityState>>,
}

impl Customer {
    /// Create a new customer without a priority
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            label: Rc::from(label.into()),
            priority: None,
            state: Rc::new(Cell::new(EntityState::Idle)),
        }
    }

    /// Create a new customer with a priority
    pub fn with_priority(label: impl Into<String>, priority: f64) -> Self {
        Self { priority: Some(priority), ..Self::new(label) }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EntityState {
        self.state.get()
    }

    /// Label given at construction
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Entity for Customer {
    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_state(&self, state: EntityState) -> Result<(), EntityError> {
        self.state.set(state);
        Ok(())
    }

    fn priority(&self) -> Option<f64> {
        self.priority
    }
}

impl PartialEq for Customer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Customer {}

impl fmt::Debug for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Customer")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("priority", &self.priority)
            .field("state", &self.state.get())
            .finish()
    }
}
