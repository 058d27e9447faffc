//! Enumeration types for the queue models
//!
//! This module contains the entity lifecycle states, the outcome of a service
//! request, and the set of supported queue disciplines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an entity as seen by a queue discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EntityState {
    /// Not tracked by any discipline (never arrived, rejected, or released)
    #[default]
    Idle,
    /// Sitting in the waiting structure
    WaitingForResource,
    /// Occupying one of the servers
    InService,
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityState::Idle => write!(f, "Idle"),
            EntityState::WaitingForResource => write!(f, "Waiting For Resource"),
            EntityState::InService => write!(f, "In Service"),
        }
    }
}

impl FromStr for EntityState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "idle" => Ok(EntityState::Idle),
            "waiting for resource" | "waitingforresource" | "waiting" => {
                Ok(EntityState::WaitingForResource)
            }
            "in service" | "inservice" | "serving" => Ok(EntityState::InService),
            _ => Err(format!("Unknown entity state: {}", s)),
        }
    }
}

/// Outcome of a `request` call
///
/// Tells the driver whether a service-completion event has to be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestResult {
    /// A server was free; the entity entered service at the request time
    ServedImmediately,
    /// All servers were busy; the entity joined the waiting structure
    Queued,
    /// The waiting structure was full; the entity balked
    RejectedQueueFull,
}

impl RequestResult {
    /// Whether the entity is now held by the discipline
    pub fn is_admitted(&self) -> bool {
        !matches!(self, RequestResult::RejectedQueueFull)
    }
}

impl fmt::Display for RequestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestResult::ServedImmediately => write!(f, "Served Immediately"),
            RequestResult::Queued => write!(f, "Queued"),
            RequestResult::RejectedQueueFull => write!(f, "Rejected Queue Full"),
        }
    }
}

/// Supported queue disciplines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisciplineKind {
    /// First come, first served with an unbounded waiting line
    #[default]
    Fifo,
    /// Lowest priority value first, FIFO among equals
    Priority,
    /// FIFO with a bounded waiting line; arrivals balk when it is full
    FiniteCapacity,
}

impl fmt::Display for DisciplineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisciplineKind::Fifo => write!(f, "FIFO"),
            DisciplineKind::Priority => write!(f, "Priority"),
            DisciplineKind::FiniteCapacity => write!(f, "Finite Capacity"),
        }
    }
}

impl FromStr for DisciplineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fifo" | "fcfs" => Ok(DisciplineKind::Fifo),
            "priority" => Ok(DisciplineKind::Priority),
            "finite_capacity" | "finite capacity" | "finitecapacity" | "finite" => {
                Ok(DisciplineKind::FiniteCapacity)
            }
            _ => Err(format!("Unknown discipline: {}", s)),
        }
    }
}
