//! Queue KPI Simulator
//!
//! Queue discipline state machines and an event-sourced KPI engine for
//! discrete-event simulation drivers.
//!
//! # Overview
//!
//! A driver (a simulation scheduler, or the bundled [`simulation::TraceReplay`])
//! tells a discipline when entities arrive and when their service completes.
//! The discipline keeps track of who occupies a server and who waits, and
//! forwards every state change to a [`measure::Measure`]. At the end of a run
//! the measure reduces its observations into a [`measure::KpiReport`], and the
//! [`transient`] functions estimate how long the warm-up phase lasted.
//!
//! ## Key Features
//!
//! - **Disciplines**: FIFO, non-preemptive priority, and FIFO with a bounded line
//! - **KPIs**: waiting, service and system times with confidence intervals,
//!   time-weighted queue length and server utilization, rejection rates
//! - **Warm-up detection**: batch means with a stability window
//!
//! ## Quick Start
//!
//! ```rust
//! use queue_kpi_simulator::*;
//!
//! let mut queue = FifoQueue::new(2, 0.0)?;
//! let a = Customer::new("a");
//! let b = Customer::new("b");
//!
//! queue.request(a.clone(), 0.0)?;
//! queue.request(b.clone(), 1.0)?;
//! queue.release(&a, 5.0)?;
//! queue.release(&b, 6.0)?;
//!
//! let report = queue.get_final_kpis(10.0);
//! let snapshot = report.snapshot().unwrap();
//! assert_eq!(snapshot.arrivals_and_throughput.total_served, 2);
//! assert_eq!(snapshot.arrivals_and_throughput.total_waited, 0);
//! # Ok::<(), QueueError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifiers, enums, and configuration
//! - [`entity`]: The capability disciplines need from the objects they schedule
//! - [`measure`]: Observation recording and KPI reduction
//! - [`discipline`]: Queue state machines
//! - [`transient`]: Warm-up detection
//! - [`simulation`]: Errors, logging, and the trace replay driver
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │ Simulation  │    │ Discipline  │    │   Measure   │
//! │             │    │             │    │             │
//! │ TraceReplay ├───►│ Fifo        ├───►│ log_*       │
//! │ Scenario    │    │ Priority    │    │ KpiReport   │
//! │             │    │ FiniteCap.  │    │             │
//! └─────────────┘    └─────────────┘    └──────┬──────┘
//!                            │                 │ raw observations
//!                            ▼                 ▼
//!                    ┌─────────────┐    ┌─────────────┐
//!                    │   Entity    │    │  Transient  │
//!                    │             │    │             │
//!                    │ Customer    │    │ Batch means │
//!                    └─────────────┘    └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod discipline;
pub mod entity;
pub mod measure;
pub mod simulation;
pub mod transient;
pub mod types;

// Core types and identifiers
pub use types::{
    // Configuration
    ConfigError,
    ConfigValidationError,
    DisciplineKind,
    // Identifiers
    EntityId,
    // Enums
    EntityState,
    ModelConfig,
    RequestResult,
    TransientConfig,
};

// Entities
pub use entity::{Customer, Entity, EntityError};

// Measurement
pub use measure::{KpiReport, KpiSnapshot, Measure, ObservationSummary};

// Disciplines
pub use discipline::{
    Discipline, FifoQueue, FiniteCapacityQueue, PriorityQueue, QueueDiscipline,
};

// Warm-up detection
pub use transient::{
    calculate_transient_data, estimate_warmup, find_transient_end, TransientData, WarmupEstimate,
};

// Simulation types and functionality
pub use simulation::{
    ArrivalRecord, LoggingConfig, QueueError, QueueResult, ReplayOutcome, Scenario, TraceReplay,
};
