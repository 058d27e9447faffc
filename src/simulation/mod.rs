//! Error handling, logging and the trace replay driver
//!
//! # Overview
//!
//! - **QueueError**: error taxonomy shared by every layer of the crate
//! - **LoggingConfig**: subscriber setup for binaries and tests
//! - **TraceReplay**: drives a discipline through a recorded arrival trace
//!
//! # Usage Example
//!
//! ```rust
//! use queue_kpi_simulator::simulation::*;
//! use queue_kpi_simulator::types::ModelConfig;
//!
//! let replay = TraceReplay::new(ModelConfig { capacity: 2, ..Default::default() })?;
//! let outcome = replay.run(&[
//!     ArrivalRecord::new(0.0, 3.0),
//!     ArrivalRecord::new(1.0, 3.0),
//!     ArrivalRecord::new(2.0, 3.0),
//! ])?;
//!
//! assert_eq!(outcome.events_processed, 6);
//! assert!(outcome.kpis.is_complete());
//! # Ok::<(), QueueError>(())
//! ```

pub mod error;
pub mod logging;
pub mod replay;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use replay::*;
